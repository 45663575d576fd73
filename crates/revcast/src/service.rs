//! Serving predictions from a trained model artifact.

use crate::error::{Error, Result};
use revcast_data::{CompanyFeatures, Dataset};
use revcast_model::{Evaluation, ModelArtifact};
use revcast_output::{PredictionReport, QualitySummary, delta_from_mean};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Estimated revenue for one company, relative to the training data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Estimated annual revenue
    pub revenue: f64,

    /// Mean revenue of the training set
    pub mean_revenue: f64,

    /// `revenue - mean_revenue`
    pub delta_from_mean: f64,

    /// Delta as a percentage of the training mean, if the mean is non-zero
    pub delta_pct: Option<f64>,
}

impl Prediction {
    fn new(revenue: f64, mean_revenue: f64) -> Self {
        let (delta_from_mean, delta_pct) = delta_from_mean(revenue, mean_revenue);
        Self {
            revenue,
            mean_revenue,
            delta_from_mean,
            delta_pct,
        }
    }

    /// Full report for this prediction and the inputs that produced it.
    pub fn report(&self, features: &CompanyFeatures) -> PredictionReport {
        PredictionReport::new(features.clone(), self.revenue, self.mean_revenue)
    }
}

/// Answers prediction requests with a loaded artifact.
///
/// The artifact is immutable and shared, so clones are cheap and the service
/// can be used from several threads without locking.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifact: Arc<ModelArtifact>,
}

impl PredictionService {
    /// Serve an artifact that is already in memory.
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    /// Load the artifact at `path` and serve it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    /// The artifact being served.
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Validate `features`, apply the fitted preprocessing and evaluate the
    /// model.
    pub fn predict(&self, features: &CompanyFeatures) -> Result<Prediction> {
        validate(features)?;
        let revenue = self.artifact.predict(features)?;
        debug!(revenue, region = %features.region, "served prediction");
        Ok(Prediction::new(revenue, self.artifact.summary().mean_revenue))
    }

    /// Predict every record of `dataset` and score the predictions.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Evaluation> {
        Ok(self.artifact.evaluate(dataset)?)
    }

    /// Quality summary recorded at training time, with coefficients attached.
    pub fn quality_summary(&self) -> QualitySummary {
        QualitySummary::from_training(self.artifact.summary()).with_coefficients(
            self.artifact.model().intercept(),
            self.artifact.named_coefficients(),
        )
    }
}

fn validate(features: &CompanyFeatures) -> Result<()> {
    let amounts = [
        ("marketing_spend", features.marketing_spend),
        ("rd_spend", features.rd_spend),
        ("administration_costs", features.administration_costs),
    ];
    for (field, value) in amounts {
        if !value.is_finite() {
            return Err(Error::InvalidInput {
                field,
                reason: format!("{value} is not a finite number"),
            });
        }
        if value < 0.0 {
            return Err(Error::InvalidInput {
                field,
                reason: format!("{value} is negative"),
            });
        }
    }
    if features.region.trim().is_empty() {
        return Err(Error::InvalidInput {
            field: "region",
            reason: "region must not be blank".to_string(),
        });
    }
    Ok(())
}

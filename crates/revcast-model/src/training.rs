//! Training pipeline: preprocess, fit, score, package.

use crate::ModelError;
use crate::artifact::{ModelArtifact, TrainingSummary};
use crate::evaluation::evaluate;
use crate::preprocessing::Preprocessor;
use crate::regression::{LinearRegression, LinearRegressionConfig};
use chrono::Utc;
use ndarray::Array1;
use revcast_data::Dataset;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Training configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Regression settings
    pub regression: LinearRegressionConfig,

    /// Label recorded as the data source in the artifact summary
    pub source: Option<String>,
}

/// Fit the full pipeline on `dataset` and package it as an artifact.
///
/// The reported metrics come from predicting every training record through
/// the same path the prediction service uses, so they are in-sample.
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<ModelArtifact, ModelError> {
    let preprocessor = Preprocessor::fit(dataset)?;
    let design = preprocessor.transform_batch(dataset.features())?;
    let target = Array1::from(dataset.revenues());

    let model = LinearRegression::new(config.regression.clone()).fit(&design, &target)?;
    let evaluation = evaluate(&preprocessor, &model, dataset)?;

    let (min_revenue, max_revenue) = dataset.revenue_range().unwrap_or_default();
    let summary = TrainingSummary {
        n_samples: dataset.len(),
        mean_revenue: dataset.mean_revenue(),
        min_revenue,
        max_revenue,
        metrics: evaluation.metrics,
        trained_at: Utc::now(),
        source: config.source.clone(),
    };

    info!(
        samples = summary.n_samples,
        features = preprocessor.n_features(),
        rank = model.rank(),
        r2 = summary.metrics.r2,
        "trained revenue model"
    );

    Ok(ModelArtifact::new(preprocessor, model, summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::PreprocessError;
    use approx::assert_relative_eq;
    use revcast_data::{CompanyFeatures, CompanyRecord};

    fn three_companies() -> Dataset {
        Dataset::from_records(vec![
            CompanyRecord::new(
                CompanyFeatures::new(100000.0, 150000.0, 120000.0, 100, "Europe"),
                500000.0,
            ),
            CompanyRecord::new(
                CompanyFeatures::new(50000.0, 50000.0, 50000.0, 20, "Asia"),
                200000.0,
            ),
            CompanyRecord::new(
                CompanyFeatures::new(200000.0, 300000.0, 250000.0, 500, "North America"),
                1200000.0,
            ),
        ])
    }

    #[test]
    fn test_three_point_fit_interpolates() {
        let dataset = three_companies();
        let artifact = train(&dataset, &TrainingConfig::default()).unwrap();

        let first = &dataset.records()[0];
        let prediction = artifact.predict(&first.features).unwrap();
        assert!(prediction.is_finite());
        assert_relative_eq!(prediction, first.revenue, max_relative = 1e-8);
        assert_relative_eq!(artifact.summary().metrics.r2, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_summary_statistics() {
        let artifact = train(&three_companies(), &TrainingConfig::default()).unwrap();
        let summary = artifact.summary();

        assert_eq!(summary.n_samples, 3);
        assert_relative_eq!(summary.mean_revenue, 1900000.0 / 3.0);
        assert_eq!(summary.min_revenue, 200000.0);
        assert_eq!(summary.max_revenue, 1200000.0);
        assert_eq!(summary.metrics.n_samples, 3);
    }

    #[test]
    fn test_empty_dataset_is_fit_error() {
        let err = train(&Dataset::default(), &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::Preprocess(PreprocessError::Empty)));
        assert!(err.is_fit_error());
    }

    #[test]
    fn test_source_recorded() {
        let config = TrainingConfig {
            source: Some("companies.csv".to_string()),
            ..Default::default()
        };
        let artifact = train(&three_companies(), &config).unwrap();
        assert_eq!(artifact.summary().source.as_deref(), Some("companies.csv"));
    }
}

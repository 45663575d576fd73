//! In-sample evaluation of a fitted pipeline over a dataset.
//!
//! The metrics are computed on the same records the model was fitted on, so
//! they describe goodness of fit, not generalization.

use crate::ModelError;
use crate::metrics::{RegressionMetrics, residuals};
use crate::preprocessing::Preprocessor;
use crate::regression::FittedLinearModel;
use revcast_data::Dataset;
use serde::{Deserialize, Serialize};

/// Per-record predictions and the metrics derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Observed revenue, in dataset order
    pub actual: Vec<f64>,

    /// Predicted revenue, in dataset order
    pub predicted: Vec<f64>,

    /// Region label of each record
    pub regions: Vec<String>,

    /// Metrics over all records
    pub metrics: RegressionMetrics,
}

impl Evaluation {
    /// `actual - predicted` for every record.
    pub fn residuals(&self) -> Vec<f64> {
        residuals(&self.actual, &self.predicted)
    }
}

/// Predict every record of `dataset` one at a time and score the result.
pub fn evaluate(
    preprocessor: &Preprocessor,
    model: &FittedLinearModel,
    dataset: &Dataset,
) -> Result<Evaluation, ModelError> {
    let predicted = dataset
        .features()
        .map(|features| -> Result<f64, ModelError> {
            let row = preprocessor.transform(features)?;
            Ok(model.predict(row.view())?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let actual = dataset.revenues();
    let metrics = RegressionMetrics::compute(&actual, &predicted)?;

    Ok(Evaluation {
        actual,
        predicted,
        regions: dataset.features().map(|f| f.region.clone()).collect(),
        metrics,
    })
}

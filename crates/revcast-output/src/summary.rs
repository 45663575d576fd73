//! Model-quality summary.
//!
//! The metrics shown here are measured on the data the model was fitted on,
//! so they describe goodness of fit rather than accuracy on new companies.

use chrono::{DateTime, Utc};
use revcast_model::{Evaluation, RegressionMetrics, TrainingSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

const IN_SAMPLE_NOTE: &str = "Metrics are in-sample: computed on the training data itself.";

/// A named regression coefficient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoefficientRow {
    /// Transformed feature name, e.g. `num__Marketing_Spend`.
    pub feature: String,

    /// Fitted coefficient.
    pub value: f64,
}

/// Quality metrics plus the revenue range they were measured over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualitySummary {
    /// Number of records scored.
    pub n_samples: usize,

    /// Mean absolute error.
    pub mae: f64,

    /// Root mean squared error.
    pub rmse: f64,

    /// Coefficient of determination.
    pub r2: f64,

    /// Mean observed revenue.
    pub mean_revenue: f64,

    /// Smallest observed revenue.
    pub min_revenue: f64,

    /// Largest observed revenue.
    pub max_revenue: f64,

    /// When the model was trained, if known.
    pub trained_at: Option<DateTime<Utc>>,

    /// Training data source, if known.
    pub source: Option<String>,

    /// Model intercept, when coefficients are attached.
    pub intercept: Option<f64>,

    /// Fitted coefficients, possibly empty.
    pub coefficients: Vec<CoefficientRow>,
}

impl QualitySummary {
    /// Summary stored in a model artifact at training time.
    pub fn from_training(summary: &TrainingSummary) -> Self {
        Self::with_metrics(
            summary.metrics,
            summary.mean_revenue,
            summary.min_revenue,
            summary.max_revenue,
        )
        .with_provenance(summary.trained_at, summary.source.clone())
    }

    /// Summary recomputed from an evaluation over a dataset.
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        let actual = &evaluation.actual;
        let mean = if actual.is_empty() {
            0.0
        } else {
            actual.iter().sum::<f64>() / actual.len() as f64
        };
        let min = actual.iter().copied().fold(f64::INFINITY, f64::min);
        let max = actual.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self::with_metrics(
            evaluation.metrics,
            mean,
            if min.is_finite() { min } else { 0.0 },
            if max.is_finite() { max } else { 0.0 },
        )
    }

    fn with_metrics(metrics: RegressionMetrics, mean: f64, min: f64, max: f64) -> Self {
        Self {
            n_samples: metrics.n_samples,
            mae: metrics.mae,
            rmse: metrics.rmse,
            r2: metrics.r2,
            mean_revenue: mean,
            min_revenue: min,
            max_revenue: max,
            trained_at: None,
            source: None,
            intercept: None,
            coefficients: Vec::new(),
        }
    }

    /// Attach training time and data source.
    pub fn with_provenance(mut self, trained_at: DateTime<Utc>, source: Option<String>) -> Self {
        self.trained_at = Some(trained_at);
        self.source = source;
        self
    }

    /// Attach the fitted intercept and named coefficients.
    pub fn with_coefficients<'a, I>(mut self, intercept: f64, coefficients: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.intercept = Some(intercept);
        self.coefficients = coefficients
            .into_iter()
            .map(|(feature, value)| CoefficientRow {
                feature: feature.to_string(),
                value,
            })
            .collect();
        self
    }

    /// MAE as a percentage of mean revenue.
    pub fn relative_mae_pct(&self) -> Option<f64> {
        crate::report::percent_of(self.mae, self.mean_revenue)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nModel Quality\n");
        if let Some(trained_at) = self.trained_at {
            output.push_str(&format!(
                "Trained: {}",
                trained_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if let Some(source) = &self.source {
                output.push_str(&format!(" from {source}"));
            }
            output.push('\n');
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str("\nMetrics:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("  Samples:                  {:>16}\n", self.n_samples));
        output.push_str(&format!("  MAE:                      {:>16.2}", self.mae));
        if let Some(pct) = self.relative_mae_pct() {
            output.push_str(&format!(" ({pct:.1}% of mean)"));
        }
        output.push('\n');
        output.push_str(&format!("  RMSE:                     {:>16.2}\n", self.rmse));
        output.push_str(&format!("  R²:                       {:>16.4}\n", self.r2));

        output.push_str("\nRevenue:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  Mean:                     {:>16.2}\n",
            self.mean_revenue
        ));
        output.push_str(&format!(
            "  Min:                      {:>16.2}\n",
            self.min_revenue
        ));
        output.push_str(&format!(
            "  Max:                      {:>16.2}\n",
            self.max_revenue
        ));

        if let Some(intercept) = self.intercept {
            output.push_str("\nCoefficients:\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            output.push_str(&format!("  {:<36}{:>16.4}\n", "intercept", intercept));
            for row in &self.coefficients {
                output.push_str(&format!("  {:<36}{:>16.4}\n", row.feature, row.value));
            }
        }

        output.push('\n');
        output.push_str(IN_SAMPLE_NOTE);
        output.push('\n');
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Model Quality\n\n");
        if let Some(trained_at) = self.trained_at {
            output.push_str(&format!(
                "**Trained:** {}\n\n",
                trained_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if let Some(source) = &self.source {
            output.push_str(&format!("**Data:** `{source}`\n\n"));
        }

        output.push_str("## Metrics\n\n");
        output.push_str(&format!("- **Samples:** {}\n", self.n_samples));
        output.push_str(&format!("- **MAE:** {:.2}\n", self.mae));
        output.push_str(&format!("- **RMSE:** {:.2}\n", self.rmse));
        output.push_str(&format!("- **R²:** {:.4}\n\n", self.r2));

        output.push_str("## Revenue\n\n");
        output.push_str("| Mean | Min | Max |\n");
        output.push_str("|------|-----|-----|\n");
        output.push_str(&format!(
            "| {:.2} | {:.2} | {:.2} |\n\n",
            self.mean_revenue, self.min_revenue, self.max_revenue
        ));

        if let Some(intercept) = self.intercept {
            output.push_str("## Coefficients\n\n");
            output.push_str("| Feature | Coefficient |\n");
            output.push_str("|---------|-------------|\n");
            output.push_str(&format!("| intercept | {intercept:.4} |\n"));
            for row in &self.coefficients {
                output.push_str(&format!("| `{}` | {:.4} |\n", row.feature, row.value));
            }
            output.push('\n');
        }

        output.push_str(&format!("_{IN_SAMPLE_NOTE}_\n"));
        output
    }
}

impl fmt::Display for QualitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Quality ({} samples, in-sample)", self.n_samples)?;
        writeln!(f, "  MAE: {:.2}", self.mae)?;
        writeln!(f, "  RMSE: {:.2}", self.rmse)?;
        writeln!(f, "  R²: {:.4}", self.r2)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn evaluation() -> Evaluation {
        Evaluation {
            actual: vec![100.0, 200.0, 300.0],
            predicted: vec![110.0, 190.0, 300.0],
            regions: vec!["Asia".into(), "Europe".into(), "Asia".into()],
            metrics: RegressionMetrics {
                mae: 20.0 / 3.0,
                rmse: (200.0_f64 / 3.0).sqrt(),
                r2: 0.99,
                n_samples: 3,
            },
        }
    }

    #[test]
    fn test_from_evaluation_revenue_range() {
        let summary = QualitySummary::from_evaluation(&evaluation());

        assert_eq!(summary.n_samples, 3);
        assert_relative_eq!(summary.mean_revenue, 200.0);
        assert_eq!(summary.min_revenue, 100.0);
        assert_eq!(summary.max_revenue, 300.0);
        assert!(summary.trained_at.is_none());
    }

    #[test]
    fn test_relative_mae() {
        let summary = QualitySummary::from_evaluation(&evaluation());
        assert_relative_eq!(summary.relative_mae_pct().unwrap(), 100.0 / 30.0);
    }

    #[test]
    fn test_tables_label_in_sample() {
        let summary = QualitySummary::from_evaluation(&evaluation())
            .with_coefficients(5.0, [("num__Marketing_Spend", 1.5)]);

        let ascii = summary.to_ascii_table();
        assert!(ascii.contains("in-sample"));
        assert!(ascii.contains("num__Marketing_Spend"));

        let markdown = summary.to_markdown();
        assert!(markdown.contains("# Model Quality"));
        assert!(markdown.contains("| intercept | 5.0000 |"));
        assert!(markdown.contains("in-sample"));
    }

    #[test]
    fn test_empty_evaluation_range_is_zero() {
        let empty = Evaluation {
            actual: vec![],
            predicted: vec![],
            regions: vec![],
            metrics: RegressionMetrics {
                mae: 0.0,
                rmse: 0.0,
                r2: 0.0,
                n_samples: 0,
            },
        };
        let summary = QualitySummary::from_evaluation(&empty);
        assert_eq!(summary.min_revenue, 0.0);
        assert_eq!(summary.max_revenue, 0.0);
        assert!(summary.relative_mae_pct().is_none());
    }
}

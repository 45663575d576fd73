//! Report for a single revenue prediction.

use chrono::{DateTime, Utc};
use revcast_data::CompanyFeatures;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A prediction together with the context needed to read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// The inputs that were scored.
    pub features: CompanyFeatures,

    /// Estimated annual revenue.
    pub predicted_revenue: f64,

    /// Mean revenue of the training data.
    pub mean_revenue: f64,

    /// `predicted_revenue - mean_revenue`.
    pub delta_from_mean: f64,

    /// Delta as a percentage of the mean, absent when the mean is zero.
    pub delta_pct: Option<f64>,

    /// Marketing spend divided by predicted revenue.
    pub marketing_ratio: Option<f64>,

    /// R&D spend divided by predicted revenue.
    pub rd_ratio: Option<f64>,

    /// Administration costs divided by predicted revenue.
    pub admin_ratio: Option<f64>,
}

impl PredictionReport {
    /// Build a report for `predicted_revenue`.
    ///
    /// Ratios are only defined for a positive prediction.
    pub fn new(features: CompanyFeatures, predicted_revenue: f64, mean_revenue: f64) -> Self {
        let ratio = |spend: f64| (predicted_revenue > 0.0).then(|| spend / predicted_revenue);
        let (delta_from_mean, delta_pct) = delta_from_mean(predicted_revenue, mean_revenue);

        Self {
            generated_at: Utc::now(),
            marketing_ratio: ratio(features.marketing_spend),
            rd_ratio: ratio(features.rd_spend),
            admin_ratio: ratio(features.administration_costs),
            features,
            predicted_revenue,
            mean_revenue,
            delta_from_mean,
            delta_pct,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nRevenue Prediction\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str("\nInputs:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  Marketing Spend:          {:>16.2}\n",
            self.features.marketing_spend
        ));
        output.push_str(&format!(
            "  R&D Spend:                {:>16.2}\n",
            self.features.rd_spend
        ));
        output.push_str(&format!(
            "  Administration Costs:     {:>16.2}\n",
            self.features.administration_costs
        ));
        output.push_str(&format!(
            "  Employees:                {:>16}\n",
            self.features.employee_count
        ));
        output.push_str(&format!(
            "  Region:                   {:>16}\n",
            self.features.region
        ));

        output.push_str("\nEstimate:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  Predicted Revenue:        {:>16.2}\n",
            self.predicted_revenue
        ));
        output.push_str(&format!(
            "  Training Mean Revenue:    {:>16.2}\n",
            self.mean_revenue
        ));
        output.push_str(&format!(
            "  Delta From Mean:          {:>+16.2}",
            self.delta_from_mean
        ));
        if let Some(pct) = self.delta_pct {
            output.push_str(&format!(" ({pct:+.1}%)"));
        }
        output.push('\n');

        output.push_str("\nSpend / Revenue:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for (label, ratio) in self.ratios() {
            output.push_str(&format!("  {label:<26}{:>16}\n", format_ratio(ratio)));
        }

        output.push_str(&"=".repeat(60));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Revenue Prediction\n\n");
        output.push_str(&format!(
            "**Generated:** {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str("## Inputs\n\n");
        output.push_str("| Field | Value |\n");
        output.push_str("|-------|-------|\n");
        output.push_str(&format!(
            "| Marketing Spend | {:.2} |\n",
            self.features.marketing_spend
        ));
        output.push_str(&format!("| R&D Spend | {:.2} |\n", self.features.rd_spend));
        output.push_str(&format!(
            "| Administration Costs | {:.2} |\n",
            self.features.administration_costs
        ));
        output.push_str(&format!(
            "| Employees | {} |\n",
            self.features.employee_count
        ));
        output.push_str(&format!("| Region | {} |\n\n", self.features.region));

        output.push_str("## Estimate\n\n");
        output.push_str(&format!(
            "- **Predicted Revenue:** {:.2}\n",
            self.predicted_revenue
        ));
        output.push_str(&format!(
            "- **Training Mean Revenue:** {:.2}\n",
            self.mean_revenue
        ));
        output.push_str(&format!(
            "- **Delta From Mean:** {:+.2}",
            self.delta_from_mean
        ));
        if let Some(pct) = self.delta_pct {
            output.push_str(&format!(" ({pct:+.1}%)"));
        }
        output.push_str("\n\n");

        output.push_str("## Spend / Revenue\n\n");
        output.push_str("| Spend | Ratio |\n");
        output.push_str("|-------|-------|\n");
        for (label, ratio) in self.ratios() {
            output.push_str(&format!("| {label} | {} |\n", format_ratio(ratio)));
        }

        output
    }

    fn ratios(&self) -> [(&'static str, Option<f64>); 3] {
        [
            ("Marketing", self.marketing_ratio),
            ("R&D", self.rd_ratio),
            ("Administration", self.admin_ratio),
        ]
    }
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Predicted revenue: {:.2} ({:+.2} vs. training mean",
            self.predicted_revenue, self.delta_from_mean
        )?;
        if let Some(pct) = self.delta_pct {
            write!(f, ", {pct:+.1}%")?;
        }
        write!(f, ")")
    }
}

/// Distance of `value` from `mean`, absolute and as a percentage of the mean.
///
/// The percentage is `None` when the mean is zero.
pub fn delta_from_mean(value: f64, mean: f64) -> (f64, Option<f64>) {
    let delta = value - mean;
    (delta, percent_of(delta, mean))
}

/// `value` as a percentage of `base`, undefined for a zero base.
pub(crate) fn percent_of(value: f64, base: f64) -> Option<f64> {
    (base.abs() > f64::EPSILON).then(|| value / base * 100.0)
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "n/a".to_string(), |r| format!("{r:.3}"))
}

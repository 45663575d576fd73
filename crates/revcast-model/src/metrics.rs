//! Regression quality metrics.

use crate::regression::RegressionError;
use serde::{Deserialize, Serialize};

/// Mean absolute error, root mean squared error and coefficient of
/// determination over one set of predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean absolute error
    pub mae: f64,

    /// Root mean squared error
    pub rmse: f64,

    /// Coefficient of determination
    pub r2: f64,

    /// Number of samples scored
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Score `predicted` against `actual`.
    ///
    /// When `actual` has zero variance, R² is 1.0 for a perfect fit and 0.0
    /// otherwise.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self, RegressionError> {
        if actual.len() != predicted.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: actual.len(),
                actual: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(RegressionError::EmptyInput);
        }

        let n = actual.len() as f64;
        let mean = actual.iter().sum::<f64>() / n;

        let (abs_sum, ss_res, ss_tot) = actual.iter().zip(predicted).fold(
            (0.0, 0.0, 0.0),
            |(abs_sum, ss_res, ss_tot), (&y, &y_hat)| {
                let residual = y - y_hat;
                (
                    abs_sum + residual.abs(),
                    ss_res + residual * residual,
                    ss_tot + (y - mean) * (y - mean),
                )
            },
        );

        let r2 = if ss_tot == 0.0 {
            if ss_res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(Self {
            mae: abs_sum / n,
            rmse: (ss_res / n).sqrt(),
            r2,
            n_samples: actual.len(),
        })
    }
}

/// Element-wise `actual - predicted`.
pub fn residuals(actual: &[f64], predicted: &[f64]) -> Vec<f64> {
    actual
        .iter()
        .zip(predicted)
        .map(|(y, y_hat)| y - y_hat)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_predictions() {
        let m = RegressionMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.n_samples, 3);
    }

    #[test]
    fn test_known_values() {
        // residuals: 1, -1, 2, 0
        let actual = [3.0, 5.0, 9.0, 7.0];
        let predicted = [2.0, 6.0, 7.0, 7.0];
        let m = RegressionMetrics::compute(&actual, &predicted).unwrap();

        assert_relative_eq!(m.mae, 1.0);
        assert_relative_eq!(m.rmse, (6.0f64 / 4.0).sqrt());
        // mean 6, ss_tot = 9 + 1 + 9 + 1 = 20, ss_res = 6
        assert_relative_eq!(m.r2, 1.0 - 6.0 / 20.0);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let m = RegressionMetrics::compute(&[1.0, 3.0], &[2.0, 2.0]).unwrap();
        assert_relative_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_zero_variance_target() {
        let perfect = RegressionMetrics::compute(&[4.0, 4.0], &[4.0, 4.0]).unwrap();
        assert_eq!(perfect.r2, 1.0);

        let off = RegressionMetrics::compute(&[4.0, 4.0], &[4.0, 5.0]).unwrap();
        assert_eq!(off.r2, 0.0);
        assert!(off.r2.is_finite());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(RegressionMetrics::compute(&[1.0, 2.0], &[1.0]).is_err());
        assert!(RegressionMetrics::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_residuals() {
        assert_eq!(residuals(&[3.0, 1.0], &[1.0, 2.0]), vec![2.0, -1.0]);
    }
}

//! Ordinary least squares regression
//!
//! Fits `y ≈ Xβ + b` by minimizing the sum of squared residuals.
//!
//! With an intercept, columns and target are centered first; the slope is
//! then the minimum-norm solution of the normal equations
//!
//! ```text
//! (XcᵀXc) β = Xcᵀyc
//! ```
//!
//! solved through the pseudo-inverse, and `b = ȳ − x̄·β`. Collinear columns
//! (a full one-hot block sums to one) or fewer samples than columns only
//! reduce the rank; they never make the fit fail.

use crate::linalg::{LinalgError, pseudo_inverse_solve};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while fitting or evaluating a linear model.
#[derive(Debug, Error)]
pub enum RegressionError {
    /// No samples to fit on
    #[error("Cannot fit a regression on zero samples")]
    EmptyInput,

    /// Shapes do not line up
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Input holds NaN or infinite values
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    /// Linear algebra failure
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

/// Linear regression configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionConfig {
    /// Whether to fit an intercept term
    pub fit_intercept: bool,

    /// Relative cutoff below which eigenvalues of `XᵀX` count as zero
    pub rcond: f64,
}

impl Default for LinearRegressionConfig {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            rcond: 1e-10,
        }
    }
}

/// Closed-form least-squares estimator
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    config: LinearRegressionConfig,
}

impl LinearRegression {
    /// Create a new estimator
    pub const fn new(config: LinearRegressionConfig) -> Self {
        Self { config }
    }

    /// Fit the model to design matrix `x` (n × p) and target `y` (n)
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<FittedLinearModel, RegressionError> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(RegressionError::EmptyInput);
        }
        if y.len() != n_samples {
            return Err(RegressionError::DimensionMismatch {
                expected: n_samples,
                actual: y.len(),
            });
        }
        if !x.iter().all(|v| v.is_finite()) {
            return Err(RegressionError::NonFinite("design matrix"));
        }
        if !y.iter().all(|v| v.is_finite()) {
            return Err(RegressionError::NonFinite("target"));
        }

        let (x_offset, y_offset) = if self.config.fit_intercept {
            (
                x.mean_axis(Axis(0)).ok_or(RegressionError::EmptyInput)?,
                y.mean().ok_or(RegressionError::EmptyInput)?,
            )
        } else {
            (Array1::zeros(n_features), 0.0)
        };

        let xc = x - &x_offset;
        let yc = y - y_offset;

        let gram = xc.t().dot(&xc);
        let moment = xc.t().dot(&yc);
        let (coefficients, rank) = pseudo_inverse_solve(&gram, &moment, self.config.rcond)?;

        let intercept = if self.config.fit_intercept {
            y_offset - x_offset.dot(&coefficients)
        } else {
            0.0
        };

        if rank < n_features {
            warn!(rank, n_features, "design matrix is rank deficient, using minimum-norm solution");
        }
        debug!(n_samples, n_features, rank, intercept, "fitted linear model");

        Ok(FittedLinearModel {
            coefficients,
            intercept,
            rank,
        })
    }
}

/// Fitted linear model. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLinearModel {
    coefficients: Array1<f64>,
    intercept: f64,
    rank: usize,
}

impl FittedLinearModel {
    /// Build a model from known parameters
    pub const fn from_parts(coefficients: Array1<f64>, intercept: f64, rank: usize) -> Self {
        Self {
            coefficients,
            intercept,
            rank,
        }
    }

    /// Slope for each feature column
    pub const fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Intercept term
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Numerical rank of the centered design at fit time
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Number of feature columns the model expects
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one sample: `β·x + b`
    pub fn predict(&self, features: ArrayView1<'_, f64>) -> Result<f64, RegressionError> {
        if features.len() != self.coefficients.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        Ok(features.dot(&self.coefficients) + self.intercept)
    }

    /// Predict every row of `x`
    ///
    /// Each row goes through [`Self::predict`], so batch and single-sample
    /// predictions agree bit for bit.
    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Array1<f64>, RegressionError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict(row))
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_config_default() {
        let config = LinearRegressionConfig::default();
        assert!(config.fit_intercept);
        assert_relative_eq!(config.rcond, 1e-10);
    }

    #[test]
    fn test_recovers_exact_line() {
        // y = 2 x1 - 3 x2 + 5
        let x = array![[1.0, 0.0], [0.0, 1.0], [2.0, 1.0], [3.0, 5.0], [-1.0, 2.0]];
        let y = x.map_axis(Axis(1), |r| 2.0 * r[0] - 3.0 * r[1] + 5.0);

        let model = LinearRegression::default().fit(&x, &y).unwrap();
        assert_eq!(model.rank(), 2);
        assert_relative_eq!(model.coefficients()[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(model.coefficients()[1], -3.0, epsilon = 1e-9);
        assert_relative_eq!(model.intercept(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_columns_do_not_fail() {
        // Second column duplicates the first.
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let model = LinearRegression::default().fit(&x, &y).unwrap();
        assert_eq!(model.rank(), 1);
        // Minimum-norm solution splits the slope evenly.
        assert_relative_eq!(model.coefficients()[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(model.coefficients()[1], 1.0, epsilon = 1e-9);
        let fitted = model.predict_batch(&x).unwrap();
        for (p, t) in fitted.iter().zip(y.iter()) {
            assert_relative_eq!(p, t, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_more_columns_than_samples_interpolates() {
        let x = array![[1.0, 0.0, 3.0, 1.0], [0.0, 2.0, 1.0, 0.0]];
        let y = array![10.0, -4.0];

        let model = LinearRegression::default().fit(&x, &y).unwrap();
        assert_eq!(model.rank(), 1);
        let fitted = model.predict_batch(&x).unwrap();
        assert_relative_eq!(fitted[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(fitted[1], -4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_without_intercept() {
        let config = LinearRegressionConfig {
            fit_intercept: false,
            ..Default::default()
        };
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let model = LinearRegression::new(config).fit(&x, &y).unwrap();
        assert_eq!(model.intercept(), 0.0);
        assert_relative_eq!(model.coefficients()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![7.0, 7.0, 7.0];

        let model = LinearRegression::default().fit(&x, &y).unwrap();
        assert_relative_eq!(model.coefficients()[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(model.intercept(), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        assert!(matches!(
            LinearRegression::default().fit(&x, &y),
            Err(RegressionError::EmptyInput)
        ));
    }

    #[test]
    fn test_target_length_mismatch() {
        let x = Array2::<f64>::zeros((3, 2));
        let y = Array1::<f64>::zeros(2);
        assert!(matches!(
            LinearRegression::default().fit(&x, &y),
            Err(RegressionError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let x = array![[1.0], [f64::NAN]];
        let y = array![1.0, 2.0];
        assert!(matches!(
            LinearRegression::default().fit(&x, &y),
            Err(RegressionError::NonFinite(_))
        ));
    }

    #[test]
    fn test_predict_checks_width() {
        let model = FittedLinearModel::from_parts(array![1.0, 2.0], 0.5, 2);
        assert_relative_eq!(model.predict(array![1.0, 1.0].view()).unwrap(), 3.5);
        assert!(model.predict(array![1.0].view()).is_err());
    }
}

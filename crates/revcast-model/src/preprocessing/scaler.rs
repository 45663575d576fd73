//! Standard scaler (z-score normalization).
//!
//! ```text
//! z = (x - mean) / std
//! ```
//!
//! `mean` and `std` are fitted once per column with the population standard
//! deviation (ddof = 0). A column whose standard deviation is zero maps every
//! input to 0.

use super::PreprocessError;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted per-column standardization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and standard deviations over the rows of `data`.
    pub fn fit(data: &Array2<f64>) -> Result<Self, PreprocessError> {
        if data.nrows() == 0 {
            return Err(PreprocessError::Empty);
        }

        let means = data
            .mean_axis(Axis(0))
            .ok_or(PreprocessError::Empty)?
            .to_vec();
        let stds = data.std_axis(Axis(0), 0.0).to_vec();

        Ok(Self { means, stds })
    }

    /// Build a scaler from known parameters.
    pub fn from_parts(means: Vec<f64>, stds: Vec<f64>) -> Result<Self, PreprocessError> {
        if means.len() != stds.len() {
            return Err(PreprocessError::DimensionMismatch {
                expected: means.len(),
                actual: stds.len(),
            });
        }
        Ok(Self { means, stds })
    }

    /// Fitted column means.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fitted column standard deviations.
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Standardize one row.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, PreprocessError> {
        if values.len() != self.means.len() {
            return Err(PreprocessError::DimensionMismatch {
                expected: self.means.len(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(&x, (&mean, &std))| {
                if is_constant(mean, std) {
                    0.0
                } else {
                    (x - mean) / std
                }
            })
            .collect())
    }
}

/// Whether a fitted column carries no variance.
///
/// Rounding while averaging identical values can leave a standard deviation
/// of a few ulps instead of exactly zero.
fn is_constant(mean: f64, std: f64) -> bool {
    std <= 10.0 * f64::EPSILON * mean.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_fit_population_std() {
        let data = array![[1.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(&data).unwrap();

        assert_eq!(scaler.means(), &[2.0, 10.0]);
        assert_relative_eq!(scaler.stds()[0], 1.0);
        assert_relative_eq!(scaler.stds()[1], 0.0);
    }

    #[test]
    fn test_transform_standardizes() {
        let data = array![[1.0], [3.0]];
        let scaler = StandardScaler::fit(&data).unwrap();

        assert_eq!(scaler.transform(&[1.0]).unwrap(), vec![-1.0]);
        assert_eq!(scaler.transform(&[3.0]).unwrap(), vec![1.0]);
        assert_eq!(scaler.transform(&[2.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let data = array![[0.1, 5.0], [0.1, 7.0], [0.1, 9.0]];
        let scaler = StandardScaler::fit(&data).unwrap();

        for input in [0.1, 0.0, 1e9] {
            let z = scaler.transform(&[input, 7.0]).unwrap();
            assert_eq!(z[0], 0.0);
            assert!(z.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_empty_fit_rejected() {
        let data = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            StandardScaler::fit(&data),
            Err(PreprocessError::Empty)
        ));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let scaler = StandardScaler::from_parts(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(PreprocessError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}

//! Feature preprocessing
//!
//! Turns a [`CompanyFeatures`] into the numeric vector the regressor sees:
//! the four numeric columns standardized, followed by the one-hot encoded
//! region. Parameters are fitted once on the training set and never refitted.
//!
//! ```text
//! [ z(marketing), z(rd), z(admin), z(employees), region_1, ..., region_k ]
//! ```

pub mod encoder;
pub mod scaler;

pub use encoder::OneHotEncoder;
pub use scaler::StandardScaler;

use ndarray::{Array1, Array2};
use revcast_data::{CompanyFeatures, Dataset, NUMERIC_COLUMNS, REGION};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while fitting or applying the preprocessing pipeline.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Nothing to fit on
    #[error("Cannot fit preprocessing on an empty dataset")]
    Empty,

    /// Category not present in the fitted vocabulary
    #[error("Unknown category '{value}' (known: {})", known.join(", "))]
    UnknownCategory {
        /// Offending label
        value: String,
        /// Fitted vocabulary
        known: Vec<String>,
    },

    /// Row width does not match the fitted state
    #[error("Dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Expected width
        expected: usize,
        /// Actual width
        actual: usize,
    },
}

/// Fitted preprocessing state: numeric scaler plus region encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    scaler: StandardScaler,
    encoder: OneHotEncoder,
}

impl Preprocessor {
    /// Fit scaler and encoder on a training dataset.
    pub fn fit(dataset: &Dataset) -> Result<Self, PreprocessError> {
        if dataset.is_empty() {
            return Err(PreprocessError::Empty);
        }

        let rows: Vec<[f64; 4]> = dataset.features().map(|f| f.numeric_values()).collect();
        let numeric = Array2::from_shape_fn((rows.len(), NUMERIC_COLUMNS.len()), |(i, j)| {
            rows[i][j]
        });

        let scaler = StandardScaler::fit(&numeric)?;
        let encoder = OneHotEncoder::fit(dataset.features().map(|f| f.region.as_str()))?;

        Ok(Self { scaler, encoder })
    }

    /// Assemble a preprocessor from already fitted parts.
    pub fn from_parts(
        scaler: StandardScaler,
        encoder: OneHotEncoder,
    ) -> Result<Self, PreprocessError> {
        if scaler.n_features() != NUMERIC_COLUMNS.len() {
            return Err(PreprocessError::DimensionMismatch {
                expected: NUMERIC_COLUMNS.len(),
                actual: scaler.n_features(),
            });
        }
        Ok(Self { scaler, encoder })
    }

    /// The numeric scaler.
    pub const fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// The region encoder.
    pub const fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    /// Width of a transformed feature vector.
    pub fn n_features(&self) -> usize {
        self.scaler.n_features() + self.encoder.n_features()
    }

    /// Names of the transformed columns, in vector order.
    pub fn feature_names(&self) -> Vec<String> {
        NUMERIC_COLUMNS
            .iter()
            .map(|name| format!("num__{}", name))
            .chain(
                self.encoder
                    .categories()
                    .iter()
                    .map(|label| format!("cat__{}_{}", REGION, label)),
            )
            .collect()
    }

    /// Transform one company into its feature vector.
    pub fn transform(&self, features: &CompanyFeatures) -> Result<Array1<f64>, PreprocessError> {
        let mut row = self.scaler.transform(&features.numeric_values())?;
        row.extend(self.encoder.transform(&features.region)?);
        Ok(Array1::from(row))
    }

    /// Transform many companies into a design matrix, one row each.
    pub fn transform_batch<'a, I>(&self, features: I) -> Result<Array2<f64>, PreprocessError>
    where
        I: IntoIterator<Item = &'a CompanyFeatures>,
    {
        let rows = features
            .into_iter()
            .map(|f| self.transform(f))
            .collect::<Result<Vec<_>, _>>()?;

        let mut matrix = Array2::<f64>::zeros((rows.len(), self.n_features()));
        for (mut target, row) in matrix.rows_mut().into_iter().zip(&rows) {
            target.assign(row);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revcast_data::CompanyRecord;

    fn dataset() -> Dataset {
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
    fn test_feature_names() {
        let pre = Preprocessor::fit(&dataset()).unwrap();
        assert_eq!(
            pre.feature_names(),
            vec![
                "num__Marketing_Spend",
                "num__R&D_Spend",
                "num__Administration_Costs",
                "num__Number_of_Employees",
                "cat__Region_Asia",
                "cat__Region_Europe",
                "cat__Region_North America",
            ]
        );
        assert_eq!(pre.n_features(), 7);
    }

    #[test]
    fn test_transform_layout() {
        let pre = Preprocessor::fit(&dataset()).unwrap();
        let row = pre
            .transform(&CompanyFeatures::new(50000.0, 50000.0, 50000.0, 20, "Asia"))
            .unwrap();

        assert_eq!(row.len(), 7);
        assert!(row.iter().take(4).all(|&z| z < 0.0));
        assert_eq!(row.slice(ndarray::s![4..]).to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let pre = Preprocessor::fit(&dataset()).unwrap();
        let features = CompanyFeatures::new(123456.0, 654321.0, 111111.0, 42, "Europe");
        let first = pre.transform(&features).unwrap();
        let second = pre.transform(&features).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_rows_match_single_transform() {
        let data = dataset();
        let pre = Preprocessor::fit(&data).unwrap();
        let matrix = pre.transform_batch(data.features()).unwrap();

        assert_eq!(matrix.dim(), (3, 7));
        for (row, features) in matrix.rows().into_iter().zip(data.features()) {
            assert_eq!(row.to_owned(), pre.transform(features).unwrap());
        }
    }

    #[test]
    fn test_zero_inputs_are_finite() {
        let pre = Preprocessor::fit(&dataset()).unwrap();
        let row = pre
            .transform(&CompanyFeatures::new(0.0, 0.0, 0.0, 0, "Asia"))
            .unwrap();
        assert!(row.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_fit_empty_dataset() {
        assert!(matches!(
            Preprocessor::fit(&Dataset::default()),
            Err(PreprocessError::Empty)
        ));
    }

    #[test]
    fn test_unknown_region() {
        let pre = Preprocessor::fit(&dataset()).unwrap();
        let err = pre
            .transform(&CompanyFeatures::new(1.0, 1.0, 1.0, 1, "Mars"))
            .unwrap_err();
        assert!(matches!(err, PreprocessError::UnknownCategory { .. }));
        assert!(err.to_string().contains("Mars"));
    }
}

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod artifact;
pub mod evaluation;
pub mod linalg;
pub mod metrics;
pub mod preprocessing;
pub mod regression;
pub mod training;

// Re-export main types
pub use artifact::{ArtifactError, ModelArtifact, TrainingSummary};
pub use evaluation::Evaluation;
pub use metrics::RegressionMetrics;
pub use preprocessing::{OneHotEncoder, PreprocessError, Preprocessor, StandardScaler};
pub use regression::{
    FittedLinearModel, LinearRegression, LinearRegressionConfig, RegressionError,
};
pub use training::{TrainingConfig, train};

use thiserror::Error;

/// Errors raised anywhere in the modelling pipeline
#[derive(Debug, Error)]
pub enum ModelError {
    /// Preprocessing error
    #[error("Preprocessing error: {0}")]
    Preprocess(#[from] PreprocessError),

    /// Regression error
    #[error("Regression error: {0}")]
    Regression(#[from] RegressionError),

    /// Artifact error
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

impl ModelError {
    /// Whether the error means the model could not be fitted.
    pub const fn is_fit_error(&self) -> bool {
        matches!(
            self,
            Self::Preprocess(PreprocessError::Empty) | Self::Regression(_)
        )
    }
}

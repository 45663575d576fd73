//! Error taxonomy shared by the library and the command line.

use revcast_data::DataError;
use revcast_model::{ArtifactError, ModelError, PreprocessError, RegressionError};
use revcast_output::{ExportError, ReportError};
use std::fmt;
use thiserror::Error;

/// Result type for revcast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], stable across crate boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Dataset file is missing
    DataNotFound,
    /// Dataset is missing columns or holds invalid values
    SchemaError,
    /// Model artifact is missing
    ArtifactNotFound,
    /// Model artifact cannot be decoded or is inconsistent
    ArtifactCorrupt,
    /// A prediction input is out of range
    InvalidInput,
    /// A region label outside the trained vocabulary
    UnknownCategory,
    /// The model could not be fitted
    FitError,
    /// Filesystem or serialization failure
    Io,
}

impl ErrorKind {
    /// Short machine-friendly name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DataNotFound => "data-not-found",
            Self::SchemaError => "schema-error",
            Self::ArtifactNotFound => "artifact-not-found",
            Self::ArtifactCorrupt => "artifact-corrupt",
            Self::InvalidInput => "invalid-input",
            Self::UnknownCategory => "unknown-category",
            Self::FitError => "fit-error",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any failure raised by revcast.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset loading failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Preprocessing, fitting or prediction failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Artifact could not be read or written
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Residual export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report rendering failed
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A prediction input was rejected before reaching the model
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl Error {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(DataError::NotFound { .. }) => ErrorKind::DataNotFound,
            Self::Data(DataError::Io(_)) => ErrorKind::Io,
            Self::Data(_) => ErrorKind::SchemaError,
            Self::Model(ModelError::Artifact(e)) | Self::Artifact(e) => artifact_kind(e),
            Self::Model(ModelError::Preprocess(PreprocessError::UnknownCategory { .. })) => {
                ErrorKind::UnknownCategory
            }
            Self::Model(
                ModelError::Preprocess(PreprocessError::DimensionMismatch { .. })
                | ModelError::Regression(RegressionError::DimensionMismatch { .. }),
            ) => ErrorKind::ArtifactCorrupt,
            Self::Model(_) => ErrorKind::FitError,
            Self::Export(_) | Self::Report(_) => ErrorKind::Io,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Errors a caller can fix by changing the request.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidInput | ErrorKind::UnknownCategory
        )
    }
}

const fn artifact_kind(error: &ArtifactError) -> ErrorKind {
    match error {
        ArtifactError::NotFound { .. } => ErrorKind::ArtifactNotFound,
        ArtifactError::Corrupt(_) => ErrorKind::ArtifactCorrupt,
        ArtifactError::Encode(_) | ArtifactError::Io(_) => ErrorKind::Io,
    }
}

//! Model artifact
//!
//! Bundles everything needed to serve predictions: the fitted preprocessing
//! state, the regression parameters, the ordered feature-name schema and a
//! summary of the training run.
//!
//! On disk the artifact is a single blob:
//!
//! ```text
//! "RVCM" | format version (u32, little endian) | bincode payload
//! ```
//!
//! Only the format version that wrote a blob can read it back.

use crate::ModelError;
use crate::evaluation::{Evaluation, evaluate};
use crate::metrics::RegressionMetrics;
use crate::preprocessing::Preprocessor;
use crate::regression::FittedLinearModel;
use bincode::Options;
use chrono::{DateTime, Utc};
use revcast_data::{CompanyFeatures, Dataset, NUMERIC_COLUMNS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Leading bytes of every artifact file.
pub const MAGIC: [u8; 4] = *b"RVCM";

/// Version of the payload layout.
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on a decoded payload.
const MAX_PAYLOAD_BYTES: u64 = 16 * 1024 * 1024;

const HEADER_LEN: usize = MAGIC.len() + 4;

/// Errors raised while saving or loading an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No artifact at the given path
    #[error("Model artifact not found: {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Artifact bytes could not be decoded or are inconsistent
    #[error("Model artifact is corrupt: {0}")]
    Corrupt(String),

    /// Encoding failure while saving
    #[error("Failed to encode model artifact: {0}")]
    Encode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Facts about the training run, shown next to predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Number of training records
    pub n_samples: usize,

    /// Mean revenue of the training set
    pub mean_revenue: f64,

    /// Smallest training revenue
    pub min_revenue: f64,

    /// Largest training revenue
    pub max_revenue: f64,

    /// In-sample metrics
    pub metrics: RegressionMetrics,

    /// When the model was fitted
    pub trained_at: DateTime<Utc>,

    /// Where the training data came from, if known
    pub source: Option<String>,
}

/// Serialized model: preprocessing state, regression parameters and schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    feature_names: Vec<String>,
    preprocessor: Preprocessor,
    model: FittedLinearModel,
    summary: TrainingSummary,
}

impl ModelArtifact {
    /// Bundle fitted parts into an artifact.
    ///
    /// The feature-name schema is taken from the preprocessor; the model must
    /// expect exactly that many columns.
    pub fn new(
        preprocessor: Preprocessor,
        model: FittedLinearModel,
        summary: TrainingSummary,
    ) -> Result<Self, ArtifactError> {
        let artifact = Self {
            feature_names: preprocessor.feature_names(),
            preprocessor,
            model,
            summary,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Ordered names of the transformed feature columns.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Fitted preprocessing state.
    pub const fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Fitted regression parameters.
    pub const fn model(&self) -> &FittedLinearModel {
        &self.model
    }

    /// Training run summary.
    pub const fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Predict revenue for one company.
    pub fn predict(&self, features: &CompanyFeatures) -> Result<f64, ModelError> {
        let row = self.preprocessor.transform(features)?;
        Ok(self.model.predict(row.view())?)
    }

    /// Predict every record of `dataset` and score the predictions.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Evaluation, ModelError> {
        evaluate(&self.preprocessor, &self.model, dataset)
    }

    /// Coefficients paired with their feature names.
    pub fn named_coefficients(&self) -> Vec<(&str, f64)> {
        self.feature_names
            .iter()
            .map(String::as_str)
            .zip(self.model.coefficients().iter().copied())
            .collect()
    }

    /// Check that schema, preprocessor and model agree.
    fn validate(&self) -> Result<(), ArtifactError> {
        validate_preprocessor(&self.preprocessor)?;

        let expected = self.preprocessor.feature_names();
        if self.feature_names != expected {
            return Err(ArtifactError::Corrupt(format!(
                "feature schema mismatch: stored [{}], preprocessor produces [{}]",
                self.feature_names.join(", "),
                expected.join(", ")
            )));
        }
        if self.model.n_features() != self.feature_names.len() {
            return Err(ArtifactError::Corrupt(format!(
                "model expects {} features, schema has {}",
                self.model.n_features(),
                self.feature_names.len()
            )));
        }
        if !self.model.intercept().is_finite()
            || !self.model.coefficients().iter().all(|c| c.is_finite())
        {
            return Err(ArtifactError::Corrupt(
                "non-finite regression parameters".to_string(),
            ));
        }
        Ok(())
    }

    /// Encode the artifact as a blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let payload = codec()
            .serialize(self)
            .map_err(|e| ArtifactError::Encode(e.to_string()))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode a blob written by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        if bytes.len() < HEADER_LEN {
            return Err(ArtifactError::Corrupt(format!(
                "truncated header ({} bytes)",
                bytes.len()
            )));
        }

        let (header, payload) = bytes.split_at(HEADER_LEN);
        if header[..MAGIC.len()] != MAGIC {
            return Err(ArtifactError::Corrupt("not a revcast model file".to_string()));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&header[MAGIC.len()..]);
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(ArtifactError::Corrupt(format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let artifact: Self = codec()
            .deserialize(payload)
            .map_err(|e| ArtifactError::Corrupt(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Write the artifact to `path`, replacing any existing file.
    ///
    /// The blob is written next to the target first and then renamed into
    /// place, so readers never observe a half-written file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = self.to_bytes()?;
        let staging = staging_path(path)?;
        if let Err(e) = fs::write(&staging, &bytes).and_then(|()| fs::rename(&staging, path)) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(path = %path.display(), bytes = bytes.len(), "saved model artifact");
        Ok(())
    }

    /// Read an artifact from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ArtifactError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArtifactError::Io(e),
        })?;

        let artifact = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            features = artifact.feature_names.len(),
            "loaded model artifact"
        );
        Ok(artifact)
    }
}

/// Fitted preprocessing state must look like the output of a fit.
///
/// Deserialization bypasses the fitting constructors, so these are checked
/// again on every load.
fn validate_preprocessor(preprocessor: &Preprocessor) -> Result<(), ArtifactError> {
    let scaler = preprocessor.scaler();
    if scaler.means().len() != NUMERIC_COLUMNS.len() || scaler.stds().len() != NUMERIC_COLUMNS.len()
    {
        return Err(ArtifactError::Corrupt(format!(
            "scaler has {} means and {} stds, expected {}",
            scaler.means().len(),
            scaler.stds().len(),
            NUMERIC_COLUMNS.len()
        )));
    }
    if !scaler.means().iter().all(|m| m.is_finite()) {
        return Err(ArtifactError::Corrupt("non-finite scaler mean".to_string()));
    }
    if !scaler.stds().iter().all(|s| s.is_finite() && *s >= 0.0) {
        return Err(ArtifactError::Corrupt(
            "scaler standard deviations must be finite and non-negative".to_string(),
        ));
    }

    let categories = preprocessor.encoder().categories();
    if categories.is_empty() {
        return Err(ArtifactError::Corrupt("empty region vocabulary".to_string()));
    }
    if !categories.windows(2).all(|pair| pair[0] < pair[1]) {
        return Err(ArtifactError::Corrupt(format!(
            "region vocabulary is not sorted and unique: [{}]",
            categories.join(", ")
        )));
    }
    Ok(())
}

/// Sibling of `path` the blob is written to before the rename.
fn staging_path(path: &Path) -> Result<PathBuf, ArtifactError> {
    let name = path.file_name().ok_or_else(|| {
        ArtifactError::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("not a file path: {}", path.display()),
        ))
    })?;
    let mut staging = name.to_os_string();
    staging.push(".partial");
    Ok(path.with_file_name(staging))
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_PAYLOAD_BYTES)
        .reject_trailing_bytes()
}

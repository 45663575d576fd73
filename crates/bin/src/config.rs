//! File locations shared by the subcommands.
//!
//! Each path comes from its flag, then its environment variable, then the
//! built-in default.

use clap::Args;
use std::path::PathBuf;

/// Default training dataset.
pub(crate) const DEFAULT_DATA_PATH: &str = "data/company_data.csv";

/// Default model artifact.
pub(crate) const DEFAULT_ARTIFACT_PATH: &str = "model.bin";

/// Location of the training dataset.
#[derive(Debug, Clone, Args)]
pub(crate) struct DataArgs {
    /// Company dataset (CSV with a header row)
    #[arg(
        long = "data",
        env = "REVCAST_DATA",
        value_name = "PATH",
        default_value = DEFAULT_DATA_PATH
    )]
    pub(crate) data_path: PathBuf,
}

/// Location of the model artifact.
#[derive(Debug, Clone, Args)]
pub(crate) struct ArtifactArgs {
    /// Serialized model artifact
    #[arg(
        long = "artifact",
        env = "REVCAST_ARTIFACT",
        value_name = "PATH",
        default_value = DEFAULT_ARTIFACT_PATH
    )]
    pub(crate) artifact_path: PathBuf,
}

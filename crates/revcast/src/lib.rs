#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod service;

// Re-export main types from sub-crates
pub use revcast_data as data;
pub use revcast_model as model;
pub use revcast_output as output;

pub use error::{Error, ErrorKind, Result};
pub use service::{Prediction, PredictionService};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

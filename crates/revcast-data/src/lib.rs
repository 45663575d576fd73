#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod record;
pub mod region;

pub use error::{DataError, Result};
pub use loader::{load_dataset, read_dataset};
pub use record::{
    CompanyFeatures, CompanyRecord, Dataset, NUMERIC_COLUMNS, REGION, REQUIRED_COLUMNS, REVENUE,
};
pub use region::Region;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

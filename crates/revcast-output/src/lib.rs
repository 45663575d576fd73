#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, ResidualExport};
pub use report::{PredictionReport, ReportError, delta_from_mean};
pub use summary::{CoefficientRow, QualitySummary};

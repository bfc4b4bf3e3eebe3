//! Services over the propagated family graph.
//!
//! Each service is built from a [`Context`](crate::context::Context) with
//! `From<&Context>` and only reads the shared store.

pub mod export;
pub mod photos;
mod statistics;
mod tree;
mod validation;

pub use export::{Dataset, ExportService, ExportSummary, Metadata};
pub use photos::{attach_photos, PhotoExport, PhotoIndex};
pub use statistics::{GenerationBucket, Statistics};
pub use tree::TreeService;
pub use validation::{ValidationReport, ValidationService};

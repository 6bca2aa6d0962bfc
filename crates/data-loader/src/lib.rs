//! # Data Loader Crate
//!
//! Supplies rating relations to the recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: `Relation` (entity -> item -> rating) and `RatingRecord`
//! - **parser**: tab-separated ratings files, skipping bad lines
//! - **loader**: `Relation::load_from_file` for TSV and JSON sources
//! - **wordcount**: word-count matrices built from feed-like documents
//! - **error**: error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Relation;
//! use std::path::Path;
//!
//! let report = Relation::load_from_file(Path::new("data/critics.tsv"))?;
//! println!("{} records skipped", report.skipped);
//!
//! let critics = report.relation;
//! let toby = critics.get("Toby").unwrap();
//! println!("Toby rated {} movies", toby.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod loader;
pub mod wordcount;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use loader::LoadReport;
pub use parser::{parse_ratings, ParseOutcome};
pub use types::{EntityId, RatingRecord, Ratings, Relation};
pub use wordcount::{Document, IngestReport, WordMatrix, WordMatrixBuilder};

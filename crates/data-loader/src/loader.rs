//! Building a `Relation` from files on disk.
//!
//! Two formats are accepted:
//! - `.json`: the serialized nested map (`{"person": {"item": 4.0}}`)
//! - anything else: tab-separated `entity<TAB>item<TAB>rating` lines
//!
//! TSV loading is lenient: bad lines are skipped and counted in the
//! returned `LoadReport`. A JSON file is a single record, so it either
//! loads completely or fails.

use crate::error::{DataLoadError, Result};
use crate::parser::{self, read_to_string_lossy};
use crate::types::Relation;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a load produced, including how many records were dropped
#[derive(Debug)]
pub struct LoadReport {
    pub relation: Relation,
    /// Records inserted into the relation
    pub loaded: usize,
    /// Records skipped because they failed to parse
    pub skipped: usize,
    /// The per-record failures behind `skipped`
    pub errors: Vec<DataLoadError>,
}

impl Relation {
    /// Load a relation from a ratings file.
    ///
    /// Later lines overwrite earlier ratings for the same (entity, item).
    pub fn load_from_file(path: &Path) -> Result<LoadReport> {
        info!("Loading ratings from {}", path.display());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let report = if is_json {
            let relation = Self::load_json(path)?;
            let loaded = relation.rating_count();
            LoadReport {
                relation,
                loaded,
                skipped: 0,
                errors: Vec::new(),
            }
        } else {
            let outcome = parser::parse_ratings_file(path)?;
            for err in &outcome.errors {
                warn!("Skipping record: {}", err);
            }
            let loaded = outcome.loaded();
            let skipped = outcome.skipped();
            LoadReport {
                relation: outcome.records.into_iter().collect(),
                loaded,
                skipped,
                errors: outcome.errors,
            }
        };

        let (entities, ratings) = report.relation.counts();
        info!(
            "Loaded {} entities, {} ratings ({} records skipped)",
            entities, ratings, report.skipped
        );
        Ok(report)
    }

    /// Parse a relation from JSON text
    pub fn from_json_str(content: &str, file: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| DataLoadError::JsonError {
            file: file.to_string(),
            source,
        })
    }

    fn load_json(path: &Path) -> Result<Self> {
        let content = read_to_string_lossy(path)?;
        debug!("Read {} bytes of JSON", content.len());
        Self::from_json_str(&content, &path.display().to_string())
    }
}

//! Error types for the engine.
//!
//! Degenerate inputs (no shared items, zero variance) are not errors: the
//! metrics answer 0 for them. The only failures are lookups.

use data_loader::{EntityId, Ratings, Relation};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A requested identifier is not a row of the relation
    #[error("Unknown entity: {id}")]
    UnknownEntity { id: EntityId },

    /// A rated item has no entry in the item-similarity table, which means
    /// the table is older than the ratings it is used with
    #[error("Item {item} is missing from the item-similarity table; rebuild the table")]
    MissingPrecomputation { item: EntityId },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Fetch a row or report the identifier as unknown
pub(crate) fn lookup<'a>(relation: &'a Relation, id: &str) -> Result<&'a Ratings> {
    relation.get(id).ok_or_else(|| EngineError::UnknownEntity { id: id.to_string() })
}

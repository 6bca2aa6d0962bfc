//! Core domain types for ratings data.
//!
//! A `Relation` is a sparse two-level map: entity -> counterpart -> rating.
//! The same shape holds critics rating movies, movies rated by critics
//! (after transposition) and blogs counting words.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a row or column in a relation (a person, an item, a word...)
pub type EntityId = String;

/// One entity's ratings, keyed by counterpart
pub type Ratings = BTreeMap<EntityId, f64>;

// =============================================================================
// Records
// =============================================================================

/// A single (entity, item, rating) triple as read from a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub entity: EntityId,
    pub item: EntityId,
    pub rating: f64,
}

impl RatingRecord {
    pub fn new(entity: impl Into<EntityId>, item: impl Into<EntityId>, rating: f64) -> Self {
        Self {
            entity: entity.into(),
            item: item.into(),
            rating,
        }
    }
}

// =============================================================================
// Relation
// =============================================================================

/// Sparse entity -> counterpart -> rating mapping.
///
/// BTreeMaps keep iteration order stable, so every computation over a
/// relation sums its terms in the same order and gives bit-identical
/// results run to run.
///
/// Serialized as a plain nested JSON object:
/// `{"Toby": {"Superman Returns": 4.0}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relation {
    rows: BTreeMap<EntityId, Ratings>,
}

impl Relation {
    /// Creates a new, empty relation
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Insert a rating, returning the rating it replaced (if any)
    pub fn insert(
        &mut self,
        entity: impl Into<EntityId>,
        item: impl Into<EntityId>,
        rating: f64,
    ) -> Option<f64> {
        self.rows
            .entry(entity.into())
            .or_default()
            .insert(item.into(), rating)
    }

    /// Insert a parsed record
    pub fn insert_record(&mut self, record: RatingRecord) -> Option<f64> {
        self.insert(record.entity, record.item, record.rating)
    }

    /// Get all ratings made by an entity
    pub fn get(&self, entity: &str) -> Option<&Ratings> {
        self.rows.get(entity)
    }

    /// Get one rating, `None` when the entity never rated the item
    pub fn rating(&self, entity: &str, item: &str) -> Option<f64> {
        self.rows.get(entity)?.get(item).copied()
    }

    /// True if `entity` has a rating for `item`
    pub fn has_rated(&self, entity: &str, item: &str) -> bool {
        self.rating(entity, item).is_some()
    }

    /// True if `entity` is a row of this relation
    pub fn contains(&self, entity: &str) -> bool {
        self.rows.contains_key(entity)
    }

    /// All row identifiers, in sorted order
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.rows.keys()
    }

    /// Rows with their ratings
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Ratings)> {
        self.rows.iter()
    }

    /// Flattened (entity, item, rating) triples
    pub fn triples(&self) -> impl Iterator<Item = (&EntityId, &EntityId, f64)> {
        self.rows.iter().flat_map(|(entity, ratings)| {
            ratings
                .iter()
                .map(move |(item, &rating)| (entity, item, rating))
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of stored ratings across all rows
    pub fn rating_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Get counts for debugging/validation: (rows, ratings)
    pub fn counts(&self) -> (usize, usize) {
        (self.len(), self.rating_count())
    }
}

impl<E, I> FromIterator<(E, I, f64)> for Relation
where
    E: Into<EntityId>,
    I: Into<EntityId>,
{
    fn from_iter<T: IntoIterator<Item = (E, I, f64)>>(iter: T) -> Self {
        let mut relation = Relation::new();
        for (entity, item, rating) in iter {
            relation.insert(entity, item, rating);
        }
        relation
    }
}

impl FromIterator<RatingRecord> for Relation {
    fn from_iter<T: IntoIterator<Item = RatingRecord>>(iter: T) -> Self {
        let mut relation = Relation::new();
        for record in iter {
            relation.insert_record(record);
        }
        relation
    }
}

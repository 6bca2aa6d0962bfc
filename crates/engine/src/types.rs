//! Result types shared by the ranker and the recommenders.

use data_loader::EntityId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One entry of a match list: how similar `id` is to the query entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub score: f64,
    pub id: EntityId,
}

impl Match {
    pub fn new(score: f64, id: impl Into<EntityId>) -> Self {
        Self {
            score,
            id: id.into(),
        }
    }
}

/// A predicted rating for an item the target has not rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub score: f64,
    pub item: EntityId,
}

impl Recommendation {
    pub fn new(score: f64, item: impl Into<EntityId>) -> Self {
        Self {
            score,
            item: item.into(),
        }
    }
}

/// Descending by score, then descending by identifier.
///
/// `total_cmp` gives a total order, so the sort never panics and equal
/// inputs always come out in the same order.
pub(crate) fn descending(a_score: f64, a_id: &str, b_score: f64, b_id: &str) -> Ordering {
    b_score.total_cmp(&a_score).then_with(|| b_id.cmp(a_id))
}

pub(crate) fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| descending(a.score, &a.id, b.score, &b.id));
}

pub(crate) fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| descending(a.score, &a.item, b.score, &b.item));
}

/// Precomputed item -> most similar items.
///
/// Built offline by `item_similarity::build_item_similarities` and read by
/// the item-based recommender. Serializes as a JSON object of match lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSimilarityTable {
    entries: BTreeMap<EntityId, Vec<Match>>,
}

impl ItemSimilarityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: impl Into<EntityId>, matches: Vec<Match>) {
        self.entries.insert(item.into(), matches);
    }

    /// The match list of `item`, if it was precomputed
    pub fn get(&self, item: &str) -> Option<&[Match]> {
        self.entries.get(item).map(|v| v.as_slice())
    }

    pub fn contains(&self, item: &str) -> bool {
        self.entries.contains_key(item)
    }

    pub fn items(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &[Match])> {
        self.entries.iter().map(|(item, matches)| (item, matches.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(EntityId, Vec<Match>)> for ItemSimilarityTable {
    fn from_iter<T: IntoIterator<Item = (EntityId, Vec<Match>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

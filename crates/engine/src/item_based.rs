//! Item-based recommendation from a precomputed item-similarity table.
//!
//! ## Algorithm
//! 1. For each item the user rated (rating `r`)
//! 2. Walk that item's precomputed similar items
//! 3. Skip candidates the user already rated
//! 4. Accumulate `similarity * r` and `similarity` per candidate
//! 5. Predict `sum(similarity * r) / sum(similarity)`, best first
//!
//! Only the user's own row and the table are read, so the cost is
//! proportional to the user's ratings times the table's list length,
//! independent of how many other people exist.

use crate::error::{lookup, EngineError, Result};
use crate::types::{sort_recommendations, ItemSimilarityTable, Recommendation};
use data_loader::Relation;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Recommend items for `user` using `table`.
///
/// Fails with `UnknownEntity` when `user` is not in `relation`, and with
/// `MissingPrecomputation` when the user rated an item the table has no
/// entry for.
#[instrument(skip(relation, table))]
pub fn recommend_items(
    relation: &Relation,
    table: &ItemSimilarityTable,
    user: &str,
) -> Result<Vec<Recommendation>> {
    let user_ratings = lookup(relation, user)?;

    // candidate -> (sum of similarity * rating, sum of similarity)
    let mut scores: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for (item, &rating) in user_ratings {
        let similar = table
            .get(item)
            .ok_or_else(|| EngineError::MissingPrecomputation { item: item.clone() })?;

        for candidate in similar {
            if user_ratings.contains_key(&candidate.id) {
                continue;
            }
            let entry = scores.entry(candidate.id.as_str()).or_insert((0.0, 0.0));
            entry.0 += candidate.score * rating;
            entry.1 += candidate.score;
        }
    }

    // A candidate reached only through zero similarities has no defined average
    let mut recommendations: Vec<Recommendation> = scores
        .into_iter()
        .filter(|&(_, (_, total_similarity))| total_similarity != 0.0)
        .map(|(item, (score, total_similarity))| Recommendation::new(score / total_similarity, item))
        .collect();
    sort_recommendations(&mut recommendations);

    debug!("Generated {} item-based recommendations", recommendations.len());
    Ok(recommendations)
}

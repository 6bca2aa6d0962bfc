//! User-based recommendation.
//!
//! ## Algorithm
//! 1. Score every other entity against the target person
//! 2. Drop entities with non-positive similarity
//! 3. For each item the target has not rated, accumulate
//!    `rating * similarity` and `similarity` across the remaining entities
//! 4. Predict `sum(rating * similarity) / sum(similarity)` per item
//! 5. Return all predictions, best first
//!
//! Dividing by the similarity sum keeps items rated by many people from
//! winning on volume alone.

use crate::config::RecommendConfig;
use crate::error::{lookup, Result};
use crate::ranking;
use crate::similarity::SimilarityMetric;
use crate::types::{sort_recommendations, Match, Recommendation};
use data_loader::{Ratings, Relation};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Entities most similar to `target`, using the configured metric and count
pub fn similar_entities(
    relation: &Relation,
    target: &str,
    config: &RecommendConfig,
) -> Result<Vec<Match>> {
    ranking::top_matches(relation, target, config.top_n, &config.metric)
}

/// Recommend items for `person` using the configured metric
#[instrument(skip(relation, config), fields(metric = %config.metric))]
pub fn recommend(
    relation: &Relation,
    person: &str,
    config: &RecommendConfig,
) -> Result<Vec<Recommendation>> {
    recommend_with(relation, person, &config.metric, config.zero_is_unrated)
}

/// Recommend items for `person` with any similarity metric
pub fn recommend_with<M>(
    relation: &Relation,
    person: &str,
    metric: &M,
    zero_is_unrated: bool,
) -> Result<Vec<Recommendation>>
where
    M: SimilarityMetric + ?Sized,
{
    let target = lookup(relation, person)?;

    // item -> (sum of rating * similarity, sum of similarity)
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    let mut contributors = 0usize;

    for (other, ratings) in relation.iter() {
        if other == person {
            continue;
        }
        let similarity = metric.score(target, ratings);
        if !(similarity > 0.0) {
            continue;
        }
        contributors += 1;

        for (item, &rating) in ratings {
            if is_unrated(target, item, zero_is_unrated) {
                let entry = totals.entry(item.as_str()).or_insert((0.0, 0.0));
                entry.0 += rating * similarity;
                entry.1 += similarity;
            }
        }
    }

    let mut recommendations: Vec<Recommendation> = totals
        .into_iter()
        .map(|(item, (total, similarity_sum))| Recommendation::new(total / similarity_sum, item))
        .collect();
    sort_recommendations(&mut recommendations);

    debug!(
        "Generated {} recommendations for {} from {} similar entities",
        recommendations.len(),
        person,
        contributors
    );
    Ok(recommendations)
}

fn is_unrated(ratings: &Ratings, item: &str, zero_is_unrated: bool) -> bool {
    match ratings.get(item) {
        None => true,
        Some(&rating) => zero_is_unrated && rating == 0.0,
    }
}

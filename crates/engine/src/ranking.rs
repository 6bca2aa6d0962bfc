//! Top-N ranking of entities by similarity to a target.

use crate::error::{lookup, Result};
use crate::similarity::SimilarityMetric;
use crate::types::{sort_matches, Match};
use data_loader::{Ratings, Relation};
use tracing::debug;

/// The `n` entities most similar to `target`, best first.
///
/// `target` never appears in its own results. When fewer than `n` other
/// entities exist, all of them are returned.
pub fn top_matches<M>(relation: &Relation, target: &str, n: usize, metric: &M) -> Result<Vec<Match>>
where
    M: SimilarityMetric + ?Sized,
{
    let row = lookup(relation, target)?;
    let matches = rank_against(relation, target, row, n, metric);
    debug!(
        "Ranked {} of {} entities against {} ({})",
        matches.len(),
        relation.len().saturating_sub(1),
        target,
        metric.name()
    );
    Ok(matches)
}

/// Ranking for a target whose row is already in hand
pub(crate) fn rank_against<M>(
    relation: &Relation,
    target: &str,
    row: &Ratings,
    n: usize,
    metric: &M,
) -> Vec<Match>
where
    M: SimilarityMetric + ?Sized,
{
    let mut matches: Vec<Match> = relation
        .iter()
        .filter(|(other, _)| other.as_str() != target)
        .map(|(other, other_row)| Match::new(metric.score(row, other_row), other.clone()))
        .collect();

    sort_matches(&mut matches);
    matches.truncate(n);
    matches
}

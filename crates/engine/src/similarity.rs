//! Similarity metrics over shared ratings.
//!
//! Both built-in metrics only look at counterparts rated by both entities.
//! Two entities with nothing in common score exactly 0, as do entities whose
//! shared ratings leave the correlation undefined.
//!
//! ## Metrics
//! - **Euclidean**: `1 / (1 + sum of squared differences)`, in (0, 1]
//! - **Pearson**: correlation coefficient, in [-1, 1]; corrects for critics
//!   who rate consistently harsher or kinder than others

use crate::error::{lookup, Result};
use data_loader::{EntityId, Ratings, Relation};
use serde::{Deserialize, Serialize};

/// Variance below this fraction of the sum of squares is treated as zero.
/// Constant ratings can leave a rounding residue instead of an exact 0.
const VARIANCE_TOLERANCE: f64 = 1e-12;

/// Scores how alike two rows of a relation are.
///
/// Implementations must be symmetric: `score(a, b) == score(b, a)`.
pub trait SimilarityMetric: Send + Sync {
    /// Returns the name of this metric (for logging)
    fn name(&self) -> &str;

    /// Score two rows directly
    fn score(&self, a: &Ratings, b: &Ratings) -> f64;

    /// Score two entities of `relation` by identifier
    fn similarity(&self, relation: &Relation, id1: &str, id2: &str) -> Result<f64> {
        let a = lookup(relation, id1)?;
        let b = lookup(relation, id2)?;
        Ok(self.score(a, b))
    }
}

/// Built-in similarity metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Euclidean,
    #[default]
    Pearson,
}

impl SimilarityMetric for Metric {
    fn name(&self) -> &str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Pearson => "pearson",
        }
    }

    fn score(&self, a: &Ratings, b: &Ratings) -> f64 {
        match self {
            Metric::Euclidean => euclidean_score(a, b),
            Metric::Pearson => pearson_score(a, b),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Distance-based similarity of two entities
pub fn euclidean_distance(relation: &Relation, id1: &str, id2: &str) -> Result<f64> {
    Metric::Euclidean.similarity(relation, id1, id2)
}

/// Pearson correlation of two entities
pub fn pearson_correlation(relation: &Relation, id1: &str, id2: &str) -> Result<f64> {
    Metric::Pearson.similarity(relation, id1, id2)
}

/// Counterparts rated by both rows, in sorted order
pub fn shared_items<'a>(a: &'a Ratings, b: &'a Ratings) -> Vec<&'a EntityId> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.keys().filter(|item| large.contains_key(*item)).collect()
}

/// Pairs of (rating in `a`, rating in `b`) over the shared items.
///
/// Walks the smaller row; both rows are sorted maps, so the pairs come out
/// in the same order whichever argument is smaller.
fn shared_ratings<'a>(a: &'a Ratings, b: &'a Ratings) -> impl Iterator<Item = (f64, f64)> + 'a {
    let swapped = a.len() > b.len();
    let (small, large) = if swapped { (b, a) } else { (a, b) };
    small.iter().filter_map(move |(item, &x)| {
        large
            .get(item)
            .map(|&y| if swapped { (y, x) } else { (x, y) })
    })
}

fn euclidean_score(a: &Ratings, b: &Ratings) -> f64 {
    let mut shared = 0usize;
    let mut sum_of_squares = 0.0;
    for (x, y) in shared_ratings(a, b) {
        shared += 1;
        sum_of_squares += (x - y).powi(2);
    }

    if shared == 0 {
        return 0.0;
    }
    1.0 / (1.0 + sum_of_squares)
}

/// Running sums over the shared items of two rows
#[derive(Debug, Default)]
struct PairSums {
    n: usize,
    sum1: f64,
    sum2: f64,
    sum1_sq: f64,
    sum2_sq: f64,
    sum_products: f64,
}

impl PairSums {
    fn collect(a: &Ratings, b: &Ratings) -> Self {
        shared_ratings(a, b).fold(Self::default(), |mut sums, (x, y)| {
            sums.n += 1;
            sums.sum1 += x;
            sums.sum2 += y;
            sums.sum1_sq += x * x;
            sums.sum2_sq += y * y;
            sums.sum_products += x * y;
            sums
        })
    }
}

fn pearson_score(a: &Ratings, b: &Ratings) -> f64 {
    let sums = PairSums::collect(a, b);
    if sums.n == 0 {
        return 0.0;
    }
    let n = sums.n as f64;

    let numerator = sums.sum_products - (sums.sum1 * sums.sum2 / n);
    let var1 = sums.sum1_sq - sums.sum1.powi(2) / n;
    let var2 = sums.sum2_sq - sums.sum2.powi(2) / n;
    if negligible(var1, sums.sum1_sq) || negligible(var2, sums.sum2_sq) {
        return 0.0;
    }

    let denominator = (var1 * var2).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

fn negligible(variance: f64, sum_sq: f64) -> bool {
    variance <= sum_sq * VARIANCE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn relation(rows: &[(&str, &[(&str, f64)])]) -> Relation {
        let mut relation = Relation::new();
        for (entity, ratings) in rows {
            for (item, rating) in *ratings {
                relation.insert(*entity, *item, *rating);
            }
        }
        relation
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let r = relation(&[("a", &[("x", 1.0)]), ("b", &[("y", 5.0)])]);
        assert_eq!(euclidean_distance(&r, "a", "b").unwrap(), 0.0);
        assert_eq!(pearson_correlation(&r, "a", "b").unwrap(), 0.0);
    }

    #[test]
    fn test_identical_ratings() {
        let r = relation(&[
            ("a", &[("x", 1.0), ("y", 2.0), ("z", 4.0)]),
            ("b", &[("x", 1.0), ("y", 2.0), ("z", 4.0)]),
        ]);
        assert_eq!(euclidean_distance(&r, "a", "b").unwrap(), 1.0);
        assert!((pearson_correlation(&r, "a", "b").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_value() {
        // squared differences: 1 + 4 = 5
        let r = relation(&[
            ("a", &[("x", 1.0), ("y", 2.0), ("only-a", 3.0)]),
            ("b", &[("x", 2.0), ("y", 4.0)]),
        ]);
        assert!((euclidean_distance(&r, "a", "b").unwrap() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let r = relation(&[
            ("a", &[("x", 1.0), ("y", 2.0), ("z", 3.0)]),
            ("b", &[("x", 3.0), ("y", 2.0), ("z", 1.0)]),
        ]);
        assert!((pearson_correlation(&r, "a", "b").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_ignores_offset_and_scale() {
        let r = relation(&[
            ("a", &[("x", 1.0), ("y", 2.0), ("z", 4.0)]),
            ("b", &[("x", 3.0), ("y", 5.0), ("z", 9.0)]),
        ]);
        assert!((pearson_correlation(&r, "a", "b").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_ratings_is_zero() {
        let r = relation(&[
            ("a", &[("x", 0.1), ("y", 0.1), ("z", 0.1)]),
            ("b", &[("x", 1.0), ("y", 2.0), ("z", 5.0)]),
            ("c", &[("x", 0.0), ("y", 0.0)]),
        ]);
        assert_eq!(pearson_correlation(&r, "a", "b").unwrap(), 0.0);
        assert_eq!(pearson_correlation(&r, "b", "a").unwrap(), 0.0);
        assert_eq!(pearson_correlation(&r, "c", "b").unwrap(), 0.0);
    }

    #[test]
    fn test_single_shared_item() {
        let r = relation(&[("a", &[("x", 2.0)]), ("b", &[("x", 4.0)])]);
        // One point has no variance
        assert_eq!(pearson_correlation(&r, "a", "b").unwrap(), 0.0);
        assert!((euclidean_distance(&r, "a", "b").unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_entity() {
        let r = relation(&[("a", &[("x", 1.0)])]);
        assert_eq!(
            pearson_correlation(&r, "a", "ghost"),
            Err(EngineError::UnknownEntity { id: "ghost".to_string() })
        );
        assert!(euclidean_distance(&r, "ghost", "a").is_err());
    }

    #[test]
    fn test_shared_items() {
        let r = relation(&[
            ("a", &[("w", 1.0), ("x", 1.0), ("y", 1.0)]),
            ("b", &[("y", 1.0), ("x", 1.0), ("z", 1.0)]),
        ]);
        let items = shared_items(r.get("a").unwrap(), r.get("b").unwrap());
        assert_eq!(items, vec!["x", "y"]);
    }

    #[test]
    fn test_metric_names_and_default() {
        assert_eq!(Metric::default(), Metric::Pearson);
        assert_eq!(Metric::Euclidean.to_string(), "euclidean");
        assert_eq!(Metric::Pearson.name(), "pearson");
    }
}

//! Per-call configuration for user-based queries.

use crate::similarity::Metric;
use serde::{Deserialize, Serialize};

/// Default number of matches returned by `top_matches`
pub const DEFAULT_TOP_N: usize = 5;

/// Knobs for similarity queries and user-based recommendation.
///
/// Defaults: Pearson correlation, 5 matches, a rating of 0.0 counts as a
/// real rating.
///
/// The zero default differs from the classic critics recommender, which
/// treats a 0 rating like a missing one and so can recommend an item back to
/// someone who rated it 0. Set `zero_is_unrated` to get that behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Metric used to compare entities
    pub metric: Metric,
    /// Number of matches `top_matches` returns
    pub top_n: usize,
    /// When true, a stored rating of exactly 0.0 is treated as "not rated"
    /// and the item can still be recommended
    pub zero_is_unrated: bool,
}

impl RecommendConfig {
    pub fn new() -> Self {
        Self {
            metric: Metric::default(),
            top_n: DEFAULT_TOP_N,
            zero_is_unrated: false,
        }
    }

    /// Configure the similarity metric (default: Pearson)
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Configure the number of matches (default: 5)
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Configure whether 0.0 ratings count as unrated (default: false)
    pub fn with_zero_is_unrated(mut self, zero_is_unrated: bool) -> Self {
        self.zero_is_unrated = zero_is_unrated;
        self
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self::new()
    }
}

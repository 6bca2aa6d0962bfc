//! Item-similarity precomputation.
//!
//! Builds, for every item, the list of its most similar items. This is the
//! expensive half of item-based recommendation: every item is compared with
//! every other item over the people who rated both. Run it offline or
//! periodically and keep the resulting table around; queries against the
//! table are cheap.
//!
//! Each item's match list depends only on the read-only transposed
//! relation, so items are ranked in parallel with Rayon and merged into the
//! table at the end.

use crate::ranking::rank_against;
use crate::similarity::{Metric, SimilarityMetric};
use crate::transpose::transpose;
use crate::types::{ItemSimilarityTable, Match};
use data_loader::{EntityId, Ratings, Relation};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{info, instrument};

/// Default number of similar items kept per item
pub const DEFAULT_SIMILAR_ITEMS: usize = 10;

/// Default number of items between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Compute the top-`n` similar items for every item rated in `relation`
pub fn build_item_similarities<M>(relation: &Relation, n: usize, metric: &M) -> ItemSimilarityTable
where
    M: SimilarityMetric + ?Sized,
{
    build(relation, n, metric, DEFAULT_PROGRESS_INTERVAL)
}

/// Configurable builder for the item-similarity table
///
/// ## Usage
/// ```ignore
/// let table = ItemSimilarityBuilder::new()
///     .with_top_n(10)
///     .with_metric(Metric::Euclidean)
///     .build(&critics);
/// ```
#[derive(Debug, Clone)]
pub struct ItemSimilarityBuilder {
    /// Similar items kept per item
    top_n: usize,

    /// Metric applied to the transposed relation
    metric: Metric,

    /// Items between progress log lines, 0 disables progress logging
    progress_interval: usize,
}

impl ItemSimilarityBuilder {
    /// Create a builder with the defaults: Euclidean metric, 10 items
    pub fn new() -> Self {
        Self {
            top_n: DEFAULT_SIMILAR_ITEMS,
            metric: Metric::Euclidean,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Configure the number of similar items per item (default: 10)
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Configure the metric (default: Euclidean)
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Configure how often progress is logged (default: every 100 items)
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Build the table for `relation` (person -> item -> rating)
    pub fn build(&self, relation: &Relation) -> ItemSimilarityTable {
        build(relation, self.top_n, &self.metric, self.progress_interval)
    }
}

impl Default for ItemSimilarityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[instrument(skip(relation, metric), fields(metric = metric.name()))]
fn build<M>(relation: &Relation, n: usize, metric: &M, progress_interval: usize) -> ItemSimilarityTable
where
    M: SimilarityMetric + ?Sized,
{
    let start = Instant::now();
    let items = transpose(relation);
    let total = items.len();
    let processed = AtomicUsize::new(0);

    let rows: Vec<(&EntityId, &Ratings)> = items.iter().collect();
    let table: ItemSimilarityTable = rows
        .par_iter()
        .map(|&(item, row)| {
            let matches: Vec<Match> = rank_against(&items, item, row, n, metric);

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if progress_interval > 0 && done % progress_interval == 0 {
                info!("Item similarity progress: {}/{}", done, total);
            }
            (item.clone(), matches)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    info!(
        "Built item-similarity table for {} items in {:?}",
        table.len(),
        start.elapsed()
    );
    table
}

//! # Engine Crate
//!
//! Similarity scoring and recommendation over sparse rating relations.
//!
//! ## Components
//!
//! - **similarity**: Euclidean and Pearson metrics behind the
//!   `SimilarityMetric` trait
//! - **ranking**: top-N entities most similar to a target
//! - **user_based**: "people like you also liked..." via similarity-weighted
//!   averages of other people's ratings
//! - **transpose**: flip person -> item into item -> person
//! - **item_similarity**: offline table of each item's most similar items
//! - **item_based**: fast recommendations from that table
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{recommend, recommend_items, top_matches, ItemSimilarityBuilder, Metric, RecommendConfig};
//!
//! let critics = data_loader::Relation::load_from_file(path)?.relation;
//!
//! // User-based
//! let similar = top_matches(&critics, "Toby", 3, &Metric::Pearson)?;
//! let recs = recommend(&critics, "Toby", &RecommendConfig::default())?;
//!
//! // Item-based: precompute once, query often
//! let table = ItemSimilarityBuilder::new().build(&critics);
//! let recs = recommend_items(&critics, &table, "Toby")?;
//! ```
//!
//! Every function here is a pure computation over borrowed, read-only
//! inputs. Nothing is cached between calls.

pub mod config;
pub mod error;
pub mod item_based;
pub mod item_similarity;
pub mod ranking;
pub mod similarity;
pub mod transpose;
pub mod types;
pub mod user_based;

// Re-export commonly used types
pub use config::RecommendConfig;
pub use error::{EngineError, Result};
pub use item_based::recommend_items;
pub use item_similarity::{build_item_similarities, ItemSimilarityBuilder};
pub use ranking::top_matches;
pub use similarity::{euclidean_distance, pearson_correlation, shared_items, Metric, SimilarityMetric};
pub use transpose::transpose;
pub use types::{ItemSimilarityTable, Match, Recommendation};
pub use user_based::{recommend, recommend_with, similar_entities};

//! Example: user-based and item-based recommendations for one critic
//!
//! Run with: cargo run --package engine --example critics_walkthrough
//!
//! This example shows how to:
//! 1. Load the critics ratings
//! 2. Compare two critics with both metrics
//! 3. Find a critic's closest matches
//! 4. Recommend movies user-based and item-based
//! 5. Display the results

use data_loader::Relation;
use engine::{
    euclidean_distance, pearson_correlation, recommend, recommend_items, top_matches,
    ItemSimilarityBuilder, Metric, RecommendConfig,
};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== Critics Recommendation Example ===\n");

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/critics.tsv");
    let critics = Relation::load_from_file(&path)?.relation;
    let (people, ratings) = critics.counts();
    println!("Loaded {} critics with {} ratings\n", people, ratings);

    println!(
        "Lisa Rose vs Gene Seymour: euclidean {:.4}, pearson {:.4}\n",
        euclidean_distance(&critics, "Lisa Rose", "Gene Seymour")?,
        pearson_correlation(&critics, "Lisa Rose", "Gene Seymour")?
    );

    let person = "Toby";
    println!("Critics most like {}:", person);
    for m in top_matches(&critics, person, 3, &Metric::Pearson)? {
        println!("  {:.3}  {}", m.score, m.id);
    }

    println!("\nUser-based recommendations for {}:", person);
    let start = Instant::now();
    let recs = recommend(&critics, person, &RecommendConfig::default())?;
    for rec in &recs {
        println!("  {:.3}  {}", rec.score, rec.item);
    }
    println!("  ({:?})", start.elapsed());

    println!("\nPrecomputing item similarities...");
    let start = Instant::now();
    let table = ItemSimilarityBuilder::new().build(&critics);
    println!("  {} items in {:?}", table.len(), start.elapsed());

    println!("\nItem-based recommendations for {}:", person);
    let start = Instant::now();
    for rec in recommend_items(&critics, &table, person)? {
        println!("  {:.3}  {}", rec.score, rec.item);
    }
    println!("  ({:?})", start.elapsed());

    Ok(())
}

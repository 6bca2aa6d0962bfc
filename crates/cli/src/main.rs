use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Relation, WordMatrix, WordMatrixBuilder};
use engine::{
    build_item_similarities, recommend, recommend_items, top_matches, transpose,
    ItemSimilarityTable, Match, Metric, RecommendConfig, Recommendation, SimilarityMetric,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// critic-recs - Similarity scores and recommendations from ratings
#[derive(Parser)]
#[command(name = "critic-recs")]
#[command(about = "Collaborative filtering over a ratings file", long_about = None)]
struct Cli {
    /// Ratings file: tab-separated `entity<TAB>item<TAB>rating` lines, or JSON
    #[arg(short, long, global = true, default_value = "data/critics.tsv")]
    data: PathBuf,

    /// How ranked lists are printed
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Similarity score between two entities
    Similarity {
        #[arg(long)]
        a: String,

        #[arg(long)]
        b: String,

        #[arg(long, value_enum, default_value_t = MetricArg::Pearson)]
        metric: MetricArg,

        /// Compare items instead of people
        #[arg(long)]
        transpose: bool,
    },

    /// Entities most similar to a target
    TopMatches {
        #[arg(long)]
        entity: String,

        #[arg(long, default_value = "5")]
        limit: usize,

        #[arg(long, value_enum, default_value_t = MetricArg::Pearson)]
        metric: MetricArg,

        /// Rank items instead of people
        #[arg(long)]
        transpose: bool,
    },

    /// User-based recommendations for a person
    Recommend {
        #[arg(long)]
        person: String,

        #[arg(long, value_enum, default_value_t = MetricArg::Pearson)]
        metric: MetricArg,

        /// Show only the first N recommendations
        #[arg(long)]
        limit: Option<usize>,

        /// Treat a stored rating of 0 as "not rated"
        #[arg(long)]
        zero_is_unrated: bool,

        /// Recommend people for an item instead
        #[arg(long)]
        transpose: bool,
    },

    /// Precompute each item's most similar items
    Precompute {
        /// Similar items kept per item
        #[arg(long, default_value = "10")]
        limit: usize,

        #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
        metric: MetricArg,

        /// Write the table as JSON instead of printing it
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Item-based recommendations from a precomputed table
    RecommendItems {
        #[arg(long)]
        user: String,

        /// Table written by `precompute`; built on the fly when absent
        #[arg(long)]
        table: Option<PathBuf>,

        /// Similar items per item when building on the fly
        #[arg(long, default_value = "10")]
        similar: usize,

        /// Show only the first N recommendations
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Build a word-count matrix from local documents
    WordMatrix {
        /// Documents: first line is the title, blank lines separate entries
        #[arg(long, num_args = 1.., required = true)]
        docs: Vec<PathBuf>,

        #[arg(long, default_value = "0.1")]
        min_fraction: f64,

        #[arg(long, default_value = "0.5")]
        max_fraction: f64,

        /// Write the matrix here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also list the documents closest to this one
        #[arg(long)]
        similar_to: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Euclidean,
    Pearson,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Euclidean => Metric::Euclidean,
            MetricArg::Pearson => Metric::Pearson,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Tsv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so tsv/json output stays clean
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let format = cli.format;
    match cli.command {
        Commands::Similarity {
            a,
            b,
            metric,
            transpose,
        } => {
            let relation = load_relation(&cli.data, transpose)?;
            handle_similarity(&relation, &a, &b, metric.into(), format)?
        }
        Commands::TopMatches {
            entity,
            limit,
            metric,
            transpose,
        } => {
            let relation = load_relation(&cli.data, transpose)?;
            let matches = top_matches(&relation, &entity, limit, &Metric::from(metric))?;
            print_matches(&mut io::stdout().lock(), &format!("Most similar to {}", entity), &matches, format)?;
        }
        Commands::Recommend {
            person,
            metric,
            limit,
            zero_is_unrated,
            transpose,
        } => {
            let relation = load_relation(&cli.data, transpose)?;
            let config = RecommendConfig::default()
                .with_metric(metric.into())
                .with_zero_is_unrated(zero_is_unrated);
            let mut recs = recommend(&relation, &person, &config)?;
            truncate(&mut recs, limit);
            print_recommendations(
                &mut io::stdout().lock(),
                &format!("Recommendations for {}", person),
                &recs,
                format,
            )?;
        }
        Commands::Precompute {
            limit,
            metric,
            output,
        } => {
            let relation = load_relation(&cli.data, false)?;
            handle_precompute(&relation, limit, metric.into(), output.as_deref(), format)?
        }
        Commands::RecommendItems {
            user,
            table,
            similar,
            limit,
        } => {
            let relation = load_relation(&cli.data, false)?;
            let table = match table {
                Some(path) => read_table(&path)?,
                None => build_item_similarities(&relation, similar, &Metric::Euclidean),
            };
            let mut recs = recommend_items(&relation, &table, &user)?;
            truncate(&mut recs, limit);
            print_recommendations(
                &mut io::stdout().lock(),
                &format!("Item-based recommendations for {}", user),
                &recs,
                format,
            )?;
        }
        Commands::WordMatrix {
            docs,
            min_fraction,
            max_fraction,
            output,
            similar_to,
        } => handle_word_matrix(
            &docs,
            min_fraction,
            max_fraction,
            output.as_deref(),
            similar_to.as_deref(),
            format,
        )?,
    }

    Ok(())
}

/// Load the ratings file, optionally flipped to item -> person
fn load_relation(path: &Path, flip: bool) -> Result<Relation> {
    let start = Instant::now();
    let report = Relation::load_from_file(path)
        .with_context(|| format!("Failed to load ratings from {}", path.display()))?;

    if report.skipped > 0 {
        eprintln!(
            "{} skipped {} malformed records in {}",
            "!".yellow(),
            report.skipped,
            path.display()
        );
    }
    let (entities, ratings) = report.relation.counts();
    tracing::debug!(
        "Loaded {} entities with {} ratings in {:?}",
        entities,
        ratings,
        start.elapsed()
    );

    Ok(if flip {
        transpose(&report.relation)
    } else {
        report.relation
    })
}

/// Handle the 'similarity' command
fn handle_similarity(
    relation: &Relation,
    a: &str,
    b: &str,
    metric: Metric,
    format: OutputFormat,
) -> Result<()> {
    let score = metric.similarity(relation, a, b)?;
    match format {
        OutputFormat::Text => println!(
            "{} {} vs {}: {}",
            metric.to_string().bold().blue(),
            a,
            b,
            format!("{:.6}", score).green()
        ),
        OutputFormat::Tsv => println!("{}\t{}\t{}\t{}", metric, a, b, score),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "metric": metric, "a": a, "b": b, "score": score })
        ),
    }
    Ok(())
}

/// Handle the 'precompute' command
fn handle_precompute(
    relation: &Relation,
    limit: usize,
    metric: Metric,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let start = Instant::now();
    let table = build_item_similarities(relation, limit, &metric);
    eprintln!(
        "{} Built similarities for {} items in {:?}",
        "✓".green(),
        table.len(),
        start.elapsed()
    );

    match output {
        Some(path) => {
            write_table(path, &table)?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => print_table(&mut io::stdout().lock(), &table, format)?,
    }
    Ok(())
}

/// Handle the 'word-matrix' command
fn handle_word_matrix(
    docs: &[PathBuf],
    min_fraction: f64,
    max_fraction: f64,
    output: Option<&Path>,
    similar_to: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    if !(min_fraction < max_fraction) {
        bail!(
            "--min-fraction ({}) must be below --max-fraction ({})",
            min_fraction,
            max_fraction
        );
    }

    let report = WordMatrixBuilder::new()
        .with_min_fraction(min_fraction)
        .with_max_fraction(max_fraction)
        .ingest_files(docs);

    eprintln!(
        "{} Parsed {} documents ({} failed), kept {} words",
        "✓".green(),
        report.succeeded,
        report.failed,
        report.matrix.words.len()
    );
    for err in &report.errors {
        eprintln!("  {} {}", "✗".red(), err);
    }

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            emit_word_matrix(
                &report.matrix,
                similar_to,
                format,
                &mut out,
                &mut io::stdout().lock(),
            )?;
            out.flush()
                .with_context(|| format!("Failed to write matrix to {}", path.display()))?;
        }
        // stdout carries the matrix alone, the ranked list goes to stderr
        None => emit_word_matrix(
            &report.matrix,
            similar_to,
            format,
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
        )?,
    }
    Ok(())
}

/// Write the matrix to `matrix_out` and, when asked, the documents closest
/// to `similar_to` to `list_out`
fn emit_word_matrix<M: Write, L: Write>(
    matrix: &WordMatrix,
    similar_to: Option<&str>,
    format: OutputFormat,
    matrix_out: &mut M,
    list_out: &mut L,
) -> Result<()> {
    matrix.write_tsv(&mut *matrix_out)?;

    if let Some(title) = similar_to {
        let relation = matrix.to_relation();
        let matches = top_matches(&relation, title, 5, &Metric::Pearson)?;
        print_matches(list_out, &format!("Documents like {}", title), &matches, format)?;
    }
    Ok(())
}

/// Serialize the table as JSON; fails if any byte fails to reach the file
fn write_table(path: &Path, table: &ItemSimilarityTable) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, table)
        .with_context(|| format!("Failed to write table to {}", path.display()))?;
    out.flush()
        .with_context(|| format!("Failed to write table to {}", path.display()))?;
    Ok(())
}

fn read_table(path: &Path) -> Result<ItemSimilarityTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open table {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse table {}", path.display()))
}

/// Print the whole table; tsv rows are `item<TAB>score<TAB>similar item`
fn print_table<W: Write>(
    out: &mut W,
    table: &ItemSimilarityTable,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (item, matches) in table.iter() {
                print_matches(&mut *out, item, matches, format)?;
            }
        }
        OutputFormat::Tsv => {
            for (item, matches) in table.iter() {
                for m in matches {
                    writeln!(out, "{}\t{}\t{}", item, m.score, m.id)?;
                }
            }
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(table)?)?,
    }
    Ok(())
}

fn truncate<T>(list: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        list.truncate(limit);
    }
}

fn print_matches<W: Write>(
    out: &mut W,
    header: &str,
    matches: &[Match],
    format: OutputFormat,
) -> Result<()> {
    let rows: Vec<(f64, &str)> = matches.iter().map(|m| (m.score, m.id.as_str())).collect();
    print_ranked(out, header, &rows, matches, format)
}

fn print_recommendations<W: Write>(
    out: &mut W,
    header: &str,
    recs: &[Recommendation],
    format: OutputFormat,
) -> Result<()> {
    let rows: Vec<(f64, &str)> = recs.iter().map(|r| (r.score, r.item.as_str())).collect();
    print_ranked(out, header, &rows, recs, format)
}

/// Print a ranked list; `raw` is what the json format serializes
fn print_ranked<W: Write, T: Serialize>(
    out: &mut W,
    header: &str,
    rows: &[(f64, &str)],
    raw: &[T],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{}", format!("{}:", header).bold().blue())?;
            if rows.is_empty() {
                writeln!(out, "  {}", "(none)".dimmed())?;
            }
            for (rank, (score, id)) in rows.iter().enumerate() {
                writeln!(out, "{:>3}. {:<8.4} {}", (rank + 1).to_string().green(), score, id)?;
            }
        }
        OutputFormat::Tsv => {
            for (score, id) in rows {
                writeln!(out, "{}\t{}", score, id)?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(raw)?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ItemSimilarityBuilder;

    fn create_test_relation() -> Relation {
        vec![
            ("Lisa Rose", "Superman Returns", 3.5),
            ("Lisa Rose", "Just My Luck", 3.0),
            ("Lisa Rose", "Lady in the Water", 2.5),
            ("Gene Seymour", "Superman Returns", 5.0),
            ("Gene Seymour", "Just My Luck", 1.5),
            ("Gene Seymour", "Lady in the Water", 3.0),
        ]
        .into_iter()
        .collect()
    }

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("critic-recs-tests-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn create_test_matrix() -> WordMatrix {
        let sources = ["alpha", "beta", "gamma"].map(|title| {
            (
                title.to_string(),
                Ok::<_, data_loader::DataLoadError>(format!("{}\n\nentry\nshared shared {} {}", title, title, title)),
            )
        });
        WordMatrixBuilder::new().with_max_fraction(1.0).ingest(sources).matrix
    }

    #[test]
    fn test_table_tsv_rows_name_the_source_item() {
        let table = ItemSimilarityBuilder::new().with_top_n(2).build(&create_test_relation());
        let mut out = Vec::new();
        print_table(&mut out, &table, OutputFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        for line in &lines {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 3);
            assert!(table.contains(fields[0]));
            assert!(fields[1].parse::<f64>().is_ok());
            assert_ne!(fields[0], fields[2]);
        }

        let superman = table.get("Superman Returns").unwrap();
        let first = format!("Superman Returns\t{}\t{}", superman[0].score, superman[0].id);
        assert!(lines.contains(&first.as_str()));
    }

    #[test]
    fn test_table_file_round_trips() {
        let table = ItemSimilarityBuilder::new().build(&create_test_relation());
        let path = temp_path("table.json");

        write_table(&path, &table).unwrap();
        let restored = read_table(&path).unwrap();

        assert_eq!(restored.len(), table.len());
        for (item, matches) in table.iter() {
            let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
            let restored_ids: Vec<&str> =
                restored.get(item).unwrap().iter().map(|m| m.id.as_str()).collect();
            assert_eq!(ids, restored_ids);
        }
    }

    #[test]
    fn test_write_table_to_missing_directory_fails() {
        let table = ItemSimilarityBuilder::new().build(&create_test_relation());
        let path = temp_path("no-such-dir").join("table.json");
        assert!(write_table(&path, &table).is_err());
    }

    #[test]
    fn test_similarity_list_kept_out_of_matrix_stream() {
        let matrix = create_test_matrix();
        let mut matrix_out = Vec::new();
        let mut list_out = Vec::new();

        emit_word_matrix(&matrix, Some("alpha"), OutputFormat::Json, &mut matrix_out, &mut list_out)
            .unwrap();

        let mut expected = Vec::new();
        matrix.write_tsv(&mut expected).unwrap();
        assert_eq!(matrix_out, expected);

        let matches: Vec<Match> = serde_json::from_slice(&list_out).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.id != "alpha"));
    }

    #[test]
    fn test_matrix_without_similarity_list() {
        let matrix = create_test_matrix();
        let mut matrix_out = Vec::new();
        let mut list_out = Vec::new();

        emit_word_matrix(&matrix, None, OutputFormat::Tsv, &mut matrix_out, &mut list_out).unwrap();

        assert!(String::from_utf8(matrix_out).unwrap().starts_with("Blog\t"));
        assert!(list_out.is_empty());
    }
}

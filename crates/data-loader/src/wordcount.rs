//! Word-count vectors for feed-like documents.
//!
//! Each document becomes one row of a word matrix: document title -> word ->
//! number of occurrences. That row is structurally a rating relation, so
//! blogs can be compared with the same similarity metrics as critics.
//!
//! ## Document format
//!
//! ```text
//! Feed Title
//!
//! First entry title
//! <p>First entry summary, may contain HTML</p>
//!
//! Second entry title
//! Second entry summary
//! ```
//!
//! The first non-empty line titles the feed. Entries are separated by blank
//! lines; an entry's first line is its title, the rest its summary.
//!
//! ## Word selection
//!
//! A word is kept when the fraction of documents using it more than once
//! lies strictly between `min_fraction` and `max_fraction`. Very rare words
//! carry no signal and very common ones ("the", "and") carry no contrast.
//! The denominator is every document attempted, including ones that failed.

use crate::error::{DataLoadError, Result};
use crate::parser::read_to_string_lossy;
use crate::types::{EntityId, Relation};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Word -> occurrence count for one document
pub type WordCounts = BTreeMap<String, u32>;

/// Split HTML into lowercase words.
///
/// Tags are removed first; words are maximal runs of ASCII letters.
pub fn extract_words(html: &str) -> Vec<String> {
    strip_tags(html)
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect()
}

/// Remove every `<...>` tag. An unterminated `<` is kept as text.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) if close > 1 => {
                text.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            _ => {
                text.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }
    text.push_str(rest);
    text
}

/// Count the words of an entry's title and summary together
pub fn word_counts(title: &str, summary: &str) -> WordCounts {
    let mut counts = WordCounts::new();
    add_words(&mut counts, title, summary);
    counts
}

fn add_words(counts: &mut WordCounts, title: &str, summary: &str) {
    let text = format!("{} {}", title, summary);
    for word in extract_words(&text) {
        *counts.entry(word).or_insert(0) += 1;
    }
}

// =============================================================================
// Documents
// =============================================================================

/// One entry of a feed
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub summary: String,
}

/// A parsed feed document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub entries: Vec<Entry>,
}

impl Document {
    /// Parse a document; `source_name` only labels the error.
    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let mut blocks = blocks(text).into_iter();

        let header = blocks.next().ok_or_else(|| DataLoadError::IngestionFailure {
            source_name: source_name.to_string(),
            reason: "document is empty".to_string(),
        })?;

        // A title-only first block; anything after its first line starts an entry.
        let title = header[0].trim().to_string();
        if title.is_empty() {
            return Err(DataLoadError::IngestionFailure {
                source_name: source_name.to_string(),
                reason: "missing feed title".to_string(),
            });
        }

        let mut entries = Vec::new();
        if header.len() > 1 {
            entries.push(parse_entry(&header[1..]));
        }
        for block in blocks {
            entries.push(parse_entry(&block));
        }

        Ok(Self { title, entries })
    }

    /// Word counts over every entry of the document
    pub fn word_counts(&self) -> WordCounts {
        let mut counts = WordCounts::new();
        for entry in &self.entries {
            add_words(&mut counts, &entry.title, &entry.summary);
        }
        counts
    }
}

/// Runs of non-blank lines. `lines()` strips `\r\n` as well as `\n`, and a
/// whitespace-only line separates blocks. Every block has at least one line.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_entry(lines: &[&str]) -> Entry {
    let title = lines.first().map(|l| l.trim()).unwrap_or_default().to_string();
    let summary = lines.iter().skip(1).map(|l| l.trim()).collect::<Vec<_>>().join(" ");
    Entry { title, summary }
}

// =============================================================================
// Word matrix
// =============================================================================

/// Document title -> word counts, restricted to the selected vocabulary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordMatrix {
    /// Selected words, sorted
    pub words: Vec<String>,
    /// Raw counts for every ingested document
    pub rows: BTreeMap<EntityId, WordCounts>,
}

impl WordMatrix {
    /// Count of `word` in `document`, 0 when absent
    pub fn count(&self, document: &str, word: &str) -> u32 {
        self.rows
            .get(document)
            .and_then(|counts| counts.get(word))
            .copied()
            .unwrap_or(0)
    }

    /// Dense relation over the selected words: every document gets a value
    /// for every word, zero included, matching the tabular output.
    pub fn to_relation(&self) -> Relation {
        let mut relation = Relation::new();
        for document in self.rows.keys() {
            for word in &self.words {
                relation.insert(document.clone(), word.clone(), self.count(document, word) as f64);
            }
        }
        relation
    }

    /// Write the matrix as tab-separated text: a `Blog` header row of words,
    /// then one row of counts per document.
    pub fn write_tsv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        write!(out, "Blog")?;
        for word in &self.words {
            write!(out, "\t{}", word)?;
        }
        writeln!(out)?;

        for document in self.rows.keys() {
            write!(out, "{}", document)?;
            for word in &self.words {
                write!(out, "\t{}", self.count(document, word))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Outcome of ingesting a batch of documents
#[derive(Debug, Default)]
pub struct IngestReport {
    pub matrix: WordMatrix,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<DataLoadError>,
}

/// Builds a `WordMatrix` from a batch of documents
#[derive(Debug, Clone)]
pub struct WordMatrixBuilder {
    min_fraction: f64,
    max_fraction: f64,
}

impl WordMatrixBuilder {
    pub fn new() -> Self {
        Self {
            min_fraction: 0.1,
            max_fraction: 0.5,
        }
    }

    /// Configure the exclusive lower bound on document fraction (default: 0.1)
    pub fn with_min_fraction(mut self, fraction: f64) -> Self {
        self.min_fraction = fraction;
        self
    }

    /// Configure the exclusive upper bound on document fraction (default: 0.5)
    pub fn with_max_fraction(mut self, fraction: f64) -> Self {
        self.max_fraction = fraction;
        self
    }

    /// Read and ingest documents from disk
    pub fn ingest_files(&self, paths: &[PathBuf]) -> IngestReport {
        self.ingest(
            paths
                .iter()
                .map(|path| (path.display().to_string(), read_to_string_lossy(path))),
        )
    }

    /// Ingest `(source name, document text)` pairs.
    ///
    /// A source that can't be read or parsed is counted as failed and
    /// skipped; it still counts toward the fraction denominator.
    pub fn ingest<I>(&self, sources: I) -> IngestReport
    where
        I: IntoIterator<Item = (String, Result<String>)>,
    {
        let mut report = IngestReport::default();
        let mut appeared: BTreeMap<String, usize> = BTreeMap::new();
        let mut attempted = 0usize;

        for (name, text) in sources {
            attempted += 1;
            match text.and_then(|text| Document::parse(&text, &name)) {
                Ok(document) => {
                    let counts = document.word_counts();
                    for (word, &count) in &counts {
                        let seen = appeared.entry(word.clone()).or_insert(0);
                        if count > 1 {
                            *seen += 1;
                        }
                    }
                    debug!("Parsed {} ({} distinct words)", name, counts.len());
                    report.matrix.rows.insert(document.title, counts);
                    report.succeeded += 1;
                }
                Err(err) => {
                    warn!("Failed to parse: {}", err);
                    report.errors.push(err);
                    report.failed += 1;
                }
            }
        }

        if attempted > 0 {
            report.matrix.words = appeared
                .into_iter()
                .filter(|&(_, count)| {
                    let fraction = count as f64 / attempted as f64;
                    self.min_fraction < fraction && fraction < self.max_fraction
                })
                .map(|(word, _)| word)
                .collect();
        }

        info!(
            "Successfully parsed {} documents, failed {}; kept {} words",
            report.succeeded,
            report.failed,
            report.matrix.words.len()
        );
        report
    }
}

impl Default for WordMatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_words() {
        let words = extract_words("<p>Hello, <b>World</b>!</p> It's 2024-ready");
        assert_eq!(words, vec!["hello", "world", "it", "s", "ready"]);
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        assert_eq!(extract_words("a < b"), vec!["a", "b"]);
        assert_eq!(extract_words("x <> y"), vec!["x", "y"]);
    }

    #[test]
    fn test_word_counts_include_title() {
        let counts = word_counts("Rust news", "<i>rust</i> is fast");
        assert_eq!(counts["rust"], 2);
        assert_eq!(counts["news"], 1);
        assert_eq!(counts["fast"], 1);
    }

    #[test]
    fn test_document_parse() {
        let text = "My Blog\n\nFirst post\nhello hello\nworld\n\nSecond post\n";
        let doc = Document::parse(text, "inline").unwrap();

        assert_eq!(doc.title, "My Blog");
        assert_eq!(doc.entries.len(), 2);
        assert_eq!(doc.entries[0].title, "First post");
        assert_eq!(doc.entries[0].summary, "hello hello world");
        assert_eq!(doc.entries[1].summary, "");

        let counts = doc.word_counts();
        assert_eq!(counts["hello"], 2);
        assert_eq!(counts["post"], 2);
    }

    #[test]
    fn test_document_parse_crlf() {
        let lf = "My Blog\n\nPost one\nhello\n\nPost two\nworld\n";
        let crlf = lf.replace('\n', "\r\n");

        let from_lf = Document::parse(lf, "lf").unwrap();
        let from_crlf = Document::parse(&crlf, "crlf").unwrap();

        assert_eq!(from_crlf, from_lf);
        assert_eq!(from_crlf.title, "My Blog");
        assert_eq!(
            from_crlf.entries,
            vec![
                Entry { title: "Post one".to_string(), summary: "hello".to_string() },
                Entry { title: "Post two".to_string(), summary: "world".to_string() },
            ]
        );
    }

    #[test]
    fn test_whitespace_line_separates_entries() {
        let doc = Document::parse("My Blog\n\nPost one\nhello\n   \nPost two\n", "inline").unwrap();
        assert_eq!(doc.entries.len(), 2);
        assert_eq!(doc.entries[1].title, "Post two");
    }

    #[test]
    fn test_empty_document_fails() {
        assert!(matches!(
            Document::parse("\n\n  \n", "empty"),
            Err(DataLoadError::IngestionFailure { .. })
        ));
    }

    fn doc(title: &str, body: &str) -> (String, Result<String>) {
        (title.to_string(), Ok(format!("{}\n\nentry\n{}", title, body)))
    }

    #[test]
    fn test_ingest_selects_mid_frequency_words() {
        // "common" is repeated in 3 of 4 documents (0.75), "mid" in 1 (0.25),
        // "once" appears only singly (0.0).
        let sources = vec![
            doc("a", "common common mid mid once"),
            doc("b", "common common"),
            doc("c", "common common once"),
            doc("d", "nothing"),
        ];
        let report = WordMatrixBuilder::new().ingest(sources);

        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(report.matrix.words, vec!["mid"]);
        assert_eq!(report.matrix.count("a", "mid"), 2);
        assert_eq!(report.matrix.count("b", "mid"), 0);
    }

    #[test]
    fn test_ingest_counts_failures() {
        let sources = vec![
            doc("a", "word word"),
            (
                "broken".to_string(),
                Err(DataLoadError::FileNotFound {
                    path: "broken".to_string(),
                }),
            ),
            ("blank".to_string(), Ok(String::new())),
        ];
        let report = WordMatrixBuilder::new().with_max_fraction(0.9).ingest(sources);

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.errors.len(), 2);
        // 1 of 3 attempted documents repeats "word"
        assert_eq!(report.matrix.words, vec!["word"]);
    }

    #[test]
    fn test_matrix_outputs() {
        let sources = vec![doc("a", "alpha alpha"), doc("b", "beta beta"), doc("c", "")];
        let report = WordMatrixBuilder::new().ingest(sources);
        let matrix = report.matrix;
        assert_eq!(matrix.words, vec!["alpha", "beta"]);

        let mut out = Vec::new();
        matrix.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Blog\talpha\tbeta\na\t2\t0\nb\t0\t2\nc\t0\t0\n"
        );

        let relation = matrix.to_relation();
        assert_eq!(relation.counts(), (3, 6));
        assert_eq!(relation.rating("b", "alpha"), Some(0.0));
        assert_eq!(relation.rating("b", "beta"), Some(2.0));
    }
}

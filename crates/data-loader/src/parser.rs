//! Parser for tab-separated ratings files.
//!
//! Format, one rating per line:
//!
//! ```text
//! # comment
//! Lisa Rose<TAB>Lady in the Water<TAB>2.5
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A malformed line is
//! recorded as an error and skipped; parsing always runs to the end of the
//! input.

use crate::error::{DataLoadError, Result};
use crate::types::RatingRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const FIELD_SEPARATOR: char = '\t';
const FIELDS_PER_LINE: usize = 3;

/// Result of parsing a whole ratings file
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Records that parsed cleanly, in file order
    pub records: Vec<RatingRecord>,
    /// One error per skipped line
    pub errors: Vec<DataLoadError>,
}

impl ParseOutcome {
    pub fn loaded(&self) -> usize {
        self.records.len()
    }

    pub fn skipped(&self) -> usize {
        self.errors.len()
    }
}

/// Read a file into a String, replacing invalid UTF-8 instead of failing.
pub(crate) fn read_to_string_lossy(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse every line of `content`; `file` only labels error messages.
pub fn parse_ratings(content: &str, file: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim_end_matches(['\r', '\n']);
        if line_trimmed.trim().is_empty() || line_trimmed.trim_start().starts_with('#') {
            continue;
        }

        match parse_line(line_trimmed, file, line_no) {
            Ok(record) => outcome.records.push(record),
            Err(err) => outcome.errors.push(err),
        }
    }

    outcome
}

/// Parse a ratings file from disk
pub fn parse_ratings_file(path: &Path) -> Result<ParseOutcome> {
    let content = read_to_string_lossy(path)?;
    Ok(parse_ratings(&content, &path.display().to_string()))
}

fn parse_line(line: &str, file: &str, line_no: usize) -> Result<RatingRecord> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if parts.len() != FIELDS_PER_LINE {
        return Err(DataLoadError::FieldCountMismatch {
            expected: FIELDS_PER_LINE,
            found: parts.len(),
            line: line_no,
        });
    }

    let entity = non_empty(parts[0], "entity")?;
    let item = non_empty(parts[1], "item")?;
    let rating = parse_rating(parts[2]).map_err(|reason| DataLoadError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason,
    })?;

    Ok(RatingRecord::new(entity, item, rating))
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(DataLoadError::InvalidValue {
            field: field.to_string(),
            value: String::new(),
        });
    }
    Ok(value)
}

fn parse_rating(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("Invalid rating {:?}: {}", s, e))?;
    if !value.is_finite() {
        return Err(format!("Rating must be finite, got {}", s));
    }
    Ok(value)
}

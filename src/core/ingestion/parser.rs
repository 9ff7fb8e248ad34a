// src/core/ingestion/parser.rs

//! Reads number vectors, one per line, into [`Point`]s.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use super::tokenizer::Tokenizer;
use crate::core::common::KnnError;
use crate::core::types::{Point, PointId};

/// Lines starting with this prefix are skipped.
pub const DEFAULT_COMMENT_PREFIX: &str = "#";

/// A line that was not turned into a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

/// Result of parsing one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub points: Vec<Point>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parses delimited numeric records into points with sequential ids.
///
/// Every accepted record must have the dimensionality of the first accepted one.
/// Records that fail to parse are reported in [`ParseOutcome::rejected`] and never
/// produce a point.
#[derive(Debug, Clone)]
pub struct NumberVectorParser {
    tokenizer: Tokenizer,
    comment_prefix: String,
}

impl NumberVectorParser {
    /// Parser with the default separator, quote and comment prefix.
    pub fn new() -> Result<Self, KnnError> {
        Ok(Self::with_tokenizer(Tokenizer::with_defaults()?))
    }

    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Self { tokenizer, comment_prefix: DEFAULT_COMMENT_PREFIX.to_string() }
    }

    #[must_use]
    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// # Errors
    ///
    /// `Io` when reading fails. Malformed records, including lines that are not
    /// valid UTF-8, are not errors.
    pub fn parse_reader<R: BufRead>(&self, mut reader: R) -> Result<ParseOutcome, KnnError> {
        let mut tokenizer = self.tokenizer.clone();
        let mut outcome = ParseOutcome::default();
        let mut dimension: Option<usize> = None;
        let mut buffer = Vec::new();
        let mut line_number = 0;

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_number += 1;

            let parsed = std::str::from_utf8(&buffer)
                .map_err(|e| format!("line is not valid UTF-8: {}", e))
                .and_then(|line| {
                    let record = line.trim();
                    if record.is_empty()
                        || (!self.comment_prefix.is_empty()
                            && record.starts_with(&self.comment_prefix))
                    {
                        return Ok(None);
                    }
                    parse_record(&mut tokenizer, record, dimension).map(Some)
                });

            match parsed {
                Ok(None) => {}
                Ok(Some(coordinates)) => {
                    dimension.get_or_insert(coordinates.len());
                    let id = outcome.points.len() as PointId;
                    outcome.points.push(Point::new(id, coordinates));
                }
                Err(reason) => {
                    warn!("rejecting line {}: {}", line_number, reason);
                    outcome.rejected.push(RejectedRecord { line: line_number, reason });
                }
            }
        }

        debug!(
            "parsed {} points ({} records rejected)",
            outcome.points.len(),
            outcome.rejected.len()
        );
        Ok(outcome)
    }

    /// # Errors
    ///
    /// `Io` when the file cannot be opened or read.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutcome, KnnError> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }
}

fn parse_record(
    tokenizer: &mut Tokenizer,
    record: &str,
    expected_dimension: Option<usize>,
) -> Result<Vec<f64>, String> {
    let mut coordinates = Vec::new();
    tokenizer.initialize(record);
    while tokenizer.valid() {
        let value = tokenizer.get_f64().map_err(|e| e.to_string())?;
        if !value.is_finite() {
            return Err(format!("non-finite value '{}'", tokenizer.substring()));
        }
        coordinates.push(value);
        tokenizer.advance();
    }
    if let Some(expected) = expected_dimension {
        if coordinates.len() != expected {
            return Err(
                KnnError::DimensionMismatch { dim1: expected, dim2: coordinates.len() }.to_string()
            );
        }
    }
    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_parses_points_with_sequential_ids() {
        let input = "# x y\n-4 -5\n-9, 3\n\n9;-1\n";
        let outcome = NumberVectorParser::new().unwrap().parse_reader(Cursor::new(input)).unwrap();
        assert!(outcome.rejected.is_empty());
        let ids: Vec<PointId> = outcome.points.iter().map(Point::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(outcome.points[1].coordinates(), &[-9.0, 3.0]);
    }

    #[test]
    fn test_rejects_malformed_and_mismatched_records() {
        let input = "1 2\n3 abc\n4 5 6\n7 8\nNaN 1\n";
        let outcome = NumberVectorParser::new().unwrap().parse_reader(Cursor::new(input)).unwrap();
        assert_eq!(outcome.points.len(), 2);
        assert_eq!(outcome.points[1].coordinates(), &[7.0, 8.0]);
        assert_eq!(outcome.points[1].id(), 1);
        let lines: Vec<usize> = outcome.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 5]);
    }

    #[test]
    fn test_invalid_utf8_line_is_rejected() {
        let input: &[u8] = b"1 2\n3 4\n\xff 5\n6 7\n";
        let outcome = NumberVectorParser::new().unwrap().parse_reader(input).unwrap();
        assert_eq!(outcome.points.len(), 3);
        assert_eq!(outcome.points[2].coordinates(), &[6.0, 7.0]);
        assert_eq!(outcome.points[2].id(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].line, 3);
    }

    #[test]
    fn test_last_line_without_newline() {
        let input: &[u8] = b"1 2\r\n3 4";
        let outcome = NumberVectorParser::new().unwrap().parse_reader(input).unwrap();
        assert_eq!(outcome.points.len(), 2);
        assert_eq!(outcome.points[1].coordinates(), &[3.0, 4.0]);
    }

    #[test]
    fn test_custom_comment_prefix() {
        let parser = NumberVectorParser::new().unwrap().with_comment_prefix("%");
        let outcome = parser.parse_reader(Cursor::new("% header\n1 1\n")).unwrap();
        assert_eq!(outcome.points.len(), 1);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0,2.0\n3.0,4.0").unwrap();
        let outcome = NumberVectorParser::new().unwrap().parse_file(file.path()).unwrap();
        assert_eq!(outcome.points.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let missing = NumberVectorParser::new().unwrap().parse_file(&dir.path().join("none.csv"));
        assert!(matches!(missing, Err(KnnError::Io(_))));
    }
}

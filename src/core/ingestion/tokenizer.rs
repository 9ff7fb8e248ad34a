// src/core/ingestion/tokenizer.rs

//! Splits a line of delimited text into fields.

use log::warn;
use regex::Regex;

use crate::core::common::KnnError;

/// Separator used when none is configured: a comma, semicolon or whitespace run,
/// with surrounding whitespace absorbed.
pub const DEFAULT_SEPARATOR: &str = r"\s*[,;\s]\s*";
/// Quote character used when none is configured.
pub const DEFAULT_QUOTE: char = '"';

/// Cursor over the fields of one input line.
///
/// Fields are separated by matches of a regular expression. A field that starts
/// with the quote character may contain separators; it ends at the first separator
/// directly preceded by a quote, and the enclosing quotes are stripped.
///
/// ```
/// use subspace_knn::core::ingestion::Tokenizer;
///
/// let mut tokenizer = Tokenizer::new(r"\s*,\s*", '"').unwrap();
/// tokenizer.initialize("1.5, \"a, b\", 7");
/// let mut fields = Vec::new();
/// while tokenizer.valid() {
///     fields.push(tokenizer.substring().to_string());
///     tokenizer.advance();
/// }
/// assert_eq!(fields, vec!["1.5", "a, b", "7"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separator: Regex,
    quote: char,
    input: String,
    /// Current field is `input[start..end]`.
    start: usize,
    end: usize,
    /// Where the next field begins.
    index: usize,
    /// Where the next separator search begins.
    scan_pos: usize,
}

impl Tokenizer {
    /// # Errors
    ///
    /// `InvalidInput` when `separator` is not a valid regular expression or matches
    /// the empty string.
    pub fn new(separator: &str, quote: char) -> Result<Self, KnnError> {
        let separator = Regex::new(separator)
            .map_err(|e| KnnError::invalid_input(format!("invalid separator pattern: {}", e)))?;
        if separator.is_match("") {
            return Err(KnnError::invalid_input(format!(
                "separator pattern '{}' matches the empty string",
                separator.as_str()
            )));
        }
        Ok(Self { separator, quote, input: String::new(), start: 0, end: 0, index: 0, scan_pos: 0 })
    }

    /// Tokenizer with [`DEFAULT_SEPARATOR`] and [`DEFAULT_QUOTE`].
    pub fn with_defaults() -> Result<Self, KnnError> {
        Self::new(DEFAULT_SEPARATOR, DEFAULT_QUOTE)
    }

    pub const fn quote(&self) -> char {
        self.quote
    }

    /// Starts tokenizing `input` and positions the cursor on its first field.
    pub fn initialize(&mut self, input: &str) {
        self.input.clear();
        self.input.push_str(input);
        self.start = 0;
        self.end = input.len();
        self.index = 0;
        self.scan_pos = 0;
        self.advance();
    }

    /// Whether the cursor is on a field.
    pub fn valid(&self) -> bool {
        self.start < self.input.len()
    }

    /// Moves to the next field.
    pub fn advance(&mut self) {
        let quote_len = self.quote.len_utf8();
        let in_quote = self.is_quote_at(self.index);

        while let Some(m) = self.separator.find_at(&self.input, self.scan_pos) {
            self.scan_pos = m.end();
            if in_quote {
                // only a quote right before the separator closes the field
                if m.start() >= self.index + 2 * quote_len
                    && self.input[..m.start()].ends_with(self.quote)
                {
                    self.start = self.index + quote_len;
                    self.end = m.start() - quote_len;
                    self.index = m.end();
                    return;
                }
                continue;
            }
            self.start = self.index;
            self.end = m.start();
            self.index = m.end();
            return;
        }

        // tail after the last separator
        let len = self.input.len();
        self.start = self.index.min(len);
        self.end = len;
        self.index = len + 1;
        if in_quote && self.start < len {
            if self.end - self.start >= 2 * quote_len && self.input.ends_with(self.quote) {
                self.start += quote_len;
                self.end -= quote_len;
            } else {
                warn!("Invalid quoted line in input: no closing quote found in: {}", self.input);
            }
        }
    }

    /// The current field.
    pub fn substring(&self) -> &str {
        &self.input[self.start..self.end.max(self.start)]
    }

    /// Parses the current field as a floating point number.
    ///
    /// # Errors
    ///
    /// `NumberFormat` when the field is not a number.
    pub fn get_f64(&self) -> Result<f64, KnnError> {
        let field = self.substring();
        field
            .parse::<f64>()
            .map_err(|_| KnnError::NumberFormat(format!("'{}' is not a floating point number", field)))
    }

    /// Parses the current field as a decimal integer.
    ///
    /// # Errors
    ///
    /// `NumberFormat` when the field is not a base 10 integer in `i64` range.
    pub fn get_i64_base10(&self) -> Result<i64, KnnError> {
        let field = self.substring();
        field
            .parse::<i64>()
            .map_err(|_| KnnError::NumberFormat(format!("'{}' is not a base 10 integer", field)))
    }

    fn is_quote_at(&self, index: usize) -> bool {
        self.input.get(index..).map_or(false, |rest| rest.starts_with(self.quote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(tokenizer: &mut Tokenizer, input: &str) -> Vec<String> {
        tokenizer.initialize(input);
        let mut out = Vec::new();
        while tokenizer.valid() {
            out.push(tokenizer.substring().to_string());
            tokenizer.advance();
        }
        out
    }

    #[test]
    fn test_default_separators() {
        let mut t = Tokenizer::with_defaults().unwrap();
        assert_eq!(fields(&mut t, "1, 2;3 4\t5"), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(fields(&mut t, "-4 -5"), vec!["-4", "-5"]);
        assert!(fields(&mut t, "").is_empty());
    }

    #[test]
    fn test_trailing_separator_drops_empty_tail() {
        let mut t = Tokenizer::with_defaults().unwrap();
        assert_eq!(fields(&mut t, "1,2,"), vec!["1", "2"]);
    }

    #[test]
    fn test_quoted_fields() {
        let mut t = Tokenizer::with_defaults().unwrap();
        assert_eq!(fields(&mut t, "\"a b\" c"), vec!["a b", "c"]);
        assert_eq!(fields(&mut t, "x \"last, field\""), vec!["x", "last, field"]);
        // a quote inside a field does not start a quoted field
        assert_eq!(fields(&mut t, "ab\"c d"), vec!["ab\"c", "d"]);
    }

    #[test]
    fn test_unterminated_quote_yields_raw_tail() {
        let mut t = Tokenizer::with_defaults().unwrap();
        assert_eq!(fields(&mut t, "1 \"open field"), vec!["1", "\"open field"]);
        assert_eq!(fields(&mut t, "1 \""), vec!["1", "\""]);
    }

    #[test]
    fn test_custom_quote_and_separator() {
        let mut t = Tokenizer::new(r"\|", '\'').unwrap();
        assert_eq!(fields(&mut t, "'a|b'|c|'d'"), vec!["a|b", "c", "d"]);
        assert_eq!(t.quote(), '\'');
    }

    #[test]
    fn test_numeric_accessors() {
        let mut t = Tokenizer::with_defaults().unwrap();
        t.initialize("2.5 -17 x");
        assert_eq!(t.get_f64().unwrap(), 2.5);
        assert!(matches!(t.get_i64_base10(), Err(KnnError::NumberFormat(_))));
        t.advance();
        assert_eq!(t.get_i64_base10().unwrap(), -17);
        assert_eq!(t.get_f64().unwrap(), -17.0);
        t.advance();
        assert!(matches!(t.get_f64(), Err(KnnError::NumberFormat(_))));
        t.advance();
        assert!(!t.valid());
    }

    #[test]
    fn test_rejects_bad_separators() {
        assert!(matches!(Tokenizer::new(r"\s*", '"'), Err(KnnError::InvalidInput { .. })));
        assert!(matches!(Tokenizer::new(r"[", '"'), Err(KnnError::InvalidInput { .. })));
    }
}

//! Dialect configuration shared by the reader, writer and parser

use crate::error::{CsvError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Line terminator written after each row
///
/// Only affects writing. The parser always accepts `\n`, `\r\n` and `\r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineEnding {
    /// Unix `\n`
    #[default]
    Lf,
    /// Windows `\r\n`
    CrLf,
    /// Legacy Mac `\r`
    Cr,
}

impl LineEnding {
    /// Bytes of the terminator
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
            LineEnding::Cr => b"\r",
        }
    }
}

/// Delimiter, quote character and line ending
///
/// # Examples
///
/// ```
/// use csvrows::dialect::{Dialect, LineEnding};
///
/// let dialect = Dialect::new()
///     .with_delimiter(b';')
///     .with_line_ending(LineEnding::CrLf);
///
/// assert!(dialect.validate().is_ok());
/// assert_eq!(dialect.delimiter, b';');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Dialect {
    /// Cell separator (default: `,`)
    pub delimiter: u8,
    /// Quote character (default: `"`)
    pub quote_char: u8,
    /// Terminator used when writing (default: `\n`)
    pub line_ending: LineEnding,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: b',',
            quote_char: b'"',
            line_ending: LineEnding::Lf,
        }
    }
}

impl Dialect {
    /// Comma-separated, double-quoted, `\n` terminated
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cell separator
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character
    pub fn with_quote_char(mut self, quote_char: u8) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Set the terminator used when writing
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Check that delimiter and quote are distinct ASCII bytes and neither
    /// is a row terminator
    pub fn validate(&self) -> Result<()> {
        for (name, byte) in [("delimiter", self.delimiter), ("quote", self.quote_char)] {
            if !byte.is_ascii() {
                return Err(CsvError::InvalidDialect(format!(
                    "{} must be an ASCII byte, got 0x{:02X}",
                    name, byte
                )));
            }
            if byte == b'\n' || byte == b'\r' {
                return Err(CsvError::InvalidDialect(format!(
                    "{} cannot be a line terminator",
                    name
                )));
            }
        }
        if self.delimiter == self.quote_char {
            return Err(CsvError::InvalidDialect(format!(
                "delimiter and quote are both '{}'",
                self.delimiter as char
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dialect() {
        let dialect = Dialect::default();
        assert_eq!(dialect.delimiter, b',');
        assert_eq!(dialect.quote_char, b'"');
        assert_eq!(dialect.line_ending.as_bytes(), b"\n");
        assert!(dialect.validate().is_ok());
    }

    #[test]
    fn test_same_delimiter_and_quote() {
        let dialect = Dialect::new().with_delimiter(b'"');
        assert!(matches!(
            dialect.validate(),
            Err(CsvError::InvalidDialect(_))
        ));
    }

    #[test]
    fn test_terminator_as_delimiter() {
        assert!(Dialect::new().with_delimiter(b'\n').validate().is_err());
        assert!(Dialect::new().with_quote_char(b'\r').validate().is_err());
    }

    #[test]
    fn test_non_ascii_rejected() {
        let err = Dialect::new().with_delimiter(0xE9).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid dialect: delimiter must be an ASCII byte, got 0xE9"
        );
    }

    #[test]
    fn test_tab_and_semicolon() {
        assert!(Dialect::new().with_delimiter(b'\t').validate().is_ok());
        assert!(Dialect::new()
            .with_delimiter(b';')
            .with_quote_char(b'\'')
            .validate()
            .is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_defaults() {
        let dialect: Dialect =
            serde_json::from_str(r#"{"delimiter": 59, "line_ending": "crlf"}"#).unwrap();
        assert_eq!(dialect.delimiter, b';');
        assert_eq!(dialect.quote_char, b'"');
        assert_eq!(dialect.line_ending, LineEnding::CrLf);
    }
}

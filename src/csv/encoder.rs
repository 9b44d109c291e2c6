//! CSV encoding with RFC 4180-like behavior
//!
//! Output of [`CsvEncoder::encode_rows`] parses back to the same rows with a
//! [`CsvParser`](super::CsvParser) using the same delimiter and quote.

use super::parser::assert_ascii;
use crate::dialect::Dialect;

/// CSV encoder for writing properly formatted CSV data
#[derive(Debug, Clone, Copy)]
pub struct CsvEncoder {
    delimiter: u8,
    quote_char: u8,
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self::new(b',', b'"')
    }
}

impl CsvEncoder {
    /// Create a new CSV encoder with custom delimiter and quote character
    ///
    /// # Panics
    ///
    /// Panics if either byte is not ASCII, since the output would not be
    /// valid UTF-8.
    pub fn new(delimiter: u8, quote_char: u8) -> Self {
        assert_ascii(delimiter, quote_char);
        Self {
            delimiter,
            quote_char,
        }
    }

    /// Create an encoder using the dialect's delimiter and quote character
    pub fn from_dialect(dialect: &Dialect) -> Self {
        Self::new(dialect.delimiter, dialect.quote_char)
    }

    /// Encode entire row into buffer (no line ending)
    pub fn encode_row<S: AsRef<str>>(&self, fields: &[S], buffer: &mut Vec<u8>) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                buffer.push(self.delimiter);
            }
            self.encode_field(field.as_ref(), buffer);
        }
    }

    /// Encode rows, terminating every row (the last one too) with `line_ending`
    ///
    /// A row with no cells encodes to a bare line ending and reads back as
    /// a single empty cell.
    pub fn encode_rows<R, S>(&self, rows: &[R], line_ending: &[u8], buffer: &mut Vec<u8>)
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        for row in rows {
            self.encode_row(row.as_ref(), buffer);
            buffer.extend_from_slice(line_ending);
        }
    }

    /// Encode single field with proper quoting/escaping
    fn encode_field(&self, field: &str, buffer: &mut Vec<u8>) {
        if self.needs_quoting(field) {
            // Quote the field
            buffer.push(self.quote_char);
            for byte in field.bytes() {
                if byte == self.quote_char {
                    // Escape quotes by doubling: " -> ""
                    buffer.push(self.quote_char);
                    buffer.push(self.quote_char);
                } else {
                    buffer.push(byte);
                }
            }
            buffer.push(self.quote_char);
        } else {
            buffer.extend_from_slice(field.as_bytes());
        }
    }

    /// Check if field requires quoting
    fn needs_quoting(&self, field: &str) -> bool {
        field
            .bytes()
            .any(|b| b == self.delimiter || b == self.quote_char || b == b'\n' || b == b'\r')
    }
}

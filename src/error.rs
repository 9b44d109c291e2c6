//! Error types for CSV reading and writing
//!
//! Parsing text into rows never fails. These errors only come from the
//! byte-level transport around the parser: I/O, UTF-8 decoding and dialect
//! configuration.

use thiserror::Error;

/// Errors produced by [`CsvReader`](crate::csv_reader::CsvReader) and
/// [`CsvWriter`](crate::csv_writer::CsvWriter)
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failure while reading input
    #[error("Read error: {0}")]
    ReadError(String),

    /// Failure while writing output
    #[error("Write error: {0}")]
    WriteError(String),

    /// Input bytes are not valid UTF-8
    #[error("Invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte from the start of the input
        offset: u64,
    },

    /// Delimiter/quote configuration that cannot be parsed unambiguously
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CsvError>;

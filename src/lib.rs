//! # csvrows
//!
//! Turns CSV text into rows of cells.
//!
//! The core is a small character-level tokenizer that understands quoted
//! fields, embedded delimiters, doubled quotes and any mix of `\n`, `\r\n`
//! and `\r` line endings. It never fails: malformed quoting is absorbed into
//! cell content rather than rejected. Cells are returned as plain strings
//! with no type conversion, and rows may have different lengths.
//!
//! ## Quick Start
//!
//! ```
//! let rows = csvrows::parse("name,city\r\n\"Doe, Jane\",Paris\n");
//! assert_eq!(rows, vec![
//!     vec!["name", "city"],
//!     vec!["Doe, Jane", "Paris"],
//! ]);
//! ```
//!
//! ## Streaming
//!
//! [`CsvReader`] decodes bytes from any `io::Read` and yields rows as they
//! complete; [`CsvWriter`] writes rows that parse back unchanged.
//!
//! ```
//! use csvrows::{CsvReader, CsvWriter};
//!
//! let mut writer = CsvWriter::new(Vec::new());
//! writer.write_row(["id", "comment"]).unwrap();
//! writer.write_row(["1", "line one\nline \"two\""]).unwrap();
//! let bytes = writer.save().unwrap();
//!
//! let mut reader = CsvReader::new(bytes.as_slice()).has_header(true);
//! let rows = reader.read_all().unwrap();
//! assert_eq!(rows, vec![vec!["1", "line one\nline \"two\""]]);
//! ```

pub mod csv;
pub mod csv_reader;
pub mod csv_writer;
pub mod dialect;
pub mod error;

pub use csv::{CsvEncoder, CsvParser, Row, Tokenizer};
pub use csv_reader::CsvReader;
pub use csv_writer::CsvWriter;
pub use dialect::{Dialect, LineEnding};
pub use error::{CsvError, Result};

/// Parse comma-separated, double-quoted text into rows
///
/// An empty input gives no rows. A final line without a terminator still
/// becomes a row; a trailing terminator does not add an empty one.
///
/// ```
/// assert!(csvrows::parse("").is_empty());
/// assert_eq!(csvrows::parse("a,\n"), vec![vec!["a", ""]]);
/// assert_eq!(csvrows::parse("\"a\"\"b\",c"), vec![vec!["a\"b", "c"]]);
/// ```
pub fn parse(content: &str) -> Vec<Row> {
    CsvParser::default().parse(content)
}

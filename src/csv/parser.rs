//! CSV parsing with RFC 4180-like behavior
//!
//! The scanner is a small state machine driven one character at a time:
//!
//! - `Unquoted`: delimiter ends the cell, `\r`, `\n` or `\r\n` ends the row,
//!   a quote opens a quoted section, anything else is cell content.
//! - `Quoted`: everything is cell content except the quote. `""` is a literal
//!   quote; a single quote closes the section.
//!
//! Two extra states hold one character of lookahead (`\r` waiting for `\n`,
//! quote waiting for a second quote) so that [`Tokenizer::feed`] gives the
//! same rows no matter where the input is split.
//!
//! Parsing is total: malformed quoting is absorbed into cell content and an
//! unterminated quote swallows the rest of the input.

use crate::dialect::Dialect;
use std::mem;

/// One parsed row
pub type Row = Vec<String>;

/// Delimiter and quote are matched as `char`s on the decoding side and
/// written as raw bytes on the encoding side; both only agree for ASCII.
pub(crate) fn assert_ascii(delimiter: u8, quote_char: u8) {
    assert!(
        delimiter.is_ascii() && quote_char.is_ascii(),
        "delimiter (0x{:02X}) and quote (0x{:02X}) must be ASCII",
        delimiter,
        quote_char
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    Quoted,
    /// Quote seen inside quotes
    QuoteInQuoted,
    /// `\r` just ended a row
    AfterCr,
}

/// Incremental tokenizer
///
/// Feed text in chunks of any size and collect the rows each chunk completes.
/// Call [`finish`](Self::finish) once the input is exhausted to get the last,
/// unterminated row.
///
/// # Examples
///
/// ```
/// use csvrows::csv::Tokenizer;
///
/// let mut tokenizer = Tokenizer::default();
/// let mut rows = tokenizer.feed("name,note\r");
/// rows.extend(tokenizer.feed("\nalice,\"says \"\"hi"));
/// rows.extend(tokenizer.feed("\"\"\""));
/// rows.extend(tokenizer.finish());
///
/// assert_eq!(rows, vec![
///     vec!["name", "note"],
///     vec!["alice", "says \"hi\""],
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiter: char,
    quote_char: char,
    state: State,
    cell: String,
    row: Row,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(b',', b'"')
    }
}

impl Tokenizer {
    /// Create a tokenizer with custom delimiter and quote character
    ///
    /// # Panics
    ///
    /// Panics if either byte is not ASCII.
    pub fn new(delimiter: u8, quote_char: u8) -> Self {
        assert_ascii(delimiter, quote_char);
        Self {
            delimiter: delimiter as char,
            quote_char: quote_char as char,
            state: State::Unquoted,
            cell: String::new(),
            row: Vec::new(),
        }
    }

    /// Create a tokenizer using the dialect's delimiter and quote character
    pub fn from_dialect(dialect: &Dialect) -> Self {
        Self::new(dialect.delimiter, dialect.quote_char)
    }

    /// Consume a chunk of text and return the rows it completes
    pub fn feed(&mut self, chunk: &str) -> Vec<Row> {
        let mut rows = Vec::new();
        for ch in chunk.chars() {
            self.step(ch, &mut rows);
        }
        rows
    }

    /// End of input: flush the pending row and reset
    ///
    /// The pending row is returned when the pending cell has content or the
    /// row already holds a cell (a trailing delimiter). An input ending in a
    /// terminator therefore yields no extra empty row, while `"a,"` yields
    /// `["a", ""]`.
    pub fn finish(&mut self) -> Option<Row> {
        self.state = State::Unquoted;
        if self.cell.is_empty() && self.row.is_empty() {
            return None;
        }
        self.end_cell();
        Some(mem::take(&mut self.row))
    }

    /// Whether the scanner is inside an open quoted section
    pub fn in_quotes(&self) -> bool {
        matches!(self.state, State::Quoted | State::QuoteInQuoted)
    }

    fn step(&mut self, ch: char, rows: &mut Vec<Row>) {
        match self.state {
            State::Unquoted => self.step_unquoted(ch, rows),
            State::Quoted => {
                if ch == self.quote_char {
                    self.state = State::QuoteInQuoted;
                } else {
                    self.cell.push(ch);
                }
            }
            State::QuoteInQuoted => {
                if ch == self.quote_char {
                    // Escaped quote ("")
                    self.cell.push(ch);
                    self.state = State::Quoted;
                } else {
                    self.state = State::Unquoted;
                    self.step_unquoted(ch, rows);
                }
            }
            State::AfterCr => {
                self.state = State::Unquoted;
                if ch != '\n' {
                    self.step_unquoted(ch, rows);
                }
            }
        }
    }

    fn step_unquoted(&mut self, ch: char, rows: &mut Vec<Row>) {
        if ch == self.quote_char {
            self.state = State::Quoted;
        } else if ch == self.delimiter {
            self.end_cell();
        } else if ch == '\r' {
            self.end_row(rows);
            self.state = State::AfterCr;
        } else if ch == '\n' {
            self.end_row(rows);
        } else {
            self.cell.push(ch);
        }
    }

    fn end_cell(&mut self) {
        self.row.push(mem::take(&mut self.cell));
    }

    fn end_row(&mut self, rows: &mut Vec<Row>) {
        self.end_cell();
        rows.push(mem::take(&mut self.row));
    }
}

/// CSV parser for reading CSV data
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    delimiter: u8,
    quote_char: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(b',', b'"')
    }
}

impl CsvParser {
    /// Create a new CSV parser with custom delimiter and quote character
    ///
    /// # Panics
    ///
    /// Panics if either byte is not ASCII.
    pub fn new(delimiter: u8, quote_char: u8) -> Self {
        assert_ascii(delimiter, quote_char);
        Self {
            delimiter,
            quote_char,
        }
    }

    /// Create a parser using the dialect's delimiter and quote character
    pub fn from_dialect(dialect: &Dialect) -> Self {
        Self::new(dialect.delimiter, dialect.quote_char)
    }

    /// Parse a whole document into rows
    pub fn parse(&self, content: &str) -> Vec<Row> {
        let mut tokenizer = self.tokenizer();
        let mut rows = tokenizer.feed(content);
        rows.extend(tokenizer.finish());
        rows
    }

    /// Fresh incremental tokenizer with this parser's settings
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.delimiter, self.quote_char)
    }
}

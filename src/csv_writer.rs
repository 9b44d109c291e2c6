//! CSV writing to files or any `io::Write`

use crate::csv::CsvEncoder;
use crate::dialect::{Dialect, LineEnding};
use crate::error::{CsvError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// CSV writer
///
/// Writes rows one at a time through a reusable buffer. Every row, the last
/// one included, is followed by the line ending, so the output parses back
/// to exactly the rows written.
///
/// # Examples
///
/// ```
/// use csvrows::csv_writer::CsvWriter;
///
/// let mut writer = CsvWriter::new(Vec::new());
/// writer.write_row(["Name", "Note"]).unwrap();
/// writer.write_row(["Alice", "likes \"quotes\", commas"]).unwrap();
/// let bytes = writer.save().unwrap();
///
/// assert_eq!(
///     String::from_utf8(bytes).unwrap(),
///     "Name,Note\nAlice,\"likes \"\"quotes\"\", commas\"\n"
/// );
/// ```
pub struct CsvWriter<W: Write> {
    writer: W,

    // State
    row_count: u64,
    buffer: Vec<u8>,
    dialect_checked: bool,

    // Configuration
    dialect: Dialect,
}

impl CsvWriter<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    ///
    /// ```no_run
    /// use csvrows::csv_writer::CsvWriter;
    ///
    /// let mut writer = CsvWriter::create("output.csv").unwrap();
    /// writer.write_row(["Name", "Age", "City"]).unwrap();
    /// writer.write_row(["Alice", "30", "NYC"]).unwrap();
    /// writer.save().unwrap();
    /// ```
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::create(path_ref)
            .map_err(|e| CsvError::WriteError(format!("Failed to create CSV file: {}", e)))?;
        debug!(path = %path_ref.display(), "created CSV file");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap any writer
    pub fn new(writer: W) -> Self {
        CsvWriter {
            writer,
            row_count: 0,
            buffer: Vec::with_capacity(4096),
            dialect_checked: false,
            dialect: Dialect::default(),
        }
    }

    /// Set custom delimiter (builder pattern)
    ///
    /// # Examples
    ///
    /// ```
    /// use csvrows::csv_writer::CsvWriter;
    ///
    /// let mut writer = CsvWriter::new(Vec::new()).delimiter(b';');
    /// writer.write_row(["a;b", "c"]).unwrap();
    /// assert_eq!(writer.save().unwrap(), b"\"a;b\";c\n");
    /// ```
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.dialect.delimiter = delim;
        self.dialect_checked = false;
        self
    }

    /// Set custom quote character (builder pattern)
    pub fn quote_char(mut self, quote: u8) -> Self {
        self.dialect.quote_char = quote;
        self.dialect_checked = false;
        self
    }

    /// Set the row terminator (builder pattern)
    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.dialect.line_ending = line_ending;
        self
    }

    /// Replace the whole dialect (builder pattern)
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.dialect_checked = false;
        self
    }

    /// Write a row of strings
    pub fn write_row<I, S>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.dialect_checked {
            self.dialect.validate()?;
            self.dialect_checked = true;
        }

        // Reuse buffer
        self.buffer.clear();

        let encoder = CsvEncoder::from_dialect(&self.dialect);
        let fields: Vec<S> = data.into_iter().collect();
        encoder.encode_row(&fields, &mut self.buffer);
        self.buffer
            .extend_from_slice(self.dialect.line_ending.as_bytes());

        self.writer
            .write_all(&self.buffer)
            .map_err(|e| CsvError::WriteError(format!("Failed to write row: {}", e)))?;

        self.row_count += 1;
        Ok(())
    }

    /// Write multiple rows at once
    ///
    /// # Examples
    ///
    /// ```
    /// use csvrows::csv_writer::CsvWriter;
    ///
    /// let mut writer = CsvWriter::new(Vec::new());
    /// let rows = vec![
    ///     vec!["Alice", "30"],
    ///     vec!["Bob", "25"],
    /// ];
    /// writer.write_rows(rows).unwrap();
    /// assert_eq!(writer.row_count(), 2);
    /// ```
    pub fn write_rows<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row_data in rows {
            self.write_row(row_data)?;
        }
        Ok(())
    }

    /// Get the number of rows written
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Flush buffered output without closing
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| CsvError::WriteError(format!("Failed to flush output: {}", e)))
    }

    /// Flush and hand back the underlying writer
    pub fn save(mut self) -> Result<W> {
        self.flush()?;
        debug!(rows = self.row_count, "CSV output saved");
        Ok(self.writer)
    }
}

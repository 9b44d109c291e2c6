//! CSV reading from files or any `io::Read`

use crate::csv::{Row, Tokenizer};
use crate::dialect::Dialect;
use crate::error::{CsvError, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::{debug, trace};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// CSV reader with streaming capabilities
///
/// Reads the source in fixed-size chunks, decodes them as UTF-8 and feeds the
/// text to a [`Tokenizer`]. Rows come out in order as soon as their
/// terminator has been read. Memory use is bounded by the chunk size plus the
/// largest row. The rows are exactly those
/// [`CsvParser::parse`](crate::csv::CsvParser::parse) returns for the whole
/// decoded text.
///
/// # Examples
///
/// ```
/// use csvrows::csv_reader::CsvReader;
///
/// let data = "id,name\r\n1,\"Smith, J\"\n2,Lee";
/// let mut reader = CsvReader::new(data.as_bytes());
///
/// let rows = reader.read_all().unwrap();
/// assert_eq!(rows, vec![
///     vec!["id", "name"],
///     vec!["1", "Smith, J"],
///     vec!["2", "Lee"],
/// ]);
/// ```
///
/// # With Headers
///
/// ```no_run
/// use csvrows::csv_reader::CsvReader;
///
/// let mut reader = CsvReader::open("data.csv")
///     .unwrap()
///     .has_header(true);
///
/// for row_result in reader.rows() {
///     let row = row_result.unwrap();
///     // Process data rows (header already consumed)
/// }
///
/// if let Some(headers) = reader.headers() {
///     println!("Headers: {:?}", headers);
/// }
/// ```
pub struct CsvReader<R: Read> {
    reader: R,

    // Decoder state
    tokenizer: Tokenizer,
    pending: VecDeque<Row>,
    undecoded: Vec<u8>,
    bytes_read: u64,
    bytes_decoded: u64,
    bom_checked: bool,
    eof: bool,
    failed: Option<CsvError>,
    row_count: u64,

    // Configuration
    dialect: Dialect,
    dialect_checked: bool,
    chunk_size: usize,
    has_header: bool,
    headers: Vec<String>,
}

impl CsvReader<BufReader<File>> {
    /// Open a CSV file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)
            .map_err(|e| CsvError::ReadError(format!("Failed to open CSV file: {}", e)))?;
        debug!(path = %path_ref.display(), "opened CSV file");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> CsvReader<R> {
    /// Wrap any reader
    pub fn new(reader: R) -> Self {
        let dialect = Dialect::default();
        CsvReader {
            reader,
            tokenizer: Tokenizer::from_dialect(&dialect),
            pending: VecDeque::new(),
            undecoded: Vec::new(),
            bytes_read: 0,
            bytes_decoded: 0,
            bom_checked: false,
            eof: false,
            failed: None,
            row_count: 0,
            dialect,
            dialect_checked: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            has_header: false,
            headers: Vec::new(),
        }
    }

    /// Set custom delimiter (builder pattern)
    ///
    /// # Examples
    ///
    /// ```
    /// use csvrows::csv_reader::CsvReader;
    ///
    /// let mut reader = CsvReader::new("a;b,c".as_bytes()).delimiter(b';');
    /// assert_eq!(reader.read_row().unwrap(), Some(vec!["a".to_string(), "b,c".to_string()]));
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

    /// Replace the whole dialect (builder pattern)
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self.dialect_checked = false;
        self
    }

    /// Bytes requested from the source per read (builder pattern, minimum 1)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Indicate that the first row contains headers (builder pattern)
    ///
    /// When set to `true`, the first row will be stored and accessible via `headers()`.
    /// The iterator will skip the header row.
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    /// Get header row if available
    ///
    /// Returns `Some(&[String])` once the header row has been read, `None` otherwise.
    pub fn headers(&self) -> Option<&[String]> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }

    /// Read a single row, header included
    ///
    /// Returns `Ok(None)` when EOF is reached. Invalid UTF-8 is reported only
    /// after every row completed before the bad byte has been returned.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                if self.has_header && self.row_count == 0 {
                    self.headers = row.clone();
                }
                self.row_count += 1;
                return Ok(Some(row));
            }
            if let Some(err) = self.failed.take() {
                self.eof = true;
                return Err(err);
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    /// Get iterator over rows
    ///
    /// # Examples
    ///
    /// ```
    /// use csvrows::csv_reader::CsvReader;
    ///
    /// let mut reader = CsvReader::new("h\n1\n2\n".as_bytes()).has_header(true);
    ///
    /// let values: Vec<String> = reader
    ///     .rows()
    ///     .map(|row| row.unwrap().remove(0))
    ///     .collect();
    /// assert_eq!(values, vec!["1", "2"]);
    /// ```
    pub fn rows(&mut self) -> CsvRowIterator<'_, R> {
        CsvRowIterator { reader: self }
    }

    /// Read every remaining row (skipping the header when `has_header` is set)
    pub fn read_all(&mut self) -> Result<Vec<Row>> {
        self.rows().collect()
    }

    /// Get the number of rows read so far, header included
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Pull one chunk from the source and tokenize whatever decodes cleanly
    fn fill(&mut self) -> Result<()> {
        if !self.dialect_checked {
            self.dialect.validate()?;
            self.tokenizer = Tokenizer::from_dialect(&self.dialect);
            self.dialect_checked = true;
        }

        let start = self.undecoded.len();
        self.undecoded.resize(start + self.chunk_size, 0);
        let n = loop {
            match self.reader.read(&mut self.undecoded[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.undecoded.truncate(start);
                    return Err(CsvError::ReadError(format!(
                        "Failed to read CSV data: {}",
                        e
                    )));
                }
            }
        };
        self.undecoded.truncate(start + n);
        self.bytes_read += n as u64;
        trace!(bytes = n, total = self.bytes_read, "read chunk");

        if n == 0 {
            self.eof = true;
            if !self.undecoded.is_empty() {
                return Err(CsvError::InvalidUtf8 {
                    offset: self.bytes_decoded,
                });
            }
            self.pending.extend(self.tokenizer.finish());
            debug!(
                rows = self.row_count + self.pending.len() as u64,
                bytes = self.bytes_read,
                "reached end of CSV input"
            );
            return Ok(());
        }

        if !self.bom_checked {
            if self.undecoded.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(&self.undecoded) {
                // Not enough bytes yet to tell
                return Ok(());
            }
            if self.undecoded.starts_with(UTF8_BOM) {
                self.undecoded.drain(..UTF8_BOM.len());
                self.bytes_decoded += UTF8_BOM.len() as u64;
            }
            self.bom_checked = true;
        }

        let (valid, bad_byte) = match std::str::from_utf8(&self.undecoded) {
            Ok(text) => {
                self.pending.extend(self.tokenizer.feed(text));
                (text.len(), false)
            }
            Err(e) => {
                // Tokenize up to the invalid or cut-off sequence
                let valid = e.valid_up_to();
                let text = std::str::from_utf8(&self.undecoded[..valid])
                    .map_err(|e| CsvError::ReadError(e.to_string()))?;
                self.pending.extend(self.tokenizer.feed(text));
                (valid, e.error_len().is_some())
            }
        };
        self.undecoded.drain(..valid);
        self.bytes_decoded += valid as u64;
        if bad_byte {
            debug!(offset = self.bytes_decoded, "invalid UTF-8 in CSV input");
            self.failed = Some(CsvError::InvalidUtf8 {
                offset: self.bytes_decoded,
            });
        }
        Ok(())
    }
}

/// Iterator over CSV rows
pub struct CsvRowIterator<'a, R: Read> {
    reader: &'a mut CsvReader<R>,
}

impl<'a, R: Read> Iterator for CsvRowIterator<'a, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.reader.read_row().transpose()?;
        // Skip header if has_header is true and this is the first row
        if row.is_ok() && self.reader.has_header && self.reader.row_count == 1 {
            return self.reader.read_row().transpose();
        }
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::CsvParser;
    use crate::csv_writer::CsvWriter;
    use std::io;
    use tempfile::NamedTempFile;

    /// Hands out at most `step` bytes per read
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_read_plain_csv() -> Result<()> {
        let temp = NamedTempFile::new().unwrap();
        {
            let mut writer = CsvWriter::create(temp.path())?;
            writer.write_row(["Name", "Age", "City"])?;
            writer.write_row(["Alice", "30", "NYC"])?;
            writer.write_row(["Bob", "25", "SF"])?;
            writer.save()?;
        }

        let mut reader = CsvReader::open(temp.path())?;
        let mut rows = vec![];
        for row_result in reader.rows() {
            rows.push(row_result?);
        }

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Name", "Age", "City"]);
        assert_eq!(rows[1], vec!["Alice", "30", "NYC"]);
        assert_eq!(reader.row_count(), 3);
        Ok(())
    }

    #[test]
    fn test_read_with_headers() -> Result<()> {
        let mut reader = CsvReader::new("ID,Name\n1,Alice\n2,Bob\n".as_bytes()).has_header(true);
        assert_eq!(reader.headers(), None); // Not read yet

        let rows = reader.read_all()?;

        // Headers should be set after first read
        assert_eq!(
            reader.headers(),
            Some(&["ID".to_string(), "Name".to_string()][..])
        );
        // Iterator should skip header
        assert_eq!(rows, vec![vec!["1", "Alice"], vec!["2", "Bob"]]);
        assert_eq!(reader.row_count(), 3);
        Ok(())
    }

    #[test]
    fn test_header_only() -> Result<()> {
        let mut reader = CsvReader::new("a,b".as_bytes()).has_header(true);
        assert!(reader.read_all()?.is_empty());
        assert_eq!(reader.headers().map(|h| h.len()), Some(2));
        Ok(())
    }

    #[test]
    fn test_empty_source() -> Result<()> {
        let mut reader = CsvReader::new(io::empty());
        assert_eq!(reader.read_row()?, None);
        assert_eq!(reader.read_row()?, None);
        Ok(())
    }

    #[test]
    fn test_matches_parser_for_every_chunk_size() -> Result<()> {
        let data = "ünï,\"cöde, 🚀\"\r\n\"x\"\"y\",\r\r\"open\nstill 😀 open";
        let expected = CsvParser::default().parse(data);
        for step in 1..=12 {
            let source = Trickle {
                data: data.as_bytes(),
                step,
            };
            let mut reader = CsvReader::new(source).chunk_size(step);
            assert_eq!(reader.read_all()?, expected, "chunk size {}", step);
        }
        Ok(())
    }

    #[test]
    fn test_bom_is_stripped() -> Result<()> {
        let data = b"\xEF\xBB\xBFa,b\n";
        for step in 1..=4 {
            let mut reader = CsvReader::new(Trickle { data, step }).chunk_size(step);
            assert_eq!(reader.read_all()?, vec![vec!["a", "b"]]);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let mut reader = CsvReader::new(&b"ok,\xFFbad"[..]);
        match reader.read_row() {
            Err(CsvError::InvalidUtf8 { offset }) => assert_eq!(offset, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rows_before_invalid_utf8_are_kept() {
        let data = b"a\nb\n\xFFc\n";
        let mut chunk_sizes: Vec<usize> = (1..=data.len()).collect();
        chunk_sizes.push(DEFAULT_CHUNK_SIZE);
        for step in chunk_sizes {
            let mut reader = CsvReader::new(Trickle { data, step }).chunk_size(step);
            let a = reader.read_row().unwrap();
            let b = reader.read_row().unwrap();
            assert_eq!(a, Some(vec!["a".to_string()]), "chunk size {}", step);
            assert_eq!(b, Some(vec!["b".to_string()]), "chunk size {}", step);
            match reader.read_row() {
                Err(CsvError::InvalidUtf8 { offset }) => {
                    assert_eq!(offset, 4, "chunk size {}", step)
                }
                other => panic!("chunk size {}: unexpected result: {:?}", step, other),
            }
            assert_eq!(reader.read_row().unwrap(), None);
        }
    }

    #[test]
    fn test_read_all_stops_at_invalid_utf8() {
        let mut reader = CsvReader::new(&b"x,y\n\xC3\x28\n"[..]);
        assert!(matches!(
            reader.read_all(),
            Err(CsvError::InvalidUtf8 { offset: 4 })
        ));
        assert_eq!(reader.row_count(), 1);
    }

    #[test]
    fn test_non_ascii_dialect_is_an_error() {
        let mut reader = CsvReader::new("a".as_bytes()).delimiter(0xE9);
        assert!(matches!(
            reader.read_row(),
            Err(CsvError::InvalidDialect(_))
        ));
    }

    #[test]
    fn test_truncated_utf8_at_eof() {
        // First two bytes of a three-byte sequence
        let mut reader = CsvReader::new(&b"a,\xE2\x82"[..]);
        match reader.read_row() {
            Err(CsvError::InvalidUtf8 { offset }) => assert_eq!(offset, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_io_error_is_wrapped() {
        let mut reader = CsvReader::new(Failing);
        match reader.read_row() {
            Err(CsvError::ReadError(msg)) => {
                assert_eq!(msg, "Failed to read CSV data: disk on fire")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CsvReader::open(dir.path().join("nope.csv")),
            Err(CsvError::ReadError(_))
        ));
    }

    #[test]
    fn test_invalid_dialect() {
        let mut reader = CsvReader::new("a".as_bytes()).delimiter(b'\n');
        assert!(matches!(
            reader.read_row(),
            Err(CsvError::InvalidDialect(_))
        ));
    }

    #[test]
    fn test_custom_dialect() -> Result<()> {
        let dialect = Dialect::new().with_delimiter(b'\t').with_quote_char(b'\'');
        let mut reader = CsvReader::new("'a\tb'\tc\n".as_bytes()).dialect(dialect);
        assert_eq!(reader.read_all()?, vec![vec!["a\tb", "c"]]);
        Ok(())
    }
}

//! CSV utilities for encoding and parsing

mod encoder;
mod parser;

pub use encoder::CsvEncoder;
pub use parser::{CsvParser, Row, Tokenizer};

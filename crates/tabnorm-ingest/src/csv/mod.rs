//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::{read_csv_table, validate_encoding};
pub use writer::{render_csv, write_csv_table};

/// Default field delimiter for input and output files.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Tokens read as missing values unless configured otherwise.
pub const DEFAULT_NA_VALUES: [&str; 4] = ["NA", "N/A", "NULL", "null"];

/// How input files are parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Exact field contents read as null. Empty fields are always null.
    pub na_values: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            na_values: DEFAULT_NA_VALUES.iter().map(|token| token.to_string()).collect(),
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_na_values<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = tokens.into_iter().map(Into::into).collect();
        self
    }
}

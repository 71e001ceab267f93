//! CSV file reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use polars::prelude::*;
use tabnorm_model::{Column, Table};

use crate::error::{IngestError, Result};

use super::CsvOptions;

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported. A UTF-8 BOM is
/// accepted. Returns the file size.
pub fn validate_encoding(path: &Path) -> Result<u64> {
    let mut file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| IngestError::open(path, e))?
        .len();

    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        let encoding = match buffer {
            [0xFF, 0xFE] => Some("UTF-16 LE"),
            [0xFE, 0xFF] => Some("UTF-16 BE"),
            _ => None,
        };
        if let Some(encoding) = encoding {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding,
            });
        }
    }

    Ok(size)
}

/// Reads a CSV file into a [`Table`] of text and null cells.
///
/// Every column is read as a string; no type inference happens here. Empty
/// fields and the configured NA tokens become null.
pub fn read_csv_table(path: &Path, options: &CsvOptions) -> Result<Table> {
    if validate_encoding(path)? == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let null_values = NullValues::AllColumns(
        options
            .na_values
            .iter()
            .map(|token| PlSmallStr::from(token.as_str()))
            .collect(),
    );
    let csv_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|parse| {
            parse
                .with_separator(options.delimiter)
                .with_null_values(Some(null_values.clone()))
                .with_missing_is_null(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(csv_error)?
        .finish()
        .map_err(csv_error)?;

    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let name = column.name().trim_start_matches('\u{feff}').to_string();
        let values = column.str().map_err(csv_error)?;
        columns.push(Column::from_raw(name, values));
    }

    let table = Table::new(columns).map_err(|source| IngestError::InvalidTable {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "read csv"
    );
    Ok(table)
}

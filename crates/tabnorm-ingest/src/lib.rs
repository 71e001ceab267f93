//! CSV input and output for tabular normalization.
//!
//! This crate is the file-facing side of the pipeline:
//!
//! - **CSV Loading**: read a delimited file into a [`Table`](tabnorm_model::Table)
//!   of text and null cells, with UTF-16 rejection and UTF-8 BOM stripping
//! - **CSV Writing**: serialize a normalized table through a temp file and rename
//! - **Discovery**: list the CSV files of an input directory
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabnorm_ingest::{CsvOptions, list_csv_files, read_csv_table, write_csv_table};
//!
//! let options = CsvOptions::default();
//! for path in list_csv_files(Path::new("entrada"))? {
//!     let table = read_csv_table(&path, &options)?;
//!     write_csv_table(&Path::new("saida").join(path.file_name().unwrap()), &table, b';')?;
//! }
//! ```

mod csv;
mod discovery;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading and Writing ===
pub use self::csv::{
    CsvOptions, DEFAULT_DELIMITER, DEFAULT_NA_VALUES, read_csv_table, render_csv,
    validate_encoding, write_csv_table,
};

// === File Discovery ===
pub use discovery::{list_csv_files, output_path_for};

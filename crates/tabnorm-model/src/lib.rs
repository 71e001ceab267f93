//! Data model for tabular normalization.
//!
//! This crate defines the types shared by every stage of the pipeline:
//!
//! - **cell**: [`CellValue`], the raw or normalized content of one cell
//! - **table**: [`Table`] and [`Column`], a fully materialized, column-major table
//! - **treatment**: [`Treatment`] and [`TreatmentCatalog`], the static
//!   column-name → normalization mapping
//! - **record**: [`ReferenceRecord`], one row fetched from the reference store

pub mod cell;
pub mod error;
pub mod record;
pub mod table;
pub mod treatment;

pub use cell::CellValue;
pub use error::{ModelError, Result};
pub use record::ReferenceRecord;
pub use table::{Column, Table};
pub use treatment::{Treatment, TreatmentCatalog};

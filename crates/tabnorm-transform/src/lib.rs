//! Column classification and normalization engine.
//!
//! Given a fully materialized table of raw text, this crate decides how each
//! column should be treated and rewrites it into a normalized form.
//!
//! # Overview
//!
//! - **normalization**: per-treatment routines (locale numerics, text
//!   cleaning and case harmonization, integer/decimal coercion, dates)
//! - **stats**: first-pass column statistics and the thresholds that turn
//!   them into column-level decisions
//! - **classify**: treatment selection by catalog entry or fallback, plus
//!   reference-key detection
//! - **enrichment**: derived columns resolved through reference data
//! - **normalizer**: the orchestrator driving one table through all of the above
//!
//! # Example
//!
//! ```ignore
//! use tabnorm_model::TreatmentCatalog;
//! use tabnorm_reference::{ReferenceCache, SqliteStore};
//! use tabnorm_transform::{NormalizerConfig, TableNormalizer};
//!
//! let normalizer = TableNormalizer::new(NormalizerConfig::new(TreatmentCatalog::builtin()));
//! let mut cache = ReferenceCache::new(SqliteStore::new("reference.db"));
//! let normalized = normalizer.normalize(table, &mut cache)?;
//! ```

mod error;

pub mod classify;
pub mod enrichment;
pub mod normalization;
pub mod normalizer;
pub mod stats;

pub use classify::{Classifier, ColumnPlan, FallbackMode, TreatmentSource, is_reference_key};
pub use enrichment::{EnrichmentSettings, KeyMatching, ReferenceIndex, enrich_column};
pub use error::{Result, TransformError};
pub use normalization::{Adjustment, TreatedColumn, apply_treatment};
pub use normalizer::{
    ColumnReport, EnrichmentReport, NormalizationReport, NormalizedTable, NormalizerConfig,
    TableNormalizer,
};
pub use stats::{ColumnStats, StorageKind};

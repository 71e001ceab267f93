//! Reference data access for enrichment.
//!
//! This crate provides the read-only side of the reference store and the
//! cache that keeps repeated lookups from hitting it twice:
//!
//! - **store**: the [`ReferenceStore`] trait and [`MemoryStore`]
//! - **sqlite**: [`SqliteStore`], one scoped connection per query
//! - **cache**: [`ReferenceCache`], memoized by query, parameters and key field
//!
//! # Example
//!
//! ```ignore
//! use tabnorm_reference::{ReferenceCache, SqliteStore};
//!
//! let mut cache = ReferenceCache::new(SqliteStore::new("reference.db"));
//! let states = cache.keyed("SELECT id, estado FROM estados", &[], "estado")?;
//! let sp = states.get("SP");
//! ```

mod cache;
mod error;
mod sqlite;
mod store;

pub use cache::{CacheKey, KeyedRecords, ReferenceCache};
pub use error::{ReferenceError, Result};
pub use sqlite::SqliteStore;
pub use store::{MemoryStore, QueryParam, ReferenceStore};

pub use tabnorm_model::ReferenceRecord;

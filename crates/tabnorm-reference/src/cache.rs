//! Memoized reference lookups.

use std::collections::HashMap;
use std::sync::Arc;

use tabnorm_model::ReferenceRecord;
use tracing::{debug, info};

use crate::error::{ReferenceError, Result};
use crate::store::{QueryParam, ReferenceStore};

/// Identity of a cached lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub params: Vec<QueryParam>,
    pub key_field: Option<String>,
}

impl CacheKey {
    pub fn new(query: &str, params: &[QueryParam], key_field: Option<&str>) -> Self {
        Self {
            query: query.to_string(),
            params: params.to_vec(),
            key_field: key_field.map(str::to_string),
        }
    }
}

/// Reference records indexed by the trimmed text of one field.
#[derive(Debug, Clone, Default)]
pub struct KeyedRecords {
    key_field: String,
    records: HashMap<String, ReferenceRecord>,
}

impl KeyedRecords {
    /// Indexes `records` by `key_field`.
    ///
    /// Records whose key is null are dropped; on duplicate keys the last
    /// record wins. A non-empty result in which no record carries the key
    /// field at all is reported as [`ReferenceError::MissingKeyField`].
    pub fn index(query: &str, key_field: &str, records: &[ReferenceRecord]) -> Result<Self> {
        if !records.is_empty() && records.iter().all(|record| !record.contains_key(key_field)) {
            return Err(ReferenceError::MissingKeyField {
                field: key_field.to_string(),
                query: query.to_string(),
            });
        }

        let mut indexed = HashMap::with_capacity(records.len());
        let mut dropped = 0usize;
        for record in records {
            match record.get(key_field).and_then(|value| value.to_key()) {
                Some(key) => {
                    indexed.insert(key.trim().to_string(), record.clone());
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(key_field, dropped, "dropped reference records with null key");
        }

        Ok(Self {
            key_field: key_field.to_string(),
            records: indexed,
        })
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, key: &str) -> Option<&ReferenceRecord> {
        self.records.get(key)
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }
}

#[derive(Debug, Clone)]
enum CachedLookup {
    Records(Arc<Vec<ReferenceRecord>>),
    Keyed(Arc<KeyedRecords>),
}

/// Cache in front of a [`ReferenceStore`].
///
/// Entries live as long as the cache and are never invalidated. Failed
/// lookups are not cached, so the next call retries the store. One cache is
/// meant to serve a whole batch run; it takes `&mut self` and needs a lock if
/// it is ever shared across threads.
#[derive(Debug)]
pub struct ReferenceCache<S> {
    store: S,
    entries: HashMap<CacheKey, CachedLookup>,
    queries: usize,
}

impl<S: ReferenceStore> ReferenceCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: HashMap::new(),
            queries: 0,
        }
    }

    /// All records returned by `query`.
    pub fn records(
        &mut self,
        query: &str,
        params: &[QueryParam],
    ) -> Result<Arc<Vec<ReferenceRecord>>> {
        let key = CacheKey::new(query, params, None);
        if let Some(CachedLookup::Records(records)) = self.entries.get(&key) {
            debug!(query, "reference cache hit");
            return Ok(Arc::clone(records));
        }

        self.queries += 1;
        let records = Arc::new(self.store.fetch(query, params)?);
        info!(query, rows = records.len(), "fetched reference data");
        self.entries
            .insert(key, CachedLookup::Records(Arc::clone(&records)));
        Ok(records)
    }

    /// Records returned by `query`, indexed by `key_field`.
    pub fn keyed(
        &mut self,
        query: &str,
        params: &[QueryParam],
        key_field: &str,
    ) -> Result<Arc<KeyedRecords>> {
        let key = CacheKey::new(query, params, Some(key_field));
        if let Some(CachedLookup::Keyed(keyed)) = self.entries.get(&key) {
            debug!(query, key_field, "reference cache hit");
            return Ok(Arc::clone(keyed));
        }

        let records = self.records(query, params)?;
        let keyed = Arc::new(KeyedRecords::index(query, key_field, &records)?);
        self.entries.insert(key, CachedLookup::Keyed(Arc::clone(&keyed)));
        Ok(keyed)
    }

    /// Number of round trips issued to the store.
    pub fn query_count(&self) -> usize {
        self.queries
    }

    /// Number of cached entries (plain and keyed).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

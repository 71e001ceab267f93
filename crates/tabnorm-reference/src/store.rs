//! The reference-store seam.

use std::collections::HashMap;
use std::fmt;

use tabnorm_model::ReferenceRecord;

use crate::error::{ReferenceError, Result};

/// A positional query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryParam {
    Null,
    Integer(i64),
    Text(String),
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParam::Null => f.write_str("NULL"),
            QueryParam::Integer(value) => write!(f, "{value}"),
            QueryParam::Text(value) => write!(f, "'{value}'"),
        }
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        QueryParam::Text(value.to_string())
    }
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        QueryParam::Integer(value)
    }
}

/// Read-only, query-driven record fetch.
///
/// Implementations run one query per call and must not mutate the store.
pub trait ReferenceStore {
    fn fetch(&self, query: &str, params: &[QueryParam]) -> Result<Vec<ReferenceRecord>>;
}

impl<S: ReferenceStore + ?Sized> ReferenceStore for &S {
    fn fetch(&self, query: &str, params: &[QueryParam]) -> Result<Vec<ReferenceRecord>> {
        (**self).fetch(query, params)
    }
}

impl<S: ReferenceStore + ?Sized> ReferenceStore for Box<S> {
    fn fetch(&self, query: &str, params: &[QueryParam]) -> Result<Vec<ReferenceRecord>> {
        (**self).fetch(query, params)
    }
}

/// Store answering fixed queries from memory.
///
/// Parameters are ignored; a query that was never registered fails the same
/// way a bad SQL statement would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    results: HashMap<String, Vec<ReferenceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_result(mut self, query: impl Into<String>, records: Vec<ReferenceRecord>) -> Self {
        self.results.insert(query.into(), records);
        self
    }
}

impl ReferenceStore for MemoryStore {
    fn fetch(&self, query: &str, _params: &[QueryParam]) -> Result<Vec<ReferenceRecord>> {
        self.results
            .get(query)
            .cloned()
            .ok_or_else(|| ReferenceError::query(query, "unknown query"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabnorm_model::CellValue;

    #[test]
    fn test_memory_store_returns_registered_rows() {
        let record = ReferenceRecord::from([("id".to_string(), CellValue::Integer(1))]);
        let store = MemoryStore::new().with_result("states", vec![record.clone()]);

        assert_eq!(store.fetch("states", &[]).unwrap(), vec![record]);
    }

    #[test]
    fn test_memory_store_unknown_query_fails() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.fetch("nope", &[]),
            Err(ReferenceError::Query { .. })
        ));
    }

    #[test]
    fn test_query_param_display() {
        assert_eq!(QueryParam::from("SP").to_string(), "'SP'");
        assert_eq!(QueryParam::from(3).to_string(), "3");
        assert_eq!(QueryParam::Null.to_string(), "NULL");
    }
}

//! Reference enrichment.
//!
//! A reference-key column is resolved value by value against a dictionary
//! built from the reference store, producing one derived column. The source
//! column is left as it is.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tabnorm_model::{CellValue, Column};
use tabnorm_reference::{KeyedRecords, QueryParam, ReferenceCache, ReferenceStore};
use tracing::debug;

use crate::error::Result;

pub const DEFAULT_REFERENCE_QUERY: &str = "SELECT id, estado FROM estados";
pub const DEFAULT_KEY_FIELD: &str = "estado";
pub const DEFAULT_VALUE_FIELD: &str = "id";

/// How trimmed column values are compared against reference keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyMatching {
    /// Case-sensitive equality: "rj" does not match "RJ".
    #[default]
    Exact,
    /// Keys and values are upper-cased before comparison.
    CaseInsensitive,
}

impl KeyMatching {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyMatching::Exact => "exact",
            KeyMatching::CaseInsensitive => "case-insensitive",
        }
    }

    fn normalize(self, key: &str) -> String {
        match self {
            KeyMatching::Exact => key.to_string(),
            KeyMatching::CaseInsensitive => key.to_uppercase(),
        }
    }
}

impl std::str::FromStr for KeyMatching {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(KeyMatching::Exact),
            "case-insensitive" | "case_insensitive" | "insensitive" => {
                Ok(KeyMatching::CaseInsensitive)
            }
            other => Err(format!(
                "unknown key matching '{other}' (expected exact or case-insensitive)"
            )),
        }
    }
}

/// Where reference data comes from and which fields to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentSettings {
    pub query: String,
    pub params: Vec<QueryParam>,
    /// Field matched against column values.
    pub key_field: String,
    /// Field copied into the derived column.
    pub value_field: String,
    pub matching: KeyMatching,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            query: DEFAULT_REFERENCE_QUERY.to_string(),
            params: Vec::new(),
            key_field: DEFAULT_KEY_FIELD.to_string(),
            value_field: DEFAULT_VALUE_FIELD.to_string(),
            matching: KeyMatching::default(),
        }
    }
}

impl EnrichmentSettings {
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>, params: Vec<QueryParam>) -> Self {
        self.query = query.into();
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_fields(
        mut self,
        key_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        self.key_field = key_field.into();
        self.value_field = value_field.into();
        self
    }

    #[must_use]
    pub fn with_matching(mut self, matching: KeyMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Name of the column derived from `source_column`, e.g. `ID_ESTADO`.
    pub fn derived_column_name(&self, source_column: &str) -> String {
        format!("{}_{}", self.value_field, source_column).to_uppercase()
    }

    /// Fetches (or reuses) the reference dictionary and indexes it.
    pub fn resolve<S: ReferenceStore>(
        &self,
        cache: &mut ReferenceCache<S>,
    ) -> Result<ReferenceIndex> {
        let keyed = cache.keyed(&self.query, &self.params, &self.key_field)?;
        Ok(ReferenceIndex::build(&keyed, &self.value_field, self.matching))
    }
}

/// Resolved key → value dictionary for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceIndex {
    matching: KeyMatching,
    values: HashMap<String, CellValue>,
}

impl ReferenceIndex {
    /// Projects `records` onto `value_field`.
    ///
    /// Records without the value field resolve to null. Keys that collide
    /// after case folding keep the record whose original key sorts last.
    pub fn build(records: &KeyedRecords, value_field: &str, matching: KeyMatching) -> Self {
        let mut entries: Vec<(&str, CellValue)> = records
            .iter()
            .map(|(key, record)| {
                let value = record.get(value_field).cloned().unwrap_or(CellValue::Null);
                (key, value)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let values = entries
            .into_iter()
            .map(|(key, value)| (matching.normalize(key), value))
            .collect();
        Self { matching, values }
    }

    /// Looks up an already trimmed key.
    pub fn resolve(&self, key: &str) -> Option<&CellValue> {
        self.values.get(&self.matching.normalize(key))
    }

    pub fn matching(&self) -> KeyMatching {
        self.matching
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves every value of `column` and returns the derived column named
/// `name`, plus how many non-null values found no match.
///
/// Null values map to null without a lookup.
pub fn enrich_column(
    column: &Column,
    index: &ReferenceIndex,
    name: impl Into<String>,
) -> (Column, usize) {
    let mut unresolved = 0usize;
    let values = column
        .values
        .iter()
        .map(|value| {
            let Some(key) = value.to_key() else {
                return CellValue::Null;
            };
            match index.resolve(key.trim()) {
                Some(resolved) => resolved.clone(),
                None => {
                    unresolved += 1;
                    CellValue::Null
                }
            }
        })
        .collect();

    let derived = Column::new(name, values);
    debug!(
        column = %column.name,
        derived = %derived.name,
        unresolved,
        "enriched reference column"
    );
    (derived, unresolved)
}

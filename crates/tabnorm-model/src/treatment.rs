//! Static column treatment catalog.
//!
//! A treatment is the normalization routine applied to every cell of a
//! column. The catalog maps exact column names to treatments and is consulted
//! before any inference. Lookups are exact: a renamed input column no longer
//! matches its entry and silently falls back to the generic treatment.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Column name of the insured capital amount, stored in Brazilian format.
pub const INSURED_CAPITAL_COLUMN: &str = "CAPITAL SEGURADO (MOEDA ORIGEM)";

/// Normalization routine selectable per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Treatment {
    /// Reparse region-formatted numbers ("75.000,00" → 75000.0) cell by cell.
    LocaleNumeric,
    /// Trim surrounding whitespace on text cells.
    GenericText,
    /// Leave every cell untouched.
    PassThrough,
    /// Fill sparse nulls with zero and widen to integers.
    IntegerFill,
    /// Coerce to decimals, rounding to two places when most values carry more.
    DecimalRound,
    /// Null out empty-equivalent tokens and harmonize letter case.
    TextHeuristic,
    /// Parse day-first dates (dd/mm/YYYY) into ISO 8601 text.
    DayFirstDate,
}

impl Treatment {
    pub const ALL: [Treatment; 7] = [
        Treatment::LocaleNumeric,
        Treatment::GenericText,
        Treatment::PassThrough,
        Treatment::IntegerFill,
        Treatment::DecimalRound,
        Treatment::TextHeuristic,
        Treatment::DayFirstDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Treatment::LocaleNumeric => "locale-numeric",
            Treatment::GenericText => "generic-text",
            Treatment::PassThrough => "pass-through",
            Treatment::IntegerFill => "integer-fill",
            Treatment::DecimalRound => "decimal-round",
            Treatment::TextHeuristic => "text-heuristic",
            Treatment::DayFirstDate => "day-first-date",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Treatment::LocaleNumeric => "Parse '.'-grouped, ','-decimal numbers",
            Treatment::GenericText => "Trim whitespace on text values",
            Treatment::PassThrough => "Keep values unchanged",
            Treatment::IntegerFill => "Zero-fill sparse nulls, widen to integer",
            Treatment::DecimalRound => "Coerce to decimal, round to 2 places if needed",
            Treatment::TextHeuristic => "Null out NA tokens, harmonize case",
            Treatment::DayFirstDate => "Parse dd/mm/YYYY dates to ISO 8601",
        }
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact column name → treatment mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreatmentCatalog {
    entries: BTreeMap<String, Treatment>,
}

impl TreatmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the tool.
    pub fn builtin() -> Self {
        Self::new().with_entry(INSURED_CAPITAL_COLUMN, Treatment::LocaleNumeric)
    }

    #[must_use]
    pub fn with_entry(mut self, column: impl Into<String>, treatment: Treatment) -> Self {
        self.insert(column, treatment);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, treatment: Treatment) {
        self.entries.insert(column.into(), treatment);
    }

    /// Overlays `other` on top of this catalog; its entries win.
    pub fn merge(&mut self, other: TreatmentCatalog) {
        self.entries.extend(other.entries);
    }

    /// Exact-match lookup.
    pub fn get(&self, column: &str) -> Option<Treatment> {
        self.entries.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Treatment)> {
        self.entries
            .iter()
            .map(|(name, treatment)| (name.as_str(), *treatment))
    }

    /// Catalog entries that no column of `table` matches.
    pub fn unmatched<'a>(&'a self, table: &Table) -> Vec<&'a str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| table.column(name).is_none())
            .collect()
    }
}

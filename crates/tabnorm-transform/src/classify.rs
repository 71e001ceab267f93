//! Column classification.
//!
//! A column's treatment comes from the catalog when its name matches an entry
//! exactly, otherwise from the configured [`FallbackMode`]. Reference-key
//! detection is independent of the treatment.

use serde::{Deserialize, Serialize};
use tabnorm_model::{CellValue, Column, Treatment, TreatmentCatalog};

use crate::stats::ColumnStats;

/// Column-name token marking a state column to enrich.
pub const REFERENCE_KEY_TOKEN: &str = "ESTADO";

/// How columns without a catalog entry are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
    /// Trim text columns, pass other columns through.
    #[default]
    Trim,
    /// Pick a heuristic routine from the column's inferred storage kind.
    Infer,
}

impl FallbackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackMode::Trim => "trim",
            FallbackMode::Infer => "infer",
        }
    }
}

impl std::str::FromStr for FallbackMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trim" => Ok(FallbackMode::Trim),
            "infer" => Ok(FallbackMode::Infer),
            other => Err(format!("unknown fallback mode '{other}' (expected trim or infer)")),
        }
    }
}

/// Where a column's treatment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatmentSource {
    Catalog,
    Fallback,
    Inferred,
}

/// Classification result for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPlan {
    pub treatment: Treatment,
    pub source: TreatmentSource,
    /// The column also feeds the enrichment step.
    pub reference_key: bool,
}

/// True when `name` contains [`REFERENCE_KEY_TOKEN`], ignoring case.
pub fn is_reference_key(name: &str) -> bool {
    name.to_uppercase().contains(REFERENCE_KEY_TOKEN)
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    catalog: TreatmentCatalog,
    fallback: FallbackMode,
}

impl Classifier {
    pub fn new(catalog: TreatmentCatalog, fallback: FallbackMode) -> Self {
        Self { catalog, fallback }
    }

    pub fn catalog(&self) -> &TreatmentCatalog {
        &self.catalog
    }

    pub fn fallback(&self) -> FallbackMode {
        self.fallback
    }

    pub fn classify(&self, column: &Column) -> ColumnPlan {
        let reference_key = is_reference_key(&column.name);
        if let Some(treatment) = self.catalog.get(&column.name) {
            return ColumnPlan {
                treatment,
                source: TreatmentSource::Catalog,
                reference_key,
            };
        }

        let (treatment, source) = match self.fallback {
            FallbackMode::Trim => {
                let textual = column
                    .values
                    .iter()
                    .any(|value| matches!(value, CellValue::Text(_)));
                let treatment = if textual {
                    Treatment::GenericText
                } else {
                    Treatment::PassThrough
                };
                (treatment, TreatmentSource::Fallback)
            }
            FallbackMode::Infer => (
                ColumnStats::collect(&column.values).storage_kind().treatment(),
                TreatmentSource::Inferred,
            ),
        };
        ColumnPlan {
            treatment,
            source,
            reference_key,
        }
    }
}

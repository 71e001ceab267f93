//! Process configuration from environment variables.
//!
//! Every setting has a default matching the historical deployment
//! (`./entrada` → `./saida`, `;`-delimited files). Command-line flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tabnorm_ingest::{CsvOptions, DEFAULT_DELIMITER, DEFAULT_NA_VALUES};
use tabnorm_model::TreatmentCatalog;
use tabnorm_transform::enrichment::{
    DEFAULT_KEY_FIELD, DEFAULT_REFERENCE_QUERY, DEFAULT_VALUE_FIELD,
};
use tabnorm_transform::{EnrichmentSettings, FallbackMode, KeyMatching, NormalizerConfig};

pub const INPUT_DIR_VAR: &str = "INPUT_DIR";
pub const OUTPUT_DIR_VAR: &str = "OUTPUT_DIR";
pub const CSV_DELIMITER_VAR: &str = "CSV_DELIMITER";
pub const CSV_NA_VALUES_VAR: &str = "CSV_NA_VALUES";
pub const REFERENCE_DB_VAR: &str = "REFERENCE_DB";
pub const REFERENCE_QUERY_VAR: &str = "REFERENCE_QUERY";
pub const REFERENCE_KEY_FIELD_VAR: &str = "REFERENCE_KEY_FIELD";
pub const REFERENCE_VALUE_FIELD_VAR: &str = "REFERENCE_VALUE_FIELD";
pub const REFERENCE_KEY_MATCHING_VAR: &str = "REFERENCE_KEY_MATCHING";
pub const FALLBACK_MODE_VAR: &str = "FALLBACK_MODE";
pub const TREATMENTS_FILE_VAR: &str = "TREATMENTS_FILE";

pub const DEFAULT_INPUT_DIR: &str = "./entrada";
pub const DEFAULT_OUTPUT_DIR: &str = "./saida";

/// Effective settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub csv: CsvOptions,
    pub output_delimiter: u8,
    /// SQLite reference database; `None` disables enrichment.
    pub reference_db: Option<PathBuf>,
    pub enrichment: EnrichmentSettings,
    pub fallback: FallbackMode,
    /// TOML file with extra `[treatments]` entries.
    pub treatments_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            csv: CsvOptions::default(),
            output_delimiter: DEFAULT_DELIMITER,
            reference_db: None,
            enrichment: EnrichmentSettings::default(),
            fallback: FallbackMode::default(),
            treatments_file: None,
        }
    }
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let delimiter = match get(CSV_DELIMITER_VAR) {
            Some(value) => {
                parse_delimiter(&value).with_context(|| format!("invalid {CSV_DELIMITER_VAR}"))?
            }
            None => DEFAULT_DELIMITER,
        };
        let na_values = match get(CSV_NA_VALUES_VAR) {
            Some(value) => parse_na_values(&value),
            None => DEFAULT_NA_VALUES.iter().map(|token| token.to_string()).collect(),
        };

        let matching = match get(REFERENCE_KEY_MATCHING_VAR) {
            Some(value) => value
                .parse::<KeyMatching>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {REFERENCE_KEY_MATCHING_VAR}"))?,
            None => KeyMatching::default(),
        };
        let fallback = match get(FALLBACK_MODE_VAR) {
            Some(value) => value
                .parse::<FallbackMode>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {FALLBACK_MODE_VAR}"))?,
            None => FallbackMode::default(),
        };

        let enrichment = EnrichmentSettings::default()
            .with_query(
                get(REFERENCE_QUERY_VAR).unwrap_or_else(|| DEFAULT_REFERENCE_QUERY.to_string()),
                Vec::new(),
            )
            .with_fields(
                get(REFERENCE_KEY_FIELD_VAR).unwrap_or_else(|| DEFAULT_KEY_FIELD.to_string()),
                get(REFERENCE_VALUE_FIELD_VAR).unwrap_or_else(|| DEFAULT_VALUE_FIELD.to_string()),
            )
            .with_matching(matching);

        Ok(Self {
            input_dir: get(INPUT_DIR_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR), PathBuf::from),
            output_dir: get(OUTPUT_DIR_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from),
            csv: CsvOptions::default()
                .with_delimiter(delimiter)
                .with_na_values(na_values),
            output_delimiter: DEFAULT_DELIMITER,
            reference_db: get(REFERENCE_DB_VAR).map(PathBuf::from),
            enrichment,
            fallback,
            treatments_file: get(TREATMENTS_FILE_VAR).map(PathBuf::from),
        })
    }

    /// Builtin catalog with the treatments file merged on top.
    pub fn catalog(&self) -> Result<TreatmentCatalog> {
        let mut catalog = TreatmentCatalog::builtin();
        if let Some(path) = &self.treatments_file {
            catalog.merge(load_treatments_file(path)?);
        }
        Ok(catalog)
    }

    pub fn normalizer_config(&self) -> Result<NormalizerConfig> {
        let enrichment = self.reference_db.as_ref().map(|_| self.enrichment.clone());
        Ok(NormalizerConfig::new(self.catalog()?)
            .with_fallback(self.fallback)
            .with_enrichment(enrichment))
    }
}

/// Parses a one-byte delimiter; `\t` and `tab` mean a tab.
pub fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "\\t" | "tab" | "\t" => return Ok(b'\t'),
        _ => {}
    }
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => bail!("delimiter must be a single ASCII character, got '{value}'"),
    }
}

/// Splits a comma-separated token list, dropping blanks.
pub fn parse_na_values(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TreatmentsFile {
    #[serde(default)]
    treatments: TreatmentCatalog,
}

/// Loads the `[treatments]` table of a TOML file.
pub fn load_treatments_file(path: &Path) -> Result<TreatmentCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read treatments file {}", path.display()))?;
    let file: TreatmentsFile = toml::from_str(&content)
        .with_context(|| format!("parse treatments file {}", path.display()))?;
    Ok(file.treatments)
}

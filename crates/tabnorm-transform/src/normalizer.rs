//! Table normalizer.
//!
//! Drives one table through classification, treatment and enrichment:
//!
//! 1. Classify every column. Reference keys whose derived column is already
//!    in the table, and such derived columns themselves, are not enriched
//!    again.
//! 2. Resolve the reference dictionary once, if a column is left to enrich.
//! 3. Treat each column in declaration order; enrich reference keys from the
//!    treated values.
//! 4. Append the derived columns after the original ones.
//!
//! A reference failure aborts the table before any output exists.

use std::collections::HashSet;
use std::time::Instant;

use tabnorm_model::{Column, Table, Treatment, TreatmentCatalog};
use tabnorm_reference::{ReferenceCache, ReferenceStore};
use tracing::{debug, info, info_span, warn};

use crate::classify::{Classifier, ColumnPlan, FallbackMode, TreatmentSource};
use crate::enrichment::{EnrichmentSettings, ReferenceIndex, enrich_column};
use crate::error::Result;
use crate::normalization::{Adjustment, apply_treatment};

/// Settings for [`TableNormalizer`].
#[derive(Debug, Clone, Default)]
pub struct NormalizerConfig {
    pub catalog: TreatmentCatalog,
    pub fallback: FallbackMode,
    /// `None` disables enrichment; reference-key columns are then only treated.
    pub enrichment: Option<EnrichmentSettings>,
}

impl NormalizerConfig {
    pub fn new(catalog: TreatmentCatalog) -> Self {
        Self {
            catalog,
            fallback: FallbackMode::default(),
            enrichment: Some(EnrichmentSettings::default()),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackMode) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_enrichment(mut self, enrichment: Option<EnrichmentSettings>) -> Self {
        self.enrichment = enrichment;
        self
    }
}

/// What happened to one input column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    pub name: String,
    pub treatment: Treatment,
    pub source: TreatmentSource,
    pub adjustments: Vec<Adjustment>,
}

impl ColumnReport {
    pub fn reverted(&self) -> bool {
        self.adjustments
            .iter()
            .any(|adjustment| matches!(adjustment, Adjustment::Reverted { .. }))
    }
}

/// One derived column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub source_column: String,
    pub derived_column: String,
    /// Non-null source values with no reference match.
    pub unresolved: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    pub rows: usize,
    pub columns: Vec<ColumnReport>,
    pub enrichments: Vec<EnrichmentReport>,
    /// Reference-key columns left without a derived column because enrichment
    /// is disabled.
    pub skipped_enrichment: Vec<String>,
    /// Reference-key columns whose derived column was already in the input.
    pub already_enriched: Vec<String>,
}

impl NormalizationReport {
    pub fn reverted_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.reverted())
            .map(|column| column.name.as_str())
    }

    pub fn derived_columns(&self) -> impl Iterator<Item = &str> {
        self.enrichments
            .iter()
            .map(|enrichment| enrichment.derived_column.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Normalized table plus the report describing how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub table: Table,
    pub report: NormalizationReport,
}

#[derive(Debug, Clone, Default)]
pub struct TableNormalizer {
    classifier: Classifier,
    enrichment: Option<EnrichmentSettings>,
}

impl TableNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            classifier: Classifier::new(config.catalog, config.fallback),
            enrichment: config.enrichment,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn enrichment(&self) -> Option<&EnrichmentSettings> {
        self.enrichment.as_ref()
    }

    /// Normalizes `table`, resolving reference data through `cache`.
    pub fn normalize<S: ReferenceStore>(
        &self,
        table: Table,
        cache: &mut ReferenceCache<S>,
    ) -> Result<NormalizedTable> {
        let span = info_span!("normalize", rows = table.height(), columns = table.width());
        let _guard = span.enter();
        let start = Instant::now();

        for entry in self.classifier.catalog().unmatched(&table) {
            debug!(column = %entry, "catalog entry matches no column");
        }

        let plans: Vec<_> = table
            .columns()
            .iter()
            .map(|column| self.classifier.classify(column))
            .collect();

        let mut report = NormalizationReport {
            rows: table.height(),
            ..NormalizationReport::default()
        };

        let targets = self.enrichment_targets(&table, &plans, &mut report);
        let index = self.resolve_reference(targets.iter().any(|target| *target), cache)?;

        let mut normalized = Table::default();
        let mut derived = Vec::new();
        let columns = table.into_columns().into_iter().zip(plans).zip(targets);
        for ((column, plan), enrich) in columns {
            let Column { name, values } = column;
            let treated = apply_treatment(plan.treatment, values);
            if treated.is_reverted() {
                warn!(
                    column = %name,
                    treatment = %plan.treatment,
                    "coercion failed, column kept as read"
                );
            }
            debug!(
                column = %name,
                treatment = %plan.treatment,
                adjustments = treated.adjustments.len(),
                "column treated"
            );
            let column = Column::new(name, treated.values);

            if enrich {
                match (&self.enrichment, &index) {
                    (Some(settings), Some(index)) => {
                        let derived_name = settings.derived_column_name(&column.name);
                        let (derived_column, unresolved) =
                            enrich_column(&column, index, derived_name);
                        report.enrichments.push(EnrichmentReport {
                            source_column: column.name.clone(),
                            derived_column: derived_column.name.clone(),
                            unresolved,
                        });
                        derived.push(derived_column);
                    }
                    _ => report.skipped_enrichment.push(column.name.clone()),
                }
            }

            report.columns.push(ColumnReport {
                name: column.name.clone(),
                treatment: plan.treatment,
                source: plan.source,
                adjustments: treated.adjustments,
            });
            normalized.push_column(column)?;
        }

        for column in derived {
            normalized.push_column(column)?;
        }

        info!(
            rows = report.rows,
            columns = normalized.width(),
            derived = report.enrichments.len(),
            duration_ms = start.elapsed().as_millis(),
            "table normalized"
        );
        Ok(NormalizedTable {
            table: normalized,
            report,
        })
    }

    /// Which columns feed the enrichment step.
    ///
    /// A reference key is left alone when its derived column is already
    /// present, or when it is itself the derived column of another key, so a
    /// table written by a previous run normalizes without name collisions.
    fn enrichment_targets(
        &self,
        table: &Table,
        plans: &[ColumnPlan],
        report: &mut NormalizationReport,
    ) -> Vec<bool> {
        let Some(settings) = &self.enrichment else {
            return plans.iter().map(|plan| plan.reference_key).collect();
        };
        let names: HashSet<&str> = table.column_names().into_iter().collect();
        let derived_names: HashSet<String> = table
            .columns()
            .iter()
            .zip(plans)
            .filter(|(_, plan)| plan.reference_key)
            .map(|(column, _)| settings.derived_column_name(&column.name))
            .collect();

        table
            .columns()
            .iter()
            .zip(plans)
            .map(|(column, plan)| {
                if !plan.reference_key || derived_names.contains(&column.name) {
                    return false;
                }
                let derived_name = settings.derived_column_name(&column.name);
                if names.contains(derived_name.as_str()) {
                    debug!(
                        column = %column.name,
                        derived = %derived_name,
                        "derived column already present, not enriching again"
                    );
                    report.already_enriched.push(column.name.clone());
                    return false;
                }
                true
            })
            .collect()
    }

    fn resolve_reference<S: ReferenceStore>(
        &self,
        needed: bool,
        cache: &mut ReferenceCache<S>,
    ) -> Result<Option<ReferenceIndex>> {
        if !needed {
            return Ok(None);
        }
        let Some(settings) = &self.enrichment else {
            warn!("reference key columns present but enrichment is disabled");
            return Ok(None);
        };
        let index = settings.resolve(cache)?;
        debug!(
            keys = index.len(),
            matching = settings.matching.as_str(),
            "reference dictionary resolved"
        );
        Ok(Some(index))
    }
}

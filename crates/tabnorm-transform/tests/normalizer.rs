//! End-to-end tests for the table normalizer.

use tabnorm_model::treatment::INSURED_CAPITAL_COLUMN;
use tabnorm_model::{CellValue, Column, ReferenceRecord, Table, Treatment, TreatmentCatalog};
use tabnorm_reference::{MemoryStore, ReferenceCache};
use tabnorm_transform::enrichment::DEFAULT_REFERENCE_QUERY;
use tabnorm_transform::{
    EnrichmentSettings, FallbackMode, KeyMatching, NormalizerConfig, TableNormalizer,
    TransformError, TreatmentSource,
};

fn states() -> MemoryStore {
    let rows = [(1, "SP"), (2, "RJ")]
        .into_iter()
        .map(|(id, estado)| {
            ReferenceRecord::from([
                ("id".to_string(), CellValue::Integer(id)),
                ("estado".to_string(), CellValue::text(estado)),
            ])
        })
        .collect();
    MemoryStore::new().with_result(DEFAULT_REFERENCE_QUERY, rows)
}

fn normalizer(catalog: TreatmentCatalog) -> TableNormalizer {
    TableNormalizer::new(NormalizerConfig::new(catalog))
}

fn state_table() -> Table {
    Table::new(vec![Column::from_raw("ESTADO", [Some("SP"), Some("rj "), None])]).unwrap()
}

#[test]
fn capital_and_state_end_to_end() {
    let table = Table::new(vec![
        Column::from_raw(INSURED_CAPITAL_COLUMN, [Some("1.234,56")]),
        Column::from_raw("ESTADO", [Some("SP")]),
    ])
    .unwrap();
    let mut cache = ReferenceCache::new(states());

    let normalized = normalizer(TreatmentCatalog::builtin())
        .normalize(table, &mut cache)
        .unwrap();

    let table = &normalized.table;
    assert_eq!(
        table.column_names(),
        vec![INSURED_CAPITAL_COLUMN, "ESTADO", "ID_ESTADO"]
    );
    assert_eq!(
        table.column(INSURED_CAPITAL_COLUMN).unwrap().values,
        vec![CellValue::Decimal(1234.56)]
    );
    assert_eq!(
        table.column("ESTADO").unwrap().values,
        vec![CellValue::text("SP")]
    );
    assert_eq!(
        table.column("ID_ESTADO").unwrap().values,
        vec![CellValue::Integer(1)]
    );

    let capital = normalized.report.column(INSURED_CAPITAL_COLUMN).unwrap();
    assert_eq!(capital.treatment, Treatment::LocaleNumeric);
    assert_eq!(capital.source, TreatmentSource::Catalog);
    assert_eq!(
        normalized.report.derived_columns().collect::<Vec<_>>(),
        vec!["ID_ESTADO"]
    );
}

#[test]
fn exact_matching_is_case_sensitive_after_trim() {
    let mut cache = ReferenceCache::new(states());

    let normalized = normalizer(TreatmentCatalog::builtin())
        .normalize(state_table(), &mut cache)
        .unwrap();

    assert_eq!(
        normalized.table.column("ID_ESTADO").unwrap().values,
        vec![CellValue::Integer(1), CellValue::Null, CellValue::Null]
    );
    assert_eq!(normalized.report.enrichments[0].unresolved, 1);
}

#[test]
fn case_insensitive_matching_resolves_lowercase_keys() {
    let config = NormalizerConfig::new(TreatmentCatalog::builtin()).with_enrichment(Some(
        EnrichmentSettings::default().with_matching(KeyMatching::CaseInsensitive),
    ));
    let mut cache = ReferenceCache::new(states());

    let normalized = TableNormalizer::new(config)
        .normalize(state_table(), &mut cache)
        .unwrap();

    assert_eq!(
        normalized.table.column("ID_ESTADO").unwrap().values,
        vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Null]
    );
    assert_eq!(normalized.report.enrichments[0].unresolved, 0);
}

#[test]
fn enrichment_uses_treated_values() {
    let catalog = TreatmentCatalog::builtin().with_entry("ESTADO", Treatment::TextHeuristic);
    let table = Table::new(vec![Column::from_raw(
        "ESTADO",
        [Some(" sp"), Some("SP "), Some("RJ"), Some("RJ")],
    )])
    .unwrap();
    let mut cache = ReferenceCache::new(states());

    let normalized = normalizer(catalog).normalize(table, &mut cache).unwrap();

    assert_eq!(
        normalized.table.column("ESTADO").unwrap().values,
        vec![
            CellValue::text("SP"),
            CellValue::text("SP"),
            CellValue::text("RJ"),
            CellValue::text("RJ"),
        ]
    );
    assert_eq!(
        normalized.table.column("ID_ESTADO").unwrap().values,
        vec![
            CellValue::Integer(1),
            CellValue::Integer(1),
            CellValue::Integer(2),
            CellValue::Integer(2),
        ]
    );
}

#[test]
fn reference_dictionary_is_fetched_once_per_run() {
    let normalizer = normalizer(TreatmentCatalog::builtin());
    let mut cache = ReferenceCache::new(states());

    for _ in 0..3 {
        normalizer.normalize(state_table(), &mut cache).unwrap();
    }
    let two_keys = Table::new(vec![
        Column::from_raw("ESTADO", [Some("SP")]),
        Column::from_raw("ESTADO_ORIGEM", [Some("RJ")]),
    ])
    .unwrap();
    let normalized = normalizer.normalize(two_keys, &mut cache).unwrap();

    assert_eq!(cache.query_count(), 1);
    assert_eq!(
        normalized.table.column_names(),
        vec!["ESTADO", "ESTADO_ORIGEM", "ID_ESTADO", "ID_ESTADO_ORIGEM"]
    );
}

#[test]
fn reference_failure_aborts_the_table() {
    let mut cache = ReferenceCache::new(MemoryStore::new());

    let result = normalizer(TreatmentCatalog::builtin()).normalize(state_table(), &mut cache);

    assert!(matches!(result, Err(TransformError::Reference(_))));
}

#[test]
fn failed_coercion_keeps_column_and_table() {
    let catalog = TreatmentCatalog::new().with_entry("QTD", Treatment::IntegerFill);
    let table = Table::new(vec![
        Column::from_raw("QTD", [Some("1"), Some("dois")]),
        Column::from_raw("NOME", [Some(" Ana "), Some("Rui")]),
    ])
    .unwrap();
    let mut cache = ReferenceCache::new(MemoryStore::new());

    let normalized = normalizer(catalog).normalize(table, &mut cache).unwrap();

    assert_eq!(
        normalized.table.column("QTD").unwrap().values,
        vec![CellValue::text("1"), CellValue::text("dois")]
    );
    assert_eq!(
        normalized.table.column("NOME").unwrap().values,
        vec![CellValue::text("Ana"), CellValue::text("Rui")]
    );
    assert_eq!(
        normalized.report.reverted_columns().collect::<Vec<_>>(),
        vec!["QTD"]
    );
}

#[test]
fn infer_mode_picks_heuristic_routines() {
    let config =
        NormalizerConfig::new(TreatmentCatalog::builtin()).with_fallback(FallbackMode::Infer);
    let mut rows: Vec<Option<&str>> = vec![Some("3"); 19];
    rows.push(None);
    let table = Table::new(vec![
        Column::from_raw("QTD", rows.clone()),
        Column::from_raw("VALOR", rows.iter().map(|_| Some("2.3456"))),
        Column::from_raw("CIDADE", rows.iter().map(|_| Some("campinas "))),
    ])
    .unwrap();
    let mut cache = ReferenceCache::new(MemoryStore::new());

    let normalized = TableNormalizer::new(config)
        .normalize(table, &mut cache)
        .unwrap();

    let table = &normalized.table;
    assert_eq!(table.column("QTD").unwrap().values[19], CellValue::Integer(0));
    assert_eq!(table.column("VALOR").unwrap().values[0], CellValue::Decimal(2.35));
    assert_eq!(
        table.column("CIDADE").unwrap().values[0],
        CellValue::text("campinas")
    );
    assert_eq!(
        normalized.report.column("QTD").unwrap().source,
        TreatmentSource::Inferred
    );
}

#[test]
fn blank_text_becomes_null_under_trim_fallback() {
    let table = Table::new(vec![Column::from_raw("NOME", [Some("   "), Some(" Ana ")])]).unwrap();
    let normalizer = TableNormalizer::new(
        NormalizerConfig::new(TreatmentCatalog::builtin()).with_enrichment(None),
    );
    let mut cache = ReferenceCache::new(MemoryStore::new());

    let normalized = normalizer.normalize(table, &mut cache).unwrap();

    assert_eq!(
        normalized.table.column("NOME").unwrap().values,
        vec![CellValue::Null, CellValue::text("Ana")]
    );
    assert_eq!(
        normalized.report.column("NOME").unwrap().treatment,
        Treatment::GenericText
    );
}

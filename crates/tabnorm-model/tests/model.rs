//! Tests for tabnorm-model types.

use tabnorm_model::{CellValue, Column, Table, Treatment, TreatmentCatalog};

#[test]
fn catalog_deserializes_from_toml_table() {
    let source = r#"
"CAPITAL SEGURADO (MOEDA ORIGEM)" = "locale-numeric"
"DATA EMISSAO" = "day-first-date"
UF = "text-heuristic"
"#;
    let catalog: TreatmentCatalog = toml::from_str(source).expect("parse catalog");
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.get("UF"), Some(Treatment::TextHeuristic));
    assert_eq!(catalog.get("DATA EMISSAO"), Some(Treatment::DayFirstDate));
}

#[test]
fn catalog_rejects_unknown_treatment() {
    let result: Result<TreatmentCatalog, _> = toml::from_str(r#"UF = "shout""#);
    assert!(result.is_err());
}

#[test]
fn table_serializes_cells_with_kind_tags() {
    let table = Table::new(vec![Column::new(
        "VALOR",
        vec![
            CellValue::Decimal(1.5),
            CellValue::Null,
            CellValue::text("x"),
        ],
    )])
    .expect("table");

    let json = serde_json::to_value(&table).expect("serialize");
    let cells = &json["columns"][0]["values"];
    assert_eq!(cells[0]["kind"], "Decimal");
    assert_eq!(cells[1]["kind"], "Null");
    assert_eq!(cells[2]["value"], "x");

    let round: Table = serde_json::from_value(json).expect("deserialize");
    assert_eq!(round, table);
}

#[test]
fn push_column_keeps_declaration_order() {
    let mut table = Table::new(vec![
        Column::from_raw("B", [Some("1")]),
        Column::from_raw("A", [Some("2")]),
    ])
    .expect("table");
    table
        .push_column(Column::new("ID_A", vec![CellValue::Integer(1)]))
        .expect("push");

    assert_eq!(table.column_names(), vec!["B", "A", "ID_A"]);
}

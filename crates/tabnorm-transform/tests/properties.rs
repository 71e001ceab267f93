//! Property tests for null handling and idempotence.

use proptest::prelude::*;
use tabnorm_model::treatment::INSURED_CAPITAL_COLUMN;
use tabnorm_model::{CellValue, Column, Table, Treatment, TreatmentCatalog};
use tabnorm_reference::{MemoryStore, ReferenceCache};
use tabnorm_transform::normalization::{convert_locale_numeric, trim_text};
use tabnorm_transform::{Adjustment, NormalizerConfig, TableNormalizer, apply_treatment};

fn raw_cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        2 => "[ A-Za-z]{0,8}".prop_map(Some),
        2 => "[ 0-9.,]{0,10}".prop_map(Some),
        1 => "[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}".prop_map(Some),
    ]
}

fn raw_column() -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(raw_cell(), 0..24)
}

/// Cells as the CSV reader produces them: empty fields are already null.
fn read_column() -> impl Strategy<Value = Vec<CellValue>> {
    raw_column().prop_map(|raw| {
        raw.into_iter()
            .map(|cell| CellValue::from_raw(cell.filter(|text| !text.is_empty())))
            .collect()
    })
}

fn treatment() -> impl Strategy<Value = Treatment> {
    prop::sample::select(Treatment::ALL.to_vec())
}

proptest! {
    #[test]
    fn nulls_stay_null(raw in raw_column(), treatment in treatment()) {
        let values: Vec<CellValue> = raw.iter().cloned().map(CellValue::from_raw).collect();
        let treated = apply_treatment(treatment, values.clone());

        prop_assert_eq!(treated.values.len(), values.len());
        let filled = treated
            .adjustments
            .iter()
            .any(|adjustment| matches!(adjustment, Adjustment::FilledNulls { .. }));
        for (before, after) in values.iter().zip(&treated.values) {
            if before.is_null() && !filled {
                prop_assert!(after.is_null(), "{} turned a null into {:?}", treatment, after);
            }
        }
    }

    #[test]
    fn no_treatment_leaves_empty_text(values in read_column(), treatment in treatment()) {
        let treated = apply_treatment(treatment, values);

        for after in &treated.values {
            prop_assert_ne!(after, &CellValue::text(""), "{} produced an empty string", treatment);
        }
    }

    #[test]
    fn per_value_routines_are_idempotent(raw in raw_cell()) {
        let cell = CellValue::from_raw(raw);

        let once = convert_locale_numeric(cell.clone());
        prop_assert_eq!(convert_locale_numeric(once.clone()), once);

        let once = trim_text(cell);
        prop_assert_eq!(trim_text(once.clone()), once);
    }

    #[test]
    fn normalizing_twice_changes_nothing(
        capital in raw_column(),
        text in raw_column(),
    ) {
        let rows = capital.len().min(text.len());
        let table = Table::new(vec![
            Column::from_raw(INSURED_CAPITAL_COLUMN, capital.into_iter().take(rows)),
            Column::from_raw("NOME", text.into_iter().take(rows)),
        ])
        .unwrap();
        let normalizer = TableNormalizer::new(
            NormalizerConfig::new(TreatmentCatalog::builtin()).with_enrichment(None),
        );
        let mut cache = ReferenceCache::new(MemoryStore::new());

        let once = normalizer.normalize(table, &mut cache).unwrap().table;
        let twice = normalizer.normalize(once.clone(), &mut cache).unwrap().table;

        prop_assert_eq!(twice, once);
    }
}

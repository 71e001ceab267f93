//! Records fetched from the reference store.

use std::collections::BTreeMap;

use crate::cell::CellValue;

/// One row of reference data: field name → value.
pub type ReferenceRecord = BTreeMap<String, CellValue>;

//! Text normalization.

use tabnorm_model::CellValue;

use crate::normalization::{Adjustment, TreatedColumn};
use crate::stats::{CaseDecision, ColumnStats};

/// Values that mean "no data" once trimmed.
pub const EMPTY_EQUIVALENT_TOKENS: [&str; 7] = ["", "null", "NULL", "nan", "NaN", "NA", "N/A"];

fn trimmed(text: String) -> String {
    let trimmed = text.trim();
    if trimmed.len() == text.len() {
        text
    } else {
        trimmed.to_string()
    }
}

/// Trims surrounding whitespace on text cells; other cells pass through.
///
/// Text that is blank once trimmed becomes null.
pub fn trim_text(value: CellValue) -> CellValue {
    match value {
        CellValue::Text(text) => {
            let text = trimmed(text);
            if text.is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(text)
            }
        }
        other => other,
    }
}

pub fn is_empty_equivalent(value: &str) -> bool {
    EMPTY_EQUIVALENT_TOKENS.contains(&value)
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// True when `value` has at least one cased letter and no lowercase one.
pub fn is_upper_case(value: &str) -> bool {
    value.chars().any(is_cased) && !value.chars().any(char::is_lowercase)
}

/// True when every word starts with an uppercase letter followed only by
/// lowercase letters.
///
/// A word is a run of cased letters; digits and punctuation separate words.
/// At least one cased letter is required.
pub fn is_title_case(value: &str) -> bool {
    let mut previous_cased = false;
    let mut seen_cased = false;
    for c in value.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else {
            previous_cased = false;
        }
    }
    seen_cased
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn to_title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_cased = false;
    for c in value.chars() {
        if previous_cased {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_cased = is_cased(c);
    }
    result
}

/// Cleans a free-text column.
///
/// Values are trimmed, empty-equivalent tokens become null, and the column is
/// then upper-cased or title-cased as a whole when at least
/// [`CASE_THRESHOLD`](crate::stats::CASE_THRESHOLD) of its non-null values
/// already are. Upper case is checked first.
pub fn harmonize_text(values: Vec<CellValue>) -> TreatedColumn {
    let mut nulled = 0usize;
    let cleaned: Vec<CellValue> = values
        .into_iter()
        .map(|value| match value {
            CellValue::Text(text) => {
                let text = trimmed(text);
                if is_empty_equivalent(&text) {
                    nulled += 1;
                    CellValue::Null
                } else {
                    CellValue::Text(text)
                }
            }
            other => other,
        })
        .collect();

    let mut adjustments = Vec::new();
    if nulled > 0 {
        adjustments.push(Adjustment::NulledTokens { count: nulled });
    }

    let convert: fn(&str) -> String = match ColumnStats::collect(&cleaned).case_decision() {
        CaseDecision::Upper => {
            adjustments.push(Adjustment::UpperCased);
            str::to_uppercase
        }
        CaseDecision::Title => {
            adjustments.push(Adjustment::TitleCased);
            to_title_case
        }
        CaseDecision::Keep => {
            return TreatedColumn {
                values: cleaned,
                adjustments,
            };
        }
    };

    let values = cleaned
        .into_iter()
        .map(|value| match value {
            CellValue::Text(text) => CellValue::Text(convert(&text)),
            other => other,
        })
        .collect();
    TreatedColumn {
        values,
        adjustments,
    }
}

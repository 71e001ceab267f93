//! Day-first date parsing.

use chrono::NaiveDate;
use tabnorm_model::CellValue;

use crate::normalization::{Adjustment, TreatedColumn};

/// Format tried for every value.
pub const DAY_FIRST_FORMAT: &str = "%d/%m/%Y";

/// Formats tried when most values do not parse day-first.
pub const FALLBACK_FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Output format (ISO 8601 calendar date).
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Share of rows without a day-first date, nulls included, above which the
/// fallback formats are tried.
pub const DATE_FAILURE_THRESHOLD: f64 = 0.5;

fn parse_with(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Rewrites `dd/mm/YYYY` text as ISO dates.
///
/// When more than [`DATE_FAILURE_THRESHOLD`] of the rows have no day-first
/// date (pre-existing nulls count as misses), the whole column is parsed again
/// with [`FALLBACK_FORMATS`]. Values that still do not parse, and non-text
/// cells, become null.
pub fn normalize_day_first_dates(values: Vec<CellValue>) -> TreatedColumn {
    let missing = values
        .iter()
        .filter(|value| match value {
            CellValue::Text(text) => parse_with(text, &[DAY_FIRST_FORMAT]).is_none(),
            _ => true,
        })
        .count();

    let mut adjustments = Vec::new();
    let use_fallback =
        !values.is_empty() && missing as f64 / values.len() as f64 > DATE_FAILURE_THRESHOLD;
    let formats: &[&str] = if use_fallback {
        adjustments.push(Adjustment::AlternateDateFormats);
        &FALLBACK_FORMATS
    } else {
        &[DAY_FIRST_FORMAT]
    };

    let mut unparsable = 0usize;
    let values = values
        .into_iter()
        .map(|value| match value {
            CellValue::Null => CellValue::Null,
            CellValue::Text(text) => match parse_with(&text, formats) {
                Some(date) => CellValue::Text(date.format(ISO_FORMAT).to_string()),
                None => {
                    unparsable += 1;
                    CellValue::Null
                }
            },
            _ => {
                unparsable += 1;
                CellValue::Null
            }
        })
        .collect();

    if unparsable > 0 {
        adjustments.push(Adjustment::NulledUnparsable { count: unparsable });
    }
    TreatedColumn {
        values,
        adjustments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[Option<&str>]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn test_day_first_to_iso() {
        let treated =
            normalize_day_first_dates(texts(&[Some("31/12/2023"), Some(" 01/02/2024 "), None]));
        assert_eq!(
            treated.values,
            texts(&[Some("2023-12-31"), Some("2024-02-01"), None])
        );
        assert!(treated.adjustments.is_empty());
    }

    #[test]
    fn test_minority_failures_become_null() {
        let treated = normalize_day_first_dates(texts(&[
            Some("31/12/2023"),
            Some("01/02/2024"),
            Some("2024-03-05"),
        ]));
        assert_eq!(treated.values[2], CellValue::Null);
        assert_eq!(
            treated.adjustments,
            vec![Adjustment::NulledUnparsable { count: 1 }]
        );
    }

    #[test]
    fn test_majority_failures_use_fallback_formats() {
        let treated = normalize_day_first_dates(texts(&[
            Some("2024-03-05"),
            Some("2024/03/06"),
            Some("07/03/2024"),
        ]));
        assert_eq!(
            treated.values,
            texts(&[Some("2024-03-05"), Some("2024-03-06"), Some("2024-03-07")])
        );
        assert_eq!(treated.adjustments, vec![Adjustment::AlternateDateFormats]);
    }

    #[test]
    fn test_existing_nulls_count_towards_fallback() {
        let treated = normalize_day_first_dates(texts(&[
            None,
            None,
            Some("31/12/2023"),
            Some("2024-03-05"),
        ]));
        assert_eq!(
            treated.values,
            texts(&[None, None, Some("2023-12-31"), Some("2024-03-05")])
        );
        assert_eq!(treated.adjustments, vec![Adjustment::AlternateDateFormats]);
    }

    #[test]
    fn test_invalid_calendar_dates_are_null() {
        let treated = normalize_day_first_dates(texts(&[
            Some("31/02/2024"),
            Some("01/01/2024"),
            Some("02/01/2024"),
        ]));
        assert_eq!(treated.values[0], CellValue::Null);
    }
}

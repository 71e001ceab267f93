//! Numeric normalization.
//!
//! Region-formatted numbers use '.' to group thousands and ',' as the decimal
//! mark ("75.000,00"). [`convert_locale_numeric`] works on one value at a
//! time; the integer and decimal routines make column-level decisions from
//! [`ColumnStats`].

use tabnorm_model::CellValue;
use tracing::warn;

use crate::normalization::{Adjustment, TreatedColumn};
use crate::stats::{ColumnStats, ROUNDING_PLACES, parse_plain_decimal};

/// Thousands separator in region-formatted numbers.
pub const THOUSANDS_SEPARATOR: char = '.';

/// Decimal separator in region-formatted numbers.
pub const DECIMAL_SEPARATOR: char = ',';

/// Parses a region-formatted number.
///
/// All thousands separators are removed and the decimal separator becomes
/// '.', then the result is parsed as a float. Surrounding whitespace is
/// ignored; NaN and infinities are rejected.
///
/// # Examples
///
/// ```
/// use tabnorm_transform::normalization::parse_locale_numeric;
///
/// assert_eq!(parse_locale_numeric("75.000,00"), Some(75000.0));
/// assert_eq!(parse_locale_numeric("78,57"), Some(78.57));
/// assert_eq!(parse_locale_numeric("1,2,3"), None);
/// ```
pub fn parse_locale_numeric(value: &str) -> Option<f64> {
    let cleaned = value
        .trim()
        .replace(THOUSANDS_SEPARATOR, "")
        .replace(DECIMAL_SEPARATOR, ".");
    parse_plain_decimal(&cleaned)
}

/// Reinterprets a text cell as a region-formatted number.
///
/// Null and numeric cells pass through. Text that does not parse is
/// returned unchanged.
pub fn convert_locale_numeric(value: CellValue) -> CellValue {
    match value {
        CellValue::Text(text) => match parse_locale_numeric(&text) {
            Some(number) => CellValue::Decimal(number),
            None => CellValue::Text(text),
        },
        other => other,
    }
}

/// Zero-fills sparse nulls, then widens every value to an integer.
///
/// Nulls are filled only when they are fewer than
/// [`NULL_FILL_THRESHOLD`](crate::stats::NULL_FILL_THRESHOLD) of the rows. If
/// any value is not integral the column is returned as it came in.
pub fn fill_and_widen_integers(values: Vec<CellValue>) -> TreatedColumn {
    let stats = ColumnStats::collect(&values);
    let fill = stats.should_fill_nulls();

    let mut widened = Vec::with_capacity(values.len());
    for value in &values {
        match widen_integer(value) {
            Ok(CellValue::Null) if fill => widened.push(CellValue::Integer(0)),
            Ok(cell) => widened.push(cell),
            Err(reason) => {
                warn!(reason = %reason, "integer coercion failed, column left unchanged");
                return TreatedColumn {
                    values,
                    adjustments: vec![Adjustment::Reverted { reason }],
                };
            }
        }
    }

    let mut adjustments = Vec::new();
    if fill {
        adjustments.push(Adjustment::FilledNulls { count: stats.nulls });
    }
    TreatedColumn {
        values: widened,
        adjustments,
    }
}

fn widen_integer(value: &CellValue) -> Result<CellValue, String> {
    match value {
        CellValue::Null => Ok(CellValue::Null),
        CellValue::Integer(number) => Ok(CellValue::Integer(*number)),
        CellValue::Decimal(number) => {
            if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
                Ok(CellValue::Integer(*number as i64))
            } else {
                Err(format!("{number:?} is not integral"))
            }
        }
        CellValue::Text(text) => text
            .trim()
            .parse::<i64>()
            .map(CellValue::Integer)
            .map_err(|_| format!("'{text}' is not an integer")),
    }
}

/// Coerces every value to a decimal and rounds when most values need it.
///
/// Unparsable text becomes null. The column is rounded to
/// [`ROUNDING_PLACES`] only when more than
/// [`ROUNDING_THRESHOLD`](crate::stats::ROUNDING_THRESHOLD) of the non-null
/// values carry more fraction digits than that.
pub fn coerce_and_round_decimals(values: Vec<CellValue>) -> TreatedColumn {
    let mut unparsable = 0usize;
    let coerced: Vec<CellValue> = values
        .into_iter()
        .map(|value| match value {
            CellValue::Null => CellValue::Null,
            CellValue::Integer(number) => CellValue::Decimal(number as f64),
            CellValue::Decimal(number) => CellValue::Decimal(number),
            CellValue::Text(text) => match parse_plain_decimal(&text) {
                Some(number) => CellValue::Decimal(number),
                None => {
                    unparsable += 1;
                    CellValue::Null
                }
            },
        })
        .collect();

    let mut adjustments = Vec::new();
    if unparsable > 0 {
        adjustments.push(Adjustment::NulledUnparsable { count: unparsable });
    }

    if !ColumnStats::collect(&coerced).should_round() {
        return TreatedColumn {
            values: coerced,
            adjustments,
        };
    }

    adjustments.push(Adjustment::Rounded);
    let rounded = coerced
        .into_iter()
        .map(|value| match value {
            CellValue::Decimal(number) => CellValue::Decimal(round_to_places(number)),
            other => other,
        })
        .collect();
    TreatedColumn {
        values: rounded,
        adjustments,
    }
}

fn round_to_places(value: f64) -> f64 {
    let factor = 10f64.powi(ROUNDING_PLACES);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_numeric_examples() {
        assert_eq!(
            convert_locale_numeric(CellValue::text("75.000,00")),
            CellValue::Decimal(75000.0)
        );
        assert_eq!(
            convert_locale_numeric(CellValue::text("78,57")),
            CellValue::Decimal(78.57)
        );
        assert_eq!(
            convert_locale_numeric(CellValue::text("abc")),
            CellValue::text("abc")
        );
        assert_eq!(
            convert_locale_numeric(CellValue::Decimal(42.5)),
            CellValue::Decimal(42.5)
        );
        assert_eq!(convert_locale_numeric(CellValue::Null), CellValue::Null);
    }

    #[test]
    fn test_locale_numeric_without_separators() {
        assert_eq!(parse_locale_numeric("42"), Some(42.0));
        assert_eq!(parse_locale_numeric(" 1.234.567 "), Some(1234567.0));
        assert_eq!(parse_locale_numeric("-3,5"), Some(-3.5));
    }

    #[test]
    fn test_locale_numeric_malformed() {
        assert_eq!(parse_locale_numeric("1,2,3"), None);
        assert_eq!(parse_locale_numeric(""), None);
        assert_eq!(parse_locale_numeric("nan"), None);
        assert_eq!(
            convert_locale_numeric(CellValue::text("12,34,56")),
            CellValue::text("12,34,56")
        );
    }

    #[test]
    fn test_integer_fill_below_threshold() {
        let mut values: Vec<CellValue> = (1..=19).map(|n| CellValue::text(n.to_string())).collect();
        values.push(CellValue::Null);

        let treated = fill_and_widen_integers(values);

        assert_eq!(treated.values[0], CellValue::Integer(1));
        assert_eq!(treated.values[19], CellValue::Integer(0));
        assert_eq!(treated.adjustments, vec![Adjustment::FilledNulls { count: 1 }]);
    }

    #[test]
    fn test_integer_keeps_nulls_above_threshold() {
        let treated = fill_and_widen_integers(vec![
            CellValue::text("5"),
            CellValue::Null,
            CellValue::Decimal(3.0),
        ]);
        assert_eq!(
            treated.values,
            vec![CellValue::Integer(5), CellValue::Null, CellValue::Integer(3)]
        );
        assert!(treated.adjustments.is_empty());
    }

    #[test]
    fn test_integer_coercion_failure_reverts() {
        let values = vec![CellValue::text("5"), CellValue::text("5,5")];
        let treated = fill_and_widen_integers(values.clone());

        assert_eq!(treated.values, values);
        assert!(treated.is_reverted());
    }

    #[test]
    fn test_decimal_rounds_when_majority_has_excess_digits() {
        let treated = coerce_and_round_decimals(vec![
            CellValue::text("1.2345"),
            CellValue::text("2.3456"),
            CellValue::text("3.5"),
            CellValue::Null,
        ]);
        assert_eq!(
            treated.values,
            vec![
                CellValue::Decimal(1.23),
                CellValue::Decimal(2.35),
                CellValue::Decimal(3.5),
                CellValue::Null,
            ]
        );
        assert_eq!(treated.adjustments, vec![Adjustment::Rounded]);
    }

    #[test]
    fn test_decimal_keeps_precision_for_minority() {
        let treated =
            coerce_and_round_decimals(vec![CellValue::text("1.2345"), CellValue::Integer(2)]);
        assert_eq!(
            treated.values,
            vec![CellValue::Decimal(1.2345), CellValue::Decimal(2.0)]
        );
    }

    #[test]
    fn test_decimal_nulls_unparsable() {
        let treated = coerce_and_round_decimals(vec![CellValue::text("x"), CellValue::text("1.5")]);
        assert_eq!(treated.values, vec![CellValue::Null, CellValue::Decimal(1.5)]);
        assert_eq!(
            treated.adjustments,
            vec![Adjustment::NulledUnparsable { count: 1 }]
        );
    }
}

//! First-pass column statistics.
//!
//! Heuristic treatments work in two phases: [`ColumnStats::collect`] scans the
//! column once, then the decision methods turn the counts into a single
//! column-level choice that the second pass applies to every cell.

use tabnorm_model::{CellValue, Treatment};

use crate::normalization::text::{is_title_case, is_upper_case};

/// Nulls are zero-filled only when they make up less than this share of rows.
pub const NULL_FILL_THRESHOLD: f64 = 0.1;

/// Share of non-null values that must already be upper/title case before the
/// whole column is converted.
pub const CASE_THRESHOLD: f64 = 0.7;

/// Decimals are rounded when more than this share carries over two fraction digits.
pub const ROUNDING_THRESHOLD: f64 = 0.5;

/// Decimal places kept when rounding.
pub const ROUNDING_PLACES: i32 = 2;

/// Storage type a column's values fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Integral,
    Decimal,
    Text,
}

impl StorageKind {
    /// Heuristic treatment for columns of this kind.
    pub fn treatment(self) -> Treatment {
        match self {
            StorageKind::Integral => Treatment::IntegerFill,
            StorageKind::Decimal => Treatment::DecimalRound,
            StorageKind::Text => Treatment::TextHeuristic,
        }
    }
}

/// Letter-case decision for a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseDecision {
    Upper,
    Title,
    Keep,
}

/// Counts gathered over one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnStats {
    pub rows: usize,
    pub nulls: usize,
    pub uppercase: usize,
    pub title_case: usize,
    /// Integer cells and text that parses as an integer.
    pub integral: usize,
    /// Numeric cells and text that parses as a number.
    pub decimal: usize,
    /// Numeric values with more than [`ROUNDING_PLACES`] fraction digits.
    pub excess_fraction: usize,
}

impl ColumnStats {
    pub fn collect(values: &[CellValue]) -> Self {
        let mut stats = Self {
            rows: values.len(),
            ..Self::default()
        };
        for value in values {
            match value {
                CellValue::Null => stats.nulls += 1,
                CellValue::Integer(_) => {
                    stats.integral += 1;
                    stats.decimal += 1;
                }
                CellValue::Decimal(number) => stats.count_decimal(*number),
                CellValue::Text(text) => {
                    if is_upper_case(text) {
                        stats.uppercase += 1;
                    }
                    if is_title_case(text) {
                        stats.title_case += 1;
                    }
                    let trimmed = text.trim();
                    if trimmed.parse::<i64>().is_ok() {
                        stats.integral += 1;
                        stats.decimal += 1;
                    } else if let Some(number) = parse_plain_decimal(trimmed) {
                        stats.count_decimal(number);
                    }
                }
            }
        }
        stats
    }

    fn count_decimal(&mut self, number: f64) {
        self.decimal += 1;
        if has_excess_fraction_digits(number) {
            self.excess_fraction += 1;
        }
    }

    pub fn non_null(&self) -> usize {
        self.rows - self.nulls
    }

    pub fn null_ratio(&self) -> f64 {
        ratio(self.nulls, self.rows)
    }

    pub fn uppercase_ratio(&self) -> f64 {
        ratio(self.uppercase, self.non_null())
    }

    pub fn title_case_ratio(&self) -> f64 {
        ratio(self.title_case, self.non_null())
    }

    pub fn excess_fraction_ratio(&self) -> f64 {
        ratio(self.excess_fraction, self.non_null())
    }

    /// Narrowest storage kind holding every non-null value.
    ///
    /// A column without any non-null value is text.
    pub fn storage_kind(&self) -> StorageKind {
        let non_null = self.non_null();
        if non_null == 0 {
            StorageKind::Text
        } else if self.integral == non_null {
            StorageKind::Integral
        } else if self.decimal == non_null {
            StorageKind::Decimal
        } else {
            StorageKind::Text
        }
    }

    pub fn should_fill_nulls(&self) -> bool {
        self.nulls > 0 && self.null_ratio() < NULL_FILL_THRESHOLD
    }

    pub fn should_round(&self) -> bool {
        self.excess_fraction_ratio() > ROUNDING_THRESHOLD
    }

    pub fn case_decision(&self) -> CaseDecision {
        if self.non_null() == 0 {
            CaseDecision::Keep
        } else if self.uppercase_ratio() >= CASE_THRESHOLD {
            CaseDecision::Upper
        } else if self.title_case_ratio() >= CASE_THRESHOLD {
            CaseDecision::Title
        } else {
            CaseDecision::Keep
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Parses a '.'-decimal number, rejecting NaN and infinities.
pub fn parse_plain_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// True when `value` needs more than [`ROUNDING_PLACES`] fraction digits.
pub fn has_excess_fraction_digits(value: f64) -> bool {
    let scaled = value * 10f64.powi(ROUNDING_PLACES);
    (scaled - scaled.round()).abs() > 1e-9 * scaled.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[Option<&str>]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn test_null_ratio_and_fill_decision() {
        let mut values = texts(&[Some("1"); 19]);
        values.push(CellValue::Null);
        let stats = ColumnStats::collect(&values);
        assert_eq!(stats.null_ratio(), 0.05);
        assert!(stats.should_fill_nulls());

        let stats = ColumnStats::collect(&texts(&[Some("1"), None, Some("2")]));
        assert!(!stats.should_fill_nulls());
    }

    #[test]
    fn test_no_fill_without_nulls() {
        let stats = ColumnStats::collect(&texts(&[Some("1"), Some("2")]));
        assert!(!stats.should_fill_nulls());
    }

    #[test]
    fn test_storage_kind() {
        let kind = |values: &[Option<&str>]| ColumnStats::collect(&texts(values)).storage_kind();
        assert_eq!(kind(&[Some("1"), Some(" 2 "), None]), StorageKind::Integral);
        assert_eq!(kind(&[Some("1"), Some("2.5")]), StorageKind::Decimal);
        assert_eq!(kind(&[Some("1"), Some("x")]), StorageKind::Text);
        assert_eq!(kind(&[None, None]), StorageKind::Text);
        assert_eq!(kind(&[Some("nan")]), StorageKind::Text);
    }

    #[test]
    fn test_case_decision_upper() {
        let stats = ColumnStats::collect(&texts(&[Some("AB"), Some("CD"), Some("EF"), Some("gh")]));
        assert_eq!(stats.uppercase_ratio(), 0.75);
        assert_eq!(stats.case_decision(), CaseDecision::Upper);
    }

    #[test]
    fn test_case_decision_title() {
        let stats = ColumnStats::collect(&texts(&[
            Some("São Paulo"),
            Some("Rio De Janeiro"),
            Some("Bahia"),
            Some("PARANÁ"),
        ]));
        assert_eq!(stats.case_decision(), CaseDecision::Title);
    }

    #[test]
    fn test_case_decision_keep_below_threshold() {
        let stats = ColumnStats::collect(&texts(&[Some("AB"), Some("cd"), Some("Ef"), None]));
        assert_eq!(stats.case_decision(), CaseDecision::Keep);
    }

    #[test]
    fn test_excess_fraction_digits() {
        assert!(has_excess_fraction_digits(1.234));
        assert!(!has_excess_fraction_digits(1.23));
        assert!(!has_excess_fraction_digits(0.1));
        assert!(!has_excess_fraction_digits(75000.0));
        assert!(has_excess_fraction_digits(-0.005));
    }

    #[test]
    fn test_should_round_needs_majority() {
        let values = vec![
            CellValue::Decimal(1.234),
            CellValue::Decimal(2.345),
            CellValue::Decimal(3.5),
        ];
        assert!(ColumnStats::collect(&values).should_round());

        let values = vec![CellValue::Decimal(1.234), CellValue::Decimal(3.5)];
        assert!(!ColumnStats::collect(&values).should_round());
    }
}

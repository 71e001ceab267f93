//! Normalization routines, one per [`Treatment`].
//!
//! - **numeric**: locale numeric reparsing, integer widening, decimal rounding
//! - **text**: whitespace trimming, empty-equivalent tokens, case harmonization
//! - **date**: day-first date parsing into ISO 8601
//!
//! Every routine maps null cells to null and never fails: per-value parse
//! failures keep or null the value, column-level coercion failures revert the
//! column and are reported as [`Adjustment::Reverted`].

pub mod date;
pub mod numeric;
pub mod text;

use std::fmt;

use tabnorm_model::{CellValue, Treatment};

pub use date::normalize_day_first_dates;
pub use numeric::{
    coerce_and_round_decimals, convert_locale_numeric, fill_and_widen_integers,
    parse_locale_numeric,
};
pub use text::{harmonize_text, is_title_case, is_upper_case, to_title_case, trim_text};

/// Column-level change made by a routine beyond its per-cell rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// Nulls replaced by zero.
    FilledNulls { count: usize },
    /// Values rounded to two decimal places.
    Rounded,
    /// Unparsable values replaced by null.
    NulledUnparsable { count: usize },
    /// Empty-equivalent tokens replaced by null.
    NulledTokens { count: usize },
    UpperCased,
    TitleCased,
    /// Day-first parsing failed for most values; alternate formats were used.
    AlternateDateFormats,
    /// A type coercion failed and the column was left as it was.
    Reverted { reason: String },
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::FilledNulls { count } => write!(f, "filled {count} nulls with 0"),
            Adjustment::Rounded => write!(f, "rounded to 2 places"),
            Adjustment::NulledUnparsable { count } => write!(f, "nulled {count} unparsable"),
            Adjustment::NulledTokens { count } => write!(f, "nulled {count} NA tokens"),
            Adjustment::UpperCased => write!(f, "upper-cased"),
            Adjustment::TitleCased => write!(f, "title-cased"),
            Adjustment::AlternateDateFormats => write!(f, "alternate date formats"),
            Adjustment::Reverted { reason } => write!(f, "reverted: {reason}"),
        }
    }
}

/// Output of a routine: the rewritten cells plus what changed column-wide.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatedColumn {
    pub values: Vec<CellValue>,
    pub adjustments: Vec<Adjustment>,
}

impl TreatedColumn {
    pub fn unchanged(values: Vec<CellValue>) -> Self {
        Self {
            values,
            adjustments: Vec::new(),
        }
    }

    pub fn is_reverted(&self) -> bool {
        self.adjustments
            .iter()
            .any(|adjustment| matches!(adjustment, Adjustment::Reverted { .. }))
    }
}

/// Applies `treatment` to every cell of a column.
pub fn apply_treatment(treatment: Treatment, values: Vec<CellValue>) -> TreatedColumn {
    match treatment {
        Treatment::LocaleNumeric => {
            TreatedColumn::unchanged(values.into_iter().map(convert_locale_numeric).collect())
        }
        Treatment::GenericText => {
            TreatedColumn::unchanged(values.into_iter().map(trim_text).collect())
        }
        Treatment::PassThrough => TreatedColumn::unchanged(values),
        Treatment::IntegerFill => fill_and_widen_integers(values),
        Treatment::DecimalRound => coerce_and_round_decimals(values),
        Treatment::TextHeuristic => harmonize_text(values),
        Treatment::DayFirstDate => normalize_day_first_dates(values),
    }
}

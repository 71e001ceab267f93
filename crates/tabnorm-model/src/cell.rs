//! Cell values before and after normalization.

use std::fmt;

/// The content of a single table cell.
///
/// Input tables only ever contain [`CellValue::Text`] and [`CellValue::Null`].
/// Normalization may turn a cell into [`CellValue::Integer`] or
/// [`CellValue::Decimal`]. Missing data is always [`CellValue::Null`], never an
/// empty string.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Null,
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl CellValue {
    /// Builds a cell from an optional raw string, keeping the text untouched.
    pub fn from_raw<S: Into<String>>(raw: Option<S>) -> Self {
        match raw {
            Some(value) => Self::Text(value.into()),
            None => Self::Null,
        }
    }

    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for integer and decimal cells.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Decimal(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric view of the cell; text is not parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    /// Renders the cell as a lookup key, or `None` for null cells.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            // Debug keeps the fractional part on whole numbers (75000.0).
            Self::Decimal(value) => write!(f, "{value:?}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

//! Sorting types.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse a direction token. Anything other than `desc` is ascending.
    pub fn parse_lenient(token: &str) -> Self {
        if token.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// A field name and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Property or column name to sort by.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending sort on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending sort on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Render as `field DIRECTION`.
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.field, self.direction.as_sql())
    }
}

/// Parse a comma-separated `"field direction"` list.
///
/// The parse is lenient: a bare field sorts ascending, an unrecognized
/// direction sorts ascending, and empty or over-long tokens are skipped.
pub fn parse_order_by(order_by: &str) -> Vec<SortField> {
    order_by
        .split(',')
        .filter_map(|token| {
            let parts: Vec<&str> = token.split_whitespace().collect();
            match parts.as_slice() {
                [field] => Some(SortField::asc(*field)),
                [field, direction] => Some(SortField::new(
                    *field,
                    SortDirection::parse_lenient(direction),
                )),
                [] => None,
                _ => {
                    tracing::debug!(token = token.trim(), "Ignoring malformed order-by token");
                    None
                }
            }
        })
        .collect()
}

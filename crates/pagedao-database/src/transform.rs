//! Query text transforms used by the paged executor.
//!
//! The transforms are substring/regex based and never parse the query
//! grammar. Known limitations:
//!
//! - `to_count_form` drops everything before the first `from` keyword, so a
//!   sub-select in the select list (`select (select max(x) from u) from t`)
//!   produces a broken count query.
//! - an `order by` inside a string literal or sub-select is treated as the
//!   top-level ordering clause.

use std::sync::LazyLock;

use regex::Regex;

use pagedao_core::error::AppError;
use pagedao_core::result::AppResult;
use pagedao_core::types::sorting::SortField;

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\border\s*by\b").expect("static regex should not panic")
});

static FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").expect("static regex should not panic"));

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("static regex should not panic")
});

/// Remove everything from the first `order by` onward.
///
/// Repeated clauses all fall after the first one, so a single cut removes
/// them too. Returns the text unchanged when there is no ordering clause.
pub fn strip_orderings(text: &str) -> &str {
    match ORDER_BY.find(text) {
        Some(m) => text[..m.start()].trim_end(),
        None => text,
    }
}

/// Derive the row-count form of a query.
///
/// Orderings are stripped, the select list up to the first `from` is
/// dropped, and `select count(*) ` is prefixed.
pub fn to_count_form(text: &str) -> AppResult<String> {
    let stripped = strip_orderings(text);
    let from = FROM.find(stripped).ok_or_else(|| {
        AppError::transform(format!("cannot derive count query, no 'from' clause in: {text}"))
    })?;
    Ok(format!("select count(*) {}", &stripped[from.start()..]))
}

/// Append an `order by` clause for the given fields.
///
/// Field names are spliced into the query text, so anything that is not a
/// plain (optionally dotted) identifier is rejected.
pub fn append_order_by(text: &str, order_by: &[SortField]) -> AppResult<String> {
    if order_by.is_empty() {
        return Ok(text.to_string());
    }
    let clause = order_by
        .iter()
        .map(|sort| validate_identifier(&sort.field).map(|_| sort.to_sql()))
        .collect::<AppResult<Vec<_>>>()?
        .join(", ");
    Ok(format!("{text} order by {clause}"))
}

/// Reject names that cannot safely be spliced into SQL.
pub fn validate_identifier(name: &str) -> AppResult<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(AppError::validation(format!("invalid identifier: {name:?}")))
    }
}

//! The generic data-access facade.
//!
//! [`BaseDao`] holds no connection and no state. Every operation receives the
//! session (query executor, criteria executor, entity store or full-text
//! index) it should run against, and delegates all execution to it.
//!
//! Operations are grouped by query form:
//!
//! - [`query`]: query-language and native SQL text;
//! - [`criteria`]: detached structured criteria;
//! - [`search`]: full-text search;
//! - [`entity`]: entity lifecycle through the unit of work.

pub mod criteria;
pub mod entity;
pub mod query;
pub mod search;

use std::fmt;
use std::marker::PhantomData;

use pagedao_core::error::AppError;
use pagedao_core::result::AppResult;
use pagedao_core::traits::FromQueryRow;

/// Data-access facade for entity type `T`.
///
/// Text and criteria queries may decode rows into any type; `T` matters for
/// operations that name the entity (criteria creation, delete by id, search).
pub struct BaseDao<T> {
    entity: PhantomData<fn() -> T>,
}

impl<T> BaseDao<T> {
    /// Create a facade for `T`.
    pub fn new() -> Self {
        Self {
            entity: PhantomData,
        }
    }
}

impl<T> Default for BaseDao<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BaseDao<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for BaseDao<T> {}

impl<T> fmt::Debug for BaseDao<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseDao")
            .field("entity", &std::any::type_name::<T>())
            .finish()
    }
}

/// Decode engine rows into caller rows.
pub(crate) fn decode_rows<R, Row>(rows: Vec<Row>) -> AppResult<Vec<R>>
where
    R: FromQueryRow<Row>,
{
    rows.into_iter().map(R::from_query_row).collect()
}

/// Turn an engine count into a page count.
pub(crate) fn to_count(raw: Option<i64>) -> AppResult<u64> {
    let raw = raw.unwrap_or(0);
    u64::try_from(raw).map_err(|_| AppError::execution(format!("negative row count: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedao_core::error::ErrorKind;

    #[test]
    fn test_to_count() {
        assert_eq!(to_count(None).unwrap(), 0);
        assert_eq!(to_count(Some(25)).unwrap(), 25);
        assert_eq!(to_count(Some(-1)).unwrap_err().kind, ErrorKind::Execution);
    }
}

//! Text query execution.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::parameter::ParamValue;

/// Language of a query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLanguage {
    /// The engine's object query language.
    Ql,
    /// Native SQL passed to the database untouched.
    Native,
}

/// Conversion from an engine row into a caller type.
pub trait FromQueryRow<R>: Sized {
    /// Decode one row.
    fn from_query_row(row: R) -> AppResult<Self>;
}

#[cfg(feature = "postgres")]
impl<E> FromQueryRow<sqlx::postgres::PgRow> for E
where
    E: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    fn from_query_row(row: sqlx::postgres::PgRow) -> AppResult<Self> {
        E::from_row(&row).map_err(Into::into)
    }
}

/// Prepares query texts against a live session.
pub trait QueryExecutor: Send + Sync {
    /// Row type produced by prepared queries.
    type Row: Send;
    /// Prepared query type.
    type Query: BoundQuery<Row = Self::Row>;

    /// Prepare `text` for binding and execution.
    fn prepare(&self, text: &str, language: QueryLanguage) -> AppResult<Self::Query>;
}

/// A prepared query accepting named parameters.
///
/// Every method reports engine failures as-is; callers never retry.
#[async_trait]
pub trait BoundQuery: Send {
    /// Row type produced by [`BoundQuery::execute`].
    type Row: Send;

    /// Bind a single value to a named parameter.
    fn bind(&mut self, name: &str, value: &ParamValue) -> AppResult<()>;

    /// Bind a multi-valued parameter.
    fn bind_list(&mut self, name: &str, values: &[ParamValue]) -> AppResult<()>;

    /// Skip `first` rows and return at most `max`.
    fn set_offset_limit(&mut self, first: u64, max: u64);

    /// Ask the engine to cache the result set or plan.
    fn set_cacheable(&mut self, cacheable: bool);

    /// Execute and return every row.
    async fn execute(self) -> AppResult<Vec<Self::Row>>;

    /// Execute and read the first column of the first row as an integer.
    ///
    /// Returns `None` when the query produced no row.
    async fn execute_count(self) -> AppResult<Option<i64>>;

    /// Execute a data-modifying statement and return the affected row count.
    async fn execute_update(self) -> AppResult<u64>;
}

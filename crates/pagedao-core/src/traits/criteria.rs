//! Structured query execution.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::criteria::Criteria;

/// Executes detached [`Criteria`] against a live session.
#[async_trait]
pub trait CriteriaExecutor: Send + Sync {
    /// Row type produced by [`CriteriaExecutor::list`].
    type Row: Send;

    /// Execute and return every row, honouring window, orderings, shaping and
    /// the cacheable hint.
    async fn list(&self, criteria: &Criteria) -> AppResult<Vec<Self::Row>>;

    /// Execute a criteria carrying a row-count projection and return its
    /// single value, or `None` when no row came back.
    async fn unique_count(&self, criteria: &Criteria) -> AppResult<Option<i64>>;
}

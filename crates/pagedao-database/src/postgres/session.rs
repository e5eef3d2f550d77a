//! Query and criteria execution against a PostgreSQL pool.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};
use tracing::debug;

use pagedao_core::result::AppResult;
use pagedao_core::traits::{CriteriaExecutor, QueryExecutor, QueryLanguage};
use pagedao_core::types::criteria::Criteria;

use super::criteria::render;
use super::query::PgQuery;
use super::statement::build_query;

/// A session over a connection pool.
///
/// Each statement checks out its own connection, so a count and the fetch
/// that follows it may see different snapshots.
#[derive(Debug, Clone)]
pub struct PgSession {
    pool: PgPool,
}

impl PgSession {
    /// Create a session over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl QueryExecutor for PgSession {
    type Row = PgRow;
    type Query = PgQuery;

    fn prepare(&self, text: &str, language: QueryLanguage) -> AppResult<PgQuery> {
        Ok(PgQuery::new(self.pool.clone(), text, language))
    }
}

#[async_trait]
impl CriteriaExecutor for PgSession {
    type Row = PgRow;

    async fn list(&self, criteria: &Criteria) -> AppResult<Vec<PgRow>> {
        let (sql, values) = render(criteria)?;
        debug!(entity = criteria.entity(), sql = %sql, "Executing criteria");
        let rows = build_query(&sql, &values)?
            .persistent(criteria.is_cacheable())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn unique_count(&self, criteria: &Criteria) -> AppResult<Option<i64>> {
        let (sql, values) = render(criteria)?;
        debug!(entity = criteria.entity(), sql = %sql, "Counting criteria");
        let row = build_query(&sql, &values)?
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<i64, _>(0)?)),
            None => Ok(None),
        }
    }
}

//! Prepared text queries over a PostgreSQL pool.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};
use tracing::debug;

use pagedao_core::error::AppError;
use pagedao_core::result::AppResult;
use pagedao_core::traits::{BoundQuery, QueryLanguage};
use pagedao_core::types::parameter::ParamValue;

use super::statement::{Binding, NamedStatement, build_query};

/// A query text with named parameters waiting to be bound.
///
/// Both query languages are executed as PostgreSQL SQL; entity names in
/// query-language text are expected to be table names.
#[derive(Debug)]
pub struct PgQuery {
    pool: PgPool,
    language: QueryLanguage,
    statement: NamedStatement,
    bindings: HashMap<String, Binding>,
    window: Option<(u64, u64)>,
    cacheable: bool,
}

impl PgQuery {
    pub(crate) fn new(pool: PgPool, text: &str, language: QueryLanguage) -> Self {
        Self {
            pool,
            language,
            statement: NamedStatement::parse(text),
            bindings: HashMap::new(),
            window: None,
            cacheable: false,
        }
    }

    fn check_declared(&self, name: &str) -> AppResult<()> {
        if self.statement.declares(name) {
            Ok(())
        } else {
            Err(AppError::binding(format!(
                "could not locate named parameter [{name}]"
            )))
        }
    }

    /// Positional SQL and values, with the row window applied.
    fn render(&self) -> AppResult<(String, Vec<ParamValue>)> {
        let (mut sql, values) = self.statement.render(&self.bindings)?;
        if let Some((first, max)) = self.window {
            sql.push_str(&format!(" LIMIT {max} OFFSET {first}"));
        }
        debug!(language = ?self.language, sql = %sql, params = values.len(), "Executing query");
        Ok((sql, values))
    }
}

#[async_trait]
impl BoundQuery for PgQuery {
    type Row = PgRow;

    fn bind(&mut self, name: &str, value: &ParamValue) -> AppResult<()> {
        self.check_declared(name)?;
        self.bindings
            .insert(name.to_string(), Binding::Scalar(value.clone()));
        Ok(())
    }

    fn bind_list(&mut self, name: &str, values: &[ParamValue]) -> AppResult<()> {
        self.check_declared(name)?;
        self.bindings
            .insert(name.to_string(), Binding::List(values.to_vec()));
        Ok(())
    }

    fn set_offset_limit(&mut self, first: u64, max: u64) {
        self.window = Some((first, max));
    }

    fn set_cacheable(&mut self, cacheable: bool) {
        self.cacheable = cacheable;
    }

    async fn execute(self) -> AppResult<Vec<PgRow>> {
        let (sql, values) = self.render()?;
        let rows = build_query(&sql, &values)?
            .persistent(self.cacheable)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn execute_count(self) -> AppResult<Option<i64>> {
        let (sql, values) = self.render()?;
        let row = build_query(&sql, &values)?
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<i64, _>(0)?)),
            None => Ok(None),
        }
    }

    async fn execute_update(self) -> AppResult<u64> {
        let (sql, values) = self.render()?;
        let result = build_query(&sql, &values)?.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

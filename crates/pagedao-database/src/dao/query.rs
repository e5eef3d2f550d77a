//! Query-language and native SQL operations.

use tracing::debug;

use pagedao_core::error::AppError;
use pagedao_core::result::AppResult;
use pagedao_core::traits::{BoundQuery, FromQueryRow, QueryExecutor, QueryLanguage};
use pagedao_core::types::pagination::Page;
use pagedao_core::types::parameter::Parameter;

use super::{BaseDao, decode_rows, to_count};
use crate::binder::bind_parameters;
use crate::transform::{append_order_by, to_count_form};

impl<T> BaseDao<T> {
    /// Paged query-language search.
    ///
    /// Unless pagination is disabled or the count is skipped, a count query
    /// derived from `ql` runs first and an empty result returns immediately
    /// without issuing the fetch.
    pub async fn find_page<X, R>(
        &self,
        session: &X,
        page: Page<R>,
        ql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<Page<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        self.paged(session, page, ql, parameters, QueryLanguage::Ql)
            .await
    }

    /// Paged native SQL search; see [`BaseDao::find_page`].
    pub async fn find_page_by_sql<X, R>(
        &self,
        session: &X,
        page: Page<R>,
        sql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<Page<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        self.paged(session, page, sql, parameters, QueryLanguage::Native)
            .await
    }

    /// Run a query-language query and return every row.
    pub async fn find_list<X, R>(
        &self,
        session: &X,
        ql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<Vec<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        let query = prepare_bound(session, ql, parameters, QueryLanguage::Ql)?;
        decode_rows(query.execute().await?)
    }

    /// Run a native SQL query and return every row.
    pub async fn find_list_by_sql<X, R>(
        &self,
        session: &X,
        sql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<Vec<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        let query = prepare_bound(session, sql, parameters, QueryLanguage::Native)?;
        decode_rows(query.execute().await?)
    }

    /// Run a query-language query over the row window `first..first + max`.
    ///
    /// The engine is asked to cache the result.
    pub async fn find_range<X, R>(
        &self,
        session: &X,
        ql: &str,
        parameters: Option<&Parameter>,
        first: u64,
        max: u64,
    ) -> AppResult<Vec<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        let mut query = prepare_bound(session, ql, parameters, QueryLanguage::Ql)?;
        query.set_cacheable(true);
        query.set_offset_limit(first, max);
        decode_rows(query.execute().await?)
    }

    /// Run a native SQL query over the row window `first..first + max`.
    pub async fn find_range_by_sql<X, R>(
        &self,
        session: &X,
        sql: &str,
        parameters: Option<&Parameter>,
        first: u64,
        max: u64,
    ) -> AppResult<Vec<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        let mut query = prepare_bound(session, sql, parameters, QueryLanguage::Native)?;
        query.set_offset_limit(first, max);
        decode_rows(query.execute().await?)
    }

    /// Run a query-language query expected to match at most one row.
    pub async fn find_unique<X, R>(
        &self,
        session: &X,
        ql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<Option<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        let query = prepare_bound(session, ql, parameters, QueryLanguage::Ql)?;
        let mut rows = query.execute().await?;
        if rows.len() > 1 {
            return Err(AppError::execution(format!(
                "query did not return a unique result: {} rows",
                rows.len()
            )));
        }
        rows.pop().map(R::from_query_row).transpose()
    }

    /// Run a query-language count query; `0` when it returns no row.
    pub async fn get_count<X>(
        &self,
        session: &X,
        ql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<u64>
    where
        X: QueryExecutor,
    {
        count_with(session, ql, parameters, QueryLanguage::Ql).await
    }

    /// Run a native SQL count query; `0` when it returns no row.
    pub async fn get_count_by_sql<X>(
        &self,
        session: &X,
        sql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<u64>
    where
        X: QueryExecutor,
    {
        count_with(session, sql, parameters, QueryLanguage::Native).await
    }

    /// Run a query-language update or delete, returning affected rows.
    pub async fn execute_update<X>(
        &self,
        session: &X,
        ql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<u64>
    where
        X: QueryExecutor,
    {
        let query = prepare_bound(session, ql, parameters, QueryLanguage::Ql)?;
        query.execute_update().await
    }

    /// Run a native SQL update or delete, returning affected rows.
    pub async fn execute_update_by_sql<X>(
        &self,
        session: &X,
        sql: &str,
        parameters: Option<&Parameter>,
    ) -> AppResult<u64>
    where
        X: QueryExecutor,
    {
        let query = prepare_bound(session, sql, parameters, QueryLanguage::Native)?;
        query.execute_update().await
    }

    /// Whether a table with the given name exists.
    pub async fn table_exists<X>(&self, session: &X, table: &str) -> AppResult<bool>
    where
        X: QueryExecutor,
    {
        let count = self
            .get_count_by_sql(
                session,
                "select count(*) from information_schema.tables where table_name = :p1",
                Some(&Parameter::positional([table])),
            )
            .await?;
        Ok(count > 0)
    }

    async fn paged<X, R>(
        &self,
        session: &X,
        mut page: Page<R>,
        text: &str,
        parameters: Option<&Parameter>,
        language: QueryLanguage,
    ) -> AppResult<Page<R>>
    where
        X: QueryExecutor,
        R: FromQueryRow<X::Row>,
    {
        if page.needs_count() {
            let count_text = to_count_form(text)?;
            let count = count_with(session, &count_text, parameters, language).await?;
            page.set_count(count);
            if count < 1 {
                debug!(query = %count_text, "Count is zero, skipping fetch");
                return Ok(page);
            }
        }

        let text = append_order_by(text, page.order_by())?;
        let mut query = prepare_bound(session, &text, parameters, language)?;
        if !page.is_disabled() {
            query.set_offset_limit(page.first_result(), page.max_results());
        }

        let rows = query.execute().await?;
        debug!(
            query = %text,
            first = page.first_result(),
            fetched = rows.len(),
            count = ?page.count(),
            "Fetched page"
        );
        page.set_items(decode_rows(rows)?);
        Ok(page)
    }
}

fn prepare_bound<X>(
    session: &X,
    text: &str,
    parameters: Option<&Parameter>,
    language: QueryLanguage,
) -> AppResult<X::Query>
where
    X: QueryExecutor,
{
    let mut query = session.prepare(text, language)?;
    bind_parameters(&mut query, parameters)?;
    Ok(query)
}

async fn count_with<X>(
    session: &X,
    text: &str,
    parameters: Option<&Parameter>,
    language: QueryLanguage,
) -> AppResult<u64>
where
    X: QueryExecutor,
{
    let query = prepare_bound(session, text, parameters, language)?;
    let count = to_count(query.execute_count().await?)?;
    debug!(query = %text, count, "Counted rows");
    Ok(count)
}

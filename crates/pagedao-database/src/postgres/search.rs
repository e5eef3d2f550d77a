//! Full-text index over PostgreSQL text search.
//!
//! Each searchable field gets a GIN expression index on
//! `to_tsvector(language, coalesce(field::text, ''))`. Queries use the same
//! expression so the planner can pick the index up.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Row};
use tracing::{debug, info};

use pagedao_core::config::SearchConfig;
use pagedao_core::error::AppError;
use pagedao_core::result::AppResult;
use pagedao_core::traits::FullTextIndex;
use pagedao_core::types::parameter::ParamValue;
use pagedao_core::types::search::{Occur, SearchClause, SearchHits, SearchQuery, SearchRequest};

use super::statement::build_query;
use crate::transform::validate_identifier;

/// SQLSTATE raised when a statement is cancelled.
const QUERY_CANCELED: &str = "57014";

/// Full-text index over one table.
#[derive(Debug)]
pub struct PgFullTextIndex<H> {
    pool: PgPool,
    table: String,
    fields: Vec<String>,
    language: String,
    rebuild_timeout: Duration,
    hit: PhantomData<fn() -> H>,
}

impl<H> PgFullTextIndex<H> {
    /// Index `fields` of `table`, with language and rebuild timeout taken
    /// from configuration.
    pub fn new(
        pool: PgPool,
        table: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
        config: &SearchConfig,
    ) -> AppResult<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        let fields = fields
            .into_iter()
            .map(|f| -> AppResult<String> {
                let f: String = f.into();
                validate_identifier(&f)?;
                Ok(f)
            })
            .collect::<AppResult<Vec<_>>>()?;
        validate_identifier(&config.language)?;

        Ok(Self {
            pool,
            table,
            fields,
            language: config.language.clone(),
            rebuild_timeout: config.rebuild_timeout(),
            hit: PhantomData,
        })
    }

    /// Indexed fields.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn document(&self, field: &str) -> String {
        format!(
            "to_tsvector('{}', coalesce({field}::text, ''))",
            self.language
        )
    }

    fn matches(&self, clause: &SearchClause, values: &mut Vec<ParamValue>) -> AppResult<String> {
        let field = validate_identifier(&clause.field)?;
        values.push(ParamValue::Text(clause.text.clone()));
        Ok(format!(
            "{} @@ plainto_tsquery('{}', ${})",
            self.document(field),
            self.language,
            values.len()
        ))
    }

    /// Render a boolean query as a `WHERE` condition.
    ///
    /// `Should` clauses are required only when no `Must` clause exists and are
    /// left out of the condition otherwise. Returns `None` when the query has
    /// no positive clause and so matches nothing. Values are pushed only for
    /// placeholders that end up in the condition.
    pub(crate) fn condition(
        &self,
        query: &SearchQuery,
        values: &mut Vec<ParamValue>,
    ) -> AppResult<Option<String>> {
        let has_must = query.clauses.iter().any(|c| c.occur == Occur::Must);
        let has_should = query.clauses.iter().any(|c| c.occur == Occur::Should);
        if !has_must && !has_should {
            return Ok(None);
        }

        let mut required = Vec::new();
        let mut should = Vec::new();
        let mut must_not = Vec::new();
        for clause in &query.clauses {
            match clause.occur {
                Occur::Must => required.push(self.matches(clause, values)?),
                Occur::Should if !has_must => should.push(self.matches(clause, values)?),
                Occur::Should => {}
                Occur::MustNot => {
                    must_not.push(format!("NOT ({})", self.matches(clause, values)?))
                }
            }
        }

        if !should.is_empty() {
            required.push(format!("({})", should.join(" OR ")));
        }
        required.extend(must_not);
        Ok(Some(required.join(" AND ")))
    }

    /// Relevance of positive clauses, summed; `None` without any.
    fn rank(&self, query: &SearchQuery, values: &mut Vec<ParamValue>) -> AppResult<Option<String>> {
        let ranks = query
            .clauses
            .iter()
            .filter(|c| c.occur != Occur::MustNot)
            .map(|clause| -> AppResult<String> {
                let field = validate_identifier(&clause.field)?;
                values.push(ParamValue::Text(clause.text.clone()));
                Ok(format!(
                    "ts_rank({}, plainto_tsquery('{}', ${}))",
                    self.document(field),
                    self.language,
                    values.len()
                ))
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok((!ranks.is_empty()).then(|| ranks.join(" + ")))
    }

    /// Build the count and fetch statements for a request.
    ///
    /// Returns `None` when the query or the filter matches nothing.
    pub(crate) fn statements(
        &self,
        request: &SearchRequest,
    ) -> AppResult<Option<SearchStatements>> {
        let mut values = Vec::new();
        let Some(mut condition) = self.condition(&request.query, &mut values)? else {
            return Ok(None);
        };
        if let Some(filter) = &request.filter {
            let Some(filtered) = self.condition(&filter.query, &mut values)? else {
                return Ok(None);
            };
            condition = format!("({condition}) AND ({filtered})");
        }
        let count = format!("SELECT COUNT(*) FROM {} WHERE {condition}", self.table);
        let count_values = values.clone();

        let order = if request.sort.is_empty() {
            self.rank(&request.query, &mut values)?
                .map(|rank| format!("{rank} DESC"))
        } else {
            let sort = request
                .sort
                .iter()
                .map(|s| validate_identifier(&s.field).map(|_| s.to_sql()))
                .collect::<AppResult<Vec<_>>>()?;
            Some(sort.join(", "))
        };
        let mut fetch = format!("SELECT * FROM {} WHERE {condition}", self.table);
        if let Some(order) = order {
            fetch.push_str(&format!(" ORDER BY {order}"));
        }
        match request.max_results {
            Some(max) => fetch.push_str(&format!(" LIMIT {max} OFFSET {}", request.first_result)),
            None if request.first_result > 0 => {
                fetch.push_str(&format!(" OFFSET {}", request.first_result))
            }
            None => {}
        }

        Ok(Some(SearchStatements {
            count,
            count_values,
            fetch,
            fetch_values: values,
        }))
    }

    async fn ensure_field_indexes(&self) -> AppResult<()> {
        for field in &self.fields {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {}_{}_fts_idx ON {} USING GIN ({})",
                self.table,
                field.replace('.', "_"),
                self.table,
                self.document(field)
            );
            debug!(sql = %sql, "Ensuring full-text index");
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Count and fetch statements of one search, each with its own values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchStatements {
    pub count: String,
    pub count_values: Vec<ParamValue>,
    pub fetch: String,
    pub fetch_values: Vec<ParamValue>,
}

/// Map a cancelled rebuild to an interruption.
fn rebuild_error(err: AppError) -> AppError {
    let cancelled = matches!(
        err.source.as_deref().and_then(|s| s.downcast_ref::<sqlx::Error>()),
        Some(sqlx::Error::Database(db)) if db.code().as_deref() == Some(QUERY_CANCELED)
    );
    if cancelled {
        AppError::indexing_interrupted(format!("index rebuild cancelled: {}", err.message))
    } else {
        err
    }
}

#[async_trait]
impl<H> FullTextIndex for PgFullTextIndex<H>
where
    H: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    type Hit = H;

    fn entity(&self) -> &str {
        &self.table
    }

    async fn query(&self, request: &SearchRequest) -> AppResult<SearchHits<H>> {
        // Hits are read straight from the table, which satisfies both lookup
        // strategies.
        debug!(
            entity = %self.table,
            lookup = ?request.lookup,
            retrieval = ?request.retrieval,
            "Running full-text query"
        );
        let Some(statements) = self.statements(request)? else {
            debug!(entity = %self.table, "Query has no positive clause, skipping search");
            return Ok(SearchHits {
                result_size: 0,
                hits: Vec::new(),
            });
        };

        let result_size = build_query(&statements.count, &statements.count_values)?
            .fetch_one(&self.pool)
            .await?
            .try_get::<i64, _>(0)?;
        let result_size = u64::try_from(result_size).unwrap_or(0);

        let rows = build_query(&statements.fetch, &statements.fetch_values)?
            .fetch_all(&self.pool)
            .await?;
        let hits = rows
            .iter()
            .map(|row| H::from_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SearchHits { result_size, hits })
    }

    async fn rebuild(&self) -> AppResult<()> {
        let work = async {
            self.ensure_field_indexes().await?;
            let sql = format!("REINDEX TABLE {}", self.table);
            sqlx::query(&sql).execute(&self.pool).await?;
            Ok::<_, AppError>(())
        };

        let outcome = match tokio::time::timeout(self.rebuild_timeout, work).await {
            Ok(result) => result.map_err(rebuild_error),
            Err(_) => Err(AppError::indexing_interrupted(format!(
                "index rebuild of {} exceeded {:?}",
                self.table, self.rebuild_timeout
            ))),
        };
        outcome?;
        info!(entity = %self.table, fields = self.fields.len(), "Reindexed table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedao_core::error::ErrorKind;
    use pagedao_core::types::search::{DatabaseRetrieval, ObjectLookup, SearchFilter};
    use pagedao_core::types::sorting::SortField;

    fn index() -> PgFullTextIndex<()> {
        let pool = PgPool::connect_lazy("postgres://localhost/pagedao").unwrap();
        PgFullTextIndex::new(pool, "articles", ["title", "body"], &SearchConfig::default()).unwrap()
    }

    fn request(query: SearchQuery) -> SearchRequest {
        SearchRequest {
            query,
            filter: None,
            sort: Vec::new(),
            first_result: 20,
            max_results: Some(10),
            lookup: ObjectLookup::PersistenceContext,
            retrieval: DatabaseRetrieval::Query,
        }
    }

    /// Distinct `$n` placeholder numbers in `sql`, ascending.
    fn placeholders(sql: &str) -> Vec<usize> {
        let mut found = Vec::new();
        let mut chars = sql.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                continue;
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            if let Ok(n) = digits.parse() {
                found.push(n);
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    fn assert_bindable(sql: &str, values: &[ParamValue]) {
        let expected: Vec<usize> = (1..=values.len()).collect();
        assert_eq!(placeholders(sql), expected, "{sql}");
    }

    #[tokio::test]
    async fn test_condition_drops_should_beside_must() {
        let index = index();
        let mut values = Vec::new();
        let query = SearchQuery::new([
            SearchClause::must("title", "rust"),
            SearchClause::should("body", "async"),
            SearchClause::must_not("body", "java"),
        ]);
        let condition = index.condition(&query, &mut values).unwrap().unwrap();
        assert_eq!(
            condition,
            "to_tsvector('english', coalesce(title::text, '')) @@ plainto_tsquery('english', $1) AND \
             NOT (to_tsvector('english', coalesce(body::text, '')) @@ plainto_tsquery('english', $2))"
        );
        assert_eq!(
            values,
            vec![ParamValue::Text("rust".into()), ParamValue::Text("java".into())]
        );
    }

    #[tokio::test]
    async fn test_condition_should_only_and_negative_only() {
        let index = index();
        let mut values = Vec::new();
        let should = SearchQuery::new([
            SearchClause::should("title", "a"),
            SearchClause::should("body", "b"),
            SearchClause::must_not("body", "c"),
        ]);
        let condition = index.condition(&should, &mut values).unwrap().unwrap();
        assert!(condition.starts_with('('));
        assert!(condition.contains(" OR "));
        assert!(condition.ends_with("$3))"));
        assert_eq!(values.len(), 3);

        let mut values = Vec::new();
        let negative = SearchQuery::new([SearchClause::must_not("title", "a")]);
        assert!(index.condition(&negative, &mut values).unwrap().is_none());
        assert!(
            index
                .condition(&SearchQuery::default(), &mut values)
                .unwrap()
                .is_none()
        );
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_statements_placeholders_match_values() {
        let index = index();
        let shapes = [
            vec![
                SearchClause::must("title", "rust"),
                SearchClause::should("body", "async"),
            ],
            vec![
                SearchClause::should("title", "rust"),
                SearchClause::should("body", "async"),
            ],
            vec![
                SearchClause::must("title", "rust"),
                SearchClause::should("body", "async"),
                SearchClause::must_not("body", "java"),
            ],
            vec![
                SearchClause::should("title", "rust"),
                SearchClause::must_not("body", "java"),
            ],
        ];
        let filters = [
            None,
            Some(SearchFilter::cached(SearchQuery::new([
                SearchClause::must("body", "tokio"),
                SearchClause::should("title", "ignored"),
            ]))),
        ];
        let sorts = [Vec::new(), vec![SortField::asc("id")]];

        for clauses in &shapes {
            for filter in &filters {
                for sort in &sorts {
                    let mut req = request(SearchQuery::new(clauses.clone()));
                    req.filter = filter.clone();
                    req.sort = sort.clone();

                    let statements = index.statements(&req).unwrap().unwrap();
                    assert_bindable(&statements.count, &statements.count_values);
                    assert_bindable(&statements.fetch, &statements.fetch_values);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_statements_match_nothing() {
        let index = index();
        let negative = request(SearchQuery::new([SearchClause::must_not("title", "java")]));
        assert!(index.statements(&negative).unwrap().is_none());

        let mut filtered = request(SearchQuery::new([SearchClause::must("title", "rust")]));
        filtered.filter = Some(SearchFilter::cached(SearchQuery::new([
            SearchClause::must_not("body", "java"),
        ])));
        assert!(index.statements(&filtered).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_statements_window_and_sort() {
        let index = index();
        let mut req = request(SearchQuery::new([SearchClause::must("title", "rust")]));
        req.filter = Some(SearchFilter::cached(SearchQuery::new([SearchClause::must(
            "body", "tokio",
        )])));

        let statements = index.statements(&req).unwrap().unwrap();
        assert!(statements.count.starts_with("SELECT COUNT(*) FROM articles WHERE ("));
        assert_eq!(statements.count_values.len(), 2);
        assert!(statements.fetch.contains("ORDER BY ts_rank("));
        assert!(statements.fetch.ends_with("DESC LIMIT 10 OFFSET 20"));
        // query, filter, rank
        assert_eq!(statements.fetch_values.len(), 3);

        req.sort = vec![SortField::desc("published_at")];
        req.max_results = None;
        let statements = index.statements(&req).unwrap().unwrap();
        assert!(statements.fetch.ends_with("ORDER BY published_at DESC OFFSET 20"));
        assert_eq!(statements.fetch_values, statements.count_values);
    }

    #[tokio::test]
    async fn test_rejects_bad_identifiers() {
        let pool = PgPool::connect_lazy("postgres://localhost/pagedao").unwrap();
        let err = PgFullTextIndex::<()>::new(pool, "articles", ["title)"], &SearchConfig::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}

//! Full-text search operations.

use tracing::{info, warn};

use pagedao_core::error::ErrorKind;
use pagedao_core::result::AppResult;
use pagedao_core::traits::FullTextIndex;
use pagedao_core::types::pagination::Page;
use pagedao_core::types::search::{
    DatabaseRetrieval, ObjectLookup, SearchClause, SearchFilter, SearchQuery, SearchRequest,
};
use pagedao_core::types::sorting::SortField;

use super::BaseDao;

impl<T> BaseDao<T> {
    /// Build a boolean keyword query from clauses.
    pub fn full_text_query(&self, clauses: impl IntoIterator<Item = SearchClause>) -> SearchQuery {
        SearchQuery::new(clauses)
    }

    /// Paged keyword search.
    ///
    /// `filter` restricts hits and is cached by the index. The page count is
    /// the index's result-size estimate. Hits are resolved from the current
    /// unit of work first, then by re-querying the store; the shared object
    /// cache is never consulted.
    pub async fn search<I>(
        &self,
        index: &I,
        mut page: Page<I::Hit>,
        query: SearchQuery,
        filter: Option<SearchQuery>,
        sort: &[SortField],
    ) -> AppResult<Page<I::Hit>>
    where
        I: FullTextIndex,
    {
        let request = SearchRequest {
            query,
            filter: filter.map(SearchFilter::cached),
            sort: sort.to_vec(),
            first_result: page.first_result(),
            max_results: (!page.is_disabled()).then(|| page.max_results()),
            lookup: ObjectLookup::PersistenceContext,
            retrieval: DatabaseRetrieval::Query,
        };

        let hits = index.query(&request).await?;
        page.set_count(hits.result_size);
        page.set_items(hits.hits);
        Ok(page)
    }

    /// Rebuild the index, blocking until it completes.
    ///
    /// Every failure, interruption included, is returned to the caller.
    pub async fn rebuild_index<I>(&self, index: &I) -> AppResult<()>
    where
        I: FullTextIndex,
    {
        info!(entity = index.entity(), "Rebuilding full-text index");
        index.rebuild().await?;
        info!(entity = index.entity(), "Full-text index rebuilt");
        Ok(())
    }

    /// Rebuild the index, logging an interruption instead of returning it.
    ///
    /// After an interruption the index may be partially rebuilt; callers that
    /// need to know should use [`BaseDao::rebuild_index`].
    pub async fn create_index<I>(&self, index: &I) -> AppResult<()>
    where
        I: FullTextIndex,
    {
        match self.rebuild_index(index).await {
            Err(e) if e.is(ErrorKind::IndexingInterrupted) => {
                warn!(entity = index.entity(), error = %e, "Full-text index rebuild interrupted");
                Ok(())
            }
            other => other,
        }
    }
}

//! Structured criteria operations.

use tracing::debug;

use pagedao_core::result::AppResult;
use pagedao_core::traits::{CriteriaExecutor, Entity, FromQueryRow};
use pagedao_core::types::criteria::{Criteria, Restriction, ResultShaping};
use pagedao_core::types::pagination::Page;

use super::{BaseDao, decode_rows, to_count};

impl<T: Entity> BaseDao<T> {
    /// Create a detached criteria for `T` with the given restrictions.
    pub fn criteria(&self, restrictions: impl IntoIterator<Item = Restriction>) -> Criteria {
        restrictions
            .into_iter()
            .fold(Criteria::for_entity(T::entity_name()), Criteria::add)
    }

    /// Paged search over every `T`.
    pub async fn find_entity_page<X, R>(&self, session: &X, page: Page<R>) -> AppResult<Page<R>>
    where
        X: CriteriaExecutor,
        R: FromQueryRow<X::Row>,
    {
        let criteria = self.criteria(std::iter::empty());
        self.find_criteria_page(session, page, &criteria).await
    }
}

impl<T> BaseDao<T> {
    /// Paged criteria search with distinct-root-entity shaping.
    pub async fn find_criteria_page<X, R>(
        &self,
        session: &X,
        page: Page<R>,
        criteria: &Criteria,
    ) -> AppResult<Page<R>>
    where
        X: CriteriaExecutor,
        R: FromQueryRow<X::Row>,
    {
        self.find_criteria_page_with(session, page, criteria, ResultShaping::DistinctRootEntity, false)
            .await
    }

    /// Like [`BaseDao::find_criteria_page`], asking the executor to cache.
    pub async fn find_criteria_page_cacheable<X, R>(
        &self,
        session: &X,
        page: Page<R>,
        criteria: &Criteria,
    ) -> AppResult<Page<R>>
    where
        X: CriteriaExecutor,
        R: FromQueryRow<X::Row>,
    {
        self.find_criteria_page_with(session, page, criteria, ResultShaping::DistinctRootEntity, true)
            .await
    }

    /// Paged criteria search.
    ///
    /// The caller's criteria is left untouched: counting and fetching work
    /// on an attached copy. Page orderings follow the criteria's own.
    pub async fn find_criteria_page_with<X, R>(
        &self,
        session: &X,
        mut page: Page<R>,
        criteria: &Criteria,
        shaping: ResultShaping,
        cacheable: bool,
    ) -> AppResult<Page<R>>
    where
        X: CriteriaExecutor,
        R: FromQueryRow<X::Row>,
    {
        let mut executable = criteria.clone();

        if page.needs_count() {
            let count = self.count_criteria(session, &mut executable).await?;
            page.set_count(count);
            if count < 1 {
                debug!(entity = executable.entity(), "Count is zero, skipping fetch");
                return Ok(page);
            }
        }

        if cacheable {
            executable.set_cacheable(true);
        }
        executable.set_result_shaping(shaping);
        if !page.is_disabled() {
            executable.set_window(page.first_result(), page.max_results());
        }
        for ordering in page.order_by() {
            executable.add_order(ordering.clone());
        }

        let rows = session.list(&executable).await?;
        debug!(
            entity = executable.entity(),
            first = page.first_result(),
            fetched = rows.len(),
            count = ?page.count(),
            "Fetched criteria page"
        );
        page.set_items(decode_rows(rows)?);
        Ok(page)
    }

    /// Unpaged criteria search with distinct-root-entity shaping.
    pub async fn find_by_criteria<X, R>(&self, session: &X, criteria: &Criteria) -> AppResult<Vec<R>>
    where
        X: CriteriaExecutor,
        R: FromQueryRow<X::Row>,
    {
        self.find_by_criteria_with(session, criteria, ResultShaping::DistinctRootEntity)
            .await
    }

    /// Unpaged criteria search with the given shaping.
    pub async fn find_by_criteria_with<X, R>(
        &self,
        session: &X,
        criteria: &Criteria,
        shaping: ResultShaping,
    ) -> AppResult<Vec<R>>
    where
        X: CriteriaExecutor,
        R: FromQueryRow<X::Row>,
    {
        let mut executable = criteria.clone();
        executable.set_result_shaping(shaping);
        decode_rows(session.list(&executable).await?)
    }

    /// Count the rows matching `criteria`.
    ///
    /// Orderings are removed and a row-count projection set for the duration
    /// of the call; both are restored before returning, also on failure.
    pub async fn count_criteria<X>(&self, session: &X, criteria: &mut Criteria) -> AppResult<u64>
    where
        X: CriteriaExecutor,
    {
        let scope = criteria.count_scope();
        let raw = session.unique_count(&scope).await;
        drop(scope);
        let count = to_count(raw?)?;
        debug!(entity = criteria.entity(), count, "Counted criteria rows");
        Ok(count)
    }
}

//! Paged criteria queries against a recording criteria executor.

mod common;

use common::{Item, Note, StubCriteria};
use pagedao_core::error::ErrorKind;
use pagedao_core::types::criteria::{Criteria, Projection, Restriction, ResultShaping};
use pagedao_core::types::pagination::Page;
use pagedao_core::types::sorting::SortField;
use pagedao_database::BaseDao;

fn ordered_criteria() -> Criteria {
    Criteria::for_entity("notes")
        .add(Restriction::eq("owner", "alice"))
        .order(SortField::desc("created_at"))
        .order(SortField::asc("title"))
}

#[tokio::test]
async fn test_count_restores_orderings_on_success() {
    let executor = StubCriteria::with_rows(7);
    let mut criteria = ordered_criteria();

    let count = BaseDao::<Note>::new()
        .count_criteria(&executor, &mut criteria)
        .await
        .unwrap();

    assert_eq!(count, 7);
    assert_eq!(
        criteria.orderings(),
        &[SortField::desc("created_at"), SortField::asc("title")]
    );
    assert_eq!(criteria.projection(), None);

    let log = executor.log.lock().unwrap();
    assert_eq!(log.counted, vec![(Vec::new(), Some(Projection::RowCount))]);
}

#[tokio::test]
async fn test_count_restores_orderings_on_failure() {
    let executor = StubCriteria::with_rows(7).failing_count();
    let mut criteria = ordered_criteria();

    let err = BaseDao::<Note>::new()
        .count_criteria(&executor, &mut criteria)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Execution);
    assert_eq!(
        criteria.orderings(),
        &[SortField::desc("created_at"), SortField::asc("title")]
    );
    assert_eq!(criteria.projection(), None);
}

#[tokio::test]
async fn test_page_window_and_orderings() {
    let executor = StubCriteria::with_rows(25);
    let criteria = ordered_criteria();
    let page = Page::new(2, 10)
        .unwrap()
        .with_order_by(vec![SortField::asc("id")]);

    let page = BaseDao::<Note>::new()
        .find_criteria_page::<_, Item>(&executor, page, &criteria)
        .await
        .unwrap();

    assert_eq!(page.count(), Some(25));
    assert_eq!(page.items().len(), 5);
    // Caller's criteria is untouched.
    assert_eq!(criteria, ordered_criteria());

    let log = executor.log.lock().unwrap();
    assert_eq!(log.listed.len(), 1);
    let executed = &log.listed[0];
    assert_eq!(executed.window(), Some((20, 10)));
    assert_eq!(
        executed.orderings(),
        &[
            SortField::desc("created_at"),
            SortField::asc("title"),
            SortField::asc("id")
        ]
    );
    assert_eq!(executed.result_shaping(), ResultShaping::DistinctRootEntity);
    assert_eq!(executed.projection(), None);
    assert!(!executed.is_cacheable());
}

#[tokio::test]
async fn test_zero_count_skips_list() {
    let executor = StubCriteria::with_rows(0);
    let page = BaseDao::<Note>::new()
        .find_entity_page::<_, Item>(&executor, Page::new(0, 10).unwrap())
        .await
        .unwrap();

    assert_eq!(page.count(), Some(0));
    assert!(page.items().is_empty());
    assert!(executor.log.lock().unwrap().listed.is_empty());
}

#[tokio::test]
async fn test_cacheable_and_unpaged() {
    let executor = StubCriteria::with_rows(12);
    let criteria = BaseDao::<Note>::new().criteria([Restriction::is_not_null("title")]);
    assert_eq!(criteria.entity(), "notes");

    let page = BaseDao::<Note>::new()
        .find_criteria_page_cacheable::<_, Item>(&executor, Page::unpaged(), &criteria)
        .await
        .unwrap();

    assert_eq!(page.items().len(), 12);
    assert_eq!(page.count(), None);
    let log = executor.log.lock().unwrap();
    assert!(log.counted.is_empty());
    assert!(log.listed[0].is_cacheable());
    assert_eq!(log.listed[0].window(), None);
}

#[tokio::test]
async fn test_unpaged_list_with_root_shaping() {
    let executor = StubCriteria::with_rows(3);
    let rows: Vec<Item> = BaseDao::<Note>::new()
        .find_by_criteria_with(&executor, &ordered_criteria(), ResultShaping::RootEntity)
        .await
        .unwrap();

    assert_eq!(rows, vec![Item(1), Item(2), Item(3)]);
    let log = executor.log.lock().unwrap();
    assert_eq!(log.listed[0].result_shaping(), ResultShaping::RootEntity);
}

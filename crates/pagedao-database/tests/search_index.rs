//! Full-text search and index rebuilds against a canned index.

mod common;

use common::{Item, Note, StubIndex};
use pagedao_core::error::ErrorKind;
use pagedao_core::types::pagination::Page;
use pagedao_core::types::search::{DatabaseRetrieval, ObjectLookup, SearchClause};
use pagedao_core::types::sorting::SortField;
use pagedao_database::BaseDao;

#[tokio::test]
async fn test_search_window_and_count() {
    let index = StubIndex {
        result_size: 25,
        hits: (1..=25).collect(),
        ..StubIndex::default()
    };
    let dao = BaseDao::<Note>::new();
    let query = dao.full_text_query([
        SearchClause::must("title", "rust"),
        SearchClause::must_not("title", "java"),
    ]);
    let filter = dao.full_text_query([SearchClause::must("owner", "alice")]);

    let page = dao
        .search(
            &index,
            Page::new(2, 10).unwrap(),
            query.clone(),
            Some(filter.clone()),
            &[SortField::desc("created_at")],
        )
        .await
        .unwrap();

    assert_eq!(page.count(), Some(25));
    assert_eq!(page.items(), &[Item(21), Item(22), Item(23), Item(24), Item(25)]);

    let requests = index.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.query, query);
    let applied = request.filter.as_ref().unwrap();
    assert!(applied.cached);
    assert_eq!(applied.query, filter);
    assert_eq!(request.first_result, 20);
    assert_eq!(request.max_results, Some(10));
    assert_eq!(request.sort, vec![SortField::desc("created_at")]);
    assert_eq!(request.lookup, ObjectLookup::PersistenceContext);
    assert_eq!(request.retrieval, DatabaseRetrieval::Query);
}

#[tokio::test]
async fn test_unpaged_search_has_no_limit() {
    let index = StubIndex {
        result_size: 4,
        hits: vec![1, 2, 3, 4],
        ..StubIndex::default()
    };
    let dao = BaseDao::<Note>::new();
    let page = dao
        .search(
            &index,
            Page::unpaged(),
            dao.full_text_query([SearchClause::should("title", "notes")]),
            None,
            &[],
        )
        .await
        .unwrap();

    assert_eq!(page.items().len(), 4);
    let requests = index.requests.lock().unwrap();
    assert_eq!(requests[0].max_results, None);
    assert!(requests[0].filter.is_none());
}

#[tokio::test]
async fn test_rebuild_index_propagates_interruption() {
    let index = StubIndex {
        rebuild_failure: Some(ErrorKind::IndexingInterrupted),
        ..StubIndex::default()
    };
    let err = BaseDao::<Note>::new()
        .rebuild_index(&index)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::IndexingInterrupted);
}

#[tokio::test]
async fn test_create_index_swallows_only_interruption() {
    let dao = BaseDao::<Note>::new();

    let interrupted = StubIndex {
        rebuild_failure: Some(ErrorKind::IndexingInterrupted),
        ..StubIndex::default()
    };
    dao.create_index(&interrupted).await.unwrap();
    assert_eq!(*interrupted.rebuilds.lock().unwrap(), 1);

    let broken = StubIndex {
        rebuild_failure: Some(ErrorKind::Execution),
        ..StubIndex::default()
    };
    let err = dao.create_index(&broken).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Execution);

    dao.create_index(&StubIndex::default()).await.unwrap();
}

//! In-memory collaborators that record every call made through them.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pagedao_core::error::{AppError, ErrorKind};
use pagedao_core::result::AppResult;
use pagedao_core::traits::{
    BoundQuery, CriteriaExecutor, Entity, EntityStore, FromQueryRow, FullTextIndex, QueryExecutor,
    QueryLanguage,
};
use pagedao_core::types::criteria::{Criteria, Projection};
use pagedao_core::types::parameter::ParamValue;
use pagedao_core::types::search::{SearchHits, SearchRequest};
use pagedao_core::types::sorting::SortField;

/// Engine row produced by the stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubRow(pub i64);

/// Caller row decoded from [`StubRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item(pub i64);

impl FromQueryRow<StubRow> for Item {
    fn from_query_row(row: StubRow) -> AppResult<Self> {
        Ok(Item(row.0))
    }
}

/// Everything the query stub was asked to do.
#[derive(Debug, Default)]
pub struct QueryLog {
    pub prepared: Vec<(String, QueryLanguage)>,
    pub binds: Vec<(String, ParamValue)>,
    pub list_binds: Vec<(String, Vec<ParamValue>)>,
    pub windows: Vec<(u64, u64)>,
    pub cacheable: Vec<bool>,
    pub count_calls: usize,
    pub fetch_calls: usize,
    pub update_calls: usize,
}

/// Query executor over a fixed list of rows.
///
/// Counts report the number of rows, fetches return the requested window.
#[derive(Debug, Clone, Default)]
pub struct StubSession {
    rows: Vec<i64>,
    fail_fetch: bool,
    pub log: Arc<Mutex<QueryLog>>,
}

impl StubSession {
    pub fn with_rows(total: i64) -> Self {
        Self {
            rows: (1..=total).collect(),
            ..Self::default()
        }
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, QueryLog> {
        self.log.lock().unwrap()
    }
}

impl QueryExecutor for StubSession {
    type Row = StubRow;
    type Query = StubQuery;

    fn prepare(&self, text: &str, language: QueryLanguage) -> AppResult<StubQuery> {
        self.log()
            .prepared
            .push((text.to_string(), language));
        Ok(StubQuery {
            text: text.to_string(),
            rows: self.rows.clone(),
            fail_fetch: self.fail_fetch,
            window: None,
            log: Arc::clone(&self.log),
        })
    }
}

pub struct StubQuery {
    text: String,
    rows: Vec<i64>,
    fail_fetch: bool,
    window: Option<(u64, u64)>,
    log: Arc<Mutex<QueryLog>>,
}

impl StubQuery {
    fn check_declared(&self, name: &str) -> AppResult<()> {
        if self.text.contains(&format!(":{name}")) {
            Ok(())
        } else {
            Err(AppError::binding(format!(
                "could not locate named parameter [{name}]"
            )))
        }
    }
}

#[async_trait]
impl BoundQuery for StubQuery {
    type Row = StubRow;

    fn bind(&mut self, name: &str, value: &ParamValue) -> AppResult<()> {
        self.check_declared(name)?;
        self.log
            .lock()
            .unwrap()
            .binds
            .push((name.to_string(), value.clone()));
        Ok(())
    }

    fn bind_list(&mut self, name: &str, values: &[ParamValue]) -> AppResult<()> {
        self.check_declared(name)?;
        self.log
            .lock()
            .unwrap()
            .list_binds
            .push((name.to_string(), values.to_vec()));
        Ok(())
    }

    fn set_offset_limit(&mut self, first: u64, max: u64) {
        self.window = Some((first, max));
        self.log.lock().unwrap().windows.push((first, max));
    }

    fn set_cacheable(&mut self, cacheable: bool) {
        self.log.lock().unwrap().cacheable.push(cacheable);
    }

    async fn execute(self) -> AppResult<Vec<StubRow>> {
        self.log.lock().unwrap().fetch_calls += 1;
        if self.fail_fetch {
            return Err(AppError::execution("fetch failed"));
        }
        let rows = self.rows.iter().copied().map(StubRow);
        Ok(match self.window {
            Some((first, max)) => rows.skip(first as usize).take(max as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn execute_count(self) -> AppResult<Option<i64>> {
        self.log.lock().unwrap().count_calls += 1;
        Ok(Some(self.rows.len() as i64))
    }

    async fn execute_update(self) -> AppResult<u64> {
        self.log.lock().unwrap().update_calls += 1;
        Ok(self.rows.len() as u64)
    }
}

/// What the criteria stub saw on each call.
#[derive(Debug, Default)]
pub struct CriteriaLog {
    pub counted: Vec<(Vec<SortField>, Option<Projection>)>,
    pub listed: Vec<Criteria>,
}

/// Criteria executor over a fixed number of rows.
#[derive(Debug, Default)]
pub struct StubCriteria {
    total: i64,
    fail_count: bool,
    pub log: Mutex<CriteriaLog>,
}

impl StubCriteria {
    pub fn with_rows(total: i64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }
}

#[async_trait]
impl CriteriaExecutor for StubCriteria {
    type Row = StubRow;

    async fn list(&self, criteria: &Criteria) -> AppResult<Vec<StubRow>> {
        self.log.lock().unwrap().listed.push(criteria.clone());
        let rows = (1..=self.total).map(StubRow);
        Ok(match criteria.window() {
            Some((first, max)) => rows.skip(first as usize).take(max as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn unique_count(&self, criteria: &Criteria) -> AppResult<Option<i64>> {
        self.log
            .lock()
            .unwrap()
            .counted
            .push((criteria.orderings().to_vec(), criteria.projection()));
        if self.fail_count {
            return Err(AppError::execution("count failed"));
        }
        Ok(Some(self.total))
    }
}

/// Full-text index returning canned hits.
#[derive(Debug, Default)]
pub struct StubIndex {
    pub result_size: u64,
    pub hits: Vec<i64>,
    pub rebuild_failure: Option<ErrorKind>,
    pub requests: Mutex<Vec<SearchRequest>>,
    pub rebuilds: Mutex<usize>,
}

#[async_trait]
impl FullTextIndex for StubIndex {
    type Hit = Item;

    fn entity(&self) -> &str {
        "notes"
    }

    async fn query(&self, request: &SearchRequest) -> AppResult<SearchHits<Item>> {
        self.requests.lock().unwrap().push(request.clone());
        let hits = self.hits.iter().copied().skip(request.first_result as usize);
        let hits = match request.max_results {
            Some(max) => hits.take(max as usize).map(Item).collect(),
            None => hits.map(Item).collect(),
        };
        Ok(SearchHits {
            result_size: self.result_size,
            hits,
        })
    }

    async fn rebuild(&self) -> AppResult<()> {
        *self.rebuilds.lock().unwrap() += 1;
        match self.rebuild_failure {
            Some(kind) => Err(AppError::new(kind, "rebuild stopped")),
            None => Ok(()),
        }
    }
}

/// Entity with observable lifecycle hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub id: Option<i64>,
    pub title: String,
    pub inserted_hook: bool,
    pub updated_hook: bool,
}

impl Note {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

impl Entity for Note {
    type Id = i64;

    fn entity_name() -> &'static str {
        "notes"
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn before_insert(&mut self) {
        self.inserted_hook = true;
    }

    fn before_update(&mut self) {
        self.updated_hook = true;
    }
}

/// Unit of work keeping notes in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub notes: Mutex<Vec<Note>>,
    pub flushes: Mutex<usize>,
    pub fail_on: Option<String>,
}

#[async_trait]
impl EntityStore<Note> for MemoryStore {
    async fn get(&self, id: &i64) -> AppResult<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == Some(*id))
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Note>> {
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn save_or_update(&self, entity: &Note) -> AppResult<()> {
        if self.fail_on.as_deref() == Some(entity.title.as_str()) {
            return Err(AppError::execution("constraint violation"));
        }
        let mut notes = self.notes.lock().unwrap();
        match entity.id {
            Some(id) => {
                notes.retain(|n| n.id != Some(id));
                notes.push(entity.clone());
            }
            None => {
                let mut stored = entity.clone();
                stored.id = Some(notes.len() as i64 + 1);
                notes.push(stored);
            }
        }
        Ok(())
    }

    async fn update(&self, entity: &Note) -> AppResult<()> {
        let mut notes = self.notes.lock().unwrap();
        match notes.iter_mut().find(|n| n.id == entity.id) {
            Some(existing) => {
                *existing = entity.clone();
                Ok(())
            }
            None => Err(AppError::not_found("note not found")),
        }
    }

    async fn delete(&self, entity: &Note) -> AppResult<()> {
        self.notes.lock().unwrap().retain(|n| n.id != entity.id);
        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }

    fn clear(&self) {
        self.notes.lock().unwrap().clear();
    }
}

//! Full-text search request types.

use serde::{Deserialize, Serialize};

use crate::types::sorting::SortField;

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause may match; at least one `Should` clause must match when no
    /// `Must` clause is present.
    Should,
    /// The clause must not match.
    MustNot,
}

/// A keyword clause against one indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchClause {
    /// Indexed field name.
    pub field: String,
    /// Keywords as typed by the user.
    pub text: String,
    /// Boolean role of the clause.
    pub occur: Occur,
}

impl SearchClause {
    /// Create a clause.
    pub fn new(field: impl Into<String>, text: impl Into<String>, occur: Occur) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            occur,
        }
    }

    /// A clause that must match.
    pub fn must(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, text, Occur::Must)
    }

    /// A clause that should match.
    pub fn should(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, text, Occur::Should)
    }

    /// A clause that must not match.
    pub fn must_not(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, text, Occur::MustNot)
    }
}

/// A boolean combination of keyword clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Clauses in insertion order.
    pub clauses: Vec<SearchClause>,
}

impl SearchQuery {
    /// Build a query from clauses.
    pub fn new(clauses: impl IntoIterator<Item = SearchClause>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
        }
    }

    /// Add a clause.
    pub fn add(mut self, clause: SearchClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Whether the query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// A filter query restricting hits without affecting their score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// The filtering query.
    pub query: SearchQuery,
    /// Whether the index may cache the filter's matching document set.
    pub cached: bool,
}

impl SearchFilter {
    /// Wrap a query as a cached filter.
    pub fn cached(query: SearchQuery) -> Self {
        Self {
            query,
            cached: true,
        }
    }
}

/// Where already-loaded objects are looked up before hitting the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectLookup {
    /// Objects already tracked by the current unit of work.
    PersistenceContext,
    /// The unit of work, then the shared second-level cache.
    SecondLevelCache,
}

/// How hits missing from the lookup are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseRetrieval {
    /// Re-query the originating store in one batch.
    Query,
    /// Load each hit by identifier.
    FindById,
}

/// Everything a full-text index needs to run one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Keyword query.
    pub query: SearchQuery,
    /// Optional filter.
    pub filter: Option<SearchFilter>,
    /// Sort; index relevance when empty.
    pub sort: Vec<SortField>,
    /// Offset of the first hit.
    pub first_result: u64,
    /// Maximum hits to return; `None` means all.
    pub max_results: Option<u64>,
    /// Object lookup strategy.
    pub lookup: ObjectLookup,
    /// Retrieval strategy for hits not found by the lookup.
    pub retrieval: DatabaseRetrieval,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchHits<H> {
    /// Index estimate of the total number of hits.
    pub result_size: u64,
    /// Materialized hits of the requested window.
    pub hits: Vec<H>,
}

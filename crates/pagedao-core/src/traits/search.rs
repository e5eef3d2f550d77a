//! Full-text index.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::search::{SearchHits, SearchRequest};

/// A full-text index over one entity kind.
#[async_trait]
pub trait FullTextIndex: Send + Sync {
    /// Materialized hit type.
    type Hit: Send;

    /// Indexed entity kind.
    fn entity(&self) -> &str;

    /// Run a search, returning the index's result-size estimate and the hits
    /// of the requested window.
    async fn query(&self, request: &SearchRequest) -> AppResult<SearchHits<Self::Hit>>;

    /// Rebuild the whole index, returning only once it is complete.
    ///
    /// An aborted run is reported as
    /// [`crate::error::ErrorKind::IndexingInterrupted`].
    async fn rebuild(&self) -> AppResult<()>;
}

//! Collaborator traits the facade delegates to, implemented by other crates.

pub mod criteria;
pub mod entity;
pub mod query;
pub mod search;

pub use criteria::CriteriaExecutor;
pub use entity::{Entity, EntityStore};
pub use query::{BoundQuery, FromQueryRow, QueryExecutor, QueryLanguage};
pub use search::FullTextIndex;

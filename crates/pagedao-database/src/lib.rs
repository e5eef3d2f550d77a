//! # pagedao-database
//!
//! The paged query facade ([`BaseDao`]) together with the query-text helpers
//! it relies on and PostgreSQL implementations of its collaborators.

pub mod binder;
pub mod connection;
pub mod dao;
pub mod postgres;
pub mod transform;

pub use connection::DatabasePool;
pub use dao::BaseDao;
pub use postgres::{JsonRow, PgFullTextIndex, PgQuery, PgSession};

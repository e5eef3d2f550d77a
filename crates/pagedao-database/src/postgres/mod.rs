//! PostgreSQL implementations of the facade's collaborators.

mod criteria;
mod query;
mod row;
mod search;
mod session;
mod statement;

pub use query::PgQuery;
pub use row::JsonRow;
pub use search::PgFullTextIndex;
pub use session::PgSession;

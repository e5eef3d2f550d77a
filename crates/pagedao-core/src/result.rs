//! Result alias shared by every pagedao crate.

use crate::error::AppError;

/// `Result` specialised to [`AppError`].
///
/// Collaborator traits, the facade and the CLI all return this type so that
/// failures from the query engine travel to the caller through `?` unchanged.
pub type AppResult<T> = Result<T, AppError>;

//! # pagedao-core
//!
//! Core crate for pagedao. Contains the collaborator traits the paged query
//! facade talks through, configuration schemas, page/sort/parameter/criteria
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other pagedao crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;

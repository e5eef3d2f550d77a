//! Core type definitions used across the pagedao workspace.

pub mod criteria;
pub mod pagination;
pub mod parameter;
pub mod search;
pub mod sorting;

pub use criteria::{CountScope, Criteria, Projection, Restriction, RestrictionOp, ResultShaping};
pub use pagination::{Page, PageRequest};
pub use parameter::{ParamValue, Parameter};
pub use search::{
    DatabaseRetrieval, ObjectLookup, Occur, SearchClause, SearchFilter, SearchHits, SearchQuery,
    SearchRequest,
};
pub use sorting::{SortDirection, SortField, parse_order_by};

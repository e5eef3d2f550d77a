//! Detached structured queries.
//!
//! A [`Criteria`] is built without any connection and executed later by a
//! [`crate::traits::CriteriaExecutor`].

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::types::parameter::ParamValue;
use crate::types::sorting::SortField;

/// Restriction comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL `LIKE` pattern match.
    Like,
    /// SQL `ILIKE` case-insensitive pattern match.
    ILike,
    /// SQL `IN` list membership.
    In,
    /// SQL `IS NULL` check.
    IsNull,
    /// SQL `IS NOT NULL` check.
    IsNotNull,
}

impl RestrictionOp {
    /// SQL operator keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::In => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator takes no right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// A single condition on a property of the root entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    /// Property (column) name.
    pub field: String,
    /// Comparison operator.
    pub op: RestrictionOp,
    /// Right-hand value; ignored by unary operators.
    pub value: ParamValue,
}

impl Restriction {
    /// Create a restriction.
    pub fn new(field: impl Into<String>, op: RestrictionOp, value: impl Into<ParamValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`.
    pub fn eq(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self::new(field, RestrictionOp::Eq, value)
    }

    /// `field <> value`.
    pub fn ne(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self::new(field, RestrictionOp::Ne, value)
    }

    /// `field ILIKE pattern`.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, RestrictionOp::ILike, pattern.into())
    }

    /// `field IN (values...)`.
    pub fn in_list<V: Into<ParamValue>>(field: impl Into<String>, values: Vec<V>) -> Self {
        Self::new(field, RestrictionOp::In, values)
    }

    /// `field IS NULL`.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, RestrictionOp::IsNull, ParamValue::Null)
    }

    /// `field IS NOT NULL`.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, RestrictionOp::IsNotNull, ParamValue::Null)
    }
}

/// Projection applied instead of selecting root entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// `count(*)` over the matching rows.
    RowCount,
}

/// How fetched rows are shaped into results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultShaping {
    /// Collapse duplicate root rows caused by join fan-out.
    #[default]
    DistinctRootEntity,
    /// One result per row.
    RootEntity,
}

/// A structured query built independently of any connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    entity: String,
    alias: String,
    restrictions: Vec<Restriction>,
    orderings: Vec<SortField>,
    projection: Option<Projection>,
    shaping: ResultShaping,
    cacheable: bool,
    window: Option<(u64, u64)>,
}

impl Criteria {
    /// Criteria selecting every row of `entity`.
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            alias: "this_".to_string(),
            restrictions: Vec::new(),
            orderings: Vec::new(),
            projection: None,
            shaping: ResultShaping::default(),
            cacheable: false,
            window: None,
        }
    }

    /// Add a restriction.
    pub fn add(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Append an ordering, builder style.
    pub fn order(mut self, ordering: SortField) -> Self {
        self.orderings.push(ordering);
        self
    }

    /// Append an ordering in place.
    pub fn add_order(&mut self, ordering: SortField) {
        self.orderings.push(ordering);
    }

    /// Clone without any ordering clauses.
    pub fn without_orderings(&self) -> Self {
        Self {
            orderings: Vec::new(),
            ..self.clone()
        }
    }

    /// Set or clear the projection.
    pub fn set_projection(&mut self, projection: Option<Projection>) {
        self.projection = projection;
    }

    /// Set the result shaping strategy.
    pub fn set_result_shaping(&mut self, shaping: ResultShaping) {
        self.shaping = shaping;
    }

    /// Ask the executor to cache the result set or plan.
    pub fn set_cacheable(&mut self, cacheable: bool) {
        self.cacheable = cacheable;
    }

    /// Restrict execution to rows `first..first + max`.
    pub fn set_window(&mut self, first: u64, max: u64) {
        self.window = Some((first, max));
    }

    /// Temporarily strip orderings and project a row count.
    ///
    /// The returned guard derefs to the criteria in counting form. Dropping it
    /// restores the original orderings and projection, whether or not the
    /// count executed successfully.
    pub fn count_scope(&mut self) -> CountScope<'_> {
        let orderings = std::mem::take(&mut self.orderings);
        let projection = self.projection.replace(Projection::RowCount);
        CountScope {
            criteria: self,
            orderings,
            projection,
        }
    }

    /// Root entity (table) name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Alias of the root entity in rendered queries.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Restrictions, in insertion order.
    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// Orderings, in insertion order.
    pub fn orderings(&self) -> &[SortField] {
        &self.orderings
    }

    /// Current projection.
    pub fn projection(&self) -> Option<Projection> {
        self.projection
    }

    /// Result shaping strategy.
    pub fn result_shaping(&self) -> ResultShaping {
        self.shaping
    }

    /// Whether caching was requested.
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// `(first, max)` row window, if any.
    pub fn window(&self) -> Option<(u64, u64)> {
        self.window
    }
}

/// Criteria in counting form; see [`Criteria::count_scope`].
#[derive(Debug)]
pub struct CountScope<'a> {
    criteria: &'a mut Criteria,
    orderings: Vec<SortField>,
    projection: Option<Projection>,
}

impl Deref for CountScope<'_> {
    type Target = Criteria;

    fn deref(&self) -> &Criteria {
        &*self.criteria
    }
}

impl DerefMut for CountScope<'_> {
    fn deref_mut(&mut self) -> &mut Criteria {
        &mut *self.criteria
    }
}

impl Drop for CountScope<'_> {
    fn drop(&mut self) {
        self.criteria.orderings = std::mem::take(&mut self.orderings);
        self.criteria.projection = self.projection.take();
    }
}

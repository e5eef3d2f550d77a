//! Rendering of detached criteria to PostgreSQL.

use pagedao_core::result::AppResult;
use pagedao_core::types::criteria::{Criteria, Projection, Restriction, RestrictionOp, ResultShaping};
use pagedao_core::types::parameter::ParamValue;

use crate::transform::validate_identifier;

/// Render `criteria` to positional SQL and its values.
pub(crate) fn render(criteria: &Criteria) -> AppResult<(String, Vec<ParamValue>)> {
    let table = validate_identifier(criteria.entity())?;
    let alias = validate_identifier(criteria.alias())?;
    let mut values = Vec::new();

    let select = match (criteria.projection(), criteria.result_shaping()) {
        (Some(Projection::RowCount), _) => "COUNT(*)".to_string(),
        (None, ResultShaping::DistinctRootEntity) => format!("DISTINCT {alias}.*"),
        (None, ResultShaping::RootEntity) => format!("{alias}.*"),
    };
    let mut sql = format!("SELECT {select} FROM {table} {alias}");

    if !criteria.restrictions().is_empty() {
        let conditions = criteria
            .restrictions()
            .iter()
            .map(|r| restriction(alias, r, &mut values))
            .collect::<AppResult<Vec<_>>>()?;
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if !criteria.orderings().is_empty() {
        let orderings = criteria
            .orderings()
            .iter()
            .map(|o| {
                qualify(alias, &o.field).map(|column| format!("{column} {}", o.direction.as_sql()))
            })
            .collect::<AppResult<Vec<_>>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&orderings.join(", "));
    }

    if let Some((first, max)) = criteria.window() {
        sql.push_str(&format!(" LIMIT {max} OFFSET {first}"));
    }

    Ok((sql, values))
}

fn qualify(alias: &str, field: &str) -> AppResult<String> {
    let field = validate_identifier(field)?;
    if field.contains('.') {
        Ok(field.to_string())
    } else {
        Ok(format!("{alias}.{field}"))
    }
}

fn placeholder(values: &mut Vec<ParamValue>, value: ParamValue) -> String {
    values.push(value);
    format!("${}", values.len())
}

fn restriction(alias: &str, r: &Restriction, values: &mut Vec<ParamValue>) -> AppResult<String> {
    let column = qualify(alias, &r.field)?;
    if r.op.is_unary() {
        return Ok(format!("{column} {}", r.op.as_sql()));
    }
    if r.op == RestrictionOp::In {
        let members = match &r.value {
            ParamValue::List(members) => members.clone(),
            other => vec![other.clone()],
        };
        // `IN ()` is a syntax error in PostgreSQL; an empty set matches nothing.
        if members.is_empty() {
            return Ok("FALSE".to_string());
        }
        let placeholders = members
            .into_iter()
            .map(|v| placeholder(values, v))
            .collect::<Vec<_>>()
            .join(", ");
        return Ok(format!("{column} IN ({placeholders})"));
    }
    let p = placeholder(values, r.value.clone());
    Ok(format!("{column} {} {p}", r.op.as_sql()))
}

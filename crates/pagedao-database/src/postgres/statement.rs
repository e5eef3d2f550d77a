//! Named parameter handling for PostgreSQL.
//!
//! Query texts use `:name` placeholders; PostgreSQL wants `$1, $2, ...`.
//! Quoted literals, quoted identifiers and `::type` casts are left alone.

use std::collections::HashMap;

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use pagedao_core::error::AppError;
use pagedao_core::result::AppResult;
use pagedao_core::types::parameter::ParamValue;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Param(String),
}

/// Value bound to a named parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Binding {
    Scalar(ParamValue),
    List(Vec<ParamValue>),
}

/// A query text split into literal text and named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamedStatement {
    segments: Vec<Segment>,
}

impl NamedStatement {
    pub(crate) fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut quote: Option<char> = None;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                current.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ':' if chars.peek() == Some(&':') => {
                    chars.next();
                    current.push_str("::");
                }
                ':' if chars.peek().is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') => {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            name.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if !current.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut current)));
                    }
                    segments.push(Segment::Param(name));
                }
                _ => current.push(c),
            }
        }
        if !current.is_empty() {
            segments.push(Segment::Text(current));
        }
        Self { segments }
    }

    /// Whether the text contains a `:name` placeholder.
    pub(crate) fn declares(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param(p) if p == name))
    }

    /// Render positional SQL and the values in placeholder order.
    ///
    /// A name used twice is bound twice.
    pub(crate) fn render(
        &self,
        bindings: &HashMap<String, Binding>,
    ) -> AppResult<(String, Vec<ParamValue>)> {
        let mut sql = String::new();
        let mut values = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => sql.push_str(text),
                Segment::Param(name) => match bindings.get(name) {
                    None => {
                        return Err(AppError::binding(format!(
                            "named parameter [{name}] was not bound"
                        )));
                    }
                    Some(Binding::Scalar(value)) => {
                        values.push(value.clone());
                        sql.push_str(&format!("${}", values.len()));
                    }
                    Some(Binding::List(list)) => {
                        if list.is_empty() {
                            return Err(AppError::binding(format!(
                                "empty list bound to parameter [{name}]"
                            )));
                        }
                        let placeholders = list
                            .iter()
                            .map(|value| {
                                values.push(value.clone());
                                format!("${}", values.len())
                            })
                            .collect::<Vec<_>>();
                        sql.push_str(&placeholders.join(", "));
                    }
                },
            }
        }
        Ok((sql, values))
    }
}

/// Build a sqlx query with positional values bound in order.
pub(crate) fn build_query<'q>(
    sql: &'q str,
    values: &'q [ParamValue],
) -> AppResult<Query<'q, Postgres, PgArguments>> {
    values
        .iter()
        .try_fold(sqlx::query(sql), |query, value| bind_value(query, value))
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q ParamValue,
) -> AppResult<Query<'q, Postgres, PgArguments>> {
    Ok(match value {
        ParamValue::Null => query.bind(None::<String>),
        ParamValue::Bool(v) => query.bind(*v),
        ParamValue::Int(v) => query.bind(*v),
        ParamValue::Float(v) => query.bind(*v),
        ParamValue::Uuid(v) => query.bind(*v),
        ParamValue::Timestamp(v) => query.bind(*v),
        ParamValue::Text(v) => query.bind(v.as_str()),
        ParamValue::Json(v) => query.bind(sqlx::types::Json(v)),
        ParamValue::List(_) => {
            return Err(AppError::binding(
                "nested list values cannot be bound to a single placeholder",
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedao_core::error::ErrorKind;

    fn scalar(v: impl Into<ParamValue>) -> Binding {
        Binding::Scalar(v.into())
    }

    #[test]
    fn test_parse_and_render() {
        let statement = NamedStatement::parse("select * from t where a = :p1 and b in (:ids)");
        assert!(statement.declares("p1"));
        assert!(statement.declares("ids"));
        assert!(!statement.declares("p2"));

        let bindings = HashMap::from([
            ("p1".to_string(), scalar("x")),
            (
                "ids".to_string(),
                Binding::List(vec![ParamValue::Int(1), ParamValue::Int(2)]),
            ),
        ]);
        let (sql, values) = statement.render(&bindings).unwrap();
        assert_eq!(sql, "select * from t where a = $1 and b in ($2, $3)");
        assert_eq!(
            values,
            vec![
                ParamValue::Text("x".into()),
                ParamValue::Int(1),
                ParamValue::Int(2)
            ]
        );
    }

    #[test]
    fn test_casts_and_literals_are_not_parameters() {
        let statement =
            NamedStatement::parse("select created::date, ':skip', \"a:b\" from t where x = :p1::int");
        assert!(statement.declares("p1"));
        assert!(!statement.declares("date"));
        assert!(!statement.declares("skip"));
        assert!(!statement.declares("b"));

        let bindings = HashMap::from([("p1".to_string(), scalar(5i64))]);
        let (sql, _) = statement.render(&bindings).unwrap();
        assert_eq!(
            sql,
            "select created::date, ':skip', \"a:b\" from t where x = $1::int"
        );
    }

    #[test]
    fn test_repeated_name_is_bound_twice() {
        let statement = NamedStatement::parse("a = :v or b = :v");
        let bindings = HashMap::from([("v".to_string(), scalar(true))]);
        let (sql, values) = statement.render(&bindings).unwrap();
        assert_eq!(sql, "a = $1 or b = $2");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_unbound_parameter() {
        let statement = NamedStatement::parse("a = :v");
        let err = statement.render(&HashMap::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Binding);
    }

    #[test]
    fn test_empty_list() {
        let statement = NamedStatement::parse("a in (:v)");
        let bindings = HashMap::from([("v".to_string(), Binding::List(Vec::new()))]);
        let err = statement.render(&bindings).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Binding);
    }
}

//! Schema-less row decoding.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, FromRow, Row, TypeInfo};
use tracing::debug;
use uuid::Uuid;

/// A row decoded into a JSON object keyed by column name.
///
/// `NUMERIC` values decode as strings to keep their precision. Columns of a
/// type without a JSON mapping (arrays, intervals, ...) decode as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonRow(Map<String, Value>);

impl JsonRow {
    /// Column names in select order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// The underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for JsonRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<'r> FromRow<'r, PgRow> for JsonRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut map = Map::new();
        for column in row.columns() {
            let i = column.ordinal();
            let value = match column.type_info().name() {
                "BOOL" => json(row.try_get::<Option<bool>, _>(i)?),
                "INT2" => json(row.try_get::<Option<i16>, _>(i)?),
                "INT4" => json(row.try_get::<Option<i32>, _>(i)?),
                "INT8" => json(row.try_get::<Option<i64>, _>(i)?),
                "FLOAT4" => json(row.try_get::<Option<f32>, _>(i)?),
                "FLOAT8" => json(row.try_get::<Option<f64>, _>(i)?),
                "NUMERIC" => json(row.try_get::<Option<Decimal>, _>(i)?),
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
                    json(row.try_get::<Option<String>, _>(i)?)
                }
                "UUID" => json(row.try_get::<Option<Uuid>, _>(i)?),
                "TIMESTAMPTZ" => json(row.try_get::<Option<DateTime<Utc>>, _>(i)?),
                "TIMESTAMP" => json(row.try_get::<Option<NaiveDateTime>, _>(i)?),
                "DATE" => json(row.try_get::<Option<NaiveDate>, _>(i)?),
                "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(i)?.unwrap_or(Value::Null),
                other => {
                    debug!(column = column.name(), r#type = other, "No JSON mapping, using null");
                    Value::Null
                }
            };
            map.insert(column.name().to_string(), value);
        }
        Ok(Self(map))
    }
}

fn json<T: Serialize>(value: Option<T>) -> Value {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

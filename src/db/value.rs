use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Number, Value};
use tokio_postgres::Row;

use crate::error::{Error, Result};

/// One row of a data response: column name → JSON value, in server
/// column order.
pub type RowRecord = Map<String, Value>;

/// A decoded table cell, one variant per scalar family the driver can
/// hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(uuid::Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(Value),
    Bytes(Vec<u8>),
}

/// Decode one cell by trying the supported types in order. `try_get`
/// rejects a mismatched column type before looking at the value, so the
/// first arm that matches the column's SQL type wins and a NULL cell
/// surfaces as `Ok(None)` there.
pub fn decode_cell(row: &Row, idx: usize) -> Result<Cell> {
    // Text types
    if let Ok(val) = row.try_get::<_, Option<String>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Text));
    }

    // Integer types
    if let Ok(val) = row.try_get::<_, Option<i32>>(idx) {
        return Ok(val.map_or(Cell::Null, |v| Cell::Integer(v.into())));
    }
    if let Ok(val) = row.try_get::<_, Option<i64>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Integer));
    }
    if let Ok(val) = row.try_get::<_, Option<i16>>(idx) {
        return Ok(val.map_or(Cell::Null, |v| Cell::Integer(v.into())));
    }

    // Floating point types
    if let Ok(val) = row.try_get::<_, Option<f32>>(idx) {
        return Ok(val.map_or(Cell::Null, |v| Cell::Float(v.into())));
    }
    if let Ok(val) = row.try_get::<_, Option<f64>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Float));
    }

    // Boolean
    if let Ok(val) = row.try_get::<_, Option<bool>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Boolean));
    }

    // UUID
    if let Ok(val) = row.try_get::<_, Option<uuid::Uuid>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Uuid));
    }

    // Temporal types
    if let Ok(val) = row.try_get::<_, Option<NaiveDateTime>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Timestamp));
    }
    if let Ok(val) = row.try_get::<_, Option<DateTime<Utc>>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::TimestampTz));
    }
    if let Ok(val) = row.try_get::<_, Option<NaiveDate>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Date));
    }
    if let Ok(val) = row.try_get::<_, Option<NaiveTime>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Time));
    }

    // JSON types
    if let Ok(val) = row.try_get::<_, Option<Value>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Json));
    }

    // Byte arrays
    if let Ok(val) = row.try_get::<_, Option<Vec<u8>>>(idx) {
        return Ok(val.map_or(Cell::Null, Cell::Bytes));
    }

    let column = &row.columns()[idx];
    Err(Error::Scan {
        column: column.name().to_string(),
        ty: column.type_().to_string(),
    })
}

impl Cell {
    /// Render into the JSON value tree. Byte strings decode as text;
    /// temporal values render as their display strings; non-finite
    /// floats have no JSON form and become null.
    pub fn into_json(self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Text(s) => Value::String(s),
            Cell::Integer(n) => Value::Number(n.into()),
            Cell::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            Cell::Boolean(b) => Value::Bool(b),
            Cell::Uuid(u) => Value::String(u.to_string()),
            Cell::Date(d) => Value::String(d.to_string()),
            Cell::Time(t) => Value::String(t.to_string()),
            Cell::Timestamp(ts) => Value::String(ts.to_string()),
            Cell::TimestampTz(ts) => Value::String(ts.to_rfc3339()),
            Cell::Json(v) => v,
            Cell::Bytes(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}

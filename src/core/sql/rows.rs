use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Map, Value};
use tiberius::{ColumnData, FromSql, Row};

/// Convert a result row into a column name to JSON value map.
pub fn row_to_json(row: Row) -> Map<String, Value> {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    names
        .into_iter()
        .zip(row)
        .map(|(name, data)| (name, column_to_json(&data)))
        .collect()
}

pub fn column_to_json(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => json!(v),
        ColumnData::I16(v) => json!(v),
        ColumnData::I32(v) => json!(v),
        ColumnData::I64(v) => json!(v),
        ColumnData::F32(v) => json!(v),
        ColumnData::F64(v) => json!(v),
        ColumnData::Bit(v) => json!(v),
        ColumnData::String(v) => json!(v.as_deref()),
        ColumnData::Guid(v) => json!(v.as_ref().map(|g| g.to_string())),
        ColumnData::Numeric(v) => json!(v.as_ref().map(|n| n.to_string())),
        ColumnData::Binary(v) => json!(v.as_ref().map(hex::encode)),
        ColumnData::Xml(v) => json!(v.as_deref().map(|xml| xml.to_string())),
        _ => temporal_to_json(data),
    }
}

// Date/time columns have several wire encodings; the chrono conversions pick
// the right one.
fn temporal_to_json(data: &ColumnData<'static>) -> Value {
    if let Ok(Some(v)) = DateTime::<FixedOffset>::from_sql(data) {
        return json!(v.to_rfc3339());
    }
    if let Ok(Some(v)) = NaiveDateTime::from_sql(data) {
        return json!(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(v)) = NaiveDate::from_sql(data) {
        return json!(v.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(v)) = NaiveTime::from_sql(data) {
        return json!(v.format("%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(v)) = <&str>::from_sql(data) {
        return json!(v);
    }
    Value::Null
}

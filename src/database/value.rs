use chrono::NaiveDate;
use chrono::NaiveDateTime;
use duckdb::types::TimeUnit;
use duckdb::types::Value as SqlValue;

/// A typed cell value extracted from a sheet, ready to bind as a SQL parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// One extracted row: one optional value per schema column, in column order.
pub type Row = Vec<Option<Value>>;

impl Value {
    /// Converts to a DuckDB parameter value. Dates become days since
    /// 1970-01-01, timestamps microseconds since the Unix epoch.
    pub(crate) fn to_sql(&self) -> SqlValue {
        match self {
            Value::Text(text) => SqlValue::Text(text.to_owned()),
            Value::Number(number) => SqlValue::Double(*number),
            Value::Boolean(value) => SqlValue::Boolean(*value),
            Value::Date(date) => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("NaiveDate literal");
                SqlValue::Date32(date.signed_duration_since(epoch).num_days() as i32)
            }
            Value::DateTime(datetime) => {
                SqlValue::Timestamp(TimeUnit::Microsecond, datetime.and_utc().timestamp_micros())
            }
        }
    }
}

/// Maps an optional extracted value to a DuckDB parameter, with `None` as NULL.
pub(crate) fn to_sql(value: &Option<Value>) -> SqlValue {
    value.as_ref().map(Value::to_sql).unwrap_or(SqlValue::Null)
}

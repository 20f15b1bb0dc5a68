use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// The result of successfully checking one CSV cell
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Binary(Vec<u8>),
    Json(serde_json::Value),
    Array(Vec<String>),
}

impl ParsedValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ParsedValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedValue::Text(s) => f.write_str(s),
            ParsedValue::Number(n) => write!(f, "{n}"),
            ParsedValue::Integer(i) => write!(f, "{i}"),
            ParsedValue::Boolean(b) => write!(f, "{b}"),
            ParsedValue::Date(d) => write!(f, "{d}"),
            ParsedValue::DateTime(dt) => write!(f, "{dt}"),
            ParsedValue::Time(t) => write!(f, "{t}"),
            ParsedValue::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            ParsedValue::Json(v) => write!(f, "{v}"),
            ParsedValue::Array(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

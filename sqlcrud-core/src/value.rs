use crate::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT};
use std::{
    borrow::Cow,
    fmt::{self, Display},
};
use time::{Date, PrimitiveDateTime, Time};

/// Dynamically typed value moving between drivers, records and generated statements.
///
/// Drivers produce whatever their wire format gives them: a faulty driver may
/// report every column as an opaque [`Value::Blob`], which [`crate::coerce`]
/// then reinterprets using the declared column type.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Varchar(String),
    /// Opaque byte string as returned by the driver.
    Blob(Box<[u8]>),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    /// JSON text passed through without decoding.
    RawJson(String),
    /// Decoded JSON document.
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(..) => "Boolean",
            Value::Int64(..) => "Int64",
            Value::Float64(..) => "Float64",
            Value::Varchar(..) => "Varchar",
            Value::Blob(..) => "Blob",
            Value::Date(..) => "Date",
            Value::Time(..) => "Time",
            Value::Timestamp(..) => "Timestamp",
            Value::RawJson(..) => "RawJson",
            Value::Json(..) => "Json",
        }
    }

    /// Textual form of the value, `None` for `Null` and for binary data that is not UTF-8.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(v) => Cow::Borrowed(if *v { "true" } else { "false" }),
            Value::Int64(v) => Cow::Owned(v.to_string()),
            Value::Float64(v) => Cow::Owned(v.to_string()),
            Value::Varchar(v) | Value::RawJson(v) => Cow::Borrowed(v.as_str()),
            Value::Blob(v) => Cow::Borrowed(std::str::from_utf8(v).ok()?),
            Value::Date(v) => Cow::Owned(v.format(DATE_FORMAT).ok()?),
            Value::Time(v) => Cow::Owned(v.format(TIME_FORMAT).ok()?),
            Value::Timestamp(v) => Cow::Owned(v.format(TIMESTAMP_FORMAT).ok()?),
            Value::Json(v) => Cow::Owned(v.to_string()),
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Blob(v) if std::str::from_utf8(v).is_err() => write!(f, "<{} bytes>", v.len()),
            _ => f.write_str(&self.as_text().unwrap_or_default()),
        }
    }
}

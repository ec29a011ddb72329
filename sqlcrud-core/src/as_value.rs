use crate::{Context, DATE_FORMAT, Error, Result, TIME_FORMAT, TIMESTAMP_FORMAT, Value, truncate_long};
use serde::{Serialize, de::DeserializeOwned};
use std::any;
use time::{Date, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// `as_value` produces the canonical variant for the type. `try_from_value`
/// accepts the canonical variant plus the alternate representations drivers
/// are known to return (integers as floats, booleans as integers, numbers and
/// temporals as text or raw bytes) and errors on anything else.
///
/// ```rust
/// use sqlcrud_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int64(42));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn conversion_error<T>(value: &Value) -> Error {
    let text = value.to_string();
    Error::msg(format!(
        "Cannot convert {} `{}` to {}",
        value.kind(),
        truncate_long!(text),
        any::type_name::<T>(),
    ))
}

fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::Varchar(v) | Value::RawJson(v) => Some(v.trim()),
        Value::Blob(v) => std::str::from_utf8(v).ok().map(str::trim),
        _ => None,
    }
}

/// Boolean grammar accepted from text: `1 t T TRUE true True 0 f F FALSE false False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, DATE_FORMAT).ok()
}

pub fn parse_time(value: &str) -> Option<Time> {
    Time::parse(value, TIME_FORMAT).ok()
}

pub fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .ok()
}

macro_rules! impl_as_value_integer {
    ($($source:ty),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Value {
                    Value::Int64(self as i64)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    let converted = match &value {
                        Value::Int64(v) => <$source>::try_from(*v).ok(),
                        Value::Boolean(v) => Some(*v as $source),
                        Value::Float64(v) if v.fract() == 0.0 => {
                            let v = *v as i128;
                            <$source>::try_from(v).ok()
                        }
                        _ => text_of(&value).and_then(|v| v.parse::<$source>().ok()),
                    };
                    converted.ok_or_else(|| conversion_error::<Self>(&value))
                }
            }
        )+
    };
}
impl_as_value_integer!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_as_value_float {
    ($($source:ty),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Value {
                    Value::Float64(self as f64)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    let converted = match &value {
                        Value::Float64(v) => Some(*v as $source),
                        Value::Int64(v) => Some(*v as $source),
                        _ => text_of(&value).and_then(|v| v.parse::<$source>().ok()),
                    };
                    converted.ok_or_else(|| conversion_error::<Self>(&value))
                }
            }
        )+
    };
}
impl_as_value_float!(f32, f64);

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Boolean(v) => Some(*v),
            Value::Int64(v) => Some(*v != 0),
            _ => text_of(&value).and_then(parse_bool),
        };
        converted.ok_or_else(|| conversion_error::<Self>(&value))
    }
}

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) | Value::RawJson(v) => Ok(v),
            Value::Blob(v) => String::from_utf8(v.into_vec())
                .map_err(|e| Error::new(e).context("Cannot convert a Blob to String")),
            Value::Null => Err(conversion_error::<Self>(&value)),
            _ => value
                .as_text()
                .map(|v| v.into_owned())
                .ok_or_else(|| conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for char {
    fn as_value(self) -> Value {
        Value::Varchar(self.into())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let text = String::try_from_value(value)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::msg(format!(
                "Cannot convert `{}` to char, expected exactly one character",
                truncate_long!(text)
            ))),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_value(self) -> Value {
        Value::Blob(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Varchar(v) | Value::RawJson(v) => Ok(v.into_bytes().into()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_value(self) -> Value {
        Value::Blob(self.into())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Date {
    fn as_value(self) -> Value {
        Value::Date(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Date(v) => Some(*v),
            Value::Timestamp(v) => Some(v.date()),
            _ => text_of(&value).and_then(|v| {
                parse_date(v).or_else(|| parse_timestamp(v).map(|v| v.date()))
            }),
        };
        converted.ok_or_else(|| conversion_error::<Self>(&value))
    }
}

impl AsValue for Time {
    fn as_value(self) -> Value {
        Value::Time(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Time(v) => Some(*v),
            Value::Timestamp(v) => Some(v.time()),
            _ => text_of(&value).and_then(parse_time),
        };
        converted.ok_or_else(|| conversion_error::<Self>(&value))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_value(self) -> Value {
        Value::Timestamp(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Timestamp(v) => Some(*v),
            Value::Date(v) => Some(v.midnight()),
            _ => text_of(&value).and_then(|v| {
                parse_timestamp(v).or_else(|| parse_date(v).map(|v| v.midnight()))
            }),
        };
        converted.ok_or_else(|| conversion_error::<Self>(&value))
    }
}

impl AsValue for Uuid {
    fn as_value(self) -> Value {
        Value::Varchar(self.to_string())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Blob(v) if v.len() == 16 => Uuid::from_slice(v).map_err(Error::new),
            _ => text_of(&value)
                .and_then(|v| Uuid::parse_str(v).ok())
                .ok_or_else(|| conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for serde_json::Value {
    fn as_value(self) -> Value {
        Value::Json(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        decode_json(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::try_from_value(v).map(Some),
        }
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

macro_rules! impl_from_for_value {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    value.as_value()
                }
            }
        )+
    };
}
impl_from_for_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    char,
    String,
    Vec<u8>,
    Date,
    Time,
    PrimitiveDateTime,
    Uuid,
    serde_json::Value,
);

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

/// Encode a structured value as JSON text.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_string(value)
        .map(Value::Varchar)
        .map_err(|e| {
            Error::new(e).context(format!(
                "Could not encode {} as JSON",
                any::type_name::<T>()
            ))
        })
}

/// Decode a structured value from JSON text or an already decoded document.
pub fn decode_json<T: DeserializeOwned>(value: Value) -> Result<T> {
    let context = || format!("Could not decode {} from JSON", any::type_name::<T>());
    match value {
        Value::Json(v) => serde_json::from_value(v).with_context(context),
        Value::Null => serde_json::from_value(serde_json::Value::Null).with_context(context),
        Value::Varchar(v) | Value::RawJson(v) => serde_json::from_str(&v).with_context(context),
        Value::Blob(v) => serde_json::from_slice(&v).with_context(context),
        v => Err(conversion_error::<T>(&v)),
    }
}

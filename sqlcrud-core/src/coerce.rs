use crate::{
    CoercionPolicy, CrudError, Dialect, Result, Value, parse_bool, parse_date, parse_time,
    parse_timestamp,
};

/// Normalize a raw driver value using the declared column type.
///
/// Already typed values pass through unchanged. Opaque byte strings are
/// reinterpreted through a fixed, case sensitive type catalog (some MySQL
/// drivers return every column as bytes). SQLite only reports bytes for real
/// blobs, those are kept whatever the declared type. Oracle drivers report most values
/// as text, so text gets a second pass there, while SQLite expressions carrying
/// JSON text are decoded when they have no declared type.
///
/// With [`CoercionPolicy::Lenient`] a value that does not parse as its declared
/// type is kept as text; [`CoercionPolicy::Strict`] reports it as
/// [`CrudError::Coercion`].
pub fn coerce(
    value: Value,
    type_name: &str,
    dialect: Dialect,
    policy: CoercionPolicy,
) -> Result<Value> {
    let value = match value {
        Value::Blob(bytes) if dialect != Dialect::Sqlite => convert_bytes(bytes, type_name, policy)?,
        v => v,
    };
    Ok(match (dialect, value) {
        (Dialect::Oracle, Value::Varchar(text)) => convert_oracle_text(text, type_name, policy)?,
        (Dialect::Sqlite, Value::Varchar(text)) if type_name.is_empty() => detect_json(text),
        (_, v) => v,
    })
}

fn fallback(
    text: String,
    type_name: &str,
    target: &'static str,
    policy: CoercionPolicy,
) -> Result<Value> {
    match policy {
        CoercionPolicy::Lenient => {
            log::warn!(
                "Could not read `{}` declared as `{}` as {}, keeping the text",
                text,
                type_name,
                target
            );
            Ok(Value::Varchar(text))
        }
        CoercionPolicy::Strict => Err(CrudError::Coercion {
            type_name: type_name.into(),
            value: text,
            target,
        }
        .into()),
    }
}

fn convert_bytes(bytes: Box<[u8]>, type_name: &str, policy: CoercionPolicy) -> Result<Value> {
    match type_name {
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            return Ok(Value::Blob(bytes));
        }
        "NULL" => return Ok(Value::Null),
        _ => {}
    }
    let text = match String::from_utf8(bytes.into_vec()) {
        Ok(text) => text,
        Err(e) => {
            let bytes = e.into_bytes();
            return if policy == CoercionPolicy::Strict && type_name_is_textual(type_name) {
                Err(CrudError::Coercion {
                    type_name: type_name.into(),
                    value: format!("<{} bytes>", bytes.len()),
                    target: "text",
                }
                .into())
            } else {
                Ok(Value::Blob(bytes.into()))
            };
        }
    };
    let trimmed = text.trim();
    Ok(match type_name {
        "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
            match trimmed.parse::<i64>() {
                Ok(v) => Value::Int64(v),
                Err(..) => return fallback(text, type_name, "integer", policy),
            }
        }
        "TINYINT" | "BOOL" | "BOOLEAN" | "BIT" => match parse_bool(trimmed) {
            Some(v) => Value::Boolean(v),
            None => return fallback(text, type_name, "boolean", policy),
        },
        "FLOAT" | "DOUBLE" | "DECIMAL" => match trimmed.parse::<f64>() {
            Ok(v) => Value::Float64(v),
            Err(..) => return fallback(text, type_name, "float", policy),
        },
        "DATETIME" | "TIMESTAMP" => match parse_timestamp(trimmed) {
            Some(v) => Value::Timestamp(v),
            None => return fallback(text, type_name, "timestamp", policy),
        },
        "DATE" => match parse_date(trimmed) {
            Some(v) => Value::Date(v),
            None => return fallback(text, type_name, "date", policy),
        },
        "TIME" => match parse_time(trimmed) {
            Some(v) => Value::Time(v),
            None => return fallback(text, type_name, "time", policy),
        },
        "JSON" => Value::RawJson(text),
        _ => Value::Varchar(text),
    })
}

fn type_name_is_textual(type_name: &str) -> bool {
    !matches!(
        type_name,
        "" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY"
    )
}

fn convert_oracle_text(text: String, type_name: &str, policy: CoercionPolicy) -> Result<Value> {
    Ok(match type_name {
        "NUMBER" => match text.trim().parse::<f64>() {
            Ok(v) => Value::Float64(v),
            Err(..) => return fallback(text, type_name, "float", policy),
        },
        "DATE" | "TIMESTAMP" => match parse_timestamp(text.trim()) {
            Some(v) => Value::Timestamp(v),
            None => return fallback(text, type_name, "timestamp", policy),
        },
        _ => Value::Varchar(text),
    })
}

/// Decode text that looks like a JSON object or array, keep it as is otherwise.
fn detect_json(text: String) -> Value {
    let trimmed = text.trim();
    let wrapped = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if wrapped {
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(v) => return Value::Json(v),
            Err(e) => log::debug!("Text looking like JSON did not decode: {}", e),
        }
    }
    Value::Varchar(text)
}

#[cfg(test)]
mod tests {
    use super::coerce;
    use crate::{CoercionPolicy, CrudError, Dialect, Value};
    use time::macros::{date, datetime, time};

    fn bytes(v: &str) -> Value {
        Value::Blob(v.as_bytes().into())
    }

    fn lenient(value: Value, type_name: &str, dialect: Dialect) -> Value {
        coerce(value, type_name, dialect, CoercionPolicy::Lenient).unwrap()
    }

    #[test]
    fn typed_values_pass_through() {
        assert_eq!(lenient(Value::Null, "INT", Dialect::MySql), Value::Null);
        assert_eq!(lenient(Value::Int64(7), "INT", Dialect::MySql), Value::Int64(7));
        assert_eq!(
            lenient(Value::Varchar("123".into()), "INT", Dialect::MySql),
            Value::Varchar("123".into())
        );
    }

    #[test]
    fn byte_catalog() {
        assert_eq!(lenient(bytes("123"), "INT", Dialect::MySql), Value::Int64(123));
        assert_eq!(lenient(bytes("-5"), "BIGINT", Dialect::MySql), Value::Int64(-5));
        assert_eq!(lenient(bytes("2024"), "YEAR", Dialect::MySql), Value::Int64(2024));
        assert_eq!(
            lenient(bytes("true"), "BOOLEAN", Dialect::MySql),
            Value::Boolean(true)
        );
        assert_eq!(lenient(bytes("0"), "TINYINT", Dialect::MySql), Value::Boolean(false));
        assert_eq!(
            lenient(bytes("1.5"), "DECIMAL", Dialect::MySql),
            Value::Float64(1.5)
        );
        assert_eq!(
            lenient(bytes("2023-04-05 06:07:08"), "DATETIME", Dialect::MySql),
            Value::Timestamp(datetime!(2023-04-05 6:07:08))
        );
        assert_eq!(
            lenient(bytes("2023-04-05"), "DATE", Dialect::MySql),
            Value::Date(date!(2023 - 04 - 05))
        );
        assert_eq!(
            lenient(bytes("06:07:08"), "TIME", Dialect::MySql),
            Value::Time(time!(6:07:08))
        );
        assert_eq!(
            lenient(bytes(r#"{"a":1}"#), "JSON", Dialect::MySql),
            Value::RawJson(r#"{"a":1}"#.into())
        );
        assert_eq!(lenient(bytes("anything"), "NULL", Dialect::MySql), Value::Null);
        assert_eq!(
            lenient(bytes("hello"), "VARCHAR", Dialect::MySql),
            Value::Varchar("hello".into())
        );
        assert_eq!(lenient(bytes("\x01\x02"), "BLOB", Dialect::MySql), bytes("\x01\x02"));
    }

    #[test]
    fn type_names_are_case_sensitive() {
        assert_eq!(
            lenient(bytes("123"), "int", Dialect::MySql),
            Value::Varchar("123".into())
        );
    }

    #[test]
    fn lenient_keeps_text() {
        assert_eq!(
            lenient(bytes("12abc"), "INT", Dialect::MySql),
            Value::Varchar("12abc".into())
        );
        assert_eq!(
            lenient(bytes("maybe"), "BOOL", Dialect::MySql),
            Value::Varchar("maybe".into())
        );
        assert_eq!(
            lenient(bytes("yesterday"), "DATE", Dialect::MySql),
            Value::Varchar("yesterday".into())
        );
    }

    #[test]
    fn strict_reports_failures() {
        let error = coerce(bytes("12abc"), "INT", Dialect::MySql, CoercionPolicy::Strict)
            .expect_err("Should not coerce 12abc into an integer");
        assert_eq!(
            error.downcast_ref::<CrudError>(),
            Some(&CrudError::Coercion {
                type_name: "INT".into(),
                value: "12abc".into(),
                target: "integer",
            })
        );
        assert_eq!(
            coerce(bytes("42"), "INT", Dialect::MySql, CoercionPolicy::Strict).unwrap(),
            Value::Int64(42)
        );
    }

    #[test]
    fn sqlite_blobs_are_native() {
        let raw = Value::Blob(Box::new([0xff, 0x00]));
        for type_name in ["bytea", "VARBINARY(16)", "binary", "INT", ""] {
            assert_eq!(
                coerce(raw.clone(), type_name, Dialect::Sqlite, CoercionPolicy::Strict).unwrap(),
                raw
            );
        }
        assert_eq!(lenient(bytes("123"), "INT", Dialect::Sqlite), bytes("123"));
    }

    #[test]
    fn oracle_text() {
        assert_eq!(
            lenient(Value::Varchar("3.25".into()), "NUMBER", Dialect::Oracle),
            Value::Float64(3.25)
        );
        assert_eq!(
            lenient(
                Value::Varchar("2020-01-02 03:04:05".into()),
                "DATE",
                Dialect::Oracle
            ),
            Value::Timestamp(datetime!(2020-01-02 3:04:05))
        );
        assert_eq!(
            lenient(Value::Varchar("abc".into()), "VARCHAR2", Dialect::Oracle),
            Value::Varchar("abc".into())
        );
        assert_eq!(
            lenient(Value::Varchar("3.25".into()), "NUMBER", Dialect::MySql),
            Value::Varchar("3.25".into())
        );
    }

    #[test]
    fn sqlite_json_heuristic() {
        assert_eq!(
            lenient(Value::Varchar(r#" {"a": [1, 2]} "#.into()), "", Dialect::Sqlite),
            Value::Json(serde_json::json!({"a": [1, 2]}))
        );
        assert_eq!(
            lenient(Value::Varchar("[1,2,3]".into()), "", Dialect::Sqlite),
            Value::Json(serde_json::json!([1, 2, 3]))
        );
        assert_eq!(
            lenient(Value::Varchar("{not json}".into()), "", Dialect::Sqlite),
            Value::Varchar("{not json}".into())
        );
        assert_eq!(
            lenient(Value::Varchar("[1,2]".into()), "TEXT", Dialect::Sqlite),
            Value::Varchar("[1,2]".into())
        );
        assert_eq!(
            lenient(Value::Varchar("[1,2]".into()), "", Dialect::MySql),
            Value::Varchar("[1,2]".into())
        );
    }
}

use crate::{CBox, error_message_from_ptr};
use libsqlite3_sys::*;
use sqlcrud_core::{Error, Result, Value, truncate_long};
use std::{
    borrow::Cow,
    ffi::{CStr, c_char, c_int, c_void},
};

unsafe fn bind_text(statement: *mut sqlite3_stmt, index: c_int, text: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            text.as_ptr() as *const c_char,
            text.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

/// Bind `params` to the `?` placeholders of `statement`, in order.
///
/// Booleans are bound as integers, temporal values and JSON as text.
pub(crate) fn bind_parameters(statement: &CBox<*mut sqlite3_stmt>, params: &[Value]) -> Result<()> {
    unsafe {
        let expected = sqlite3_bind_parameter_count(**statement);
        if expected as usize != params.len() {
            return Err(Error::msg(format!(
                "The statement expects {} parameters but {} were provided",
                expected,
                params.len()
            )));
        }
        for (i, value) in params.iter().enumerate() {
            let index = i as c_int + 1;
            let rc = match value {
                Value::Null => sqlite3_bind_null(**statement, index),
                Value::Boolean(v) => sqlite3_bind_int(**statement, index, *v as c_int),
                Value::Int64(v) => sqlite3_bind_int64(**statement, index, *v),
                Value::Float64(v) => sqlite3_bind_double(**statement, index, *v),
                Value::Varchar(v) | Value::RawJson(v) => bind_text(**statement, index, v),
                Value::Blob(v) => sqlite3_bind_blob(
                    **statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Json(v) => bind_text(**statement, index, &v.to_string()),
                Value::Date(..) | Value::Time(..) | Value::Timestamp(..) => {
                    let Some(text) = value.as_text() else {
                        return Err(Error::msg(format!(
                            "Cannot format the {} parameter {}",
                            value.kind(),
                            index
                        )));
                    };
                    bind_text(**statement, index, &text)
                }
            };
            if rc != SQLITE_OK {
                let db = sqlite3_db_handle(**statement);
                let query: Cow<str> = CStr::from_ptr(sqlite3_sql(**statement)).to_string_lossy();
                let error = Error::msg(error_message_from_ptr(&sqlite3_errmsg(db)).to_string())
                    .context(format!(
                        "Cannot bind parameter {} to query:\n{}",
                        index,
                        truncate_long!(query)
                    ));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(())
    }
}

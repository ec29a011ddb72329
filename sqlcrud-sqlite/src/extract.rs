use libsqlite3_sys::*;
use sqlcrud_core::{ColumnInfo, Error, Result, Value};
use std::{
    ffi::{CStr, c_int},
    slice,
};

pub(crate) fn extract_value(statement: *mut sqlite3_stmt, index: c_int) -> Result<Value> {
    unsafe {
        let column_type = sqlite3_column_type(statement, index);
        Ok(match column_type {
            SQLITE_NULL => Value::Null,
            SQLITE_INTEGER => Value::Int64(sqlite3_column_int64(statement, index)),
            SQLITE_FLOAT => Value::Float64(sqlite3_column_double(statement, index)),
            SQLITE_BLOB => {
                let ptr = sqlite3_column_blob(statement, index) as *const u8;
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() {
                    Value::Blob(Box::default())
                } else {
                    Value::Blob(slice::from_raw_parts(ptr, len).into())
                }
            }
            SQLITE_TEXT => {
                let ptr = sqlite3_column_text(statement, index);
                let len = sqlite3_column_bytes(statement, index) as usize;
                if ptr.is_null() {
                    Value::Varchar(String::new())
                } else {
                    let bytes = slice::from_raw_parts(ptr, len);
                    match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => Value::Varchar(text),
                        Err(e) => Value::Blob(e.into_bytes().into()),
                    }
                }
            }
            _ => {
                return Err(Error::msg(format!(
                    "Unexpected column type {}",
                    column_type
                )));
            }
        })
    }
}

/// Name and declared type of a result column, the type is empty for expressions.
pub(crate) fn extract_column(statement: *mut sqlite3_stmt, index: c_int) -> Result<ColumnInfo> {
    unsafe {
        let name = sqlite3_column_name(statement, index);
        if name.is_null() {
            return Err(Error::msg(format!("Could not read the name of column {}", index)));
        }
        let name = CStr::from_ptr(name).to_str()?;
        let declared = sqlite3_column_decltype(statement, index);
        let type_name = if declared.is_null() {
            ""
        } else {
            CStr::from_ptr(declared).to_str()?
        };
        Ok(ColumnInfo::new(name, type_name))
    }
}

use crate::{
    CBox, SqliteTransaction,
    bind::bind_parameters,
    error_message_from_ptr,
    extract::{extract_column, extract_value},
};
use async_stream::try_stream;
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_close, sqlite3_column_count, sqlite3_db_handle,
    sqlite3_errmsg, sqlite3_finalize, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt, sqlite3_total_changes64,
};
use sqlcrud_core::{
    ColumnInfo, Connection, ConnectionId, Context, DbResult, Error, Executor, QueryResult, Result,
    Value, truncate_long,
    stream::Stream,
};
use std::{
    borrow::Cow,
    ffi::{CString, c_int},
    future::Future,
    ptr,
    sync::{
        Arc,
        atomic::{AtomicPtr, Ordering},
    },
};
use tokio::task::spawn_blocking;

/// Connection to a SQLite database file, or to an in memory database.
///
/// Opened with `sqlite://<path>?mode=rwc` (any SQLite URI parameter is accepted)
/// or `sqlite://:memory:`.
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
    pub(crate) id: ConnectionId,
}

impl SqliteConnection {
    pub const PREFIX: &'static str = "sqlite://";

    fn prepare(&self, sql: &str) -> impl Future<Output = Result<CBox<*mut sqlite3_stmt>>> + Send {
        let connection = AtomicPtr::new(*self.connection);
        let sql = sql.to_owned();
        async move {
            spawn_blocking(move || unsafe {
                let connection = connection.load(Ordering::Relaxed);
                let context = || format!("While preparing the query:\n{}", truncate_long!(sql));
                let text = CString::new(sql.as_bytes())
                    .context("Could not create a CString from the query String")
                    .with_context(context)?;
                let mut statement = CBox::new(ptr::null_mut(), |p| {
                    sqlite3_finalize(p);
                });
                let mut tail = ptr::null();
                let rc = sqlite3_prepare_v2(
                    connection,
                    text.as_ptr(),
                    -1,
                    &mut *statement,
                    &mut tail,
                );
                if rc != SQLITE_OK {
                    return Err(Error::msg(
                        error_message_from_ptr(&sqlite3_errmsg(connection)).to_string(),
                    )
                    .context(context()));
                }
                if !tail.is_null() && *tail != 0 && !trailing_is_blank(tail) {
                    return Err(
                        Error::msg("Cannot prepare more than one statement at a time")
                            .context(context()),
                    );
                }
                if statement.is_null() {
                    return Err(Error::msg("The query does not contain any statement")
                        .context(context()));
                }
                Ok(statement)
            })
            .await?
        }
    }

    fn step_error(statement: &CBox<*mut sqlite3_stmt>) -> Error {
        unsafe {
            Error::msg(
                error_message_from_ptr(&sqlite3_errmsg(sqlite3_db_handle(**statement)))
                    .to_string(),
            )
        }
    }
}

unsafe fn trailing_is_blank(tail: *const std::ffi::c_char) -> bool {
    unsafe {
        std::ffi::CStr::from_ptr(tail)
            .to_bytes()
            .iter()
            .all(|c| c.is_ascii_whitespace() || *c == b';')
    }
}

impl Executor for SqliteConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        let prepared = self.prepare(sql);
        let params = params.to_vec();
        try_stream! {
            let statement = prepared.await?;
            bind_parameters(&statement, &params)?;
            let count = unsafe { sqlite3_column_count(*statement) };
            let columns = (0..count)
                .map(|i| extract_column(*statement, i))
                .collect::<Result<Arc<[ColumnInfo]>>>()?;
            yield QueryResult::Columns(columns);
            loop {
                match unsafe { sqlite3_step(*statement) } {
                    SQLITE_BUSY => continue,
                    SQLITE_DONE => break,
                    SQLITE_ROW => {
                        let row = (0..count)
                            .map(|i| extract_value(*statement, i))
                            .collect::<Result<Box<[Value]>>>()?;
                        yield QueryResult::Row(row);
                    }
                    _ => Err(Self::step_error(&statement))?,
                }
            }
        }
    }

    fn exec(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<DbResult>> + Send {
        let prepared = self.prepare(sql);
        let connection = AtomicPtr::new(*self.connection);
        let params = params.to_vec();
        async move {
            let statement = prepared.await?;
            bind_parameters(&statement, &params)?;
            let connection = connection.load(Ordering::Relaxed);
            let before = unsafe { sqlite3_total_changes64(connection) };
            loop {
                match unsafe { sqlite3_step(*statement) } {
                    SQLITE_BUSY => continue,
                    SQLITE_DONE => break,
                    SQLITE_ROW => {}
                    _ => return Err(Self::step_error(&statement)),
                }
            }
            let (after, last_insert_id) = unsafe {
                (
                    sqlite3_total_changes64(connection),
                    sqlite3_last_insert_rowid(connection),
                )
            };
            Ok(DbResult {
                rows_affected: (after - before).max(0) as u64,
                last_insert_id: Some(last_insert_id).filter(|v| *v != 0),
            })
        }
    }
}

impl Connection for SqliteConnection {
    type Transaction<'c> = SqliteTransaction<'c>;

    #[allow(refining_impl_trait)]
    async fn connect(url: Cow<'static, str>) -> Result<SqliteConnection> {
        let Some(location) = url.strip_prefix(Self::PREFIX) else {
            return Err(Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                Self::PREFIX
            )));
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let location = CString::new(format!("file:{}", location)).with_context(context)?;
        let mut connection: CBox<*mut sqlite3>;
        let rc: c_int;
        unsafe {
            connection = CBox::new(ptr::null_mut(), |p| {
                sqlite3_close(p);
            });
            rc = sqlite3_open_v2(
                location.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI,
                ptr::null(),
            );
        }
        if rc != SQLITE_OK {
            let message = if connection.is_null() {
                "Out of memory".to_string()
            } else {
                unsafe { error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string() }
            };
            return Err(Error::msg(message).context(context()));
        }
        let id = ConnectionId::next();
        log::debug!("Opened {} on {}", id, url);
        Ok(Self { connection, id })
    }

    fn begin(&mut self) -> impl Future<Output = Result<SqliteTransaction<'_>>> + Send {
        SqliteTransaction::new(self)
    }
}

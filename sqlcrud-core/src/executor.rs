use crate::{
    ConnectionId, DbResult, Error, QueryResult, Result, Value,
    stream::{Stream, StreamExt},
};
use std::{future::Future, pin::pin};

/// Empty parameter list.
pub const NO_PARAMS: &[Value] = &[];

/// The three primitives every backend exposes, plus a stable identity.
///
/// Parameters are positional, the driver binds them to its native wire format.
/// Implementors are connections and transactions; the engine never owns them.
pub trait Executor: Send {
    /// Identity used to memoize the dialect of this executor.
    fn id(&self) -> ConnectionId;

    /// Run a statement returning rows.
    ///
    /// The stream yields [`QueryResult::Columns`] once, then every row, forward only.
    fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Run a statement and report the rows affected.
    fn exec(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<DbResult>> + Send;

    /// Run a query and return the first value of its first row.
    fn scalar(&mut self, sql: &str) -> impl Future<Output = Result<Value>> + Send {
        let stream = self.query(sql, NO_PARAMS);
        async move {
            let mut stream = pin!(stream);
            while let Some(item) = stream.next().await {
                if let QueryResult::Row(row) = item? {
                    return row
                        .into_vec()
                        .into_iter()
                        .next()
                        .ok_or_else(|| Error::msg("The scalar query returned a row without columns"));
                }
            }
            Err(Error::msg("The scalar query returned no rows"))
        }
    }
}

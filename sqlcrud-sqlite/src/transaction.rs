use crate::SqliteConnection;
use sqlcrud_core::{
    ConnectionId, DbResult, Executor, NO_PARAMS, QueryResult, Result, Transaction, Value,
    stream::Stream,
};
use std::future::Future;

/// Transaction opened with `BEGIN`, it reports the id of its connection.
pub struct SqliteTransaction<'c> {
    connection: &'c mut SqliteConnection,
}

impl<'c> SqliteTransaction<'c> {
    pub async fn new(connection: &'c mut SqliteConnection) -> Result<Self> {
        connection.exec("BEGIN", NO_PARAMS).await?;
        Ok(Self { connection })
    }
}

impl<'c> Executor for SqliteTransaction<'c> {
    fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.connection.query(sql, params)
    }

    fn exec(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<DbResult>> + Send {
        self.connection.exec(sql, params)
    }
}

impl<'c> Transaction<'c> for SqliteTransaction<'c> {
    fn commit(self) -> impl Future<Output = Result<()>> + Send {
        async move { self.connection.exec("COMMIT", NO_PARAMS).await.map(|_| ()) }
    }

    fn rollback(self) -> impl Future<Output = Result<()>> + Send {
        async move { self.connection.exec("ROLLBACK", NO_PARAMS).await.map(|_| ()) }
    }
}

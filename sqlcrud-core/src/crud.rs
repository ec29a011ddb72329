use crate::{
    Config, Context, CrudError, DbResult, Dialect, DialectCache, Executor, Record, RecordValues,
    Result, RowArrays, RowMap, SqlWriter, Value, assign_row, collect_arrays, collect_maps,
    collect_records, column_names, for_each_row, insert_fragment, truncate_long, update_fragment,
    where_fragment,
};
use std::sync::Arc;

/// Entry point of every data access operation.
///
/// Holds the configuration and the dialect memo. Executors are borrowed per
/// call, the engine never keeps them. Cloning shares the memo.
#[derive(Debug, Clone)]
pub struct Crud {
    config: Config,
    dialects: Arc<DialectCache>,
}

impl Default for Crud {
    /// Configuration read from the environment, see [`Config::from_env`].
    fn default() -> Self {
        Self::new(Config::from_env())
    }
}

impl Crud {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dialects: Default::default(),
        }
    }

    /// Share an existing dialect memo.
    pub fn with_dialects(mut self, dialects: Arc<DialectCache>) -> Self {
        self.dialects = dialects;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dialects(&self) -> &Arc<DialectCache> {
        &self.dialects
    }

    /// Dialect of the executor, probed once per connection.
    pub async fn dialect<E: Executor>(&self, executor: &mut E) -> Dialect {
        self.dialects.resolve(executor).await
    }

    async fn known_dialect<E: Executor>(&self, executor: &mut E) -> Result<Dialect> {
        match self.dialect(executor).await {
            Dialect::Unknown => Err(CrudError::UnknownDialect.into()),
            dialect => Ok(dialect),
        }
    }

    fn traced<T>(&self, sql: &str, result: Result<T>) -> Result<T> {
        if result.is_err() && self.config.trace_sql {
            log::error!("Error executing: {}", truncate_long!(sql));
        }
        result.with_context(|| format!("While executing `{}`", truncate_long!(sql)))
    }

    /// Run `sql` and return lower-cased column names with positional rows.
    pub async fn query_to_arrays<E: Executor>(
        &self,
        executor: &mut E,
        sql: &str,
        params: &[Value],
    ) -> Result<RowArrays> {
        let dialect = self.dialect(executor).await;
        let stream = executor.query(sql, params);
        let result = collect_arrays(stream, dialect, self.config.coercion).await;
        self.traced(sql, result)
    }

    /// Run `sql` and return one map per row, keyed by lower-cased column name.
    pub async fn query_to_maps<E: Executor>(
        &self,
        executor: &mut E,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<RowMap>> {
        let dialect = self.dialect(executor).await;
        let stream = executor.query(sql, params);
        let result = collect_maps(stream, dialect, self.config.coercion).await;
        self.traced(sql, result)
    }

    /// Run `sql` and build a record out of every row.
    pub async fn query_to_records<R, E>(
        &self,
        executor: &mut E,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<R>>
    where
        R: Record + Default,
        E: Executor,
    {
        let dialect = self.dialect(executor).await;
        let stream = executor.query(sql, params);
        let result = collect_records(stream, dialect, self.config.coercion).await;
        self.traced(sql, result)
    }

    /// Reload `record` from `table` using its primary key values.
    ///
    /// Fails with [`CrudError::NotFound`] when no row matches.
    pub async fn fetch_by_key<R, E>(&self, executor: &mut E, record: &mut R, table: &str) -> Result<()>
    where
        R: Record,
        E: Executor,
    {
        let dialect = self.known_dialect(executor).await?;
        let values = RecordValues::new(record)?;
        let condition = where_fragment(values.keys(), 0, dialect);
        let mut sql = String::with_capacity(128);
        SqlWriter::new(dialect).write_select(&mut sql, table, column_names::<R>(), &condition);
        let policy = self.config.coercion;
        let mut found = false;
        let stream = executor.query(&sql, &condition.values);
        let result = for_each_row(stream, dialect, policy, |columns, row| {
            if !found {
                found = true;
                assign_row(record, columns, row, policy)?;
            }
            Ok(())
        })
        .await;
        self.traced(&sql, result)?;
        if !found {
            return Err(CrudError::NotFound {
                table: table.into(),
                keys: values.describe_keys(),
            }
            .into());
        }
        Ok(())
    }

    /// Insert every supplied column of `record`, keys included.
    ///
    /// A record without any value is a successful no-op.
    pub async fn insert<R, E>(&self, executor: &mut E, record: &R, table: &str) -> Result<DbResult>
    where
        R: Record,
        E: Executor,
    {
        let dialect = self.known_dialect(executor).await?;
        let values = RecordValues::new(record)?;
        if values.is_empty() {
            return Ok(DbResult::default());
        }
        let fragment = insert_fragment(values.all(), dialect)?;
        let mut sql = String::with_capacity(128);
        SqlWriter::new(dialect).write_insert(&mut sql, table, &fragment);
        let result = executor.exec(&sql, &fragment.values).await;
        self.traced(&sql, result)
    }

    /// Write the non key columns of `record` into the row matching its keys.
    ///
    /// Unset optional fields are left out of the statement, nothing to set is a
    /// successful no-op.
    pub async fn update_by_key<R, E>(
        &self,
        executor: &mut E,
        record: &R,
        table: &str,
    ) -> Result<DbResult>
    where
        R: Record,
        E: Executor,
    {
        let dialect = self.known_dialect(executor).await?;
        let values = RecordValues::new(record)?;
        let set = values.values().collect::<Vec<_>>();
        let condition = where_fragment(values.keys(), set.len(), dialect);
        if condition.is_empty() {
            return Err(CrudError::MissingPrimaryKey {
                operation: "update",
                table: table.into(),
            }
            .into());
        }
        if set.is_empty() {
            return Ok(DbResult::default());
        }
        let set = update_fragment(set, dialect)?;
        let mut sql = String::with_capacity(128);
        SqlWriter::new(dialect).write_update(&mut sql, table, &set, &condition);
        let params = [set.values, condition.values].concat();
        let result = executor.exec(&sql, &params).await;
        self.traced(&sql, result)
    }

    /// Delete the row matching the keys of `record`.
    pub async fn delete_by_key<R, E>(
        &self,
        executor: &mut E,
        record: &R,
        table: &str,
    ) -> Result<DbResult>
    where
        R: Record,
        E: Executor,
    {
        let dialect = self.known_dialect(executor).await?;
        let values = RecordValues::new(record)?;
        let condition = where_fragment(values.keys(), 0, dialect);
        if condition.is_empty() {
            return Err(CrudError::MissingPrimaryKey {
                operation: "delete",
                table: table.into(),
            }
            .into());
        }
        let mut sql = String::with_capacity(64);
        SqlWriter::new(dialect).write_delete(&mut sql, table, &condition);
        let result = executor.exec(&sql, &condition.values).await;
        self.traced(&sql, result)
    }

    /// Run a statement verbatim.
    pub async fn exec<E: Executor>(
        &self,
        executor: &mut E,
        sql: &str,
        params: &[Value],
    ) -> Result<DbResult> {
        let result = executor.exec(sql, params).await;
        self.traced(sql, result)
    }
}

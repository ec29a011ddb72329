use sqlcrud::{
    ColumnInfo, ConnectionId, DbResult, Error, Executor, QueryResult, Result, Value,
    future::{self, Future},
    stream::{self, Stream},
};
use std::{collections::VecDeque, sync::Arc};

const PROBES: [&str; 4] = [
    "SELECT VERSION() AS version",
    "SELECT @@VERSION AS version",
    "SELECT BANNER FROM v$version",
    "SELECT sqlite_version()",
];

/// In memory executor answering the dialect probes of one engine family and
/// recording every other statement it receives.
pub struct ScriptedExecutor {
    id: ConnectionId,
    answers: [Option<&'static str>; 4],
    pub probes: usize,
    pub statements: Vec<(String, Vec<Value>)>,
    pub results: VecDeque<Vec<Result<QueryResult>>>,
    pub rows_affected: u64,
}

impl ScriptedExecutor {
    /// Answers to the four probes, in the order they are attempted.
    pub fn new(answers: [Option<&'static str>; 4]) -> Self {
        Self {
            id: ConnectionId::next(),
            answers,
            probes: 0,
            statements: Vec::new(),
            results: VecDeque::new(),
            rows_affected: 1,
        }
    }

    pub fn postgres() -> Self {
        Self::new([Some("PostgreSQL 16.2 on x86_64-pc-linux-gnu"), None, None, None])
    }

    pub fn mysql() -> Self {
        Self::new([Some("8.0.36"), None, None, None])
    }

    pub fn sqlserver() -> Self {
        Self::new([None, Some("Microsoft SQL Server 2022 (RTM)"), None, None])
    }

    pub fn oracle() -> Self {
        Self::new([
            None,
            None,
            Some("Oracle Database 19c Enterprise Edition"),
            None,
        ])
    }

    pub fn sqlite() -> Self {
        Self::new([None, None, None, Some("3.46.0")])
    }

    pub fn unknown() -> Self {
        Self::new([None, None, None, None])
    }

    /// Report `id` instead of a fresh identity.
    pub fn with_id(mut self, id: ConnectionId) -> Self {
        self.id = id;
        self
    }

    /// Queue the result of the next non probe query.
    pub fn with_rows(mut self, columns: &[(&str, &str)], rows: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[ColumnInfo]> = columns
            .iter()
            .map(|(name, type_name)| ColumnInfo::new(*name, *type_name))
            .collect();
        let mut items = vec![Ok(QueryResult::Columns(columns))];
        items.extend(rows.into_iter().map(|row| Ok(QueryResult::Row(row.into()))));
        self.results.push_back(items);
        self
    }

    pub fn last_statement(&self) -> (&str, &[Value]) {
        let (sql, params) = self.statements.last().expect("No statement was executed");
        (sql, params)
    }
}

impl Executor for ScriptedExecutor {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        let items = if let Some(i) = PROBES.iter().position(|p| *p == sql) {
            self.probes += 1;
            match self.answers[i] {
                Some(answer) => vec![
                    Ok(QueryResult::Columns(Arc::new([ColumnInfo::new(
                        "version", "",
                    )]))),
                    Ok(QueryResult::Row(Box::new([Value::from(answer)]))),
                ],
                None => vec![Err(Error::msg(format!("Unsupported statement: {}", sql)))],
            }
        } else {
            self.statements.push((sql.into(), params.to_vec()));
            self.results.pop_front().unwrap_or_default()
        };
        stream::iter(items)
    }

    fn exec(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<DbResult>> + Send {
        self.statements.push((sql.into(), params.to_vec()));
        future::ready(Ok(DbResult {
            rows_affected: self.rows_affected,
            last_insert_id: None,
        }))
    }
}

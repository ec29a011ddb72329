use crate::{ConnectionId, Executor};
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt::{self, Display},
    sync::{PoisonError, RwLock},
};

/// SQL family of a live connection, driving placeholder syntax and driver workarounds.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Unknown,
    /// Embedded file engine.
    Sqlite,
    MySql,
    Postgres,
    SqlServer,
    Oracle,
}

impl Dialect {
    /// Placeholder for the parameter at zero based `index`.
    pub fn placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::Postgres => Cow::Owned(format!("${}", index + 1)),
            Dialect::SqlServer => Cow::Owned(format!("@p{}", index + 1)),
            Dialect::Oracle => Cow::Owned(format!(":{}", index + 1)),
            _ => Cow::Borrowed("?"),
        }
    }

    pub fn write_placeholder(&self, out: &mut String, index: usize) {
        out.push_str(&self.placeholder(index));
    }

    pub fn is_known(&self) -> bool {
        *self != Dialect::Unknown
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Unknown => "unknown",
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
        })
    }
}

/// Memo of the dialect of each connection identity.
///
/// Once an identity is resolved (`Unknown` included) it is never probed again,
/// until [`DialectCache::invalidate`] is called for it.
#[derive(Default, Debug)]
pub struct DialectCache {
    entries: RwLock<HashMap<ConnectionId, Dialect>>,
}

impl DialectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ConnectionId) -> Option<Dialect> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    pub fn insert(&self, id: ConnectionId, dialect: Dialect) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, dialect);
    }

    /// Forget an identity, typically after its connection was closed.
    pub fn invalidate(&self, id: ConnectionId) -> Option<Dialect> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached dialect of the executor, probing it on first use.
    pub async fn resolve<E: Executor>(&self, executor: &mut E) -> Dialect {
        let id = executor.id();
        if let Some(dialect) = self.get(id) {
            return dialect;
        }
        let dialect = probe_dialect(executor).await;
        log::debug!("Resolved {} as {}", id, dialect);
        self.insert(id, dialect);
        dialect
    }
}

async fn probe_text<E: Executor>(executor: &mut E, sql: &str) -> Option<String> {
    match executor.scalar(sql).await {
        Ok(value) => Some(
            value
                .as_text()
                .map(|v| v.to_lowercase())
                .unwrap_or_default(),
        ),
        Err(e) => {
            log::debug!("Probe `{}` failed: {:#}", sql, e);
            None
        }
    }
}

/// Run the capability probes, first success wins.
pub async fn probe_dialect<E: Executor>(executor: &mut E) -> Dialect {
    if let Some(version) = probe_text(executor, "SELECT VERSION() AS version").await {
        return if version.contains("postgres") {
            Dialect::Postgres
        } else {
            Dialect::MySql
        };
    }
    if let Some(version) = probe_text(executor, "SELECT @@VERSION AS version").await {
        return if version.contains("microsoft") {
            Dialect::SqlServer
        } else {
            Dialect::MySql
        };
    }
    if let Some(banner) = probe_text(executor, "SELECT BANNER FROM v$version").await {
        if banner.contains("oracle") {
            return Dialect::Oracle;
        }
    }
    if probe_text(executor, "SELECT sqlite_version()").await.is_some() {
        return Dialect::Sqlite;
    }
    Dialect::Unknown
}

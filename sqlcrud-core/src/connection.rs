use crate::{Executor, Result, Transaction};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a live connection.
///
/// Drivers assign a process-unique id when the connection is opened, so an id is
/// never reused by a later connection. Transactions report the id of the
/// connection they run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an id managed by the caller.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection#{}", self.0)
    }
}

pub trait Connection: Executor + Sized {
    type Transaction<'c>: Transaction<'c>
    where
        Self: 'c;

    /// Open a connection to the given URL.
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>>;

    /// Start a transaction, ended by [`Transaction::commit`] or [`Transaction::rollback`].
    fn begin(&mut self) -> impl Future<Output = Result<Self::Transaction<'_>>> + Send;
}

use crate::{Executor, Result};
use std::future::Future;

/// An open transaction. Dropping it without committing leaves the outcome to the driver.
pub trait Transaction<'c>: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

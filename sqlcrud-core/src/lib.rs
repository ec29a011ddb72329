mod as_value;
mod coerce;
mod config;
mod connection;
mod crud;
mod dialect;
mod error;
mod executor;
mod materialize;
mod query;
mod record;
mod sql_writer;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use coerce::*;
pub use config::*;
pub use connection::*;
pub use crud::*;
pub use dialect::*;
pub use error::*;
pub use executor::*;
pub use materialize::*;
pub use query::*;
pub use record::*;
pub use sql_writer::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;

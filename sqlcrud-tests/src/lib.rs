mod accounts;
mod bulk;
mod errors;
mod simple;
mod transaction1;

use crate::{
    accounts::accounts, bulk::bulk, errors::errors, simple::simple, transaction1::transaction1,
};
use log::LevelFilter;
use sqlcrud::Connection;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every scenario against a fresh database reached through `connection`.
pub async fn execute_tests<C: Connection>(mut connection: C) {
    simple(&mut connection).await;
    accounts(&mut connection).await;
    bulk(&mut connection).await;
    errors(&mut connection).await;
    transaction1(&mut connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}

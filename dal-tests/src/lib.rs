mod pager;
mod student;
mod transaction;

use dal::Provider;
use log::LevelFilter;
use pager::pager;
use std::env;
use student::student;
use transaction::transaction;

pub use student::Student;

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

/// Runs the whole suite, the provider must be ready and connected to an empty scratch database.
pub async fn execute_tests<P: Provider>(provider: &P) {
    student(provider).await;
    pager(provider).await;
    transaction(provider).await;
}

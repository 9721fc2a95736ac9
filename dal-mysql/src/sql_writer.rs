use dal_core::SqlWriter;
use std::fmt::Write;

#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlSqlWriter;

impl SqlWriter for MySqlSqlWriter {
    fn write_limit(&self, out: &mut String, offset: i64, count: i64) {
        let _ = write!(out, " LIMIT {offset},{count}");
    }
}

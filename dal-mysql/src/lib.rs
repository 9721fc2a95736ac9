mod config;
mod provider;
mod row_wrap;
mod sql_writer;
mod value_wrap;

pub use config::*;
pub use provider::*;
pub(crate) use row_wrap::*;
pub use sql_writer::*;
pub(crate) use value_wrap::*;

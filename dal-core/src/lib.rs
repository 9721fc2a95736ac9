mod aggregate;
mod as_value;
mod condition;
mod entity;
mod error;
mod fields;
mod provider;
mod registry;
mod result;
mod sql_writer;
mod timestamp;
mod util;
mod value;

pub use ::anyhow::Context;
pub use aggregate::*;
pub use as_value::*;
pub use condition::*;
pub use entity::*;
pub use error::*;
pub use fields::*;
pub use provider::*;
pub use registry::*;
pub use result::*;
pub use sql_writer::*;
pub use timestamp::*;
pub use util::*;
pub use value::*;
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;

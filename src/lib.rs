//! dal reads and writes rows of a relational store from loosely typed mappings or derived
//! aggregates, without hand written SQL.
//!
//! ```rust
//! use dal::{Aggregate, Condition, Fields, GenericSqlWriter, QueryEntity, ResultKind, SqlWriter};
//!
//! #[derive(Aggregate, Default, Clone)]
//! struct Student {
//!     #[dal(name = "StuCode")]
//!     code: String,
//!     #[dal(name = "StuName")]
//!     name: String,
//! }
//!
//! let condition = Condition::equality(Student {
//!     code: "S002".into(),
//!     ..Default::default()
//! })
//! .unwrap();
//! let statements = GenericSqlWriter
//!     .sql_query(&QueryEntity::new("student", condition), ResultKind::Single)
//!     .unwrap();
//! assert_eq!(
//!     statements[0].sql,
//!     "SELECT * FROM (SELECT * FROM student WHERE StuCode=?) AS t LIMIT 1"
//! );
//! # let _ = Fields::new();
//! ```
pub use dal_core::*;
pub use dal_macros::*;

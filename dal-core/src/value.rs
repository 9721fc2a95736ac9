use crate::{Fields, format_timestamp};
use std::fmt::{self, Display};
use time::PrimitiveDateTime;

/// Dynamically shaped value moved between callers, the decoder and the store.
///
/// Scalars carry a single payload, while `List`, `Map` and `Struct` nest other values. A
/// `Struct` is the value form of a named aggregate (see [`Aggregate`](crate::Aggregate)): it
/// keeps every field, zero valued ones included, and the aggregate name so that a decode into
/// the very same aggregate type can be recognized as an identity conversion.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Varchar(String),
    Blob(Box<[u8]>),
    Timestamp(PrimitiveDateTime),
    List(Vec<Value>),
    Map(Fields),
    Struct(&'static str, Fields),
}

impl Value {
    /// Short description of the shape, used in decode errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(..) => "boolean",
            Value::Int(..) => "integer",
            Value::UInt(..) => "unsigned integer",
            Value::Float(..) => "float",
            Value::Varchar(..) => "text",
            Value::Blob(..) => "blob",
            Value::Timestamp(..) => "timestamp",
            Value::List(..) => "sequence",
            Value::Map(..) => "mapping",
            Value::Struct(..) => "aggregate",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True when the value equals the default of its shape.
    ///
    /// Zero valued aggregate fields are skipped when an aggregate is projected into a mapping,
    /// this is what makes "write only the fields you set" work for inserts and updates.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => !v,
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Varchar(v) => v.is_empty(),
            Value::Blob(v) => v.is_empty(),
            Value::Timestamp(..) => false,
            Value::List(v) => v.is_empty(),
            Value::Map(v) => v.is_empty(),
            Value::Struct(.., v) => v.values().all(Value::is_zero),
        }
    }

    /// Text representation of a scalar, `None` for nested shapes.
    ///
    /// Booleans render as `1`/`0`, timestamps use the canonical format of
    /// [`format_timestamp`] and `Null` renders as empty text.
    pub fn to_text(&self) -> Option<String> {
        Some(match self {
            Value::Null => String::new(),
            Value::Boolean(v) => if *v { "1" } else { "0" }.into(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Varchar(v) => v.clone(),
            Value::Blob(v) => String::from_utf8_lossy(v).into_owned(),
            Value::Timestamp(v) => format_timestamp(v),
            Value::List(..) | Value::Map(..) | Value::Struct(..) => return None,
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Varchar(v) => write!(f, "{v:?}"),
            Value::List(v) => {
                f.write_str("[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            Value::Map(v) | Value::Struct(.., v) => {
                if let Value::Struct(name, ..) = self {
                    f.write_str(name)?;
                }
                f.write_str("{")?;
                for (i, (k, item)) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {item}")?;
                }
                f.write_str("}")
            }
            _ => f.write_str(&self.to_text().unwrap_or_default()),
        }
    }
}

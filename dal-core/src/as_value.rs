use crate::{DalError, Fields, Result, Value, parse_timestamp};
use anyhow::Context;
use std::{
    any,
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};
use time::PrimitiveDateTime;

/// Conversion between native Rust types and the dynamically shaped [`Value`].
///
/// `as_value` produces the natural representation of a type, `try_from_value` is the decoding
/// half and implements the coercion table of the decoder:
///
/// | destination | accepted sources |
/// |---|---|
/// | `bool` | boolean, any number (non zero is true), text (`true`/`t`/`1`, `false`/`f`/`0`, empty is false) |
/// | integers, floats | any number (`as` conversion), boolean (1/0), text (empty is zero) |
/// | `String` | text, boolean (`1`/`0`), any number, timestamp (canonical format) |
/// | `PrimitiveDateTime` | timestamp, text matching one of [`TIMESTAMP_FORMATS`](crate::TIMESTAMP_FORMATS) |
/// | `Vec<T>` | sequence, element by element |
/// | maps, [`Fields`] | mapping, aggregate (zero valued fields skipped) |
/// | aggregates | same aggregate, mapping (exact name first, then ignoring case) |
///
/// Unparsable numeric or timestamp text is always an error, never a silent zero.
///
/// # Examples
/// ```rust
/// use dal_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int(42));
/// let n: u8 = AsValue::try_from_value(Value::Varchar("7".into())).unwrap();
/// assert_eq!(n, 7);
/// ```
pub trait AsValue {
    fn as_value(self) -> Value;

    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;

    /// Decode `value` into an existing destination.
    ///
    /// The default replaces the destination. Aggregates and mappings override it to write only
    /// what the source provides, leaving everything else untouched.
    fn assign_from_value(&mut self, value: Value) -> Result<()>
    where
        Self: Sized,
    {
        *self = Self::try_from_value(value)?;
        Ok(())
    }
}

impl AsValue for Value {
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        x if x.eq_ignore_ascii_case("true") || x.eq_ignore_ascii_case("t") || x == "1" => {
            Some(true)
        }
        x if x.eq_ignore_ascii_case("false") || x.eq_ignore_ascii_case("f") || x == "0" => {
            Some(false)
        }
        _ => None,
    }
}

macro_rules! impl_as_value_number {
    ($source:ty, $destination:path, $parse:ty) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $destination(self as _)
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Null => Ok(0 as _),
                    Value::Int(v) => Ok(v as _),
                    Value::UInt(v) => Ok(v as _),
                    Value::Float(v) => Ok(v as _),
                    Value::Boolean(v) => Ok(if v { 1 as _ } else { 0 as _ }),
                    Value::Varchar(ref v) if v.is_empty() => Ok(0 as _),
                    Value::Varchar(ref v) => match v.parse::<$parse>() {
                        Ok(v) => Ok(v as _),
                        Err(e) => Err(DalError::decode::<Self>(
                            &value,
                            format!("cannot parse `{v}` as {}: {e}", any::type_name::<$parse>()),
                        )),
                    },
                    _ => Err(DalError::unconvertible::<Self>(&value)),
                }
            }
        }
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                value.as_value()
            }
        }
    };
}
impl_as_value_number!(i8, Value::Int, i64);
impl_as_value_number!(i16, Value::Int, i64);
impl_as_value_number!(i32, Value::Int, i64);
impl_as_value_number!(i64, Value::Int, i64);
impl_as_value_number!(isize, Value::Int, i64);
impl_as_value_number!(u8, Value::UInt, u64);
impl_as_value_number!(u16, Value::UInt, u64);
impl_as_value_number!(u32, Value::UInt, u64);
impl_as_value_number!(u64, Value::UInt, u64);
impl_as_value_number!(usize, Value::UInt, u64);
impl_as_value_number!(f32, Value::Float, f64);
impl_as_value_number!(f64, Value::Float, f64);

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(false),
            Value::Boolean(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            Value::Float(v) => Ok(v != 0.0),
            Value::Varchar(ref v) if v.is_empty() => Ok(false),
            Value::Varchar(ref v) => parse_bool(v).ok_or_else(|| {
                DalError::decode::<Self>(&value, format!("cannot parse `{v}` as a boolean"))
            }),
            _ => Err(DalError::unconvertible::<Self>(&value)),
        }
    }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            Value::Blob(v) => String::from_utf8(v.into_vec()).map_err(|e| {
                DalError::decode::<Self>(&Value::Blob(Box::default()), format!("{e}"))
            }),
            Value::List(..) | Value::Map(..) | Value::Struct(..) => {
                Err(DalError::unconvertible::<Self>(&value))
            }
            v => Ok(v.to_text().unwrap_or_default()),
        }
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}
impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Varchar(value.clone())
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_value(self) -> Value {
        Value::Timestamp(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::Varchar(ref v) if !v.is_empty() => parse_timestamp(v)
                .map_err(|e| DalError::decode::<Self>(&value, format!("{e:#}"))),
            Value::Null | Value::Varchar(..) => Err(DalError::decode::<Self>(
                &value,
                "no timestamp information, use an Option to accept missing values",
            )),
            _ => Err(DalError::unconvertible::<Self>(&value)),
        }
    }
}
impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Varchar(ref v) if v.is_empty() => Ok(None),
            v => T::try_from_value(v).map(Some),
        }
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_value(self) -> Value {
        Value::List(self.into_iter().map(AsValue::as_value).collect())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(v) => v
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    T::try_from_value(v).with_context(|| format!("While decoding element {i}"))
                })
                .collect(),
            _ => Err(DalError::decode::<Self>(&value, "expected a sequence")),
        }
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

/// Key/value pairs of a keyed source.
///
/// A mapping yields every entry, an aggregate yields only its non zero fields. Anything else is
/// a decode error against `T`.
pub(crate) fn keyed_entries<T: ?Sized>(value: Value) -> Result<Vec<(String, Value)>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Map(v) => Ok(v.into_iter().collect()),
        Value::Struct(.., v) => Ok(v.into_iter().filter(|(_, v)| !v.is_zero()).collect()),
        _ => Err(DalError::decode::<T>(
            &value,
            "expected a mapping or an aggregate",
        )),
    }
}

fn decode_entries<T: ?Sized, V: AsValue>(
    value: Value,
) -> impl Iterator<Item = Result<(String, V)>> {
    let entries = keyed_entries::<T>(value);
    let (entries, error) = match entries {
        Ok(v) => (v, None),
        Err(e) => (Vec::new(), Some(e)),
    };
    error.map(Err).into_iter().chain(entries.into_iter().map(|(k, v)| {
        let v = V::try_from_value(v).with_context(|| format!("While decoding key `{k}`"))?;
        Ok((k, v))
    }))
}

impl<V: AsValue> AsValue for BTreeMap<String, V> {
    fn as_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.as_value())).collect())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        decode_entries::<Self, V>(value).collect()
    }
    fn assign_from_value(&mut self, value: Value) -> Result<()> {
        for entry in decode_entries::<Self, V>(value) {
            let (k, v) = entry?;
            self.insert(k, v);
        }
        Ok(())
    }
}
impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(value: BTreeMap<K, V>) -> Self {
        Value::Map(value.into_iter().collect())
    }
}

impl<V: AsValue, S: BuildHasher + Default> AsValue for HashMap<String, V, S> {
    fn as_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.as_value())).collect())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        decode_entries::<Self, V>(value).collect()
    }
    fn assign_from_value(&mut self, value: Value) -> Result<()> {
        for entry in decode_entries::<Self, V>(value) {
            let (k, v) = entry?;
            self.insert(k, v);
        }
        Ok(())
    }
}
impl<K: Into<String>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(value: HashMap<K, V, S>) -> Self {
        Value::Map(value.into_iter().collect())
    }
}

impl AsValue for Fields {
    fn as_value(self) -> Value {
        Value::Map(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(keyed_entries::<Self>(value)?.into_iter().collect())
    }
    fn assign_from_value(&mut self, value: Value) -> Result<()> {
        self.extend(keyed_entries::<Self>(value)?);
        Ok(())
    }
}
impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Value::Map(value)
    }
}

/// Convert `value` into `T`, see [`AsValue`] for the accepted conversions.
pub fn decode<T: AsValue>(value: impl Into<Value>) -> Result<T> {
    T::try_from_value(value.into())
}

/// Holds a source value until it is written into a destination.
///
/// The destination is always a `&mut`, so only the fields the source provides are touched
/// when decoding into an aggregate or a mapping.
#[derive(Debug, Clone)]
pub struct Decoder {
    input: Value,
}

impl Decoder {
    pub fn new(input: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn decode<T: AsValue>(self, destination: &mut T) -> Result<()> {
        destination.assign_from_value(self.input)
    }
}

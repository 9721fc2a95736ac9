use crate::{DalError, Result, Value};
use anyhow::Context;

/// A plain struct whose fields are visible to the decoder through compile time descriptors.
///
/// Implemented by `#[derive(Aggregate)]`, which also provides the matching
/// [`AsValue`](crate::AsValue) implementation on top of [`aggregate_as_value`] and
/// [`aggregate_assign`].
pub trait Aggregate: Default + 'static {
    /// Fully qualified name, two aggregates share a value shape only if their names match.
    fn name() -> &'static str;
    fn fields() -> &'static [FieldDef<Self>];
}

/// Accessor pair for one aggregate field.
pub struct FieldDef<A: 'static> {
    /// Key used when matching mappings and when projecting into a mapping.
    pub name: &'static str,
    pub get: fn(&A) -> Value,
    pub set: fn(&mut A, Value) -> Result<()>,
}

/// `Value::Struct` holding every field of `aggregate`, zero valued ones included.
pub fn aggregate_as_value<A: Aggregate>(aggregate: &A) -> Value {
    Value::Struct(
        A::name(),
        A::fields()
            .iter()
            .map(|f| (f.name, (f.get)(aggregate)))
            .collect(),
    )
}

/// Write `value` into `aggregate`.
///
/// The same aggregate is copied field by field. A mapping is matched by exact key first then
/// ignoring case; fields without a matching key keep their current value and keys without a
/// matching field are ignored. A different aggregate must go through a mapping first.
pub fn aggregate_assign<A: Aggregate>(aggregate: &mut A, value: Value) -> Result<()> {
    let mut fields = match value {
        Value::Null => return Ok(()),
        Value::Struct(name, fields) if name == A::name() => {
            for (def, (_, value)) in A::fields().iter().zip(fields) {
                (def.set)(aggregate, value)
                    .with_context(|| format!("While decoding field `{}`", def.name))?;
            }
            return Ok(());
        }
        Value::Map(fields) => fields,
        v @ Value::Struct(..) => {
            return Err(DalError::decode::<A>(
                &v,
                format!("expected a mapping or a `{}` aggregate", A::name()),
            ));
        }
        v => {
            return Err(DalError::decode::<A>(
                &v,
                "expected a mapping or an aggregate",
            ));
        }
    };
    for def in A::fields() {
        if let Some(value) = fields.take_ignore_case(def.name) {
            (def.set)(aggregate, value)
                .with_context(|| format!("While decoding field `{}`", def.name))?;
        }
    }
    Ok(())
}

pub fn aggregate_from_value<A: Aggregate>(value: Value) -> Result<A> {
    let mut result = A::default();
    aggregate_assign(&mut result, value)?;
    Ok(result)
}

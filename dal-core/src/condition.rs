use crate::{AsValue, Fields, Result, Value};

/// Row filter of a query, update or delete.
///
/// ```rust
/// use dal_core::{Condition, Fields};
/// let by_code = Condition::equality(Fields::from_iter([("StuCode", "S002")])).unwrap();
/// let by_age: Condition = Condition::raw("WHERE Age > ? AND Age < ?").bind(18).bind(30).into();
/// # let _ = (by_code, by_age);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `name=?` terms joined by `AND`, in field order.
    Equality(Fields),
    /// Expression written verbatim after the table, `WHERE` included, with its positional
    /// parameters.
    Raw { text: String, params: Vec<Value> },
}

impl Condition {
    /// Equality on every field of `value`, a mapping or an aggregate (zero fields excluded).
    ///
    /// An empty result is accepted here and rejected once a statement is written from it, so
    /// an empty filter can never match every row.
    pub fn equality(value: impl Into<Value>) -> Result<Self> {
        Ok(Self::Equality(Fields::try_from_value(value.into())?))
    }

    /// Raw expression, parameters are appended with [`RawCondition::bind`].
    pub fn raw(text: impl Into<String>) -> RawCondition {
        RawCondition {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn raw_with(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self::Raw {
            text: text.into(),
            params,
        }
    }

    /// Parameters in placeholder order.
    pub fn params(&self) -> Vec<Value> {
        match self {
            Self::Equality(fields) => fields.values().cloned().collect(),
            Self::Raw { params, .. } => params.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Equality(fields) => fields.is_empty(),
            Self::Raw { text, .. } => text.trim().is_empty(),
        }
    }
}

/// Builder of a [`Condition::Raw`], accepted wherever a [`Condition`] is.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCondition {
    text: String,
    params: Vec<Value>,
}

impl RawCondition {
    /// Append a positional parameter.
    pub fn bind(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }
}

impl From<RawCondition> for Condition {
    fn from(value: RawCondition) -> Self {
        Condition::Raw {
            text: value.text,
            params: value.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Condition;
    use crate::{Fields, Value};

    #[test]
    fn raw_binds_in_order() {
        let condition: Condition = Condition::raw("WHERE Age > ? AND Age < ?")
            .bind(18)
            .bind(30)
            .into();
        assert_eq!(condition.params(), [Value::from(18), Value::from(30)]);
        assert!(!condition.is_empty());
        let condition: Condition = Condition::raw(" ").into();
        assert!(condition.is_empty());
    }

    #[test]
    fn equality_params_follow_fields() {
        let condition =
            Condition::equality(Fields::from_iter([("StuCode", "S002"), ("Age", "20")])).unwrap();
        assert_eq!(condition.params(), [Value::from("S002"), Value::from("20")]);
    }
}

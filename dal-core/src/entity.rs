use crate::{AsValue, Condition, DalError, Fields, Result, Value};

/// Shape of the result a query produces.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Not specified, the entity can still be run through `single` or `list`.
    #[default]
    None,
    Single,
    List,
    Paged,
}

/// Page request, `page_index` starts at 1.
///
/// Only built through [`PagerParam::new`], so both values are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerParam {
    page_index: i64,
    page_size: i64,
}

impl PagerParam {
    pub const DEFAULT_INDEX: i64 = 1;
    pub const DEFAULT_SIZE: i64 = 15;

    /// Non positive values are replaced by the defaults.
    pub fn new(page_index: i64, page_size: i64) -> Self {
        Self {
            page_index: if page_index > 0 {
                page_index
            } else {
                Self::DEFAULT_INDEX
            },
            page_size: if page_size > 0 {
                page_size
            } else {
                Self::DEFAULT_SIZE
            },
        }
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows skipped before the requested page, an error when it does not fit an `i64`.
    pub fn offset(&self) -> Result<i64> {
        (self.page_index - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| {
                DalError::entity(format!(
                    "page {} of size {} is out of range",
                    self.page_index, self.page_size
                ))
            })
    }
}

impl Default for PagerParam {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INDEX, Self::DEFAULT_SIZE)
    }
}

/// Describes one single table select.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct QueryEntity {
    pub table: String,
    /// Projected columns, empty means `*`.
    pub fields: Vec<String>,
    /// `None` selects every row.
    pub condition: Option<Condition>,
    pub result_kind: ResultKind,
    pub pager: PagerParam,
}

impl QueryEntity {
    pub fn new(table: impl Into<String>, condition: impl Into<Condition>) -> Self {
        Self {
            table: table.into(),
            condition: Some(condition.into()),
            ..Default::default()
        }
    }

    /// Every row of `table`.
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn paged(
        table: impl Into<String>,
        condition: impl Into<Condition>,
        pager: PagerParam,
    ) -> Self {
        Self {
            table: table.into(),
            condition: Some(condition.into()),
            result_kind: ResultKind::Paged,
            pager,
            ..Default::default()
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(mut self, result_kind: ResultKind) -> Self {
        self.result_kind = result_kind;
        self
    }

    pub fn pager(mut self, pager: PagerParam) -> Self {
        self.pager = pager;
        self.result_kind = ResultKind::Paged;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

/// Describes one insert, update or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationEntity {
    pub table: String,
    pub operation: Operation,
    /// Columns written by insert and update, in this order.
    pub payload: Fields,
    /// Required by update and delete.
    pub condition: Option<Condition>,
}

impl MutationEntity {
    /// `payload` is a mapping or an aggregate, zero valued aggregate fields are not written.
    pub fn insert(table: impl Into<String>, payload: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            table: table.into(),
            operation: Operation::Insert,
            payload: Fields::try_from_value(payload.into())?,
            condition: None,
        })
    }

    pub fn update(
        table: impl Into<String>,
        payload: impl Into<Value>,
        condition: impl Into<Condition>,
    ) -> Result<Self> {
        Ok(Self {
            table: table.into(),
            operation: Operation::Update,
            payload: Fields::try_from_value(payload.into())?,
            condition: Some(condition.into()),
        })
    }

    pub fn delete(table: impl Into<String>, condition: impl Into<Condition>) -> Self {
        Self {
            table: table.into(),
            operation: Operation::Delete,
            payload: Fields::new(),
            condition: Some(condition.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PagerParam;
    use crate::DalError;

    #[test]
    fn pager_defaults_and_offset() {
        let pager = PagerParam::new(0, -3);
        assert_eq!(pager, PagerParam::new(1, 15));
        assert_eq!((pager.page_index(), pager.page_size()), (1, 15));
        assert_eq!(PagerParam::new(3, 20).offset().unwrap(), 40);
        assert_eq!(PagerParam::default().offset().unwrap(), 0);
    }

    #[test]
    fn pager_offset_overflow() {
        let error = PagerParam::new(i64::MAX / 2, 15).offset().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DalError>(),
            Some(DalError::Entity(..))
        ));
        assert_eq!(
            PagerParam::new(i64::MAX, 1).offset().unwrap(),
            i64::MAX - 1
        );
    }
}

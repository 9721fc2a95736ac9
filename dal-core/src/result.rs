use serde::Serialize;
use std::collections::BTreeMap;

/// One materialized row, every column rendered as text (`NULL` is empty text).
pub type Record = BTreeMap<String, String>;

/// Rows of the requested page together with the number of rows matching the condition.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct PagedResult {
    pub rows: Vec<Record>,
    pub total: i64,
}

/// Result of [`QueryProvider::query`](crate::QueryProvider::query), shaped by the entity's
/// result kind.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Single(Record),
    List(Vec<Record>),
    Paged(PagedResult),
}

/// Outcome of one or many mutations.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Generated identifier of the last insert, when the store reports one.
    pub last_insert_id: Option<u64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_insert_id.is_some() {
                self.last_insert_id = elem.last_insert_id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PagedResult, Record, RowsAffected};

    #[test]
    fn rows_affected_accumulate() {
        let mut total = RowsAffected::default();
        total.extend([
            RowsAffected {
                rows_affected: 1,
                last_insert_id: Some(7),
            },
            RowsAffected {
                rows_affected: 2,
                last_insert_id: None,
            },
        ]);
        assert_eq!(total.rows_affected, 3);
        assert_eq!(total.last_insert_id, Some(7));
    }

    #[test]
    fn paged_result_json() {
        let result = PagedResult {
            rows: vec![Record::from([("StuCode".into(), "S001".into())])],
            total: 12,
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"rows":[{"StuCode":"S001"}],"total":12}"#
        );
    }
}

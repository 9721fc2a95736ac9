use crate::value_to_text;
use dal_core::Record;
use mysql_async::FromRowError;

/// Row materialized as column label to text.
pub(crate) struct RowWrap(pub(crate) Record);

impl mysql_async::prelude::FromRow for RowWrap {
    fn from_row_opt(mut row: mysql_async::Row) -> Result<Self, FromRowError>
    where
        Self: Sized,
    {
        let columns = row.columns();
        let mut record = Record::new();
        for (i, column) in columns.iter().enumerate() {
            let Some(value) = row.take::<mysql_async::Value, _>(i) else {
                return Err(FromRowError(row));
            };
            record.insert(
                column.name_str().into_owned(),
                value_to_text(value, column.column_type()),
            );
        }
        Ok(RowWrap(record))
    }
}

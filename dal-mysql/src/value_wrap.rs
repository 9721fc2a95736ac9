use dal_core::{DalError, Value, format_timestamp};
use mysql_async::consts::ColumnType;
use std::fmt::Write;

pub(crate) struct ValueWrap(pub(crate) Value);

impl From<Value> for ValueWrap {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl TryFrom<ValueWrap> for mysql_async::Value {
    type Error = dal_core::Error;

    fn try_from(value: ValueWrap) -> Result<Self, Self::Error> {
        type MySqlValue = mysql_async::Value;
        Ok(match value.0 {
            Value::Null => MySqlValue::NULL,
            Value::Boolean(v) => MySqlValue::from(v),
            Value::Int(v) => MySqlValue::from(v),
            Value::UInt(v) => MySqlValue::from(v),
            Value::Float(v) => MySqlValue::from(v),
            Value::Varchar(v) => MySqlValue::from(v),
            Value::Blob(v) => MySqlValue::Bytes(v.into_vec()),
            Value::Timestamp(v) => {
                let year = u16::try_from(v.year()).map_err(|_| {
                    DalError::usage(format!(
                        "timestamp {} is out of range for MySQL",
                        format_timestamp(&v)
                    ))
                })?;
                MySqlValue::Date(
                    year,
                    v.month().into(),
                    v.day(),
                    v.hour(),
                    v.minute(),
                    v.second(),
                    v.microsecond(),
                )
            }
            v @ (Value::List(..) | Value::Map(..) | Value::Struct(..)) => {
                return Err(DalError::usage(format!(
                    "a {} cannot be bound as a MySQL parameter",
                    v.kind_name()
                )));
            }
        })
    }
}

/// Text form of a column value, `NULL` is empty text.
pub(crate) fn value_to_text(value: mysql_async::Value, column_type: ColumnType) -> String {
    type MySqlValue = mysql_async::Value;
    match value {
        MySqlValue::NULL => String::new(),
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(v) => v,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        },
        MySqlValue::Int(v) => v.to_string(),
        MySqlValue::UInt(v) => v.to_string(),
        MySqlValue::Float(v) => v.to_string(),
        MySqlValue::Double(v) => v.to_string(),
        MySqlValue::Date(year, month, day, hour, minute, second, micro) => {
            let mut out = format!("{year:04}-{month:02}-{day:02}");
            if column_type != ColumnType::MYSQL_TYPE_DATE {
                let _ = write!(out, " {hour:02}:{minute:02}:{second:02}");
                if micro != 0 {
                    let _ = write!(out, ".{micro:06}");
                }
            }
            out
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micro) => {
            let hours = days as u64 * 24 + hours as u64;
            let mut out = format!(
                "{}{hours:02}:{minutes:02}:{seconds:02}",
                if negative { "-" } else { "" }
            );
            if micro != 0 {
                let _ = write!(out, ".{micro:06}");
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ValueWrap, value_to_text};
    use dal_core::Value;
    use mysql_async::consts::ColumnType;
    use time::macros::datetime;

    #[test]
    fn parameters() {
        let value: mysql_async::Value = ValueWrap(Value::Timestamp(datetime!(
            2021-09-01 08:00:00.5
        )))
        .try_into()
        .unwrap();
        assert_eq!(value, mysql_async::Value::Date(2021, 9, 1, 8, 0, 0, 500_000));
        let value: mysql_async::Value = ValueWrap(Value::Boolean(true)).try_into().unwrap();
        assert_eq!(value, mysql_async::Value::Int(1));
        assert!(mysql_async::Value::try_from(ValueWrap(Value::List(vec![]))).is_err());
    }

    #[test]
    fn column_text() {
        type V = mysql_async::Value;
        let other = ColumnType::MYSQL_TYPE_VAR_STRING;
        assert_eq!(value_to_text(V::NULL, other), "");
        assert_eq!(value_to_text(V::Bytes(b"S001".to_vec()), other), "S001");
        assert_eq!(value_to_text(V::Int(-3), ColumnType::MYSQL_TYPE_LONG), "-3");
        assert_eq!(
            value_to_text(V::Date(2006, 1, 2, 0, 0, 0, 0), ColumnType::MYSQL_TYPE_DATE),
            "2006-01-02"
        );
        assert_eq!(
            value_to_text(
                V::Date(2006, 1, 2, 15, 4, 5, 0),
                ColumnType::MYSQL_TYPE_DATETIME
            ),
            "2006-01-02 15:04:05"
        );
        assert_eq!(
            value_to_text(V::Time(true, 1, 2, 3, 4, 0), ColumnType::MYSQL_TYPE_TIME),
            "-26:03:04"
        );
    }
}

use crate::{
    Condition, DalError, MutationEntity, Operation, QueryEntity, Result, ResultKind, Value,
    separated_by,
};
use std::fmt::{self, Display, Write};

/// Statement text with its positional parameters, in placeholder order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        f.write_str(" [")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            param.fmt(f)?;
        }
        f.write_str("]")
    }
}

/// Turns entities into parameterized statements.
///
/// Every method has a default producing `?` placeholders, a driver overrides the pieces its
/// dialect writes differently.
pub trait SqlWriter: Send + Sync {
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_table(&self, out: &mut String, table: &str) -> Result<()> {
        let table = table.trim();
        if table.is_empty() {
            return Err(DalError::entity("the table name is empty"));
        }
        self.write_identifier(out, table);
        Ok(())
    }

    fn write_projection(&self, out: &mut String, fields: &[String]) {
        if fields.is_empty() {
            out.push('*');
            return;
        }
        separated_by(
            out,
            fields,
            |out, v| self.write_identifier(out, v),
            ",",
        );
    }

    /// Writes ` WHERE ...` (or the raw text) and appends the condition parameters.
    fn write_condition(
        &self,
        out: &mut String,
        params: &mut Vec<Value>,
        condition: &Condition,
    ) -> Result<()> {
        match condition {
            Condition::Equality(fields) => {
                if fields.is_empty() {
                    return Err(DalError::condition("the equality condition has no fields"));
                }
                out.push_str(" WHERE ");
                separated_by(
                    out,
                    fields.iter(),
                    |out, (name, value)| {
                        self.write_identifier(out, name);
                        out.push_str("=?");
                        params.push(value.clone());
                    },
                    " AND ",
                );
            }
            Condition::Raw { text, params: raw } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(DalError::condition("the raw condition text is empty"));
                }
                out.push(' ');
                out.push_str(text);
                params.extend(raw.iter().cloned());
            }
        }
        Ok(())
    }

    fn write_limit(&self, out: &mut String, offset: i64, count: i64) {
        let _ = write!(out, " LIMIT {count} OFFSET {offset}");
    }

    /// `SELECT <projection> FROM <table>[ <where>]`, without any wrapping.
    fn write_select(
        &self,
        out: &mut String,
        params: &mut Vec<Value>,
        entity: &QueryEntity,
    ) -> Result<()> {
        out.push_str("SELECT ");
        self.write_projection(out, &entity.fields);
        out.push_str(" FROM ");
        self.write_table(out, &entity.table)?;
        if let Some(condition) = &entity.condition {
            self.write_condition(out, params, condition)?;
        }
        Ok(())
    }

    fn write_single(&self, out: &mut String, inner: &str) {
        out.push_str("SELECT * FROM (");
        out.push_str(inner);
        out.push_str(") AS t");
        self.write_limit_one(out);
    }

    fn write_limit_one(&self, out: &mut String) {
        out.push_str(" LIMIT 1");
    }

    /// Row count matching the same table and condition of a paged query, projection ignored.
    fn write_count(
        &self,
        out: &mut String,
        params: &mut Vec<Value>,
        entity: &QueryEntity,
    ) -> Result<()> {
        out.push_str("SELECT COUNT(*) AS total FROM ");
        self.write_table(out, &entity.table)?;
        if let Some(condition) = &entity.condition {
            self.write_condition(out, params, condition)?;
        }
        Ok(())
    }

    fn write_insert(
        &self,
        out: &mut String,
        params: &mut Vec<Value>,
        entity: &MutationEntity,
    ) -> Result<()> {
        out.push_str("INSERT INTO ");
        self.write_table(out, &entity.table)?;
        out.push('(');
        separated_by(
            out,
            entity.payload.names(),
            |out, v| self.write_identifier(out, v),
            ",",
        );
        out.push_str(") VALUES(");
        separated_by(
            out,
            entity.payload.values(),
            |out, v| {
                out.push('?');
                params.push(v.clone());
            },
            ",",
        );
        out.push(')');
        Ok(())
    }

    fn write_update(
        &self,
        out: &mut String,
        params: &mut Vec<Value>,
        entity: &MutationEntity,
    ) -> Result<()> {
        out.push_str("UPDATE ");
        self.write_table(out, &entity.table)?;
        out.push_str(" SET ");
        separated_by(
            out,
            entity.payload.iter(),
            |out, (name, value)| {
                self.write_identifier(out, name);
                out.push_str("=?");
                params.push(value.clone());
            },
            ",",
        );
        self.write_condition(out, params, required_condition(entity)?)
    }

    fn write_delete(
        &self,
        out: &mut String,
        params: &mut Vec<Value>,
        entity: &MutationEntity,
    ) -> Result<()> {
        out.push_str("DELETE FROM ");
        self.write_table(out, &entity.table)?;
        self.write_condition(out, params, required_condition(entity)?)
    }

    /// Statements for `entity` run as `kind`: one for `None`, `Single` and `List`, two (data
    /// then count) for `Paged`. Both paged statements carry the same condition parameters.
    fn sql_query(&self, entity: &QueryEntity, kind: ResultKind) -> Result<Vec<Statement>> {
        let mut inner = Statement::default();
        self.write_select(&mut inner.sql, &mut inner.params, entity)?;
        Ok(match kind {
            ResultKind::None | ResultKind::List => vec![inner],
            ResultKind::Single => {
                let mut sql = String::with_capacity(inner.sql.len() + 32);
                self.write_single(&mut sql, &inner.sql);
                vec![Statement {
                    sql,
                    params: inner.params,
                }]
            }
            ResultKind::Paged => {
                let offset = entity.pager.offset()?;
                let mut data = Statement::default();
                data.sql.push_str("SELECT * FROM (");
                data.sql.push_str(&inner.sql);
                data.sql.push_str(") AS t");
                self.write_limit(&mut data.sql, offset, entity.pager.page_size());
                data.params = inner.params;
                let mut count = Statement::default();
                self.write_count(&mut count.sql, &mut count.params, entity)?;
                vec![data, count]
            }
        })
    }

    fn sql_mutation(&self, entity: &MutationEntity) -> Result<Statement> {
        let mut result = Statement::default();
        if entity.operation != Operation::Delete && entity.payload.is_empty() {
            return Err(DalError::entity(format!(
                "nothing to write into `{}`, the payload has no fields",
                entity.table
            )));
        }
        match entity.operation {
            Operation::Insert => self.write_insert(&mut result.sql, &mut result.params, entity),
            Operation::Update => self.write_update(&mut result.sql, &mut result.params, entity),
            Operation::Delete => self.write_delete(&mut result.sql, &mut result.params, entity),
        }?;
        Ok(result)
    }
}

fn required_condition(entity: &MutationEntity) -> Result<&Condition> {
    entity.condition.as_ref().ok_or_else(|| {
        DalError::condition(format!(
            "{:?} on `{}` requires a condition",
            entity.operation, entity.table
        ))
    })
}

/// Dialect neutral writer, `LIMIT count OFFSET offset` paging.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {}

#[cfg(test)]
mod tests {
    use super::{GenericSqlWriter, SqlWriter};
    use crate::{
        Condition, DalError, Fields, MutationEntity, PagerParam, QueryEntity, ResultKind, Value,
    };

    fn student(code: &str) -> Condition {
        Condition::equality(Fields::from_iter([("StuCode", code)])).unwrap()
    }

    #[test]
    fn select_list_and_projection() {
        let writer = GenericSqlWriter;
        let entity = QueryEntity::new("student", student("S001")).fields(["StuCode", "StuName"]);
        let statements = writer.sql_query(&entity, ResultKind::List).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].sql,
            "SELECT StuCode,StuName FROM student WHERE StuCode=?"
        );
        assert_eq!(statements[0].params, [Value::from("S001")]);
    }

    #[test]
    fn select_without_condition() {
        let statements = GenericSqlWriter
            .sql_query(&QueryEntity::all("student"), ResultKind::None)
            .unwrap();
        assert_eq!(statements[0].sql, "SELECT * FROM student");
        assert!(statements[0].params.is_empty());
    }

    #[test]
    fn paged_uses_limit_offset() {
        let entity = QueryEntity::paged("student", student("S001"), PagerParam::new(2, 10));
        let statements = GenericSqlWriter
            .sql_query(&entity, ResultKind::Paged)
            .unwrap();
        assert_eq!(
            statements[0].sql,
            "SELECT * FROM (SELECT * FROM student WHERE StuCode=?) AS t LIMIT 10 OFFSET 10"
        );
        assert_eq!(
            statements[1].sql,
            "SELECT COUNT(*) AS total FROM student WHERE StuCode=?"
        );
        assert_eq!(statements[0].params, statements[1].params);
    }

    #[test]
    fn paged_out_of_range_is_entity_error() {
        let entity = QueryEntity::paged(
            "student",
            student("S001"),
            PagerParam::new(i64::MAX / 2, 15),
        );
        let error = GenericSqlWriter
            .sql_query(&entity, ResultKind::Paged)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DalError>(),
            Some(DalError::Entity(..))
        ));
        let entity = QueryEntity::all("student").pager(PagerParam::new(0, 0));
        let statements = GenericSqlWriter
            .sql_query(&entity, ResultKind::Paged)
            .unwrap();
        assert!(statements[0].sql.ends_with("LIMIT 15 OFFSET 0"));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let empty = Condition::equality(Fields::new()).unwrap();
        let error = GenericSqlWriter
            .sql_query(&QueryEntity::new("student", empty), ResultKind::List)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DalError>(),
            Some(DalError::Condition(..))
        ));
        let error = GenericSqlWriter
            .sql_query(
                &QueryEntity::new("student", Condition::raw("  ")),
                ResultKind::List,
            )
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DalError>(),
            Some(DalError::Condition(..))
        ));
        let error = GenericSqlWriter
            .sql_query(&QueryEntity::all(""), ResultKind::List)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DalError>(),
            Some(DalError::Entity(..))
        ));
        let insert = MutationEntity::insert("student", Fields::new()).unwrap();
        let error = GenericSqlWriter.sql_mutation(&insert).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DalError>(),
            Some(DalError::Entity(..))
        ));
    }

    #[test]
    fn update_params_follow_payload_then_condition() {
        let update = MutationEntity::update(
            "student",
            Fields::from_iter([("StuName", "Lyric"), ("Grade", "3")]),
            Condition::raw("WHERE StuCode=? OR StuCode=?")
                .bind("S001")
                .bind("S002"),
        )
        .unwrap();
        let statement = GenericSqlWriter.sql_mutation(&update).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE student SET StuName=?,Grade=? WHERE StuCode=? OR StuCode=?"
        );
        assert_eq!(
            statement.params,
            ["Lyric", "3", "S001", "S002"].map(Value::from)
        );
        let delete = MutationEntity::delete("student", student("S003"));
        assert_eq!(
            GenericSqlWriter.sql_mutation(&delete).unwrap().sql,
            "DELETE FROM student WHERE StuCode=?"
        );
    }
}

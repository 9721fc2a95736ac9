use crate::{
    AsValue, DalError, MutationEntity, Operation, PagedResult, QueryEntity, QueryOutput, Record,
    Result, ResultKind, RowsAffected, SqlWriter, Statement, Value, decode,
};
use anyhow::Context;
use futures::future::try_join;
use std::future::Future;

/// Statement dialect of a provider.
pub trait Dialect: Send + Sync {
    fn sql_writer(&self) -> &dyn SqlWriter;
}

/// Read side of a provider.
///
/// A driver implements [`fetch`](QueryProvider::fetch), every other operation is built on top of
/// it and of the driver's [`SqlWriter`].
pub trait QueryProvider: Dialect {
    /// Run one statement and materialize every row.
    fn fetch(&self, statement: Statement) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// First matching row, an empty record when nothing matches.
    fn single(&self, entity: &QueryEntity) -> impl Future<Output = Result<Record>> + Send {
        async move {
            let statement = first(self.sql_writer().sql_query(entity, ResultKind::Single)?)?;
            Ok(self.fetch(statement).await?.into_iter().next().unwrap_or_default())
        }
    }

    fn list(&self, entity: &QueryEntity) -> impl Future<Output = Result<Vec<Record>>> + Send {
        async move {
            let statement = first(self.sql_writer().sql_query(entity, ResultKind::List)?)?;
            self.fetch(statement).await
        }
    }

    /// Requested page and total count, both statements run concurrently.
    ///
    /// The first failure observed is returned and the other statement is dropped.
    fn paged(&self, entity: &QueryEntity) -> impl Future<Output = Result<PagedResult>> + Send {
        async move {
            let mut statements = self
                .sql_writer()
                .sql_query(entity, ResultKind::Paged)?
                .into_iter();
            let (Some(data), Some(count)) = (statements.next(), statements.next()) else {
                return Err(DalError::usage("a paged query needs a data and a count statement"));
            };
            let (rows, count) = try_join(self.fetch(data), self.fetch(count)).await?;
            let total = match count.into_iter().next() {
                Some(mut row) => {
                    let total = row
                        .remove("total")
                        .or_else(|| row.into_values().next())
                        .unwrap_or_default();
                    decode::<i64>(total).context("While reading the row count")?
                }
                None => 0,
            };
            Ok(PagedResult { rows, total })
        }
    }

    /// Dispatch on the entity's result kind.
    fn query(&self, entity: &QueryEntity) -> impl Future<Output = Result<QueryOutput>> + Send {
        async move {
            Ok(match entity.result_kind {
                ResultKind::Single => QueryOutput::Single(self.single(entity).await?),
                ResultKind::List => QueryOutput::List(self.list(entity).await?),
                ResultKind::Paged => QueryOutput::Paged(self.paged(entity).await?),
                ResultKind::None => {
                    let error = DalError::usage(format!(
                        "the query on `{}` does not specify a result kind",
                        entity.table
                    ));
                    log::error!("{:#}", error);
                    return Err(error);
                }
            })
        }
    }

    /// Write the first matching row into `destination`, untouched when nothing matches.
    fn assign_single<T: AsValue + Send>(
        &self,
        entity: &QueryEntity,
        destination: &mut T,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let row = self.single(entity).await?;
            assign_record(row, destination)
        }
    }

    fn assign_list<T: AsValue + Send>(
        &self,
        entity: &QueryEntity,
    ) -> impl Future<Output = Result<Vec<T>>> + Send {
        async move { decode_records(self.list(entity).await?) }
    }

    /// First row of a caller written statement, an empty record when there is none.
    fn single_with_sql(
        &self,
        sql: impl Into<String> + Send,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Record>> + Send {
        async move {
            let statement = Statement {
                sql: sql.into(),
                params,
            };
            Ok(self.fetch(statement).await?.into_iter().next().unwrap_or_default())
        }
    }

    fn list_with_sql(
        &self,
        sql: impl Into<String> + Send,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send {
        async move {
            self.fetch(Statement {
                sql: sql.into(),
                params,
            })
            .await
        }
    }

    fn assign_single_with_sql<T: AsValue + Send>(
        &self,
        sql: impl Into<String> + Send,
        params: Vec<Value>,
        destination: &mut T,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            let row = self.single_with_sql(sql, params).await?;
            assign_record(row, destination)
        }
    }

    fn assign_list_with_sql<T: AsValue + Send>(
        &self,
        sql: impl Into<String> + Send,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<T>>> + Send {
        async move { decode_records(self.list_with_sql(sql, params).await?) }
    }
}

/// Write side of a provider.
pub trait MutationProvider: Dialect {
    /// Run one statement outside of any explicit transaction.
    fn execute(&self, statement: Statement) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Run every statement in order inside one transaction, rolled back on the first failure.
    fn execute_transaction(
        &self,
        statements: Vec<Statement>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Generated identifier for an insert, rows affected for update and delete.
    fn exec(&self, entity: &MutationEntity) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let statement = self.sql_writer().sql_mutation(entity)?;
            let result = self.execute(statement).await?;
            Ok(match entity.operation {
                Operation::Insert => result.last_insert_id.unwrap_or_default(),
                Operation::Update | Operation::Delete => result.rows_affected,
            })
        }
    }

    /// Run a caller written statement, returns the rows affected.
    fn exec_with_sql(
        &self,
        sql: impl Into<String> + Send,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let statement = Statement {
                sql: sql.into(),
                params,
            };
            Ok(self.execute(statement).await?.rows_affected)
        }
    }

    /// All or nothing, returns the rows affected summed over every entity.
    fn exec_transaction(
        &self,
        entities: &[MutationEntity],
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            if entities.is_empty() {
                return Err(DalError::entity("the transaction has no entities"));
            }
            let writer = self.sql_writer();
            let statements = entities
                .iter()
                .enumerate()
                .map(|(i, entity)| {
                    writer
                        .sql_mutation(entity)
                        .with_context(|| format!("While writing entity {} of the transaction", i + 1))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(self.execute_transaction(statements).await?.rows_affected)
        }
    }
}

pub trait Provider: QueryProvider + MutationProvider {}

impl<P: QueryProvider + MutationProvider> Provider for P {}

/// Provider that starts unconfigured and becomes ready after [`init`](DbProvider::init).
pub trait DbProvider: Provider {
    /// Connect using the JSON configuration text, fails when already initialized.
    fn init(&mut self, config: &str) -> impl Future<Output = Result<()>> + Send;

    fn is_ready(&self) -> bool;
}

fn first(statements: Vec<Statement>) -> Result<Statement> {
    statements
        .into_iter()
        .next()
        .ok_or_else(|| DalError::usage("no statement was produced"))
}

fn assign_record<T: AsValue>(row: Record, destination: &mut T) -> Result<()> {
    destination
        .assign_from_value(row.into())
        .context("While decoding the row")
}

fn decode_records<T: AsValue>(rows: Vec<Record>) -> Result<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            T::try_from_value(row.into()).with_context(|| format!("While decoding row {i}"))
        })
        .collect()
}

use crate::{Config, MySqlSqlWriter, RowWrap, ValueWrap};
use dal_core::{
    Context, DalError, DbProvider, Dialect, Error, MutationProvider, QueryProvider, Record, Result,
    RowsAffected, SqlWriter, Statement, truncate_long,
};
use mysql_async::{
    Opts, OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, TxOpts, prelude::Queryable,
};

/// Provider backed by a `mysql_async` connection pool.
///
/// Created unconfigured, [`init`](DbProvider::init) (or [`MySqlProvider::connect`]) opens the
/// pool. Every operation takes its own connection from the pool, so one provider can be shared
/// by any number of tasks.
#[derive(Default)]
pub struct MySqlProvider {
    pool: Option<Pool>,
    config: Config,
    writer: MySqlSqlWriter,
}

impl MySqlProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(config: Config) -> Result<Self> {
        let mut result = Self::new();
        result.open(config).await?;
        Ok(result)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Close every pooled connection.
    pub async fn disconnect(self) -> Result<()> {
        if let Some(pool) = self.pool {
            pool.disconnect().await.map_err(|e| {
                let e = Error::new(e).context(DalError::Connectivity("while disconnecting".into()));
                log::error!("{:#}", e);
                e
            })?;
        }
        Ok(())
    }

    fn pool(&self) -> Result<&Pool> {
        self.pool
            .as_ref()
            .ok_or_else(|| DalError::usage("the MySQL provider is not initialized"))
    }

    async fn open(&mut self, config: Config) -> Result<()> {
        if self.pool.is_some() {
            let error = DalError::usage("the MySQL provider is already initialized");
            log::error!("{:#}", error);
            return Err(error);
        }
        let config = config.normalized().map_err(|e| {
            log::error!("{:#}", e);
            e
        })?;
        let context = || {
            DalError::Connectivity(format!(
                "While trying to connect to `{}`",
                truncate_long(&config.datasource)
            ))
        };
        let opts = Opts::from_url(&config.datasource)
            .map_err(|e| DalError::config(format!("invalid `datasource`: {e}")))?;
        let constraints = PoolConstraints::new(config.maxidle as usize, config.maxopen as usize)
            .ok_or_else(|| DalError::config("`maxidle` cannot exceed `maxopen`"))?;
        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_abs_conn_ttl(Some(config.lifetime()));
        let pool = Pool::new(OptsBuilder::from_opts(opts).pool_opts(pool_opts));
        let ping = async {
            let mut connection = pool.get_conn().await?;
            connection.ping().await
        };
        if let Err(e) = ping.await {
            let _ = pool.disconnect().await;
            let e = Error::new(e).context(context());
            log::error!("{:#}", e);
            return Err(e);
        }
        log::debug!(
            "MySQL pool ready, maxopen: {}, maxidle: {}, maxlifetime: {}s",
            config.maxopen,
            config.maxidle,
            config.maxlifetime
        );
        self.pool = Some(pool);
        self.config = config;
        Ok(())
    }

    fn print(&self, statement: &Statement) {
        if self.config.print {
            log::info!("{}", statement);
        }
    }
}

fn params(statement: &Statement) -> Result<Params> {
    if statement.params.is_empty() {
        return Ok(Params::Empty);
    }
    Ok(Params::Positional(
        statement
            .params
            .iter()
            .cloned()
            .map(|v| mysql_async::Value::try_from(ValueWrap(v)))
            .collect::<Result<_>>()?,
    ))
}

fn execution_error(statement: &Statement, error: impl Into<Error>) -> Error {
    let error = error.into().context(DalError::Execution(format!(
        "While running the statement:\n{}",
        truncate_long(&statement.sql)
    )));
    log::error!("{:#}", error);
    error
}

impl Dialect for MySqlProvider {
    fn sql_writer(&self) -> &dyn SqlWriter {
        &self.writer
    }
}

impl QueryProvider for MySqlProvider {
    async fn fetch(&self, statement: Statement) -> Result<Vec<Record>> {
        self.print(&statement);
        let params = params(&statement)?;
        let pool = self.pool()?;
        let run = async {
            let mut connection = pool.get_conn().await?;
            let rows: Vec<RowWrap> = connection.exec(statement.sql.as_str(), params).await?;
            Ok::<_, Error>(rows.into_iter().map(|v| v.0).collect())
        };
        run.await.map_err(|e| execution_error(&statement, e))
    }
}

impl MutationProvider for MySqlProvider {
    async fn execute(&self, statement: Statement) -> Result<RowsAffected> {
        self.print(&statement);
        let params = params(&statement)?;
        let pool = self.pool()?;
        let run = async {
            let mut connection = pool.get_conn().await?;
            connection.exec_drop(statement.sql.as_str(), params).await?;
            Ok::<_, Error>(RowsAffected {
                rows_affected: connection.affected_rows(),
                last_insert_id: connection.last_insert_id(),
            })
        };
        run.await.map_err(|e| execution_error(&statement, e))
    }

    async fn execute_transaction(&self, statements: Vec<Statement>) -> Result<RowsAffected> {
        let mut transaction = self
            .pool()?
            .start_transaction(TxOpts::default())
            .await
            .map_err(|e| {
                let e = Error::new(e).context(DalError::Execution(
                    "While starting the transaction".into(),
                ));
                log::error!("{:#}", e);
                e
            })?;
        let mut result = RowsAffected::default();
        for statement in &statements {
            self.print(statement);
            let run = async {
                transaction
                    .exec_drop(statement.sql.as_str(), params(statement)?)
                    .await?;
                Ok::<_, Error>(RowsAffected {
                    rows_affected: transaction.affected_rows(),
                    last_insert_id: transaction.last_insert_id(),
                })
            };
            match run.await {
                Ok(affected) => result.extend([affected]),
                Err(e) => {
                    let e = execution_error(statement, e);
                    if let Err(rollback) = transaction.rollback().await {
                        log::error!("While rolling back the transaction: {:#}", rollback);
                    }
                    return Err(e);
                }
            }
        }
        transaction
            .commit()
            .await
            .context(DalError::Execution("While committing the transaction".into()))
            .map_err(|e| {
                log::error!("{:#}", e);
                e
            })?;
        Ok(result)
    }
}

impl DbProvider for MySqlProvider {
    async fn init(&mut self, config: &str) -> Result<()> {
        let config = Config::from_json(config).map_err(|e| {
            log::error!("{:#}", e);
            e
        })?;
        self.open(config).await
    }

    fn is_ready(&self) -> bool {
        self.pool.is_some()
    }
}

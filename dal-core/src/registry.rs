use crate::{DalError, DbProvider, Result};
use std::fmt::{self, Display};

/// Name a provider is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Engine(pub &'static str);

impl Engine {
    pub const MYSQL: Engine = Engine("mysql");
}

impl Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Providers known to the application, at most one of them active.
///
/// Meant to be built once at startup and then shared by reference. Every misuse is reported as
/// [`DalError::Usage`], nothing is ever overwritten.
pub struct Registry<P: DbProvider> {
    providers: Vec<(Engine, P)>,
    active: Option<usize>,
}

impl<P: DbProvider> Default for Registry<P> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            active: None,
        }
    }
}

impl<P: DbProvider> Registry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, engine: Engine, provider: P) -> Result<()> {
        if self.providers.iter().any(|(e, _)| *e == engine) {
            let error = DalError::usage(format!("a provider is already registered as `{engine}`"));
            log::error!("{:#}", error);
            return Err(error);
        }
        self.providers.push((engine, provider));
        Ok(())
    }

    /// Initialize the provider registered as `engine` with `config` (JSON text) and make it the
    /// active one.
    pub async fn activate(&mut self, engine: Engine, config: &str) -> Result<&P> {
        if let Some(active) = self.active {
            let error = DalError::usage(format!(
                "cannot activate `{engine}`, `{}` is already active",
                self.providers[active].0
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        let Some(index) = self.providers.iter().position(|(e, _)| *e == engine) else {
            let error = DalError::usage(format!("no provider is registered as `{engine}`"));
            log::error!("{:#}", error);
            return Err(error);
        };
        let provider = &mut self.providers[index].1;
        provider.init(config).await?;
        self.active = Some(index);
        log::debug!("Provider `{engine}` is active");
        Ok(&self.providers[index].1)
    }

    pub fn active(&self) -> Result<&P> {
        self.active
            .map(|i| &self.providers[i].1)
            .ok_or_else(|| DalError::usage("no provider has been activated"))
    }

    pub fn active_engine(&self) -> Option<Engine> {
        self.active.map(|i| self.providers[i].0)
    }
}

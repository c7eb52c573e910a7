//! Storage wiring.
//!
//! Backends register a factory under a name; the configured name picks which
//! repository the service gets. [`configure_dependencies`] is the only place
//! that knows the concrete repository types.

use crate::config::Config;
use crate::repo::{CsvTaskRepository, SqliteTaskRepository, TaskRepository};
use crate::service::TaskManagerService;
use log::{debug, info};
use std::collections::BTreeMap;
use thiserror::Error;

pub type DynRepository = Box<dyn TaskRepository>;
pub type RepositoryFactory = Box<dyn Fn(&Config) -> anyhow::Result<DynRepository>>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No repository registered for backend '{name}' (available: {available})")]
    Unregistered { name: String, available: String },
    #[error("Failed to create '{name}' repository")]
    Factory {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Name -> repository factory map
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<String, RepositoryFactory>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in backends already wired
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        configure_dependencies(&mut registry);
        registry
    }

    /// Register `factory` under `name`, replacing any earlier registration
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Config) -> anyhow::Result<DynRepository> + 'static,
    {
        let name = name.to_ascii_lowercase();
        debug!("Registered repository backend '{}'", name);
        self.factories.insert(name, Box::new(factory));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the repository for `config.backend`
    pub fn resolve(&self, config: &Config) -> Result<DynRepository, RegistryError> {
        let name = config.backend.to_ascii_lowercase();
        let factory = self.factories.get(&name).ok_or_else(|| RegistryError::Unregistered {
            name: name.clone(),
            available: self.names().join(", "),
        })?;

        let repo = factory(config).map_err(|source| RegistryError::Factory {
            name: name.clone(),
            source,
        })?;
        info!("Resolved '{}' backend: {}", name, repo.describe());
        Ok(repo)
    }

    pub fn resolve_service(
        &self,
        config: &Config,
    ) -> Result<TaskManagerService<DynRepository>, RegistryError> {
        Ok(TaskManagerService::new(self.resolve(config)?))
    }
}

/// Register every built-in backend
pub fn configure_dependencies(registry: &mut RepositoryRegistry) {
    info!("Configuring application dependencies...");

    registry.register("csv", |config| {
        let path = config.data_path();
        let repo = if config.read_only {
            CsvTaskRepository::read_only(path)
        } else {
            CsvTaskRepository::new(path)
        };
        Ok(Box::new(repo) as DynRepository)
    });

    registry.register("sqlite", |config| {
        let repo = SqliteTaskRepository::open(&config.data_path())?;
        Ok(Box::new(repo) as DynRepository)
    });

    info!("Dependencies configured.");
}

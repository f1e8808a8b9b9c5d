//! Process-wide configuration defaults and per-call resolution.
//!
//! # Responsibilities
//! - Hold the installed configuration map behind an atomic pointer
//! - Merge per-call overrides over the built-in defaults
//! - Lazily load the default configuration the first time it is needed
//!
//! # Design Decisions
//! - Readers never lock: `ArcSwapOption::load_full` hands out a complete map
//! - Writers build the full replacement first, then swap it in
//! - Initialization (explicit or lazy) is serialized by one lock so a lazy
//!   load can never overwrite an explicit `initialize`

use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::config::error::ConfigResult;
use crate::config::keys;
use crate::config::loader::{self, ConfigSource};
use crate::config::ConfigurationMap;

/// Environment variable naming the default configuration file of the global store.
pub const CONFIG_FILE_ENV: &str = "REST_PIPELINE_CONFIG";

static GLOBAL: LazyLock<ConfigurationStore> = LazyLock::new(|| {
    let store = ConfigurationStore::new();
    match std::env::var_os(CONFIG_FILE_ENV) {
        Some(path) => store.default_source(PathBuf::from(path)),
        None => store,
    }
});

/// Configuration defaults shared by every call that carries no explicit override.
#[derive(Debug)]
pub struct ConfigurationStore {
    /// Built-in values every resolved map is layered over.
    defaults: ConfigurationMap,
    /// File loaded on lazy initialization, on top of `defaults`.
    default_source: Option<PathBuf>,
    current: ArcSwapOption<ConfigurationMap>,
    init_lock: Mutex<()>,
}

impl ConfigurationStore {
    /// A store seeded with the built-in defaults.
    pub fn new() -> Self {
        Self::with_defaults(keys::default_map())
    }

    /// A store seeded with custom built-in defaults.
    pub fn with_defaults(defaults: ConfigurationMap) -> Self {
        Self {
            defaults,
            default_source: None,
            current: ArcSwapOption::empty(),
            init_lock: Mutex::new(()),
        }
    }

    /// Read `path` during lazy initialization.
    pub fn default_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_source = Some(path.into());
        self
    }

    /// The process-wide store.
    pub fn global() -> &'static ConfigurationStore {
        &GLOBAL
    }

    /// Replace the installed configuration with `source` layered over the defaults.
    pub fn initialize(&self, source: ConfigSource) -> ConfigResult<()> {
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let combined = self.combine(&loader::load(source)?);
        tracing::info!(keys = combined.len(), "Configuration initialized");
        self.current.store(Some(Arc::new(combined)));
        Ok(())
    }

    /// Reload from the default source, discarding any explicit initialization.
    pub fn initialize_to_default(&self) -> ConfigResult<()> {
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let combined = self.load_default()?;
        self.current.store(Some(Arc::new(combined)));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    /// The currently installed map, if the store has been initialized.
    pub fn snapshot(&self) -> Option<Arc<ConfigurationMap>> {
        self.current.load_full()
    }

    /// Produce the complete configuration for one call.
    ///
    /// An override is merged over the built-in defaults and never touches
    /// the installed map. Without one, the installed map is returned,
    /// loading the default configuration first if nothing is installed yet.
    pub fn resolve(&self, overrides: Option<&ConfigurationMap>) -> ConfigResult<ConfigurationMap> {
        match overrides {
            Some(overrides) => Ok(self.combine(overrides)),
            None => Ok(self.current_or_init()?.as_ref().clone()),
        }
    }

    fn current_or_init(&self) -> ConfigResult<Arc<ConfigurationMap>> {
        if let Some(current) = self.current.load_full() {
            return Ok(current);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = self.current.load_full() {
            return Ok(current);
        }

        tracing::debug!(source = ?self.default_source, "Configuration not initialized, loading defaults");
        let loaded = Arc::new(self.load_default()?);
        self.current.store(Some(Arc::clone(&loaded)));
        Ok(loaded)
    }

    fn load_default(&self) -> ConfigResult<ConfigurationMap> {
        match &self.default_source {
            Some(path) => Ok(self.combine(&loader::load_file(path)?)),
            None => Ok(self.defaults.clone()),
        }
    }

    fn combine(&self, overrides: &ConfigurationMap) -> ConfigurationMap {
        let mut combined = self.defaults.clone();
        combined.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        combined
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

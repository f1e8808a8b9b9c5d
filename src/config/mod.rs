//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! properties / TOML file, stream or map
//!     → loader.rs (parse into a flat key → value map)
//!     → store.rs (layer over built-in defaults, atomic install)
//!     → resolve(override?) per call → complete ConfigurationMap
//!
//! On file change:
//!     watcher.rs detects change
//!     → store.initialize(file)
//!     → atomic swap of Arc<ConfigurationMap>
//!     → later calls observe new values
//! ```
//!
//! # Design Decisions
//! - Values stay strings until the call that needs them parses them
//! - A resolved map always carries every key in `keys::REQUIRED_KEYS`
//! - A failed load never replaces the installed map

pub mod error;
pub mod keys;
pub mod loader;
pub mod store;
pub mod watcher;

use std::collections::HashMap;

/// Flat string configuration, keyed like `http.ConnectionTimeOut`.
pub type ConfigurationMap = HashMap<String, String>;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigSource;
pub use store::ConfigurationStore;
pub use watcher::ConfigWatcher;

//! # dash-config
//!
//! Layered configuration loading for studydash using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`STUDYDASH_*` prefix, `__` as separator)
//! 2. Project-level `.studydash/config.toml`
//! 3. User-level `~/.config/studydash/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `STUDYDASH_API__BASE_URL` -> `api.base_url`,
//! `STUDYDASH_STORE__BACKEND` -> `store.backend`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use dash_config::DashConfig;
//!
//! let config = DashConfig::load_with_dotenv().expect("config");
//!
//! if config.api.is_configured() {
//!     println!("API: {}", config.api.base_url);
//! }
//! ```

mod api;
mod bucket;
mod error;
mod general;
mod store;

pub use api::ApiConfig;
pub use bucket::{BucketConfig, BucketKind};
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::{StoreBackend, StoreConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "STUDYDASH_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub bucket: BucketConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl DashConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a
    /// value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".studydash/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check that the section the selected backend needs is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] naming the missing section.
    pub fn require_backend(&self) -> Result<StoreBackend, ConfigError> {
        let backend = self.store.backend;
        let ready = match backend {
            StoreBackend::Http => self.api.is_configured(),
            StoreBackend::ObjectStore => self.bucket.is_configured(),
            StoreBackend::Memory => true,
        };
        if ready {
            Ok(backend)
        } else {
            let section = match backend {
                StoreBackend::Http => "api",
                StoreBackend::ObjectStore | StoreBackend::Memory => "bucket",
            };
            Err(ConfigError::NotConfigured {
                section: section.to_string(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("studydash").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

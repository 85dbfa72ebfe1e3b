//! Store selected at runtime from configuration.

use dash_config::{DashConfig, StoreBackend};
use dash_core::Asset;
use tracing::info;

use crate::adapter::RemoteStore;
use crate::bucket::BucketStore;
use crate::error::StoreError;
use crate::http::HttpStore;

/// Either backend, chosen by `store.backend`.
#[derive(Debug, Clone)]
pub enum ConfiguredStore {
    Http(HttpStore),
    Bucket(BucketStore),
}

impl ConfiguredStore {
    /// Build the backend the configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the selected section is missing or
    /// unusable.
    pub fn from_config(config: &DashConfig) -> Result<Self, StoreError> {
        let backend = config.require_backend()?;
        let store = match backend {
            StoreBackend::Http => Self::Http(HttpStore::from_config(&config.api)?),
            StoreBackend::ObjectStore => Self::Bucket(BucketStore::from_config(&config.bucket)?),
            StoreBackend::Memory => {
                Self::Bucket(BucketStore::in_memory(config.bucket.trimmed_prefix()))
            }
        };
        info!(backend = backend.as_str(), target = %store.describe(), "remote store ready");
        Ok(store)
    }

    /// Human-readable location of the store.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Http(store) => store.base_url().to_string(),
            Self::Bucket(store) => format!("bucket:{}", store.prefix()),
        }
    }
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Self::Http($store) => $call.await,
            Self::Bucket($store) => $call.await,
        }
    };
}

impl RemoteStore for ConfiguredStore {
    async fn upload_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        delegate!(self, store => store.upload_asset(asset))
    }

    async fn delete_asset(&self, path: &str) -> Result<(), StoreError> {
        delegate!(self, store => store.delete_asset(path))
    }

    async fn fetch_study(&self, id: &str) -> Result<serde_json::Value, StoreError> {
        delegate!(self, store => store.fetch_study(id))
    }

    async fn fetch_all_studies(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        delegate!(self, store => store.fetch_all_studies())
    }

    async fn write_study_metadata(&self, document: &serde_json::Value) -> Result<(), StoreError> {
        delegate!(self, store => store.write_study_metadata(document))
    }

    async fn delete_study_metadata(&self, id: &str) -> Result<(), StoreError> {
        delegate!(self, store => store.delete_study_metadata(id))
    }

    async fn update_study_enabled(
        &self,
        id: &str,
        enabled: bool,
        last_modified_time: i64,
    ) -> Result<(), StoreError> {
        delegate!(self, store => store.update_study_enabled(id, enabled, last_modified_time))
    }

    async fn fetch_results(&self, study_id: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        delegate!(self, store => store.fetch_results(study_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_needs_no_section() {
        let mut config = DashConfig::default();
        config.store.backend = StoreBackend::Memory;
        let store = ConfiguredStore::from_config(&config).unwrap();
        assert_eq!(store.describe(), "bucket:studies");
    }

    #[test]
    fn http_backend_uses_api_section() {
        let store = ConfiguredStore::from_config(&DashConfig::default()).unwrap();
        assert_eq!(store.describe(), "http://localhost:8080");
    }

    #[test]
    fn unconfigured_bucket_is_a_config_error() {
        let mut config = DashConfig::default();
        config.store.backend = StoreBackend::ObjectStore;
        assert!(matches!(
            ConfiguredStore::from_config(&config),
            Err(StoreError::Config(_))
        ));
    }
}

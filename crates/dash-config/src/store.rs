//! Remote store backend selection.

use serde::{Deserialize, Serialize};

/// Which remote store adapter commands talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// The dashboard HTTP API, see [`crate::ApiConfig`].
    #[default]
    Http,
    /// An object-store bucket, see [`crate::BucketConfig`].
    ObjectStore,
    /// A process-local in-memory store, for dry runs.
    Memory,
}

impl StoreBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::ObjectStore => "object_store",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

//! Object-store bucket configuration.

use serde::{Deserialize, Serialize};

fn default_prefix() -> String {
    String::from("studies")
}

/// Which object store holds the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    /// A directory on the local filesystem.
    #[default]
    Local,
    /// An S3-compatible service (AWS, R2, MinIO, ...).
    S3,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketConfig {
    #[serde(default)]
    pub kind: BucketKind,

    /// Root directory for `local` buckets.
    #[serde(default)]
    pub root: String,

    #[serde(default)]
    pub bucket_name: String,

    #[serde(default)]
    pub region: String,

    /// Custom endpoint URL for S3-compatible services.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Key prefix under which assets and metadata are stored.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            kind: BucketKind::default(),
            root: String::new(),
            bucket_name: String::new(),
            region: String::new(),
            endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            prefix: default_prefix(),
        }
    }
}

impl BucketConfig {
    /// Check if the bucket config has the minimum required fields for its kind.
    pub fn is_configured(&self) -> bool {
        match self.kind {
            BucketKind::Local => !self.root.is_empty(),
            BucketKind::S3 => {
                !self.bucket_name.is_empty()
                    && !self.access_key_id.is_empty()
                    && !self.secret_access_key.is_empty()
            }
        }
    }

    /// Prefix with surrounding slashes removed.
    pub fn trimmed_prefix(&self) -> &str {
        self.prefix.trim_matches('/')
    }
}

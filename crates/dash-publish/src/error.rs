use dash_core::ModelError;
use dash_schema::SchemaError;
use dash_store::StoreError;
use dash_sync::BatchError;
use dash_verify::VerifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    /// Verification failed; no store call was made.
    #[error("publish aborted before contacting the store: {0}")]
    Verification(#[from] VerifyError),

    #[error("cannot collect study assets: {0}")]
    Assets(#[from] ModelError),

    /// An asset batch failed. Assets written before the failure remain.
    #[error("{0}; study metadata was not changed")]
    Batch(#[from] BatchError),

    /// Assets were uploaded but the study document was not written.
    #[error(
        "metadata write for study '{study_id}' failed after {uploaded} assets were uploaded; those assets now exist without matching metadata: {source}"
    )]
    Metadata {
        study_id: String,
        uploaded: usize,
        source: StoreError,
    },

    /// A single store call outside the publish sequence failed.
    #[error("{op} for study '{study_id}' failed: {source}")]
    Store {
        op: &'static str,
        study_id: String,
        source: StoreError,
    },

    /// A document read back from the store does not decode.
    #[error("study '{study_id}' in the store is malformed: {source}")]
    Decode {
        study_id: String,
        source: SchemaError,
    },
}

impl PublishError {
    /// True when the store may hold changes from this failed attempt.
    #[must_use]
    pub const fn may_have_partial_effects(&self) -> bool {
        matches!(self, Self::Batch(_) | Self::Metadata { .. })
    }
}

//! The remote store contract.

use std::fmt;
use std::future::Future;

use dash_core::Asset;

use crate::error::StoreError;

/// The operations a remote store exposes to studydash.
///
/// Every call is one independent asynchronous unit that either succeeds or
/// fails with a [`StoreError`]. Retries and timeouts are the implementation's
/// business.
pub trait RemoteStore: Send + Sync {
    /// Store `asset.payload` under `asset.path`, overwriting any existing object.
    fn upload_asset(&self, asset: &Asset) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the object at `path`. Removing a missing object succeeds.
    fn delete_asset(&self, path: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetch one study document. A missing study is [`StoreError::NotFound`].
    fn fetch_study(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<serde_json::Value, StoreError>> + Send;

    /// Fetch every study document.
    fn fetch_all_studies(
        &self,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, StoreError>> + Send;

    /// Insert or update a study document, keyed by its `id` field.
    fn write_study_metadata(
        &self,
        document: &serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a study document.
    fn delete_study_metadata(&self, id: &str)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Set a stored study's `enabled` flag and `lastModifiedTime` without
    /// rewriting the rest of its document. A missing study is
    /// [`StoreError::NotFound`].
    fn update_study_enabled(
        &self,
        id: &str,
        enabled: bool,
        last_modified_time: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetch every result document (a completed session) recorded for a study.
    fn fetch_results(
        &self,
        study_id: &str,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, StoreError>> + Send;
}

/// Names the adapter operations, for call accounting and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreCall {
    UploadAsset,
    DeleteAsset,
    FetchStudy,
    FetchAllStudies,
    WriteStudyMetadata,
    DeleteStudyMetadata,
    UpdateStudyEnabled,
    FetchResults,
}

impl StoreCall {
    pub const ALL: [Self; 8] = [
        Self::UploadAsset,
        Self::DeleteAsset,
        Self::FetchStudy,
        Self::FetchAllStudies,
        Self::WriteStudyMetadata,
        Self::DeleteStudyMetadata,
        Self::UpdateStudyEnabled,
        Self::FetchResults,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UploadAsset => "upload_asset",
            Self::DeleteAsset => "delete_asset",
            Self::FetchStudy => "fetch_study",
            Self::FetchAllStudies => "fetch_all_studies",
            Self::WriteStudyMetadata => "write_study_metadata",
            Self::DeleteStudyMetadata => "delete_study_metadata",
            Self::UpdateStudyEnabled => "update_study_enabled",
            Self::FetchResults => "fetch_results",
        }
    }
}

impl fmt::Display for StoreCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the `id` a study document is keyed by.
///
/// # Errors
///
/// Returns [`StoreError::Parse`] if `id` is missing, not a string, or empty.
pub fn document_id(document: &serde_json::Value) -> Result<&str, StoreError> {
    document
        .get("id")
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::Parse("study document has no string 'id'".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn document_id_reads_string_id() {
        let doc = serde_json::json!({"id": "study-1"});
        assert_eq!(document_id(&doc).unwrap(), "study-1");
    }

    #[rstest]
    #[case::missing(serde_json::json!({}))]
    #[case::number(serde_json::json!({"id": 7}))]
    #[case::empty(serde_json::json!({"id": ""}))]
    #[case::not_an_object(serde_json::json!(["study-1"]))]
    fn document_id_rejects(#[case] doc: serde_json::Value) {
        assert!(matches!(document_id(&doc), Err(StoreError::Parse(_))));
    }

    #[test]
    fn call_names_are_unique() {
        let mut names: Vec<_> = StoreCall::ALL.iter().map(|c| c.to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), StoreCall::ALL.len());
    }
}

//! Deterministic asset addressing and the batch unit handed to the synchronizer.
//!
//! Binary content is never embedded in a serialized Study. Each payload is
//! addressed by a path derived from `(study id, entity id, content hash,
//! extension)`, so re-uploading unchanged content overwrites the same object.

use std::collections::BTreeMap;
use std::collections::btree_map;

use bytes::Bytes;

use crate::enums::ImageKind;
use crate::errors::ModelError;

/// Hex characters of the content hash kept in the path.
const CONTENT_KEY_LEN: usize = 16;

fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;

    for ch in input.chars() {
        let keep = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        if keep {
            out.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let sanitized = out.trim_matches('_');
    if sanitized.is_empty() {
        return "_".to_string();
    }

    let mut capped = sanitized.to_string();
    if capped.len() > 128 {
        capped.truncate(128);
    }
    capped
}

/// Build the storage path for a binary payload.
///
/// The result has the shape `{study}/{entity}-{key}.{ext}` where `key` is the
/// first 16 hex characters of the BLAKE3 hash of `content`.
#[must_use]
pub fn asset_path(study_id: &str, entity_id: &str, content: &[u8], kind: ImageKind) -> String {
    let hash = blake3::hash(content).to_hex();
    format!(
        "{}/{}-{}.{}",
        sanitize_segment(study_id),
        sanitize_segment(entity_id),
        &hash.as_str()[..CONTENT_KEY_LEN],
        kind.extension()
    )
}

/// A named binary payload, alive only for the duration of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: String,
    pub payload: Bytes,
    pub content_type: String,
}

impl Asset {
    #[must_use]
    pub fn new(path: impl Into<String>, payload: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payload,
            content_type: content_type.into(),
        }
    }

    /// An asset that only names a remote path, used for delete batches.
    #[must_use]
    pub fn reference(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payload: Bytes::new(),
            content_type: String::new(),
        }
    }
}

/// Assets processed as one unit, keyed by path.
///
/// Paths are unique: inserting the same path twice is accepted only when the
/// payloads are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBatch {
    assets: BTreeMap<String, Asset>,
}

impl AssetBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a delete batch from remote paths. Duplicate paths collapse.
    pub fn references<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets = paths
            .into_iter()
            .map(|path| {
                let asset = Asset::reference(path);
                (asset.path.clone(), asset)
            })
            .collect();
        Self { assets }
    }

    /// Add an asset to the batch.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateAsset`] if the path is already present
    /// with a different payload.
    pub fn insert(&mut self, asset: Asset) -> Result<(), ModelError> {
        match self.assets.entry(asset.path.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(asset);
                Ok(())
            }
            btree_map::Entry::Occupied(existing) => {
                if existing.get().payload == asset.payload {
                    Ok(())
                } else {
                    Err(ModelError::DuplicateAsset { path: asset.path })
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }
}

impl IntoIterator for AssetBatch {
    type Item = Asset;
    type IntoIter = btree_map::IntoValues<String, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn asset_path_is_deterministic() {
        let a = asset_path("study-1", "post-1", b"pixels", ImageKind::Png);
        let b = asset_path("study-1", "post-1", b"pixels", ImageKind::Png);
        assert_eq!(a, b);
        assert!(a.starts_with("study-1/post-1-"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn asset_path_changes_with_content() {
        let a = asset_path("s", "p", b"one", ImageKind::Png);
        let b = asset_path("s", "p", b"two", ImageKind::Png);
        assert_ne!(a, b);
    }

    #[test]
    fn asset_path_sanitizes_segments() {
        let path = asset_path("../etc", "post one/two", b"x", ImageKind::Jpeg);
        assert!(path.starts_with("etc/post_one_two-"), "got {path}");
        assert!(path.ends_with(".jpg"));
    }

    #[test]
    fn content_key_has_fixed_width() {
        let path = asset_path("s", "p", b"x", ImageKind::Gif);
        let key = path
            .trim_start_matches("s/p-")
            .trim_end_matches(".gif");
        assert_eq!(key.len(), CONTENT_KEY_LEN);
    }

    #[test]
    fn batch_accepts_identical_duplicate() {
        let mut batch = AssetBatch::new();
        let asset = Asset::new("a.png", Bytes::from_static(b"1"), "image/png");
        batch.insert(asset.clone()).unwrap();
        batch.insert(asset).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn batch_rejects_conflicting_duplicate() {
        let mut batch = AssetBatch::new();
        batch
            .insert(Asset::new("a.png", Bytes::from_static(b"1"), "image/png"))
            .unwrap();
        let err = batch
            .insert(Asset::new("a.png", Bytes::from_static(b"2"), "image/png"))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateAsset {
                path: "a.png".into()
            }
        );
    }

    #[test]
    fn references_collapse_duplicates() {
        let batch = AssetBatch::references(["x.png", "y.png", "x.png"]);
        assert_eq!(batch.paths().collect::<Vec<_>>(), vec!["x.png", "y.png"]);
        assert!(batch.iter().all(|asset| asset.payload.is_empty()));
    }
}

use std::borrow::Cow;

use bytes::Bytes;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::asset::{Asset, asset_path};
use crate::enums::ImageKind;
use crate::errors::ModelError;

/// An image attached to a post or a source avatar.
///
/// An image is always addressed by its storage path. Freshly authored images
/// also carry their bytes until they are uploaded; images read back from the
/// store carry only the path. Two images are equal when their paths are equal,
/// so an authored image and its stored counterpart compare equal.
///
/// Serialized form: the path as a JSON string.
#[derive(Debug, Clone)]
pub struct StudyImage {
    path: String,
    kind: ImageKind,
    payload: Option<Bytes>,
}

impl StudyImage {
    /// Wrap freshly authored bytes, deriving the storage path from the owning entity.
    #[must_use]
    pub fn from_bytes(study_id: &str, entity_id: &str, bytes: Bytes, kind: ImageKind) -> Self {
        Self {
            path: asset_path(study_id, entity_id, &bytes, kind),
            kind,
            payload: Some(bytes),
        }
    }

    /// Reference an image that already lives in the remote store.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidImagePath`] if the path is empty or has no
    /// recognised image extension.
    pub fn stored(path: impl Into<String>) -> Result<Self, ModelError> {
        let path = path.into();
        let kind = kind_from_path(&path)?;
        Ok(Self {
            path,
            kind,
            payload: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> ImageKind {
        self.kind
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// True while the bytes have not been handed to the remote store.
    #[must_use]
    pub const fn is_pending_upload(&self) -> bool {
        self.payload.is_some()
    }

    /// Build the upload asset for this image, if it still carries bytes.
    #[must_use]
    pub fn to_asset(&self) -> Option<Asset> {
        self.payload.as_ref().map(|bytes| {
            Asset::new(self.path.clone(), bytes.clone(), self.kind.content_type())
        })
    }

    /// Drop the bytes once they are known to be stored remotely.
    #[must_use]
    pub fn into_stored(self) -> Self {
        Self {
            payload: None,
            ..self
        }
    }
}

fn kind_from_path(path: &str) -> Result<ImageKind, ModelError> {
    if path.trim().is_empty() {
        return Err(ModelError::InvalidImagePath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        });
    }
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return Err(ModelError::InvalidImagePath {
            path: path.to_string(),
            reason: "path is missing its extension".to_string(),
        });
    };
    ImageKind::from_extension(ext).ok_or_else(|| ModelError::InvalidImagePath {
        path: path.to_string(),
        reason: format!("unsupported image extension '{ext}'"),
    })
}

impl PartialEq for StudyImage {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for StudyImage {}

impl Serialize for StudyImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path)
    }
}

impl<'de> Deserialize<'de> for StudyImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        Self::stored(path).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for StudyImage {
    fn schema_name() -> Cow<'static, str> {
        "StudyImage".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "minLength": 1,
            "pattern": "\\.[A-Za-z0-9]+$",
            "description": "Storage path of the image, ending in its file extension."
        })
    }
}

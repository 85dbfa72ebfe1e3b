//! Loading study documents and their image files from disk.

use std::path::{Component, Path};

use anyhow::Context;
use bytes::Bytes;
use dash_core::entities::{PostContent, Study, StudyImage};
use serde_json::Value;
use tracing::{debug, warn};

pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read study document {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Replace image references that name a file under `assets_dir` with the
/// file's bytes, addressed by their content-derived asset path.
///
/// References with no matching file are kept as remote paths. A reference
/// that is absolute or climbs out with `..` is an error. Returns the number
/// of images loaded.
pub fn attach_local_images(study: &mut Study, assets_dir: &Path) -> anyhow::Result<usize> {
    let study_id = study.id.clone();
    let mut loaded = 0;

    for source in &mut study.sources {
        if let Some(avatar) = &source.avatar {
            if let Some(local) = load(&study_id, &source.id, avatar, assets_dir)? {
                source.avatar = Some(local);
                loaded += 1;
            }
        }
    }
    for post in &mut study.posts {
        if let PostContent::Image(image) = &post.content {
            if let Some(local) = load(&study_id, &post.id, image, assets_dir)? {
                post.content = PostContent::Image(local);
                loaded += 1;
            }
        }
    }
    Ok(loaded)
}

fn load(
    study_id: &str,
    entity_id: &str,
    image: &StudyImage,
    assets_dir: &Path,
) -> anyhow::Result<Option<StudyImage>> {
    let relative = Path::new(image.path());
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
    {
        anyhow::bail!(
            "image path '{}' of '{entity_id}' is not inside the assets directory",
            image.path()
        );
    }
    let file = assets_dir.join(relative);
    if !file.is_file() {
        warn!(path = image.path(), dir = %assets_dir.display(), "no local file, keeping remote reference");
        return Ok(None);
    }
    let bytes = std::fs::read(&file)
        .with_context(|| format!("failed to read image {}", file.display()))?;
    debug!(file = %file.display(), bytes = bytes.len(), "loaded local image");
    Ok(Some(StudyImage::from_bytes(
        study_id,
        entity_id,
        Bytes::from(bytes),
        image.kind(),
    )))
}

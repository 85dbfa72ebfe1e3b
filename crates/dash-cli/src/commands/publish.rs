use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::bundle;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::PublishArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct PublishSummary {
    id: String,
    name: String,
    enabled: bool,
    assets_uploaded: usize,
    last_modified_time: i64,
}

/// Handle `studydash publish`.
pub async fn run(args: &PublishArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let document = bundle::read_document(&args.file)?;
    let verified = ctx
        .publisher
        .pipeline()
        .verify_document(&document)
        .with_context(|| format!("{} did not verify", args.file.display()))?;

    let mut study = verified.study;
    if let Some(dir) = &args.assets {
        let loaded = bundle::attach_local_images(&mut study, dir)?;
        info!(loaded, dir = %dir.display(), "attached local images");
    }

    let pending = study.pending_assets()?.len();
    let progress = Progress::bar(u64::try_from(pending).unwrap_or(u64::MAX), "uploading images");
    let bar = progress.handle();

    let result = ctx
        .publisher
        .publish_with_progress(&study, move |done, _total| {
            if let Some(bar) = &bar {
                bar.set_position(u64::try_from(done).unwrap_or(u64::MAX));
            }
        })
        .await;

    let published = match result {
        Ok(published) => {
            progress.finish_ok("images uploaded");
            published
        }
        Err(error) => {
            progress.finish_err("publish failed");
            return Err(error).with_context(|| format!("failed to publish study '{}'", study.id));
        }
    };

    output(
        &PublishSummary {
            id: published.study.id,
            name: published.study.basic_settings.name,
            enabled: published.study.enabled,
            assets_uploaded: published.assets_uploaded,
            last_modified_time: published.study.last_modified_time,
        },
        flags.format,
    )
}

mod publish;
mod study;
mod verify;

use dash_config::DashConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::context::AppContext;

/// Dispatch a parsed command to its handler.
///
/// `verify` is purely local; every other command builds the remote store
/// from configuration first and runs under Ctrl-C supervision.
pub async fn dispatch(
    command: Commands,
    config: &DashConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if let Commands::Verify(args) = &command {
        return verify::run(args, flags);
    }
    let ctx = AppContext::init(config)?;
    ctx.run(remote(command, &ctx, flags)).await
}

async fn remote(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Verify(args) => verify::run(&args, flags),
        Commands::Publish(args) => publish::run(&args, ctx, flags).await,
        Commands::Get { id } => study::get(&id, ctx, flags).await,
        Commands::List => study::list(ctx, flags).await,
        Commands::Delete { id } => study::delete(&id, ctx, flags).await,
        Commands::Enable { id } => study::set_enabled(&id, true, ctx, flags).await,
        Commands::Disable { id } => study::set_enabled(&id, false, ctx, flags).await,
        Commands::Results { id } => study::results(&id, ctx, flags).await,
    }
}

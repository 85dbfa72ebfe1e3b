use std::future::Future;

use anyhow::Context;
use dash_config::DashConfig;
use dash_publish::Publisher;
use dash_store::ConfiguredStore;
use dash_sync::CancellationToken;
use tokio::sync::mpsc;
use tracing::warn;

/// Exit status of a run abandoned by a second Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The command was abandoned before it finished.
#[derive(Debug, thiserror::Error)]
#[error("interrupted before the command finished")]
pub struct Interrupted;

/// Shared state for commands that talk to the remote store.
pub struct AppContext {
    pub publisher: Publisher<ConfiguredStore>,
    cancel: CancellationToken,
}

impl AppContext {
    pub fn init(config: &DashConfig) -> anyhow::Result<Self> {
        let store = ConfiguredStore::from_config(config)
            .context("failed to initialize the remote store")?;
        let cancel = CancellationToken::new();
        Ok(Self {
            publisher: Publisher::new(store).with_cancellation(cancel.clone()),
            cancel,
        })
    }

    /// Drive a command while listening for Ctrl-C.
    ///
    /// The first signal stops new store operations and lets in-flight ones
    /// settle; the second abandons the command with [`Interrupted`].
    pub async fn run<T>(&self, work: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        let result = interruptible(work, &self.cancel, rx).await;
        listener.abort();
        result
    }
}

async fn interruptible<T>(
    work: impl Future<Output = anyhow::Result<T>>,
    cancel: &CancellationToken,
    mut signals: mpsc::UnboundedReceiver<()>,
) -> anyhow::Result<T> {
    tokio::pin!(work);
    let mut interrupted = false;
    loop {
        tokio::select! {
            result = &mut work => return result,
            Some(()) = signals.recv() => {
                if interrupted {
                    return Err(Interrupted.into());
                }
                interrupted = true;
                warn!("interrupted, no further store operations will start (Ctrl-C again to exit)");
                cancel.cancel();
            }
        }
    }
}

// src/watch/session.rs

//! Starting and stopping a watch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{PomwatchError, Result};
use crate::exec::{BuildInvoker, Dispatcher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::CoalesceMode;
use crate::watch::backend::{NotificationRx, NotifyBackend, WatchBackend};
use crate::watch::pump::{EventPump, PumpExit};

/// Everything the watcher needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub root: PathBuf,
    pub coalesce: CoalesceMode,
    pub max_depth: usize,
}

/// A running watch.
///
/// Dropping the session does **not** stop the pump; call [`stop`](Self::stop)
/// or cancel the token returned by [`cancel_token`](Self::cancel_token).
#[derive(Debug)]
pub struct WatchSession {
    root: PathBuf,
    registered: usize,
    cancel: CancellationToken,
    join: JoinHandle<PumpExit>,
}

impl WatchSession {
    /// Canonical watch root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Number of directories registered by the initial walk.
    pub fn initially_registered(&self) -> usize {
        self.registered
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask the pump to stop. A build in progress is abandoned.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the pump to finish.
    pub async fn wait(self) -> Result<PumpExit> {
        self.join
            .await
            .map_err(|e| PomwatchError::Other(anyhow!("watch task failed: {e}")))
    }
}

/// Start watching with the platform backend and the real filesystem.
///
/// Must be called from within a Tokio runtime.
pub fn start<I>(options: WatchOptions, invoker: I) -> Result<WatchSession>
where
    I: BuildInvoker + 'static,
{
    let (backend, events) = NotifyBackend::new()?;
    start_with(options, Arc::new(RealFileSystem), backend, events, invoker)
}

/// Start watching with explicit collaborators.
///
/// The initial registration runs to completion on the caller's task before
/// this returns; only the pump runs in the background.
pub fn start_with<B, I>(
    options: WatchOptions,
    fs: Arc<dyn FileSystem>,
    backend: B,
    events: NotificationRx,
    invoker: I,
) -> Result<WatchSession>
where
    B: WatchBackend + 'static,
    I: BuildInvoker + 'static,
{
    if !fs.is_dir(&options.root) {
        return Err(PomwatchError::ConfigError(format!(
            "watch root {:?} is not a directory",
            options.root
        )));
    }
    let root = fs.canonicalize(&options.root)?;

    let cancel = CancellationToken::new();
    let dispatcher = Dispatcher::new(Arc::clone(&fs), root.clone(), invoker, options.coalesce);
    let mut pump = EventPump::new(
        root.clone(),
        fs,
        backend,
        dispatcher,
        events,
        cancel.clone(),
        options.max_depth,
    );

    let registration = pump.register_tree(&root);
    let registered = registration.handles.len();
    if registered == 0 {
        warn!(?root, "nothing to watch under root");
    } else {
        info!(?root, directories = registered, "watching source tree");
    }

    let join = tokio::spawn(pump.run());

    Ok(WatchSession {
        root,
        registered,
        cancel,
        join,
    })
}

// src/watch/backend.rs

//! Seam between the watcher and the platform change-notification facility.
//!
//! - [`NotifyBackend`] subscribes each directory individually through the
//!   `notify` crate (non-recursive), so the registrar stays in control of
//!   which directories are watched and which are skipped.
//! - [`DryRunBackend`] accepts every subscription without touching the
//!   platform; `--dry-run` uses it to list what would be watched.
//! - Tests provide their own backend and push events into the channel
//!   themselves.

use std::path::Path;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::{PomwatchError, Result};

/// One platform notification, or the error the platform reported instead.
pub type Notification = notify::Result<Event>;

/// Receiving end of the notification stream consumed by the pump.
pub type NotificationRx = mpsc::UnboundedReceiver<Notification>;

/// Sending end, handed to whatever produces notifications.
pub type NotificationTx = mpsc::UnboundedSender<Notification>;

/// Subscribes and unsubscribes single directories.
pub trait WatchBackend: Send {
    /// Subscribe `dir` (and only `dir`) for create/delete/modify notifications.
    fn subscribe(&mut self, dir: &Path) -> Result<()>;

    /// Cancel the subscription for `dir`.
    ///
    /// Never fails: by the time a handle is dropped the platform has usually
    /// cancelled the subscription itself.
    fn unsubscribe(&mut self, dir: &Path);
}

/// Production backend built on `notify::RecommendedWatcher`.
pub struct NotifyBackend {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend").finish()
    }
}

impl NotifyBackend {
    /// Create the platform watcher and the channel its events arrive on.
    ///
    /// Fails with [`PomwatchError::PlatformUnavailable`] when the facility
    /// cannot be created (e.g. inotify instance limit reached).
    pub fn new() -> Result<(Self, NotificationRx)> {
        let (tx, rx) = mpsc::unbounded_channel::<Notification>();

        // Called synchronously on notify's own thread.
        let inner = RecommendedWatcher::new(
            move |res: Notification| {
                if tx.send(res).is_err() {
                    debug!("notification dropped; pump already stopped");
                }
            },
            Config::default(),
        )
        .map_err(PomwatchError::PlatformUnavailable)?;

        Ok((Self { inner }, rx))
    }
}

impl WatchBackend for NotifyBackend {
    fn subscribe(&mut self, dir: &Path) -> Result<()> {
        self.inner
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| PomwatchError::Registration {
                path: dir.to_path_buf(),
                source,
            })
    }

    fn unsubscribe(&mut self, dir: &Path) {
        if let Err(err) = self.inner.unwatch(dir) {
            debug!(?dir, error = %err, "unwatch failed; subscription already gone");
        }
    }
}

/// Backend that accepts every subscription and never produces events.
#[derive(Debug, Default)]
pub struct DryRunBackend;

impl WatchBackend for DryRunBackend {
    fn subscribe(&mut self, _dir: &Path) -> Result<()> {
        Ok(())
    }

    fn unsubscribe(&mut self, dir: &Path) {
        warn!(?dir, "dry-run backend asked to unsubscribe");
    }
}

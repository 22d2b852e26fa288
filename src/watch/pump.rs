// src/watch/pump.rs

//! The long-lived loop that turns notifications into registrations and
//! builds.
//!
//! ```text
//!   Listening --batch--> Draining --set empty--> Terminated
//!       ^                   |
//!       +-------------------+
//! ```
//!
//! The pump owns the [`WatchSet`], the backend and the dispatcher outright.
//! Everything happens on the pump's own task, in delivery order: a created
//! directory is registered before the next event is looked at, and a build is
//! awaited before the next event is looked at.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::PomwatchError;
use crate::exec::{BuildInvoker, Dispatcher};
use crate::fs::FileSystem;
use crate::types::{ChangeEvent, ChangeKind};
use crate::watch::backend::{Notification, NotificationRx, WatchBackend};
use crate::watch::decode::decode;
use crate::watch::registrar::{register_tree, Registration};
use crate::watch::registry::WatchSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Listening,
    Draining,
    Terminated,
}

/// Why the pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// Every registered directory went away.
    NothingLeftToWatch,
    /// The stop token was cancelled.
    Cancelled,
    /// The notification source hung up.
    SourceClosed,
}

pub struct EventPump<B: WatchBackend, I: BuildInvoker> {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    backend: B,
    watches: WatchSet,
    dispatcher: Dispatcher<I>,
    events: NotificationRx,
    cancel: CancellationToken,
    max_depth: usize,
    state: PumpState,
}

impl<B: WatchBackend, I: BuildInvoker> std::fmt::Debug for EventPump<B, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPump")
            .field("root", &self.root)
            .field("watched", &self.watches.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend, I: BuildInvoker> EventPump<B, I> {
    pub fn new(
        root: PathBuf,
        fs: Arc<dyn FileSystem>,
        backend: B,
        dispatcher: Dispatcher<I>,
        events: NotificationRx,
        cancel: CancellationToken,
        max_depth: usize,
    ) -> Self {
        Self {
            root,
            fs,
            backend,
            watches: WatchSet::new(),
            dispatcher,
            events,
            cancel,
            max_depth,
            state: PumpState::Listening,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn watches(&self) -> &WatchSet {
        &self.watches
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    /// Register `dir` and everything below it.
    pub fn register_tree(&mut self, dir: &Path) -> Registration {
        register_tree(
            self.fs.as_ref(),
            &mut self.backend,
            &mut self.watches,
            dir,
            self.max_depth,
        )
    }

    /// Run until the watch set empties, the token is cancelled, or the
    /// notification source closes.
    pub async fn run(mut self) -> PumpExit {
        let exit = self.run_loop().await;
        self.state = PumpState::Terminated;
        info!(?exit, root = ?self.root, "watch loop finished");
        exit
    }

    async fn run_loop(&mut self) -> PumpExit {
        loop {
            if self.watches.is_empty() {
                info!("no directories left to watch");
                return PumpExit::NothingLeftToWatch;
            }

            self.state = PumpState::Listening;
            debug!(watched = self.watches.len(), "listening");

            let first = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return PumpExit::Cancelled,
                next = self.events.recv() => match next {
                    Some(n) => n,
                    None => {
                        warn!("notification source closed");
                        return PumpExit::SourceClosed;
                    }
                },
            };

            // Everything already queued behind the first notification belongs
            // to the same batch.
            let mut batch = vec![first];
            while let Ok(n) = self.events.try_recv() {
                batch.push(n);
            }

            self.state = PumpState::Draining;
            debug!(size = batch.len(), "draining batch");
            self.dispatcher.begin_batch();

            for notification in batch {
                if !self.handle_notification(notification).await {
                    return PumpExit::Cancelled;
                }
            }
        }
    }

    /// Returns false if the pump was cancelled while handling it.
    async fn handle_notification(&mut self, notification: Notification) -> bool {
        let event = match notification {
            Ok(event) => event,
            Err(err) => {
                let err = PomwatchError::WaitInterrupted(err);
                warn!(error = %err, "continuing to listen");
                return !self.cancel.is_cancelled();
            }
        };

        if event.need_rescan() {
            self.rescan();
        }

        for change in decode(self.fs.as_ref(), &self.root, &event) {
            if !self.handle_change(change).await {
                return false;
            }
        }
        !self.cancel.is_cancelled()
    }

    async fn handle_change(&mut self, change: ChangeEvent) -> bool {
        debug!(path = ?change.path, kind = %change.kind, "change observed");

        let mut pending = Vec::new();
        if change.kind == ChangeKind::Created && self.fs.is_dir(&change.path) {
            let registration = self.register_tree(&change.path);
            debug!(
                dir = ?change.path,
                new_watches = registration.handles.len(),
                "registered new subtree"
            );
            pending.extend(
                registration
                    .files
                    .into_iter()
                    .map(|f| ChangeEvent::new(f, ChangeKind::Created)),
            );
        }

        let is_deletion = change.kind == ChangeKind::Deleted;
        let deleted_path = change.path.clone();

        for event in std::iter::once(change).chain(pending) {
            let cancel = self.cancel.clone();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(path = ?event.path, "stop requested; abandoning build");
                    return false;
                }
                outcome = self.dispatcher.dispatch(&event) => {
                    debug!(?outcome, "dispatched");
                }
            }
        }

        if is_deletion {
            for handle in self.watches.invalidate_under(&mut self.backend, &deleted_path) {
                debug!(dir = ?handle.dir(), "directory removed; dropped its watch");
            }
        }

        true
    }

    /// The platform dropped notifications. Drop dead handles and walk the
    /// whole tree again to pick up directories created in the gap.
    fn rescan(&mut self) {
        warn!(root = ?self.root, "change notifications were lost (overflow); rescanning tree");
        let pruned = self.watches.prune_missing(&mut self.backend, self.fs.as_ref());
        let root = self.root.clone();
        let registration = self.register_tree(&root);
        info!(
            pruned = pruned.len(),
            added = registration.handles.len(),
            watched = self.watches.len(),
            "rescan complete"
        );
    }
}

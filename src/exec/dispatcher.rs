// src/exec/dispatcher.rs

//! Turns change events into build invocations, one at a time.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::exec::backend::{BuildInvoker, BuildOutcome};
use crate::fs::FileSystem;
use crate::types::{is_within_output_dir, BuildRequest, ChangeEvent, CoalesceMode};
use crate::watch::classify::classify;

/// What happened to one dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A build ran and exited with this code.
    Built { root: PathBuf, code: BuildOutcome },
    /// The invoker could not run the build at all.
    InvocationFailed { root: PathBuf },
    /// No project descriptor above the path.
    NoOwningUnit,
    /// The unit was already built in this batch.
    Coalesced { root: PathBuf },
    /// The path is (inside) a build output directory.
    Ignored,
}

/// Resolves the owning build unit for each event and awaits the build.
///
/// Builds are awaited inline, so a caller that dispatches events one after
/// another never has two builds in flight.
pub struct Dispatcher<I: BuildInvoker> {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    invoker: I,
    coalesce: CoalesceMode,
    built_this_batch: HashSet<PathBuf>,
}

impl<I: BuildInvoker> std::fmt::Debug for Dispatcher<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root)
            .field("coalesce", &self.coalesce)
            .finish_non_exhaustive()
    }
}

impl<I: BuildInvoker> Dispatcher<I> {
    /// `root` is the watch root; only path components below it count when
    /// deciding whether an event lies in a build output directory.
    pub fn new(fs: Arc<dyn FileSystem>, root: PathBuf, invoker: I, coalesce: CoalesceMode) -> Self {
        Self {
            fs,
            root,
            invoker,
            coalesce,
            built_this_batch: HashSet::new(),
        }
    }

    /// Start of a new notification batch; forget which units were built.
    pub fn begin_batch(&mut self) {
        self.built_this_batch.clear();
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Handle one change. Never fails: every problem is logged and reported
    /// through the returned outcome.
    pub async fn dispatch(&mut self, event: &ChangeEvent) -> DispatchOutcome {
        if is_within_output_dir(&self.root, &event.path) {
            debug!(path = ?event.path, kind = %event.kind, "change in build output; ignoring");
            return DispatchOutcome::Ignored;
        }

        let is_dir = self.fs.is_dir(&event.path);
        let Some(unit) = classify(self.fs.as_ref(), &event.path, is_dir) else {
            info!(path = ?event.path, kind = %event.kind, "found no Maven module owning this path");
            return DispatchOutcome::NoOwningUnit;
        };

        if self.coalesce == CoalesceMode::Batch && !self.built_this_batch.insert(unit.clone()) {
            debug!(
                path = ?event.path,
                root = ?unit,
                "module already built in this batch; coalescing"
            );
            return DispatchOutcome::Coalesced { root: unit };
        }

        info!(path = ?event.path, kind = %event.kind, root = ?unit, "change -> build");

        match self.invoker.invoke(BuildRequest::package(unit.clone())).await {
            Ok(0) => {
                info!(root = ?unit, "build succeeded");
                DispatchOutcome::Built { root: unit, code: 0 }
            }
            Ok(code) => {
                warn!(root = ?unit, exit_code = code, "build failed");
                DispatchOutcome::Built { root: unit, code }
            }
            Err(err) => {
                error!(root = ?unit, error = %err, "build invocation failed");
                DispatchOutcome::InvocationFailed { root: unit }
            }
        }
    }
}

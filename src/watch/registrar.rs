// src/watch/registrar.rs

//! Walks a directory subtree and subscribes every directory worth watching.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::fs::FileSystem;
use crate::types::OUTPUT_DIR_NAME;
use crate::watch::backend::WatchBackend;
use crate::watch::registry::{WatchHandle, WatchSet};

/// Result of one [`register_tree`] call.
#[derive(Debug, Default)]
pub struct Registration {
    /// Handles created by this call (directories already registered are not
    /// repeated here).
    pub handles: Vec<WatchHandle>,
    /// Regular files found directly inside the newly registered directories.
    ///
    /// Anything created in a fresh directory before its subscription existed
    /// produced no notification; the pump uses this list to catch up.
    pub files: Vec<PathBuf>,
}

/// Depth-first registration of `root` and everything below it.
///
/// - Directories named `target` are skipped together with their subtree.
/// - Symbolic links to directories are followed. Each real directory is
///   visited once per call, and a directory whose real path is already
///   registered under another name is not entered at all, which keeps link
///   cycles finite. `max_depth` bounds nesting as a second guard.
/// - Directories that are already registered under the same name are not
///   subscribed again, but are still descended into, so calling this again
///   on a known root picks up directories that were missed.
/// - A failed subscription is logged and the walk continues.
pub fn register_tree(
    fs: &dyn FileSystem,
    backend: &mut dyn WatchBackend,
    set: &mut WatchSet,
    root: &Path,
    max_depth: usize,
) -> Registration {
    let mut registration = Registration::default();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut stack: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];

    while let Some((dir, depth)) = stack.pop() {
        if !fs.is_dir(&dir) {
            trace!(?dir, "not a directory (anymore); skipping");
            continue;
        }

        if is_excluded(&dir) {
            debug!(?dir, "skipping build output directory");
            continue;
        }

        let real_dir = fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !visited.insert(real_dir.clone()) {
            debug!(?dir, real = ?real_dir, "already visited in this walk; skipping");
            continue;
        }

        let newly_registered = if set.contains(&dir) {
            false
        } else if set.contains_real(&real_dir) {
            debug!(?dir, real = ?real_dir, "directory already watched under another name");
            continue;
        } else {
            match backend.subscribe(&dir) {
                Ok(()) => {
                    let handle = WatchHandle::new(dir.clone(), real_dir);
                    set.insert(handle.clone());
                    registration.handles.push(handle);
                    debug!(?dir, "watching");
                    true
                }
                Err(err) => {
                    warn!(?dir, error = %err, "failed to register directory; continuing");
                    false
                }
            }
        };

        let mut entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(?dir, error = %err, "failed to list directory; not descending");
                continue;
            }
        };
        entries.sort();

        let mut subdirs = Vec::new();
        for entry in entries {
            if fs.is_dir(&entry) {
                subdirs.push(entry);
            } else if newly_registered && fs.is_file(&entry) {
                registration.files.push(entry);
            }
        }

        if depth >= max_depth {
            if !subdirs.is_empty() {
                warn!(?dir, max_depth, "maximum depth reached; not descending further");
            }
            continue;
        }

        // Reverse so the first entry is popped first.
        for sub in subdirs.into_iter().rev() {
            stack.push((sub, depth + 1));
        }
    }

    registration
}

fn is_excluded(dir: &Path) -> bool {
    dir.file_name().is_some_and(|name| name == OUTPUT_DIR_NAME)
}

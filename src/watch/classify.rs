// src/watch/classify.rs

//! Maps a changed path to the build unit that owns it.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::types::PROJECT_DESCRIPTOR;

/// Find the nearest directory at or above `path` that contains a project
/// descriptor.
///
/// The walk starts at `path` itself when it is a directory, otherwise at its
/// parent. Returns `None` once the filesystem root is passed without a match.
///
/// Nothing is cached: descriptors can appear or vanish between two events.
pub fn classify(fs: &dyn FileSystem, path: &Path, is_dir: bool) -> Option<PathBuf> {
    let start = if is_dir { Some(path) } else { path.parent() }?;

    start
        .ancestors()
        .find(|dir| fs.is_file(&dir.join(PROJECT_DESCRIPTOR)))
        .map(Path::to_path_buf)
}

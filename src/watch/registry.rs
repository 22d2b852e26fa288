// src/watch/registry.rs

//! The set of live watch handles and its lifecycle.
//!
//! [`WatchSet`] is owned by the pump and handed around by `&mut`; nothing
//! else keeps a reference to it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::backend::WatchBackend;

/// Subscription token for exactly one directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchHandle {
    dir: PathBuf,
    real_dir: PathBuf,
}

impl WatchHandle {
    pub(crate) fn new(dir: PathBuf, real_dir: PathBuf) -> Self {
        Self { dir, real_dir }
    }

    /// Directory as registered (may go through a symbolic link).
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory with every symbolic link resolved.
    pub fn real_dir(&self) -> &Path {
        &self.real_dir
    }
}

/// Registered directories, one handle each.
///
/// Also indexes real paths, so one physical directory reachable under two
/// names is only ever registered once.
#[derive(Debug, Default)]
pub struct WatchSet {
    handles: HashMap<PathBuf, WatchHandle>,
    real_dirs: HashSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.handles.contains_key(dir)
    }

    pub fn contains_real(&self, real_dir: &Path) -> bool {
        self.real_dirs.contains(real_dir)
    }

    pub fn get(&self, dir: &Path) -> Option<&WatchHandle> {
        self.handles.get(dir)
    }

    /// Registered directories, sorted.
    pub fn dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.handles.keys().cloned().collect();
        dirs.sort();
        dirs
    }

    /// Returns false (and keeps the existing handle) if either the directory
    /// or its real path is already registered.
    pub(crate) fn insert(&mut self, handle: WatchHandle) -> bool {
        if self.handles.contains_key(&handle.dir) || self.real_dirs.contains(&handle.real_dir) {
            return false;
        }
        self.real_dirs.insert(handle.real_dir.clone());
        self.handles.insert(handle.dir.clone(), handle);
        true
    }

    /// Drop the handle for `dir` and cancel its subscription.
    pub fn invalidate(&mut self, backend: &mut dyn WatchBackend, dir: &Path) -> Option<WatchHandle> {
        let handle = self.handles.remove(dir)?;
        self.real_dirs.remove(&handle.real_dir);
        backend.unsubscribe(&handle.dir);
        debug!(dir = ?handle.dir, remaining = self.handles.len(), "watch handle invalidated");
        Some(handle)
    }

    /// Drop every handle at or below `path`.
    ///
    /// Used for deletions: once a directory is gone, the subscriptions of the
    /// directory and everything under it are dead even if a directory with
    /// the same name is created again right away.
    pub fn invalidate_under(&mut self, backend: &mut dyn WatchBackend, path: &Path) -> Vec<WatchHandle> {
        let doomed: Vec<PathBuf> = self
            .handles
            .keys()
            .filter(|dir| dir.starts_with(path))
            .cloned()
            .collect();

        doomed
            .iter()
            .filter_map(|dir| self.invalidate(backend, dir))
            .collect()
    }

    /// Drop handles whose directory no longer exists.
    pub fn prune_missing(&mut self, backend: &mut dyn WatchBackend, fs: &dyn FileSystem) -> Vec<WatchHandle> {
        let missing: Vec<PathBuf> = self
            .handles
            .keys()
            .filter(|dir| !fs.is_dir(dir))
            .cloned()
            .collect();

        missing
            .iter()
            .filter_map(|dir| self.invalidate(backend, dir))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::fs::mock::MockFileSystem;

    #[derive(Default)]
    struct CountingBackend {
        unsubscribed: Vec<PathBuf>,
    }

    impl WatchBackend for CountingBackend {
        fn subscribe(&mut self, _dir: &Path) -> Result<()> {
            Ok(())
        }

        fn unsubscribe(&mut self, dir: &Path) {
            self.unsubscribed.push(dir.to_path_buf());
        }
    }

    fn handle(dir: &str) -> WatchHandle {
        WatchHandle::new(PathBuf::from(dir), PathBuf::from(dir))
    }

    #[test]
    fn same_real_dir_is_not_registered_twice() {
        let mut set = WatchSet::new();
        assert!(set.insert(handle("/w/a")));
        assert!(!set.insert(handle("/w/a")));
        assert!(!set.insert(WatchHandle::new(PathBuf::from("/w/alias"), PathBuf::from("/w/a"))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn invalidate_under_removes_descendants_only() {
        let mut set = WatchSet::new();
        let mut backend = CountingBackend::default();
        for d in ["/w", "/w/a", "/w/a/b", "/w/ab"] {
            set.insert(handle(d));
        }

        let gone = set.invalidate_under(&mut backend, Path::new("/w/a"));

        assert_eq!(gone.len(), 2);
        assert_eq!(set.dirs(), vec![PathBuf::from("/w"), PathBuf::from("/w/ab")]);
        assert_eq!(backend.unsubscribed.len(), 2);
        // Real path index follows the handles.
        assert!(!set.contains_real(Path::new("/w/a/b")));
    }

    #[test]
    fn prune_missing_drops_vanished_dirs() {
        let fs = MockFileSystem::new();
        fs.add_dir("/w/a");
        let mut set = WatchSet::new();
        let mut backend = CountingBackend::default();
        set.insert(handle("/w"));
        set.insert(handle("/w/a"));
        set.insert(handle("/w/gone"));

        let pruned = set.prune_missing(&mut backend, &fs);

        assert_eq!(pruned, vec![handle("/w/gone")]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn invalidating_last_handle_empties_set() {
        let mut set = WatchSet::new();
        let mut backend = CountingBackend::default();
        set.insert(handle("/w"));
        assert!(set.invalidate(&mut backend, Path::new("/w")).is_some());
        assert!(set.is_empty());
        assert!(set.invalidate(&mut backend, Path::new("/w")).is_none());
    }
}

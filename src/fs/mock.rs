// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Link hops allowed while resolving a path, mirroring the kernel's ELOOP limit.
const MAX_LINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<String>), // List of child names
    Link(PathBuf),    // Absolute target
}

/// In-memory tree keyed by absolute path.
///
/// Cloning shares the underlying tree, so a test can keep one clone to mutate
/// while the code under test holds another.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains_key(path) {
            Self::insert_locked(&mut entries, path, MockEntry::Dir(Vec::new()));
        }
    }

    /// Create a symbolic link at `link` pointing to the absolute `target`.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(link.as_ref(), MockEntry::Link(target.as_ref().to_path_buf()));
    }

    /// Remove `path` and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|p, _| !p.starts_with(path));
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
                let name = name.to_string_lossy();
                children.retain(|c| *c != name);
            }
        }
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        Self::insert_locked(&mut entries, path, entry);
    }

    fn insert_locked(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, entry: MockEntry) {
        entries.insert(path.to_path_buf(), entry);

        // Parents are created implicitly.
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if !entries.contains_key(parent) {
                Self::insert_locked(entries, parent, MockEntry::Dir(Vec::new()));
            }
            if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
                let name = name.to_string_lossy().into_owned();
                if !children.contains(&name) {
                    children.push(name);
                }
            }
        }
    }

    /// Resolve every symbolic link in `path`, returning the real path of an
    /// existing entry.
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let entries = self.entries.lock().unwrap();
        let mut hops = 0;
        Self::resolve_locked(&entries, path, &mut hops)
    }

    fn resolve_locked(
        entries: &HashMap<PathBuf, MockEntry>,
        path: &Path,
        hops: &mut usize,
    ) -> Option<PathBuf> {
        let mut current = PathBuf::from("/");
        for component in path.components() {
            match component {
                Component::RootDir | Component::Prefix(_) | Component::CurDir => continue,
                Component::ParentDir => {
                    current.pop();
                    continue;
                }
                Component::Normal(name) => current.push(name),
            }

            if let Some(MockEntry::Link(target)) = entries.get(&current) {
                *hops += 1;
                if *hops > MAX_LINK_HOPS {
                    return None;
                }
                current = Self::resolve_locked(entries, target, hops)?;
            } else if !entries.contains_key(&current) {
                return None;
            }
        }
        Some(current)
    }

    fn entry_at(&self, path: &Path) -> Option<MockEntry> {
        let real = self.resolve(path)?;
        self.entries.lock().unwrap().get(&real).cloned()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entry_at(path), Some(MockEntry::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entry_at(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .ok_or_else(|| anyhow!("No such file or directory: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.entry_at(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_created_implicitly() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a/b/Foo.java");

        assert!(fs.is_dir(Path::new("/w")));
        assert!(fs.is_dir(Path::new("/w/a/b")));
        assert!(fs.is_file(Path::new("/w/a/b/Foo.java")));
        assert_eq!(
            fs.read_dir(Path::new("/w/a")).unwrap(),
            vec![PathBuf::from("/w/a/b")]
        );
    }

    #[test]
    fn symlinks_are_followed() {
        let fs = MockFileSystem::new();
        fs.add_file("/real/src/Foo.java");
        fs.add_symlink("/w/linked", "/real");

        assert!(fs.is_dir(Path::new("/w/linked/src")));
        assert!(fs.is_file(Path::new("/w/linked/src/Foo.java")));
        assert_eq!(
            fs.canonicalize(Path::new("/w/linked/src")).unwrap(),
            PathBuf::from("/real/src")
        );
        assert_eq!(
            fs.read_dir(Path::new("/w/linked")).unwrap(),
            vec![PathBuf::from("/w/linked/src")]
        );
    }

    #[test]
    fn link_loops_do_not_resolve() {
        let fs = MockFileSystem::new();
        fs.add_symlink("/a", "/b");
        fs.add_symlink("/b", "/a");

        assert!(!fs.exists(Path::new("/a")));
        assert!(fs.canonicalize(Path::new("/a/x")).is_err());
    }

    #[test]
    fn remove_drops_whole_subtree() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a/b/Foo.java");
        fs.add_file("/w/c.txt");
        fs.remove("/w/a");

        assert!(!fs.exists(Path::new("/w/a/b/Foo.java")));
        assert!(!fs.exists(Path::new("/w/a")));
        assert_eq!(
            fs.read_dir(Path::new("/w")).unwrap(),
            vec![PathBuf::from("/w/c.txt")]
        );
    }
}

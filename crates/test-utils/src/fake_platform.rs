use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use notify::event::{CreateKind, DataChange, Flag, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::debug;

use pomwatch::errors::{PomwatchError, Result};
use pomwatch::fs::mock::MockFileSystem;
use pomwatch::fs::FileSystem;
use pomwatch::watch::{NotificationRx, NotificationTx, WatchBackend};

#[derive(Debug, Default)]
struct PlatformState {
    subscribed: HashSet<PathBuf>,
    ever_subscribed: Vec<PathBuf>,
    refuse: HashSet<PathBuf>,
}

/// In-memory stand-in for the operating system: a mock filesystem plus a
/// notification facility that, like the real one, only reports changes
/// inside directories that are currently subscribed.
#[derive(Clone)]
pub struct FakePlatform {
    fs: MockFileSystem,
    state: Arc<Mutex<PlatformState>>,
    tx: NotificationTx,
}

impl FakePlatform {
    /// Returns the platform, the backend to hand to the watcher, and the
    /// notification stream the pump consumes.
    pub fn new(fs: MockFileSystem) -> (Self, FakeBackend, NotificationRx) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(PlatformState::default()));
        let platform = Self {
            fs,
            state: Arc::clone(&state),
            tx,
        };
        (platform, FakeBackend { state }, rx)
    }

    pub fn fs(&self) -> &MockFileSystem {
        &self.fs
    }

    /// Make subscribing `dir` fail.
    pub fn refuse(&self, dir: impl AsRef<Path>) {
        self.state.lock().unwrap().refuse.insert(dir.as_ref().to_path_buf());
    }

    /// Currently subscribed directories, sorted.
    pub fn subscribed(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.state.lock().unwrap().subscribed.iter().cloned().collect();
        dirs.sort();
        dirs
    }

    /// Every successful subscribe call, in order (duplicates included).
    pub fn subscribe_calls(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().ever_subscribed.clone()
    }

    pub fn create_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.fs.add_file(path);
        self.notify_parent(path, EventKind::Create(CreateKind::File));
    }

    pub fn create_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.fs.add_dir(path);
        self.notify_parent(path, EventKind::Create(CreateKind::Folder));
    }

    pub fn modify(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.notify_parent(path, EventKind::Modify(ModifyKind::Data(DataChange::Content)));
    }

    /// Remove `path` (recursively). The parent reports the removal, and a
    /// removed directory that was subscribed reports its own deletion.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let was_dir = self.fs.is_dir(path);
        self.fs.remove(path);
        let kind = if was_dir {
            EventKind::Remove(RemoveKind::Folder)
        } else {
            EventKind::Remove(RemoveKind::File)
        };
        self.notify_parent(path, kind);

        let self_watched = {
            let mut state = self.state.lock().unwrap();
            let watched = state.subscribed.contains(path);
            // The kernel drops watches of deleted directories on its own.
            state.subscribed.retain(|d| !d.starts_with(path));
            watched
        };
        if self_watched {
            self.send(Event::new(EventKind::Remove(RemoveKind::Any)).add_path(path.to_path_buf()));
        }
    }

    /// Report lost notifications, as on a queue overflow.
    pub fn overflow(&self) {
        self.send(Event::new(EventKind::Other).set_flag(Flag::Rescan));
    }

    /// Deliver a platform error in place of a notification.
    pub fn fail(&self, msg: &str) {
        let _ = self.tx.send(Err(notify::Error::generic(msg)));
    }

    /// Push a raw event, bypassing the subscription check.
    pub fn send(&self, event: Event) {
        let _ = self.tx.send(Ok(event));
    }

    fn notify_parent(&self, path: &Path, kind: EventKind) {
        let Some(parent) = path.parent() else { return };
        let watched = self.state.lock().unwrap().subscribed.contains(parent);
        if watched {
            debug!(?path, ?kind, "fake platform event");
            self.send(Event::new(kind).add_path(path.to_path_buf()));
        }
    }
}

/// The watcher's view of [`FakePlatform`].
pub struct FakeBackend {
    state: Arc<Mutex<PlatformState>>,
}

impl WatchBackend for FakeBackend {
    fn subscribe(&mut self, dir: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse.contains(dir) {
            debug!(?dir, "fake platform refusing subscription");
            return Err(PomwatchError::Registration {
                path: dir.to_path_buf(),
                source: notify::Error::generic("permission denied"),
            });
        }
        state.subscribed.insert(dir.to_path_buf());
        state.ever_subscribed.push(dir.to_path_buf());
        Ok(())
    }

    fn unsubscribe(&mut self, dir: &Path) {
        self.state.lock().unwrap().subscribed.remove(dir);
    }
}

// src/watch/decode.rs

//! Turns raw `notify` events into [`ChangeEvent`]s.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

use crate::fs::FileSystem;
use crate::types::{ChangeEvent, ChangeKind};

/// Resolve a reported path against the directory it was reported for.
///
/// `notify` already reports absolute paths; relative ones are joined onto
/// `base`.
pub fn resolve_path(base: &Path, reported: &Path) -> PathBuf {
    if reported.is_absolute() {
        reported.to_path_buf()
    } else {
        base.join(reported)
    }
}

/// Decode one platform event into zero or more changes.
///
/// Renames become a deletion of the old name and a creation of the new one.
/// Renames reported without a direction (`RenameMode::Any`, common on macOS)
/// are decided by whether the path still exists. Access and unclassified
/// events produce nothing.
pub fn decode(fs: &dyn FileSystem, base: &Path, event: &Event) -> Vec<ChangeEvent> {
    let resolved: Vec<PathBuf> = event.paths.iter().map(|p| resolve_path(base, p)).collect();

    let all = |kind: ChangeKind| -> Vec<ChangeEvent> {
        resolved
            .iter()
            .map(|p| ChangeEvent::new(p.clone(), kind))
            .collect()
    };

    match event.kind {
        EventKind::Create(_) => all(ChangeKind::Created),
        EventKind::Remove(_) => all(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::with_capacity(resolved.len());
            let mut paths = resolved.iter();
            if let Some(from) = paths.next() {
                changes.push(ChangeEvent::new(from.clone(), ChangeKind::Deleted));
            }
            changes.extend(paths.map(|to| ChangeEvent::new(to.clone(), ChangeKind::Created)));
            changes
        }
        EventKind::Modify(ModifyKind::Name(_)) => resolved
            .iter()
            .map(|p| {
                let kind = if fs.exists(p) {
                    ChangeKind::Created
                } else {
                    ChangeKind::Deleted
                };
                ChangeEvent::new(p.clone(), kind)
            })
            .collect(),
        EventKind::Modify(_) => all(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
    }

    #[test]
    fn basic_kinds_map_directly() {
        let fs = MockFileSystem::new();
        let base = Path::new("/w");

        let created = decode(&fs, base, &event(EventKind::Create(CreateKind::Folder), &["/w/new"]));
        assert_eq!(created, vec![ChangeEvent::new("/w/new", ChangeKind::Created)]);

        let removed = decode(&fs, base, &event(EventKind::Remove(RemoveKind::File), &["/w/a.txt"]));
        assert_eq!(removed, vec![ChangeEvent::new("/w/a.txt", ChangeKind::Deleted)]);

        let modified = decode(
            &fs,
            base,
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), &["/w/a.txt"]),
        );
        assert_eq!(modified, vec![ChangeEvent::new("/w/a.txt", ChangeKind::Modified)]);
    }

    #[test]
    fn rename_both_splits_into_delete_and_create() {
        let fs = MockFileSystem::new();
        let changes = decode(
            &fs,
            Path::new("/w"),
            &event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &["/w/old", "/w/new"],
            ),
        );
        assert_eq!(
            changes,
            vec![
                ChangeEvent::new("/w/old", ChangeKind::Deleted),
                ChangeEvent::new("/w/new", ChangeKind::Created),
            ]
        );
    }

    #[test]
    fn undirected_rename_checks_existence() {
        let fs = MockFileSystem::new();
        fs.add_dir("/w/here");
        let changes = decode(
            &fs,
            Path::new("/w"),
            &event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
                &["/w/here", "/w/gone"],
            ),
        );
        assert_eq!(
            changes,
            vec![
                ChangeEvent::new("/w/here", ChangeKind::Created),
                ChangeEvent::new("/w/gone", ChangeKind::Deleted),
            ]
        );
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let fs = MockFileSystem::new();
        let changes = decode(
            &fs,
            Path::new("/w/moduleA"),
            &event(EventKind::Create(CreateKind::File), &["src/Foo.java"]),
        );
        assert_eq!(
            changes,
            vec![ChangeEvent::new("/w/moduleA/src/Foo.java", ChangeKind::Created)]
        );
    }

    #[test]
    fn access_events_are_dropped() {
        let fs = MockFileSystem::new();
        let changes = decode(
            &fs,
            Path::new("/w"),
            &event(EventKind::Access(AccessKind::Any), &["/w/a.txt"]),
        );
        assert!(changes.is_empty());
    }
}

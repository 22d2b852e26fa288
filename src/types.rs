use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// File name that marks a directory as the root of a build unit.
pub const PROJECT_DESCRIPTOR: &str = "pom.xml";

/// Directory name that halts subtree descent (build output).
pub const OUTPUT_DIR_NAME: &str = "target";

/// The single goal every triggered build runs.
pub const DEFAULT_GOAL: &str = "package";

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Deleted,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        };
        f.write_str(s)
    }
}

/// A single decoded filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// What the watcher asks the build invoker to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Directory containing the project descriptor.
    pub project_root: PathBuf,
    /// Ordered goals; always `[DEFAULT_GOAL]` when built by the dispatcher.
    pub goals: Vec<String>,
}

impl BuildRequest {
    pub fn package(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            goals: vec![DEFAULT_GOAL.to_string()],
        }
    }

    pub fn descriptor(&self) -> PathBuf {
        self.project_root.join(PROJECT_DESCRIPTOR)
    }
}

/// Returns true if `path` is an output directory or lies inside one.
///
/// Only components below `root` are considered, so a watch root that itself
/// sits under some `target/` directory still behaves normally.
pub fn is_within_output_dir(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| c.as_os_str() == OUTPUT_DIR_NAME)
}

/// How the dispatcher treats several events for the same build unit.
///
/// - `Batch`: build each unit at most once per notification batch (default).
///   Every event in a batch was queued before the first build started, so the
///   build already observes all of them.
/// - `Off`: every qualifying event triggers its own build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoalesceMode {
    Batch,
    Off,
}

impl Default for CoalesceMode {
    fn default() -> Self {
        CoalesceMode::Batch
    }
}

impl FromStr for CoalesceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(CoalesceMode::Batch),
            "off" => Ok(CoalesceMode::Off),
            other => Err(format!(
                "invalid coalesce mode: {other} (expected \"batch\" or \"off\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_detection_matches_whole_components() {
        let root = Path::new("/w");
        assert!(is_within_output_dir(root, Path::new("/w/moduleA/target")));
        assert!(is_within_output_dir(root, Path::new("/w/moduleA/target/classes/A.class")));
        assert!(!is_within_output_dir(root, Path::new("/w/moduleA/targets/x")));
        assert!(!is_within_output_dir(root, Path::new("/w/moduleA/src/target.txt")));
    }

    #[test]
    fn output_dir_above_root_is_ignored() {
        let root = Path::new("/home/u/target/ws");
        assert!(!is_within_output_dir(root, Path::new("/home/u/target/ws/a/Foo.java")));
        assert!(is_within_output_dir(root, Path::new("/home/u/target/ws/a/target")));
    }

    #[test]
    fn package_request_uses_fixed_goal() {
        let req = BuildRequest::package("/w/moduleA");
        assert_eq!(req.goals, vec!["package".to_string()]);
        assert_eq!(req.descriptor(), PathBuf::from("/w/moduleA/pom.xml"));
    }

    #[test]
    fn coalesce_mode_parses() {
        assert_eq!("Batch".parse::<CoalesceMode>(), Ok(CoalesceMode::Batch));
        assert_eq!(" off ".parse::<CoalesceMode>(), Ok(CoalesceMode::Off));
        assert!("sometimes".parse::<CoalesceMode>().is_err());
    }
}

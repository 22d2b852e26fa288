// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::CoalesceMode;

/// Default bound on directory nesting below the watch root.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Raw configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// directory = "."
/// coalesce = "batch"
/// max_depth = 256
///
/// [build]
/// program = "mvn"
/// offline = false
/// quiet = false
/// batch_mode = true
/// settings = "/home/me/.m2/settings.xml"
///
/// [build.defines]
/// skipTests = "true"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub build: BuildSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, build: BuildSection) -> Self {
        Self { watch, build }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Root of the source tree. `--directory` wins over this.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// `"batch"` (default) or `"off"`.
    #[serde(default)]
    pub coalesce: CoalesceMode,

    /// Maximum nesting below the root that the registrar descends into.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            directory: None,
            coalesce: CoalesceMode::default(),
            max_depth: default_max_depth(),
        }
    }
}

/// `[build]` section: how the external build tool is launched.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// `-o`
    #[serde(default)]
    pub offline: bool,

    /// `-q`
    #[serde(default)]
    pub quiet: bool,

    /// `-B`; on by default since the build shares the terminal with the watcher.
    #[serde(default = "default_batch_mode")]
    pub batch_mode: bool,

    /// `-Dkey=value` pairs.
    #[serde(default)]
    pub defines: BTreeMap<String, String>,

    /// `-s <file>`
    #[serde(default)]
    pub settings: Option<PathBuf>,
}

fn default_program() -> String {
    "mvn".to_string()
}

fn default_batch_mode() -> bool {
    true
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            offline: false,
            quiet: false,
            batch_mode: default_batch_mode(),
            defines: BTreeMap::new(),
            settings: None,
        }
    }
}

// src/config/mod.rs

//! Configuration loading and validation for pomwatch.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a config file from disk.
//! - `validate.rs`: basic sanity checks.
//!
//! [`Settings`] is the final merge of the optional config file with the
//! command line; flags win over file values.

pub mod loader;
pub mod model;
pub mod validate;

use std::path::PathBuf;

pub use loader::{load_and_validate, load_from_path, load_optional};
pub use model::{BuildSection, ConfigFile, RawConfigFile, WatchSection, DEFAULT_MAX_DEPTH};
pub use validate::validate_config;

use crate::cli::CliArgs;
use crate::types::CoalesceMode;

/// Effective settings for one watch session.
#[derive(Debug, Clone)]
pub struct Settings {
    pub directory: PathBuf,
    pub coalesce: CoalesceMode,
    pub max_depth: usize,
    pub build: BuildSection,
}

impl Settings {
    pub fn resolve(args: &CliArgs, file: ConfigFile) -> Self {
        let directory = args
            .directory
            .clone()
            .or(file.watch.directory)
            .unwrap_or_else(|| PathBuf::from("."));

        let coalesce = if args.no_coalesce {
            CoalesceMode::Off
        } else {
            file.watch.coalesce
        };

        let mut build = file.build;
        if let Some(ref program) = args.mvn {
            build.program = program.clone();
        }
        build.offline |= args.offline;
        build.quiet |= args.quiet;

        Self {
            directory,
            coalesce,
            max_depth: file.watch.max_depth,
            build,
        }
    }
}

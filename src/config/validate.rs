// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PomwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PomwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.build))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch_section(cfg)?;
    validate_build_section(cfg)?;
    Ok(())
}

fn validate_watch_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.max_depth == 0 {
        return Err(PomwatchError::ConfigError(
            "[watch].max_depth must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_build_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.program.trim().is_empty() {
        return Err(PomwatchError::ConfigError(
            "[build].program must not be empty".to_string(),
        ));
    }

    for key in cfg.build.defines.keys() {
        if key.trim().is_empty() || key.contains('=') {
            return Err(PomwatchError::ConfigError(format!(
                "[build.defines] has invalid property name '{}'",
                key
            )));
        }
    }

    Ok(())
}

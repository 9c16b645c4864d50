// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FanwatchError, Result};
use crate::filter::GlobFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FanwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.output))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_queue(cfg)?;
    validate_path_limit(cfg)?;
    validate_patterns(cfg)?;
    validate_directory(cfg)?;
    Ok(())
}

fn validate_queue(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.queue_length == 0 {
        return Err(FanwatchError::ConfigError(
            "[watch].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_path_limit(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.max_path_len == Some(0) {
        return Err(FanwatchError::ConfigError(
            "[watch].max_path_len must be >= 1 when set".to_string(),
        ));
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    GlobFilter::new(&cfg.watch.include, &cfg.watch.exclude)?;
    Ok(())
}

fn validate_directory(cfg: &RawConfigFile) -> Result<()> {
    if let Some(dir) = &cfg.watch.directory {
        if dir.as_os_str().is_empty() {
            return Err(FanwatchError::ConfigError(
                "[watch].directory must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

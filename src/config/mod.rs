//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<PomotoneConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let config: PomotoneConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {:?}", path))?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the defaults
pub fn load_or_default(path: &Path) -> Result<PomotoneConfig> {
    if path.exists() {
        load_config(path)
    } else {
        debug!("no config at {:?}, using defaults", path);
        Ok(PomotoneConfig::default())
    }
}

use crate::config::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_STATE_DIR: &str = ".ebo-wizard";
pub const TENANT_FILE_NAME: &str = "tenant.yaml";
pub const CATALOG_FILE_NAME: &str = "catalog.json";

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(DEFAULT_STATE_DIR))
}

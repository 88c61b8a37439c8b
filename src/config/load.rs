use super::{ConfigError, TenantConfig};
use crate::library::LibraryCatalog;
use std::path::Path;

pub fn load_tenant_config(path: &Path) -> Result<TenantConfig, ConfigError> {
    let config = TenantConfig::from_path(path)?;
    config.validate()?;
    Ok(config)
}

pub fn load_library_catalog(path: &Path) -> Result<LibraryCatalog, ConfigError> {
    let catalog = LibraryCatalog::from_path(path)?;
    catalog.validate()?;
    Ok(catalog)
}

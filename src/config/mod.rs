pub mod error;
pub mod load;
pub mod paths;
pub mod tenant;

pub use error::ConfigError;
pub use load::{load_library_catalog, load_tenant_config};
pub use paths::{default_state_root, CATALOG_FILE_NAME, DEFAULT_STATE_DIR, TENANT_FILE_NAME};
pub use tenant::{TenantConfig, XCEL_ENERGY_TENANT};

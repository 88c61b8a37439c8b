#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid json in {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tenant validation failed: {0}")]
    Tenant(String),
    #[error("library catalog validation failed: {0}")]
    Catalog(String),
    #[error("failed to resolve home directory for default state root")]
    HomeDirectoryUnavailable,
}

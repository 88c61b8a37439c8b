use super::RunnerError;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("ebos"),
            self.root.join("files"),
            self.root.join("logs"),
        ]
    }

    pub fn tenant_file(&self) -> PathBuf {
        self.root.join(crate::config::TENANT_FILE_NAME)
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.root.join(crate::config::CATALOG_FILE_NAME)
    }

    pub fn wizard_log_path(&self) -> PathBuf {
        self.root.join("logs/wizard.log")
    }
}

pub fn bootstrap_state_root(paths: &StatePaths) -> Result<(), RunnerError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| RunnerError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

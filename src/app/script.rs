//! Scripted wizard sessions for the `run` command.

use crate::ebo::UserRef;
use crate::steps::photos::PhotosAction;
use crate::wizard::WizardAction;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardScript {
    /// Fixed clock for the whole run; wall time when absent.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub actions: Vec<WizardAction>,
}

impl WizardScript {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("failed to read script {}: {e}", path.display()))?;
        let mut script: WizardScript = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid script {}: {e}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        script.resolve_files(base)?;
        Ok(script)
    }

    /// Reads selected files that name a path instead of inlining bytes.
    /// Relative paths resolve against `base`.
    pub fn resolve_files(&mut self, base: &Path) -> Result<(), String> {
        for action in &mut self.actions {
            let WizardAction::Photos(PhotosAction::FilesSelected { files }) = action else {
                continue;
            };
            for file in files.iter_mut() {
                let Some(path) = file.path.take() else {
                    continue;
                };
                let path = if path.is_absolute() {
                    path
                } else {
                    base.join(path)
                };
                file.bytes = fs::read(&path)
                    .map_err(|e| format!("failed to read photo {}: {e}", path.display()))?;
            }
        }
        Ok(())
    }
}

//! Seams to the outside world. The wizard never calls these directly; the
//! runner executes its effects through them.

pub mod file_store;

pub use file_store::{EboStorePaths, FileEboStore};

use crate::ebo::{EboStatus, SaveEboInput, SavedEboInfo};
use crate::library::{CrewMember, Hazard, Incident, LibraryTask, WorkType};
use crate::shared::ids::{EboId, TaskId, WorkTypeId};
use crate::steps::photo_upload::{FileUploadPolicy, UploadForm};
use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid ebo record {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("ebo `{0}` does not exist")]
    NotFound(EboId),
    #[error("ebo cannot move from {from} to {to}")]
    InvalidTransition { from: EboStatus, to: EboStatus },
    #[error("failed to generate identifier: {0}")]
    Identifier(String),
    #[error("upload rejected: {0}")]
    Upload(String),
}

/// Persistence and library lookups.
pub trait EboGateway {
    fn save_ebo(
        &self,
        ebo_id: Option<&EboId>,
        input: &SaveEboInput,
    ) -> Result<SavedEboInfo, GatewayError>;

    /// Saves and locks.
    fn complete_ebo(&self, ebo_id: &EboId, input: &SaveEboInput)
        -> Result<SavedEboInfo, GatewayError>;

    fn delete_ebo(&self, ebo_id: &EboId) -> Result<bool, GatewayError>;

    fn reopen_ebo(&self, ebo_id: &EboId) -> Result<SavedEboInfo, GatewayError>;

    fn get_historical_incidents(&self, task_id: &TaskId) -> Result<Vec<Incident>, GatewayError>;

    fn get_crew_members(&self) -> Result<Vec<CrewMember>, GatewayError>;

    fn get_high_energy_hazards(&self) -> Result<Vec<Hazard>, GatewayError>;

    fn get_work_types(&self) -> Result<Vec<WorkType>, GatewayError>;

    fn get_tasks_for_work_types(
        &self,
        work_type_ids: &BTreeSet<WorkTypeId>,
    ) -> Result<Vec<LibraryTask>, GatewayError>;
}

pub trait FileUploadGateway {
    fn generate_file_upload_policies(
        &self,
        count: usize,
    ) -> Result<Vec<FileUploadPolicy>, GatewayError>;

    fn upload_file(&self, url: &str, form: &UploadForm) -> Result<(), GatewayError>;
}

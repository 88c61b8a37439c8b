use super::{EboGateway, FileUploadGateway, GatewayError};
use crate::ebo::{EboStatus, SaveEboInput, SavedEboInfo, UserRef};
use crate::library::{CrewMember, Hazard, Incident, LibraryCatalog, LibraryTask, WorkType};
use crate::shared::fs_atomic::{atomic_write_file, atomic_write_json};
use crate::shared::ids::{EboId, PhotoId, TaskId, WorkTypeId};
use crate::steps::photo_upload::{FileUploadPolicy, UploadForm};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EboStorePaths {
    pub ebos: PathBuf,
    pub files: PathBuf,
}

impl EboStorePaths {
    pub fn from_state_root(state_root: &Path) -> Self {
        Self {
            ebos: state_root.join("ebos"),
            files: state_root.join("files"),
        }
    }

    pub fn record_path(&self, ebo_id: &EboId) -> PathBuf {
        self.ebos.join(format!("{ebo_id}.json"))
    }
}

/// EBO records as JSON files under the state root, with library lookups
/// served from a catalog and uploads copied into `files/`.
#[derive(Debug, Clone)]
pub struct FileEboStore {
    paths: EboStorePaths,
    catalog: LibraryCatalog,
    user: Option<UserRef>,
}

impl FileEboStore {
    pub fn new(state_root: &Path, catalog: LibraryCatalog, user: Option<UserRef>) -> Self {
        Self {
            paths: EboStorePaths::from_state_root(state_root),
            catalog,
            user,
        }
    }

    pub fn paths(&self) -> &EboStorePaths {
        &self.paths
    }

    pub fn catalog(&self) -> &LibraryCatalog {
        &self.catalog
    }

    pub fn load(&self, ebo_id: &EboId) -> Result<SavedEboInfo, GatewayError> {
        let path = self.paths.record_path(ebo_id);
        if !path.exists() {
            return Err(GatewayError::NotFound(ebo_id.clone()));
        }
        read_record(&path)
    }

    /// Every stored EBO, ordered by id.
    pub fn list(&self) -> Result<Vec<SavedEboInfo>, GatewayError> {
        if !self.paths.ebos.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.paths.ebos).map_err(|source| GatewayError::Read {
            path: self.paths.ebos.display().to_string(),
            source,
        })?;
        let mut records = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| GatewayError::Read {
                path: self.paths.ebos.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|v| v.to_str()) != Some("json") {
                continue;
            }
            let record = read_record(&path)?;
            records.insert(record.id.clone(), record);
        }
        Ok(records.into_values().collect())
    }

    fn store(&self, record: &SavedEboInfo) -> Result<(), GatewayError> {
        let path = self.paths.record_path(&record.id);
        atomic_write_json(&path, record).map_err(|source| GatewayError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    fn transition(record: &mut SavedEboInfo, next: EboStatus) -> Result<(), GatewayError> {
        if !record.status.can_transition_to(next) {
            return Err(GatewayError::InvalidTransition {
                from: record.status,
                to: next,
            });
        }
        record.status = next;
        Ok(())
    }

    fn upsert(
        &self,
        ebo_id: Option<&EboId>,
        input: &SaveEboInput,
        next: EboStatus,
    ) -> Result<SavedEboInfo, GatewayError> {
        let mut record = match ebo_id {
            Some(ebo_id) => self.load(ebo_id)?,
            None => SavedEboInfo {
                id: EboId::generate().map_err(GatewayError::Identifier)?,
                status: EboStatus::NotStarted,
                created_by: self.user.clone(),
                completed_by: None,
                contents: SaveEboInput::default(),
            },
        };
        Self::transition(&mut record, next)?;
        record.contents = record.contents.clone().merge(input.clone());
        if next == EboStatus::Complete {
            record.completed_by = self.user.clone();
        }
        self.store(&record)?;
        Ok(record)
    }
}

fn read_record(path: &Path) -> Result<SavedEboInfo, GatewayError> {
    let raw = fs::read_to_string(path).map_err(|source| GatewayError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| GatewayError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn is_plain_object_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.starts_with('.')
}

impl EboGateway for FileEboStore {
    fn save_ebo(
        &self,
        ebo_id: Option<&EboId>,
        input: &SaveEboInput,
    ) -> Result<SavedEboInfo, GatewayError> {
        self.upsert(ebo_id, input, EboStatus::InProgress)
    }

    fn complete_ebo(
        &self,
        ebo_id: &EboId,
        input: &SaveEboInput,
    ) -> Result<SavedEboInfo, GatewayError> {
        self.upsert(Some(ebo_id), input, EboStatus::Complete)
    }

    fn delete_ebo(&self, ebo_id: &EboId) -> Result<bool, GatewayError> {
        let path = self.paths.record_path(ebo_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| GatewayError::Write {
            path: path.display().to_string(),
            source,
        })?;
        Ok(true)
    }

    fn reopen_ebo(&self, ebo_id: &EboId) -> Result<SavedEboInfo, GatewayError> {
        let mut record = self.load(ebo_id)?;
        Self::transition(&mut record, EboStatus::Reopened)?;
        record.completed_by = None;
        self.store(&record)?;
        Ok(record)
    }

    fn get_historical_incidents(&self, task_id: &TaskId) -> Result<Vec<Incident>, GatewayError> {
        Ok(self.catalog.incidents_for_task(task_id))
    }

    fn get_crew_members(&self) -> Result<Vec<CrewMember>, GatewayError> {
        Ok(self.catalog.crew_members.clone())
    }

    fn get_high_energy_hazards(&self) -> Result<Vec<Hazard>, GatewayError> {
        Ok(self.catalog.high_energy_hazards())
    }

    fn get_work_types(&self) -> Result<Vec<WorkType>, GatewayError> {
        Ok(self.catalog.work_types.clone())
    }

    fn get_tasks_for_work_types(
        &self,
        work_type_ids: &BTreeSet<WorkTypeId>,
    ) -> Result<Vec<LibraryTask>, GatewayError> {
        Ok(self.catalog.tasks_for_work_types(work_type_ids))
    }
}

impl FileUploadGateway for FileEboStore {
    fn generate_file_upload_policies(
        &self,
        count: usize,
    ) -> Result<Vec<FileUploadPolicy>, GatewayError> {
        (0..count)
            .map(|_| {
                let id = PhotoId::generate().map_err(GatewayError::Identifier)?;
                Ok(FileUploadPolicy {
                    fields: BTreeMap::from([("key".to_string(), id.to_string())]),
                    url: self.paths.files.display().to_string(),
                    signed_url: None,
                    id,
                })
            })
            .collect()
    }

    /// `url` is the directory the policy pointed at.
    fn upload_file(&self, url: &str, form: &UploadForm) -> Result<(), GatewayError> {
        let key = form
            .field("key")
            .ok_or_else(|| GatewayError::Upload("policy has no object key".to_string()))?;
        if !is_plain_object_key(key) {
            return Err(GatewayError::Upload(format!("invalid object key `{key}`")));
        }
        if form.bytes.is_empty() {
            return Err(GatewayError::Upload(format!("{} is empty", form.file_name)));
        }
        let path = Path::new(url).join(key);
        atomic_write_file(&path, &form.bytes).map_err(|source| GatewayError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

use super::types::{
    ApplicabilityLevel, CrewMember, Department, Hazard, Incident, LibraryTask, OpCo, WorkType,
};
use crate::config::ConfigError;
use crate::shared::ids::{HazardId, OpCoId, TaskId, WorkTypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Everything the wizard looks up by id: tasks, hazards, work types, crew,
/// incidents and the organisation selects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCatalog {
    #[serde(default)]
    pub work_types: Vec<WorkType>,
    #[serde(default)]
    pub tasks: Vec<LibraryTask>,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    #[serde(default)]
    pub crew_members: Vec<CrewMember>,
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub opcos: Vec<OpCo>,
    #[serde(default)]
    pub departments: Vec<Department>,
}

impl LibraryCatalog {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ParseJson {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut task_ids = BTreeSet::new();
        for task in &self.tasks {
            if !task_ids.insert(task.id.clone()) {
                return Err(ConfigError::Catalog(format!(
                    "task `{}` is defined twice",
                    task.id
                )));
            }
            if task.activity_groups.is_empty() {
                return Err(ConfigError::Catalog(format!(
                    "task `{}` must belong to at least one activity group",
                    task.id
                )));
            }
            for link in &task.hazards {
                if self.hazard(&link.hazard_id).is_none() {
                    return Err(ConfigError::Catalog(format!(
                        "task `{}` references unknown hazard `{}`",
                        task.id, link.hazard_id
                    )));
                }
            }
        }
        let mut hazard_ids = BTreeSet::new();
        for hazard in &self.hazards {
            if !hazard_ids.insert(hazard.id.clone()) {
                return Err(ConfigError::Catalog(format!(
                    "hazard `{}` is defined twice",
                    hazard.id
                )));
            }
        }
        for opco in &self.opcos {
            if let Some(parent) = &opco.parent_id {
                if self.opco(parent).is_none() {
                    return Err(ConfigError::Catalog(format!(
                        "opco `{}` references unknown parent `{parent}`",
                        opco.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn task(&self, id: &TaskId) -> Option<&LibraryTask> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn hazard(&self, id: &HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|hazard| &hazard.id == id)
    }

    pub fn opco(&self, id: &OpCoId) -> Option<&OpCo> {
        self.opcos.iter().find(|opco| &opco.id == id)
    }

    pub fn high_energy_hazards(&self) -> Vec<Hazard> {
        self.hazards
            .iter()
            .filter(|hazard| hazard.is_high_energy)
            .cloned()
            .collect()
    }

    /// Tasks whose work types all sit inside `selected`.
    pub fn tasks_for_work_types(&self, selected: &BTreeSet<WorkTypeId>) -> Vec<LibraryTask> {
        self.tasks
            .iter()
            .filter(|task| !task.work_type_ids.is_empty() && task.matches_work_types(selected))
            .cloned()
            .collect()
    }

    pub fn incidents_for_task(&self, task_id: &TaskId) -> Vec<Incident> {
        self.incidents
            .iter()
            .filter(|incident| &incident.task_id == task_id)
            .cloned()
            .collect()
    }

    pub fn top_level_opcos(&self) -> impl Iterator<Item = &OpCo> + '_ {
        self.opcos.iter().filter(|opco| opco.parent_id.is_none())
    }

    pub fn sub_opcos(&self, parent: &OpCoId) -> Vec<&OpCo> {
        self.opcos
            .iter()
            .filter(|opco| opco.parent_id.as_ref() == Some(parent))
            .collect()
    }

    pub fn recommended_hazards(&self, task_id: &TaskId) -> Vec<HazardId> {
        self.task(task_id)
            .map(|task| {
                task.hazards_with_applicability(ApplicabilityLevel::Mostly)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

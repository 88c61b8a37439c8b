use crate::shared::ids::{
    ActivityGroupId, ControlId, CrewMemberId, DepartmentId, HazardId, IncidentId, OpCoId, TaskId,
    WorkTypeId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The generic "Other" hazard and "Other" controls carry no library id
/// convention, only the display name.
pub fn is_other_name(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("other")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkType {
    pub id: WorkTypeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityGroup {
    pub id: ActivityGroupId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicabilityLevel {
    Always,
    Mostly,
    Rarely,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHazardLink {
    pub hazard_id: HazardId,
    pub applicability: ApplicabilityLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTask {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub work_type_ids: BTreeSet<WorkTypeId>,
    #[serde(default)]
    pub activity_groups: Vec<ActivityGroup>,
    #[serde(default)]
    pub hazards: Vec<TaskHazardLink>,
}

impl LibraryTask {
    pub fn hazards_with_applicability(
        &self,
        level: ApplicabilityLevel,
    ) -> impl Iterator<Item = &HazardId> + '_ {
        self.hazards
            .iter()
            .filter(move |link| link.applicability == level)
            .map(|link| &link.hazard_id)
    }

    /// Non-strict subset check against the selected work types.
    pub fn matches_work_types(&self, selected: &BTreeSet<WorkTypeId>) -> bool {
        self.work_type_ids.is_subset(selected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub id: ControlId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hazard {
    pub id: HazardId,
    pub name: String,
    #[serde(default)]
    pub energy_type: Option<String>,
    #[serde(default = "default_true")]
    pub is_high_energy: bool,
    #[serde(default)]
    pub direct_controls: Vec<Control>,
    #[serde(default)]
    pub limited_controls: Vec<Control>,
}

fn default_true() -> bool {
    true
}

impl Hazard {
    pub fn is_other(&self) -> bool {
        is_other_name(&self.name)
    }

    pub fn is_other_direct_control(&self, control_id: &ControlId) -> bool {
        self.direct_controls
            .iter()
            .any(|control| &control.id == control_id && is_other_name(&control.name))
    }

    pub fn is_other_limited_control(&self, control_id: &ControlId) -> bool {
        self.limited_controls
            .iter()
            .any(|control| &control.id == control_id && is_other_name(&control.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub id: CrewMemberId,
    pub name: String,
    #[serde(default)]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,
    pub task_id: TaskId,
    #[serde(default)]
    pub incident_date: Option<String>,
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpCo {
    pub id: OpCoId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<OpCoId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub opco_id: Option<OpCoId>,
}

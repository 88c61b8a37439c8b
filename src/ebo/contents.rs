//! The serialized save payload. Every key is optional so each wizard step can
//! send only the slice it owns; the server echoes the merged document back as
//! `EboContents`.

use crate::library::{RiskLevel, WorkType};
use crate::shared::ids::{
    ActivityGroupId, ConnectorId, ControlId, CrewMemberId, DepartmentId, HazardId, IncidentId,
    OpCoId, PhotoId, TaskId,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEboInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DetailsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<ActivityInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_energy_tasks: Option<Vec<HighEnergyTaskInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historic_incidents: Option<Vec<IncidentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<PhotoInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel: Option<PersonnelInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryInput>,
}

pub type EboContents = SaveEboInput;

impl SaveEboInput {
    /// Keys present in `other` replace the ones in `self`.
    pub fn merge(mut self, other: SaveEboInput) -> Self {
        if other.details.is_some() {
            self.details = other.details;
        }
        if other.activities.is_some() {
            self.activities = other.activities;
        }
        if other.high_energy_tasks.is_some() {
            self.high_energy_tasks = other.high_energy_tasks;
        }
        if other.historic_incidents.is_some() {
            self.historic_incidents = other.historic_incidents;
        }
        if other.additional_information.is_some() {
            self.additional_information = other.additional_information;
        }
        if other.photos.is_some() {
            self.photos = other.photos;
        }
        if other.personnel.is_some() {
            self.personnel = other.personnel;
        }
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &SaveEboInput::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub gps_coordinates: Option<GpsCoordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsInput {
    pub observation_date: NaiveDate,
    pub observation_time: NaiveTime,
    pub work_types: Vec<WorkType>,
    pub opco_id: OpCoId,
    #[serde(default)]
    pub sub_opco_id: Option<OpCoId>,
    pub department_id: DepartmentId,
    pub work_location: String,
    pub location: LocationInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub id: TaskId,
    pub name: String,
    pub risk_level: RiskLevel,
    pub instance_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub id: ActivityGroupId,
    pub name: String,
    pub instance_id: u32,
    pub tasks: Vec<TaskInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardObservationInput {
    pub id: HazardId,
    pub name: String,
    #[serde(default)]
    pub copy_index: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub energy_level: Option<f64>,
    #[serde(default)]
    pub direct_controls_implemented: Option<bool>,
    #[serde(default)]
    pub direct_controls: Vec<ControlId>,
    #[serde(default)]
    pub direct_controls_description: Option<String>,
    #[serde(default)]
    pub limited_controls: Vec<ControlId>,
    #[serde(default)]
    pub limited_controls_description: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighEnergyTaskInput {
    pub id: ConnectorId,
    pub task_id: TaskId,
    pub instance_id: u32,
    pub activity_name: String,
    #[serde(default)]
    pub recommended_hazards_dismissed: Option<bool>,
    pub hazards: Vec<HazardObservationInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInput {
    pub id: PhotoId,
    pub name: String,
    pub display_name: String,
    pub size: u64,
    pub url: String,
    #[serde(default)]
    pub signed_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonnelRole {
    Observed,
    CoObserver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMemberInput {
    pub id: CrewMemberId,
    pub name: String,
    pub roles: Vec<PersonnelRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelInput {
    #[serde(default)]
    pub observer: Option<super::UserRef>,
    pub crew_members: Vec<CrewMemberInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    pub viewed: bool,
}

pub mod contents;
pub mod status;

pub use contents::{
    ActivityInput, CrewMemberInput, DetailsInput, EboContents, GpsCoordinates,
    HazardObservationInput, HighEnergyTaskInput, LocationInput, PersonnelInput, PersonnelRole,
    PhotoInput, SaveEboInput, SummaryInput, TaskInput,
};
pub use status::EboStatus;

use crate::shared::ids::EboId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    pub name: String,
}

/// Authoritative EBO state returned by every successful save, complete or
/// reopen call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEboInfo {
    pub id: EboId,
    pub status: EboStatus,
    #[serde(default)]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub completed_by: Option<UserRef>,
    #[serde(default)]
    pub contents: EboContents,
}

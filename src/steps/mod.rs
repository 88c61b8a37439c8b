//! One model per wizard step. Each model is created by `init` from the saved
//! EBO (if any), changed only through its `update` reducer, and serialized by
//! `to_save_ebo_input`.

pub mod activities;
pub mod additional_information;
pub mod hazard_subsection;
pub mod hazard_validation;
pub mod high_energy_tasks;
pub mod historic_incidents;
pub mod observation_details;
pub mod personnel;
pub mod photo_upload;
pub mod photos;
pub mod summary;

use crate::shared::ids::TaskId;
use crate::shared::serde_ext::parse_via_string;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepName {
    ObservationDetails,
    HighEnergyTasks,
    AdditionalInformation,
    HistoricIncidents,
    Photos,
    Personnel,
    Summary,
}

pub const ALL_STEPS: [StepName; 7] = [
    StepName::ObservationDetails,
    StepName::HighEnergyTasks,
    StepName::AdditionalInformation,
    StepName::HistoricIncidents,
    StepName::Photos,
    StepName::Personnel,
    StepName::Summary,
];

impl StepName {
    pub fn as_str(self) -> &'static str {
        match self {
            StepName::ObservationDetails => "observationDetails",
            StepName::HighEnergyTasks => "highEnergyTasks",
            StepName::AdditionalInformation => "additionalInformation",
            StepName::HistoricIncidents => "historicIncidents",
            StepName::Photos => "photos",
            StepName::Personnel => "personnel",
            StepName::Summary => "summary",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        ALL_STEPS
            .iter()
            .copied()
            .find(|step| step.as_str() == trimmed)
            .ok_or_else(|| {
                format!(
                    "step must be one of: {}",
                    ALL_STEPS
                        .iter()
                        .map(|step| step.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }

    pub fn title(self) -> &'static str {
        match self {
            StepName::ObservationDetails => "Observation Details",
            StepName::HighEnergyTasks => "High Energy Tasks",
            StepName::AdditionalInformation => "Additional Information",
            StepName::HistoricIncidents => "Historic Incidents",
            StepName::Photos => "Photos",
            StepName::Personnel => "Personnel",
            StepName::Summary => "Summary",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_via_string(deserializer, "step name", Self::parse)
    }
}

/// Side effects a step reducer asks the wizard to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEffect {
    Alert(String),
    UploadPhotos(Vec<u32>),
    FetchHistoricalIncidents(Vec<TaskId>),
}

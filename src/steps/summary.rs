use super::additional_information::AdditionalInformation;
use super::hazard_validation::validate_task_hazard_data;
use super::high_energy_tasks::{HighEnergyTasks, HighEnergyTasksContext};
use super::historic_incidents::HistoricIncidents;
use super::observation_details::{DetailsContext, ObservationDetails};
use super::personnel::PersonnelSection;
use super::photos::PhotosSection;
use super::{StepEffect, StepName};
use crate::ebo::{
    ActivityInput, DetailsInput, HighEnergyTaskInput, PersonnelInput, PhotoInput, SaveEboInput,
    SavedEboInfo, SummaryInput,
};
use crate::form::FormValidationError;
use crate::library::Incident;
use crate::shared::hashing::snapshot_hash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryAction {
    MarkViewed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub viewed: bool,
}

impl Summary {
    pub fn init(saved: Option<&SavedEboInfo>) -> Self {
        Self {
            viewed: saved
                .and_then(|ebo| ebo.contents.summary)
                .map(|summary| summary.viewed)
                .unwrap_or(false),
        }
    }

    pub fn update(&mut self, action: SummaryAction) -> Vec<StepEffect> {
        match action {
            SummaryAction::MarkViewed => self.viewed = true,
        }
        Vec::new()
    }

    pub fn to_save_ebo_input(&self) -> Result<SaveEboInput, FormValidationError> {
        Ok(SaveEboInput {
            summary: Some(SummaryInput {
                viewed: self.viewed,
            }),
            ..SaveEboInput::default()
        })
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(self)
    }
}

/// A summary section whose source step cannot produce its data yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{step} is not ready: {reason}")]
pub struct DataNotReady {
    pub step: StepName,
    pub reason: String,
}

impl DataNotReady {
    fn new(step: StepName, reason: impl Into<String>) -> Self {
        Self {
            step,
            reason: reason.into(),
        }
    }
}

pub struct SummarySources<'a> {
    pub details: &'a ObservationDetails,
    pub details_ctx: DetailsContext<'a>,
    pub high_energy_tasks: &'a HighEnergyTasks,
    pub tasks_ctx: HighEnergyTasksContext<'a>,
    pub historic_incidents: &'a HistoricIncidents,
    pub visible_incidents: &'a [Incident],
    pub additional_information: &'a AdditionalInformation,
    pub photos: &'a PhotosSection,
    /// `None` for tenants without a personnel step.
    pub personnel: Option<&'a PersonnelSection>,
}

/// Read-only projection of every other step. Each section stands alone so a
/// partially completed EBO still shows what it has.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub details: Result<DetailsInput, DataNotReady>,
    pub activities: Result<Vec<ActivityInput>, DataNotReady>,
    pub high_energy_tasks: Result<Vec<HighEnergyTaskInput>, DataNotReady>,
    pub historic_incidents: Result<Vec<Incident>, DataNotReady>,
    pub additional_information: Result<String, DataNotReady>,
    pub photos: Result<Vec<PhotoInput>, DataNotReady>,
    pub personnel: Option<Result<PersonnelInput, DataNotReady>>,
}

impl SummaryView {
    pub fn sections_not_ready(&self) -> Vec<&DataNotReady> {
        let mut not_ready = vec![
            self.details.as_ref().err(),
            self.activities.as_ref().err(),
            self.high_energy_tasks.as_ref().err(),
            self.historic_incidents.as_ref().err(),
            self.additional_information.as_ref().err(),
            self.photos.as_ref().err(),
        ];
        if let Some(personnel) = &self.personnel {
            not_ready.push(personnel.as_ref().err());
        }
        not_ready.into_iter().flatten().collect()
    }
}

fn high_energy_task_projection(
    sources: &SummarySources<'_>,
) -> Result<Vec<HighEnergyTaskInput>, DataNotReady> {
    let step = StepName::HighEnergyTasks;
    let ctx = sources.tasks_ctx;
    sources
        .high_energy_tasks
        .validate_activities()
        .map_err(|error| DataNotReady::new(step, error.message))?;
    sources
        .high_energy_tasks
        .sub_sections
        .iter()
        .map(|section| {
            let hazards = validate_task_hazard_data(section, ctx.hazards, ctx.tenant).map_err(
                |error| {
                    DataNotReady::new(
                        step,
                        format!("{} / {}: {}", section.activity_name, section.task_name, error),
                    )
                },
            )?;
            Ok(HighEnergyTaskInput {
                hazards,
                ..section.to_high_energy_task_input(ctx.hazards)
            })
        })
        .collect()
}

pub fn summary_view(sources: &SummarySources<'_>) -> SummaryView {
    let details = sources
        .details
        .to_details_input(sources.details_ctx)
        .map_err(|error| DataNotReady::new(StepName::ObservationDetails, error.to_string()));
    let activities = sources
        .high_energy_tasks
        .validate_activities()
        .map(|()| sources.high_energy_tasks.activity_inputs(sources.tasks_ctx.tasks))
        .map_err(|error| DataNotReady::new(StepName::HighEnergyTasks, error.message));
    let historic_incidents = Ok(sources
        .visible_incidents
        .iter()
        .filter(|incident| sources.historic_incidents.is_selected(&incident.id))
        .cloned()
        .collect());
    let additional_information = sources
        .additional_information
        .text
        .val()
        .clone()
        .map_err(|message| DataNotReady::new(StepName::AdditionalInformation, message));
    let photos = if sources.photos.uploads_in_progress() {
        Err(DataNotReady::new(
            StepName::Photos,
            "photos are still uploading",
        ))
    } else {
        Ok(sources.photos.uploaded_photos())
    };
    let personnel = sources.personnel.map(|personnel| {
        personnel
            .validate()
            .map(|()| personnel.to_personnel_input())
            .map_err(|error| DataNotReady::new(StepName::Personnel, error.message))
    });
    SummaryView {
        details,
        activities,
        high_energy_tasks: high_energy_task_projection(sources),
        historic_incidents,
        additional_information,
        photos,
        personnel,
    }
}

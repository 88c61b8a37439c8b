use crate::ebo::{SaveEboInput, SavedEboInfo};
use crate::library::{CrewMember, Hazard, Incident, LibraryTask, WorkType};
use crate::shared::ids::{EboId, HazardId, TaskId, WorkTypeId};
use crate::steps::activities::SelectedTask;
use crate::steps::additional_information::AdditionalInformationAction;
use crate::steps::high_energy_tasks::{HighEnergyTasksAction, SubStep};
use crate::steps::historic_incidents::HistoricIncidentsAction;
use crate::steps::observation_details::ObservationDetailsAction;
use crate::steps::personnel::PersonnelAction;
use crate::steps::photos::PhotosAction;
use crate::steps::summary::SummaryAction;
use crate::steps::StepName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Two-phase network operation. `Finished` carries the gateway outcome, with
/// failures reduced to their display message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "result", rename_all = "snake_case")]
pub enum AsyncOp<T> {
    Started,
    Finished(Result<T, String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WizardAction {
    NavTo(StepName),
    NavToWithFromStep {
        step: StepName,
        from_step: StepName,
    },
    NavToHighEnergyTasksSubSection(SubStep),
    MoveToNextFormSection,
    ObservationDetails(ObservationDetailsAction),
    HighEnergyTasks(HighEnergyTasksAction),
    HistoricIncidents(HistoricIncidentsAction),
    AdditionalInformation(AdditionalInformationAction),
    Photos(PhotosAction),
    Personnel(PersonnelAction),
    Summary(SummaryAction),
    SaveEbo(AsyncOp<SavedEboInfo>),
    DeleteEbo(AsyncOp<bool>),
    ReopenEbo(AsyncOp<SavedEboInfo>),
    FetchTasks(AsyncOp<Vec<LibraryTask>>),
    FetchHazards(AsyncOp<Vec<Hazard>>),
    FetchWorkTypes(AsyncOp<Vec<WorkType>>),
    FetchCrewMembers(AsyncOp<Vec<CrewMember>>),
    FetchHistoricalIncidents {
        task_id: TaskId,
        op: AsyncOp<Vec<Incident>>,
    },
    ConfirmActivityRemoval,
    CancelActivityRemoval,
    AddRecommendedHazards,
    DismissRecommendedHazards,
    DismissAlert(u64),
    ExpireAlerts,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::NavTo(_) => "nav_to",
            WizardAction::NavToWithFromStep { .. } => "nav_to_with_from_step",
            WizardAction::NavToHighEnergyTasksSubSection(_) => {
                "nav_to_high_energy_tasks_sub_section"
            }
            WizardAction::MoveToNextFormSection => "move_to_next_form_section",
            WizardAction::ObservationDetails(_) => "observation_details",
            WizardAction::HighEnergyTasks(_) => "high_energy_tasks",
            WizardAction::HistoricIncidents(_) => "historic_incidents",
            WizardAction::AdditionalInformation(_) => "additional_information",
            WizardAction::Photos(_) => "photos",
            WizardAction::Personnel(_) => "personnel",
            WizardAction::Summary(_) => "summary",
            WizardAction::SaveEbo(_) => "save_ebo",
            WizardAction::DeleteEbo(_) => "delete_ebo",
            WizardAction::ReopenEbo(_) => "reopen_ebo",
            WizardAction::FetchTasks(_) => "fetch_tasks",
            WizardAction::FetchHazards(_) => "fetch_hazards",
            WizardAction::FetchWorkTypes(_) => "fetch_work_types",
            WizardAction::FetchCrewMembers(_) => "fetch_crew_members",
            WizardAction::FetchHistoricalIncidents { .. } => "fetch_historical_incidents",
            WizardAction::ConfirmActivityRemoval => "confirm_activity_removal",
            WizardAction::CancelActivityRemoval => "cancel_activity_removal",
            WizardAction::AddRecommendedHazards => "add_recommended_hazards",
            WizardAction::DismissRecommendedHazards => "dismiss_recommended_hazards",
            WizardAction::DismissAlert(_) => "dismiss_alert",
            WizardAction::ExpireAlerts => "expire_alerts",
        }
    }
}

/// Which persistence call a save turns into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "eboId", rename_all = "snake_case")]
pub enum SaveKind {
    Create,
    Update(EboId),
    Complete(EboId),
}

impl SaveKind {
    pub fn for_save(ebo_id: Option<&EboId>, completing: bool) -> Self {
        match (ebo_id, completing) {
            (None, _) => SaveKind::Create,
            (Some(id), true) => SaveKind::Complete(id.clone()),
            (Some(id), false) => SaveKind::Update(id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEffect {
    SaveEbo {
        kind: SaveKind,
        input: SaveEboInput,
    },
    DeleteEbo {
        ebo_id: EboId,
    },
    ReopenEbo {
        ebo_id: EboId,
    },
    FetchTasks {
        work_type_ids: BTreeSet<WorkTypeId>,
    },
    FetchHazards,
    FetchWorkTypes,
    FetchCrewMembers,
    FetchHistoricalIncidents {
        task_id: TaskId,
    },
    UploadPhotos {
        local_ids: Vec<u32>,
    },
    ShowAlert {
        id: u64,
        message: String,
    },
    FocusElement {
        element_id: String,
    },
    ConfirmActivityRemoval {
        removed: Vec<RemovedTask>,
    },
    PromptRecommendedHazards {
        sub_step: SubStep,
        hazard_ids: Vec<HazardId>,
    },
    Redirect,
}

/// A selected task that a work type change would drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedTask {
    pub activity_name: String,
    pub instance_id: u32,
    pub task_id: TaskId,
}

impl From<SelectedTask> for RemovedTask {
    fn from(value: SelectedTask) -> Self {
        Self {
            activity_name: value.activity_name,
            instance_id: value.instance_id,
            task_id: value.task_id,
        }
    }
}

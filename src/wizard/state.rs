use super::actions::WizardEffect;
use super::alerts::AlertQueue;
use super::error::WizardError;
use super::progress::{badge_for, compare_ebo_snapshots, Badge, CompletedSteps, EboSnapshots};
use super::resources::{Deferred, WizardResources};
use crate::config::TenantConfig;
use crate::ebo::{EboStatus, SavedEboInfo, UserRef};
use crate::form::FormValidationError;
use crate::library::{Incident, OpCo};
use crate::shared::ids::{EboId, HazardId, TaskId};
use crate::steps::activities::SelectedTask;
use crate::steps::additional_information::AdditionalInformation;
use crate::steps::hazard_validation::validate_task_hazard_data;
use crate::steps::high_energy_tasks::{HighEnergyTasks, HighEnergyTasksContext, SubStep};
use crate::steps::historic_incidents::{visible_incidents, HistoricIncidents};
use crate::steps::observation_details::{DetailsContext, ObservationDetails};
use crate::steps::personnel::PersonnelSection;
use crate::steps::photos::PhotosSection;
use crate::steps::summary::{summary_view, Summary, SummarySources, SummaryView};
use crate::steps::StepName;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// One model per step, whether or not the tenant shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSteps {
    pub observation_details: ObservationDetails,
    pub high_energy_tasks: HighEnergyTasks,
    pub historic_incidents: HistoricIncidents,
    pub additional_information: AdditionalInformation,
    pub photos: PhotosSection,
    pub personnel: PersonnelSection,
    pub summary: Summary,
}

/// Where a save in flight came from, so `Finished` marks the right key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub step: StepName,
    pub sub_step: Option<SubStep>,
    pub completing: bool,
}

/// Static inputs for `Wizard::init`.
#[derive(Debug, Clone, Default)]
pub struct WizardInit {
    pub saved: Option<SavedEboInfo>,
    pub opcos: Vec<OpCo>,
    pub current_user: Option<UserRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    pub tenant: TenantConfig,
    pub step_order: Vec<StepName>,
    pub current_step: StepName,
    pub from_step: Option<StepName>,
    pub sub_step: Option<SubStep>,
    pub steps: WizardSteps,
    pub completed: CompletedSteps,
    pub initial_snapshots: EboSnapshots,
    pub ebo_id: Option<EboId>,
    pub status: EboStatus,
    pub created_by: Option<UserRef>,
    pub completed_by: Option<UserRef>,
    pub current_user: Option<UserRef>,
    pub opcos: Vec<OpCo>,
    pub resources: WizardResources,
    pub save_status: Deferred<EboId>,
    pub pending_save: Option<SaveTarget>,
    pub alerts: AlertQueue,
    pub form_error: Option<FormValidationError>,
    pub pending_activity_removal: Option<Vec<SelectedTask>>,
    pub pending_recommended_hazards: Option<(SubStep, Vec<HazardId>)>,
    pub redirect: bool,
    pub suppress_leave_prompt: bool,
}

impl Wizard {
    /// Builds the wizard and the fetches it needs before the user can work.
    pub fn init(
        tenant: TenantConfig,
        init: WizardInit,
    ) -> Result<(Self, Vec<WizardEffect>), WizardError> {
        let saved = init.saved.as_ref();
        let step_order = tenant.step_order();
        let mut personnel = PersonnelSection::init(saved);
        if personnel.observer.is_none() {
            personnel.observer = init.current_user.clone();
        }
        let steps = WizardSteps {
            observation_details: ObservationDetails::init(saved),
            high_energy_tasks: HighEnergyTasks::init(saved, &[]).map_err(WizardError::SubSteps)?,
            historic_incidents: HistoricIncidents::init(saved),
            additional_information: AdditionalInformation::init(saved),
            photos: PhotosSection::init(saved),
            personnel,
            summary: Summary::init(saved),
        };
        let mut wizard = Self {
            current_step: step_order
                .first()
                .copied()
                .unwrap_or(StepName::ObservationDetails),
            step_order,
            from_step: None,
            sub_step: None,
            steps,
            completed: CompletedSteps::from_saved(saved),
            initial_snapshots: EboSnapshots::default(),
            ebo_id: saved.map(|ebo| ebo.id.clone()),
            status: saved.map(|ebo| ebo.status).unwrap_or_default(),
            created_by: saved.and_then(|ebo| ebo.created_by.clone()),
            completed_by: saved.and_then(|ebo| ebo.completed_by.clone()),
            current_user: init.current_user,
            opcos: init.opcos,
            resources: WizardResources::default(),
            save_status: Deferred::NotStarted,
            pending_save: None,
            alerts: AlertQueue::default(),
            form_error: None,
            pending_activity_removal: None,
            pending_recommended_hazards: None,
            redirect: false,
            suppress_leave_prompt: false,
            tenant,
        };
        wizard.initial_snapshots = wizard.snapshots();

        let mut effects = vec![WizardEffect::FetchWorkTypes, WizardEffect::FetchHazards];
        if wizard.has_step(StepName::Personnel) {
            effects.push(WizardEffect::FetchCrewMembers);
        }
        let work_type_ids = wizard.steps.observation_details.work_type_ids.clone();
        if !work_type_ids.is_empty() {
            effects.push(WizardEffect::FetchTasks { work_type_ids });
        }
        for task_id in wizard.steps.high_energy_tasks.activities.task_ids() {
            wizard
                .resources
                .historical_incidents
                .insert(task_id.clone(), Deferred::NotStarted);
            effects.push(WizardEffect::FetchHistoricalIncidents { task_id });
        }
        Ok((wizard, effects))
    }

    pub fn has_step(&self, step: StepName) -> bool {
        self.step_order.contains(&step)
    }

    pub fn last_step(&self) -> StepName {
        self.step_order
            .last()
            .copied()
            .unwrap_or(StepName::Summary)
    }

    pub fn is_last_step(&self, step: StepName) -> bool {
        self.last_step() == step
    }

    pub fn next_step(&self, step: StepName) -> Option<StepName> {
        let position = self.step_order.iter().position(|candidate| *candidate == step)?;
        self.step_order.get(position + 1).copied()
    }

    pub fn details_context(&self, now: DateTime<Utc>) -> DetailsContext<'_> {
        DetailsContext {
            today: self.tenant.today(now),
            opcos: &self.opcos,
            work_types: self.resources.work_types(),
        }
    }

    pub fn tasks_context(&self) -> HighEnergyTasksContext<'_> {
        HighEnergyTasksContext {
            tasks: self.resources.tasks(),
            hazards: self.resources.hazards(),
            tenant: &self.tenant,
        }
    }

    pub fn selected_task_ids(&self) -> BTreeSet<TaskId> {
        self.steps.high_energy_tasks.activities.task_ids()
    }

    pub fn visible_incidents(&self) -> Vec<Incident> {
        visible_incidents(
            &self.resources.resolved_incidents(),
            &self.selected_task_ids(),
        )
    }

    pub fn snapshots(&self) -> EboSnapshots {
        EboSnapshots::new(self.step_order.iter().map(|step| {
            let hash = match step {
                StepName::ObservationDetails => self.steps.observation_details.make_snapshot(),
                StepName::HighEnergyTasks => self.steps.high_energy_tasks.make_snapshot(),
                StepName::HistoricIncidents => self.steps.historic_incidents.make_snapshot(),
                StepName::AdditionalInformation => {
                    self.steps.additional_information.make_snapshot()
                }
                StepName::Photos => self.steps.photos.make_snapshot(),
                StepName::Personnel => self.steps.personnel.make_snapshot(),
                StepName::Summary => self.steps.summary.make_snapshot(),
            };
            (*step, hash)
        }))
    }

    pub fn unsaved_steps(&self) -> Vec<StepName> {
        compare_ebo_snapshots(&self.initial_snapshots, &self.snapshots())
    }

    /// Whether leaving the wizard should ask for confirmation.
    pub fn should_prompt_before_leave(&self) -> bool {
        !self.suppress_leave_prompt && !self.unsaved_steps().is_empty()
    }

    pub fn is_step_complete(&self, step: StepName) -> bool {
        if !self.completed.contains_step(step) {
            return false;
        }
        step != StepName::HighEnergyTasks
            || self
                .steps
                .high_energy_tasks
                .sub_steps()
                .iter()
                .all(|sub_step| self.completed.contains_sub_step(sub_step))
    }

    /// Steps other than the last that still need a save.
    pub fn incomplete_steps_before_last(&self) -> Vec<StepName> {
        let last = self.last_step();
        self.step_order
            .iter()
            .copied()
            .filter(|step| *step != last && !self.is_step_complete(*step))
            .collect()
    }

    fn step_has_visible_error(&self, step: StepName, now: DateTime<Utc>) -> bool {
        match step {
            StepName::ObservationDetails => {
                let details = &self.steps.observation_details;
                details.errors_enabled && !details.is_valid(self.details_context(now))
            }
            StepName::HighEnergyTasks => {
                let tasks = &self.steps.high_energy_tasks;
                (tasks.errors_enabled && tasks.validate_activities().is_err())
                    || tasks.sub_sections.iter().any(|section| {
                        section.errors_enabled
                            && validate_task_hazard_data(
                                section,
                                self.resources.hazards(),
                                &self.tenant,
                            )
                            .is_err()
                    })
            }
            StepName::Personnel => {
                self.steps.personnel.errors_enabled && self.steps.personnel.validate().is_err()
            }
            StepName::AdditionalInformation => {
                !self.steps.additional_information.text.is_valid()
            }
            StepName::HistoricIncidents | StepName::Photos | StepName::Summary => false,
        }
    }

    pub fn badges(&self, now: DateTime<Utc>) -> Vec<(StepName, Badge)> {
        self.step_order
            .iter()
            .map(|step| {
                (
                    *step,
                    badge_for(
                        *step == self.current_step,
                        self.step_has_visible_error(*step, now),
                        self.is_step_complete(*step),
                    ),
                )
            })
            .collect()
    }

    pub fn summary_view(&self, now: DateTime<Utc>) -> SummaryView {
        let incidents = self.visible_incidents();
        summary_view(&SummarySources {
            details: &self.steps.observation_details,
            details_ctx: self.details_context(now),
            high_energy_tasks: &self.steps.high_energy_tasks,
            tasks_ctx: self.tasks_context(),
            historic_incidents: &self.steps.historic_incidents,
            visible_incidents: &incidents,
            additional_information: &self.steps.additional_information,
            photos: &self.steps.photos,
            personnel: self
                .has_step(StepName::Personnel)
                .then_some(&self.steps.personnel),
        })
    }

    /// `true` while a sub-step points at a task that is no longer selected.
    pub fn is_invalid_sub_step(&self) -> bool {
        self.sub_step.as_ref().is_some_and(|sub_step| {
            self.steps
                .high_energy_tasks
                .sub_section(sub_step)
                .is_none()
        })
    }

    pub fn is_saving(&self) -> bool {
        self.save_status.is_updating()
    }
}

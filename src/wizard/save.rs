//! Pre-save gating and the save / complete / delete / reopen protocol.

use super::actions::{RemovedTask, SaveKind, WizardEffect};
use super::error::WizardError;
use super::resources::Deferred;
use super::state::{SaveTarget, Wizard};
use crate::ebo::{EboStatus, SaveEboInput, SavedEboInfo};
use crate::form::FormValidationError;
use crate::shared::ids::HazardId;
use crate::steps::hazard_validation::{get_task_hazard_ids_with_error, validate_task_hazard_data};
use crate::steps::high_energy_tasks::SubStep;
use crate::steps::StepName;
use chrono::{DateTime, Utc};

pub const INCOMPLETE_STEPS_MESSAGE: &str = "Please complete every section before submitting";

/// Why a save did not go out.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveBlocked {
    Invalid {
        error: FormValidationError,
        focus: Option<String>,
    },
    ConfirmActivityRemoval(Vec<RemovedTask>),
    RecommendedHazards(SubStep, Vec<HazardId>),
}

impl Wizard {
    fn focus_effects(&self, blocked: &SaveBlocked) -> Vec<WizardEffect> {
        match blocked {
            SaveBlocked::Invalid { focus, .. } => focus
                .iter()
                .map(|element_id| WizardEffect::FocusElement {
                    element_id: element_id.clone(),
                })
                .collect(),
            SaveBlocked::ConfirmActivityRemoval(removed) => {
                vec![WizardEffect::ConfirmActivityRemoval {
                    removed: removed.clone(),
                }]
            }
            SaveBlocked::RecommendedHazards(sub_step, hazard_ids) => {
                vec![WizardEffect::PromptRecommendedHazards {
                    sub_step: sub_step.clone(),
                    hazard_ids: hazard_ids.clone(),
                }]
            }
        }
    }

    /// Checks the current step before any save. On failure the step's error
    /// flag is raised and the reason is returned.
    pub fn should_form_section_prevent_save(
        &mut self,
        now: DateTime<Utc>,
    ) -> Option<SaveBlocked> {
        let blocked = self.gate_current_step(now)?;
        if let SaveBlocked::Invalid { error, .. } = &blocked {
            self.form_error = Some(error.clone());
        }
        Some(blocked)
    }

    fn gate_current_step(&mut self, now: DateTime<Utc>) -> Option<SaveBlocked> {
        if self.is_last_step(self.current_step) {
            if let Some(step) = self.incomplete_steps_before_last().first() {
                return Some(SaveBlocked::Invalid {
                    error: FormValidationError::new(INCOMPLETE_STEPS_MESSAGE),
                    focus: Some(step.as_str().to_string()),
                });
            }
        }
        match self.current_step {
            StepName::ObservationDetails => self.gate_observation_details(now),
            StepName::HighEnergyTasks => match self.sub_step.clone() {
                Some(sub_step) => self.gate_sub_step(&sub_step),
                None => {
                    let tasks = &mut self.steps.high_energy_tasks;
                    tasks.validate_activities().err().map(|error| {
                        tasks.errors_enabled = true;
                        SaveBlocked::Invalid {
                            error,
                            focus: Some(StepName::HighEnergyTasks.as_str().to_string()),
                        }
                    })
                }
            },
            StepName::Personnel => {
                let personnel = &mut self.steps.personnel;
                personnel.validate().err().map(|error| {
                    personnel.errors_enabled = true;
                    SaveBlocked::Invalid {
                        error,
                        focus: Some(StepName::Personnel.as_str().to_string()),
                    }
                })
            }
            StepName::Photos => self
                .steps
                .photos
                .to_save_ebo_input()
                .err()
                .map(|error| SaveBlocked::Invalid { error, focus: None }),
            StepName::AdditionalInformation => self
                .steps
                .additional_information
                .to_save_ebo_input()
                .err()
                .map(|error| SaveBlocked::Invalid {
                    error,
                    focus: Some(StepName::AdditionalInformation.as_str().to_string()),
                }),
            StepName::HistoricIncidents | StepName::Summary => None,
        }
    }

    fn gate_observation_details(&mut self, now: DateTime<Utc>) -> Option<SaveBlocked> {
        let first_invalid = self
            .steps
            .observation_details
            .first_invalid_field(self.details_context(now));
        if let Some(field_error) = first_invalid {
            self.steps.observation_details.errors_enabled = true;
            return Some(SaveBlocked::Invalid {
                focus: Some(field_error.field.clone()),
                error: field_error.into(),
            });
        }
        let removed: Vec<RemovedTask> = self
            .steps
            .high_energy_tasks
            .activities
            .tasks_outside_work_types(
                &self.resources.known_tasks(),
                &self.steps.observation_details.work_type_ids,
            )
            .into_iter()
            .map(RemovedTask::from)
            .collect();
        (!removed.is_empty()).then_some(SaveBlocked::ConfirmActivityRemoval(removed))
    }

    fn gate_sub_step(&mut self, sub_step: &SubStep) -> Option<SaveBlocked> {
        let task = self.resources.task_library.get(&sub_step.task_id).cloned();
        let hazards = self.resources.hazards().to_vec();
        let section = self.steps.high_energy_tasks.sub_section_mut(sub_step)?;
        let recommended = section.pending_recommended_hazards(task.as_ref());
        if !recommended.is_empty() {
            return Some(SaveBlocked::RecommendedHazards(sub_step.clone(), recommended));
        }
        let with_error = get_task_hazard_ids_with_error(section, &hazards, &self.tenant);
        match validate_task_hazard_data(section, &hazards, &self.tenant) {
            Ok(_) => None,
            Err(error) => {
                section.errors_enabled = true;
                Some(SaveBlocked::Invalid {
                    error,
                    focus: Some(
                        with_error
                            .iter()
                            .next()
                            .map(|hazard_id| hazard_id.to_string())
                            .unwrap_or_else(|| sub_step.completed_key()),
                    ),
                })
            }
        }
    }

    /// The outgoing payload for the current step. Saving the first step also
    /// carries the activity selection and every sub-step as entered.
    pub fn outgoing_payload(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SaveEboInput, FormValidationError> {
        let tasks_ctx = self.tasks_context();
        let own = match self.current_step {
            StepName::ObservationDetails => self
                .steps
                .observation_details
                .to_save_ebo_input(self.details_context(now))?,
            StepName::HighEnergyTasks => match &self.sub_step {
                Some(sub_step) => self
                    .steps
                    .high_energy_tasks
                    .to_save_ebo_input_for_sub_step(sub_step, tasks_ctx)?,
                None => self.steps.high_energy_tasks.to_save_ebo_input(tasks_ctx)?,
            },
            StepName::HistoricIncidents => self.steps.historic_incidents.to_save_ebo_input()?,
            StepName::AdditionalInformation => {
                self.steps.additional_information.to_save_ebo_input()?
            }
            StepName::Photos => self.steps.photos.to_save_ebo_input()?,
            StepName::Personnel => self.steps.personnel.to_save_ebo_input()?,
            StepName::Summary => self.steps.summary.to_save_ebo_input()?,
        };
        if self.current_step == StepName::ObservationDetails {
            let selection = self.steps.high_energy_tasks.to_server_payload(tasks_ctx);
            return Ok(selection.merge(own));
        }
        Ok(own)
    }

    pub(crate) fn start_save(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Vec<WizardEffect>, WizardError> {
        if self.status.is_locked() {
            return Err(WizardError::Locked);
        }
        if self.save_status.is_updating() {
            return Ok(Vec::new());
        }
        if let Some(blocked) = self.should_form_section_prevent_save(now) {
            match &blocked {
                SaveBlocked::ConfirmActivityRemoval(removed) => {
                    self.pending_activity_removal = Some(
                        self.steps
                            .high_energy_tasks
                            .activities
                            .selected_tasks()
                            .into_iter()
                            .filter(|selected| {
                                removed.iter().any(|task| {
                                    task.task_id == selected.task_id
                                        && task.instance_id == selected.instance_id
                                        && task.activity_name == selected.activity_name
                                })
                            })
                            .collect(),
                    );
                }
                SaveBlocked::RecommendedHazards(sub_step, hazard_ids) => {
                    self.pending_recommended_hazards = Some((sub_step.clone(), hazard_ids.clone()));
                }
                SaveBlocked::Invalid { .. } => {}
            }
            return Ok(self.focus_effects(&blocked));
        }
        let input = match self.outgoing_payload(now) {
            Ok(input) => input,
            Err(error) => {
                self.form_error = Some(error);
                return Ok(Vec::new());
            }
        };
        let completing = self.is_last_step(self.current_step);
        self.form_error = None;
        self.pending_save = Some(SaveTarget {
            step: self.current_step,
            sub_step: self.sub_step.clone(),
            completing,
        });
        self.save_status = Deferred::Updating;
        Ok(vec![WizardEffect::SaveEbo {
            kind: SaveKind::for_save(self.ebo_id.as_ref(), completing),
            input,
        }])
    }

    fn adopt_saved(&mut self, saved: &SavedEboInfo) {
        self.ebo_id = Some(saved.id.clone());
        self.status = saved.status;
        self.created_by = saved.created_by.clone().or_else(|| self.created_by.clone());
        self.completed_by = saved.completed_by.clone();
    }

    pub(crate) fn finish_save(
        &mut self,
        result: Result<SavedEboInfo, String>,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        let target = self.pending_save.take().unwrap_or(SaveTarget {
            step: self.current_step,
            sub_step: self.sub_step.clone(),
            completing: false,
        });
        let saved = match result {
            Ok(saved) => saved,
            Err(message) => {
                self.save_status = Deferred::Resolved(Err(message.clone()));
                return self.raise_alert(message, now);
            }
        };
        self.adopt_saved(&saved);
        self.save_status = Deferred::Resolved(Ok(saved.id.clone()));
        match &target.sub_step {
            Some(sub_step) if target.step == StepName::HighEnergyTasks => {
                self.completed.mark_sub_step(sub_step)
            }
            _ => self.completed.mark_step(target.step),
        }
        let known_tasks = self.resources.known_tasks();
        if let Err(message) = self
            .steps
            .high_energy_tasks
            .refresh_from_server(&saved, &known_tasks)
        {
            return self.raise_alert(message, now);
        }
        if target.step == StepName::Personnel {
            self.steps.personnel.touched = false;
        }
        self.steps.personnel.refresh_from_server(&saved);
        self.initial_snapshots = self.snapshots();

        if target.completing {
            self.redirect = true;
            self.suppress_leave_prompt = true;
            return vec![WizardEffect::Redirect];
        }
        self.move_to_next_form_section()
    }

    pub(crate) fn start_delete(&mut self) -> Result<Vec<WizardEffect>, WizardError> {
        let ebo_id = self.ebo_id.clone().ok_or(WizardError::NotSaved)?;
        Ok(vec![WizardEffect::DeleteEbo { ebo_id }])
    }

    pub(crate) fn finish_delete(
        &mut self,
        result: Result<bool, String>,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        match result {
            Ok(true) => {
                self.redirect = true;
                self.suppress_leave_prompt = true;
                vec![WizardEffect::Redirect]
            }
            Ok(false) => self.raise_alert("The EBO could not be deleted", now),
            Err(message) => self.raise_alert(message, now),
        }
    }

    pub(crate) fn start_reopen(&mut self) -> Result<Vec<WizardEffect>, WizardError> {
        let ebo_id = self.ebo_id.clone().ok_or(WizardError::NotSaved)?;
        if !self.status.can_transition_to(EboStatus::Reopened) {
            return Err(WizardError::InvalidStatusTransition {
                from: self.status,
                to: EboStatus::Reopened,
            });
        }
        Ok(vec![WizardEffect::ReopenEbo { ebo_id }])
    }

    pub(crate) fn finish_reopen(
        &mut self,
        result: Result<SavedEboInfo, String>,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        match result {
            Ok(saved) => {
                self.adopt_saved(&saved);
                self.redirect = false;
                self.suppress_leave_prompt = false;
                Vec::new()
            }
            Err(message) => self.raise_alert(message, now),
        }
    }

    pub(crate) fn raise_alert(
        &mut self,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        let message = message.into();
        let id = self
            .alerts
            .push(message.clone(), now, self.tenant.alert_ttl_seconds);
        vec![WizardEffect::ShowAlert { id, message }]
    }
}

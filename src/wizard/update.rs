use super::actions::{AsyncOp, WizardAction, WizardEffect};
use super::error::WizardError;
use super::resources::Deferred;
use super::state::Wizard;
use crate::library::LibraryTask;
use crate::steps::activities::SelectedDuplicateActivities;
use crate::steps::hazard_subsection::SubSectionAction;
use crate::steps::high_energy_tasks::{HighEnergyTasksContext, SubStep};
use crate::steps::observation_details::{DetailsContext, ObservationDetailsAction};
use crate::steps::{StepEffect, StepName};
use chrono::{DateTime, Utc};

impl Wizard {
    /// Applies one action and returns the effects the caller must run.
    /// `now` drives date checks and alert expiry.
    pub fn update(
        &mut self,
        action: WizardAction,
        now: DateTime<Utc>,
    ) -> Result<Vec<WizardEffect>, WizardError> {
        match action {
            WizardAction::NavTo(step) => self.nav_to(step),
            WizardAction::NavToWithFromStep { step, from_step } => {
                self.nav_to_with_from_step(step, from_step)
            }
            WizardAction::NavToHighEnergyTasksSubSection(sub_step) => {
                self.nav_to_sub_section(sub_step)
            }
            WizardAction::MoveToNextFormSection => Ok(self.move_to_next_form_section()),

            WizardAction::ObservationDetails(action) => Ok(self.update_details(action, now)),
            WizardAction::HighEnergyTasks(action) => {
                let ctx = HighEnergyTasksContext {
                    tasks: self.resources.tasks(),
                    hazards: self.resources.hazards(),
                    tenant: &self.tenant,
                };
                let effects = self.steps.high_energy_tasks.update(action, ctx);
                Ok(self.apply_step_effects(effects, now))
            }
            WizardAction::HistoricIncidents(action) => {
                let effects = self.steps.historic_incidents.update(action);
                Ok(self.apply_step_effects(effects, now))
            }
            WizardAction::AdditionalInformation(action) => {
                let effects = self.steps.additional_information.update(action);
                Ok(self.apply_step_effects(effects, now))
            }
            WizardAction::Photos(action) => {
                let effects = self
                    .steps
                    .photos
                    .update(action, self.tenant.max_photo_files);
                Ok(self.apply_step_effects(effects, now))
            }
            WizardAction::Personnel(action) => {
                let effects = self.steps.personnel.update(action);
                Ok(self.apply_step_effects(effects, now))
            }
            WizardAction::Summary(action) => {
                let effects = self.steps.summary.update(action);
                Ok(self.apply_step_effects(effects, now))
            }

            WizardAction::SaveEbo(AsyncOp::Started) => self.start_save(now),
            WizardAction::SaveEbo(AsyncOp::Finished(result)) => Ok(self.finish_save(result, now)),
            WizardAction::DeleteEbo(AsyncOp::Started) => self.start_delete(),
            WizardAction::DeleteEbo(AsyncOp::Finished(result)) => {
                Ok(self.finish_delete(result, now))
            }
            WizardAction::ReopenEbo(AsyncOp::Started) => self.start_reopen(),
            WizardAction::ReopenEbo(AsyncOp::Finished(result)) => {
                Ok(self.finish_reopen(result, now))
            }

            WizardAction::FetchTasks(AsyncOp::Started) => {
                self.resources.tasks = Deferred::Updating;
                Ok(Vec::new())
            }
            WizardAction::FetchTasks(AsyncOp::Finished(result)) => {
                if let Ok(tasks) = &result {
                    self.resources.remember_tasks(tasks);
                    self.apply_library_tasks(tasks);
                }
                let effects = self.fetch_failure_alert(&result, now);
                self.resources.tasks = Deferred::Resolved(result);
                Ok(effects)
            }
            WizardAction::FetchHazards(AsyncOp::Started) => {
                self.resources.hazards = Deferred::Updating;
                Ok(Vec::new())
            }
            WizardAction::FetchHazards(AsyncOp::Finished(result)) => {
                let effects = self.fetch_failure_alert(&result, now);
                self.resources.hazards = Deferred::Resolved(result.map(|hazards| {
                    hazards
                        .into_iter()
                        .filter(|hazard| hazard.is_high_energy)
                        .collect()
                }));
                Ok(effects)
            }
            WizardAction::FetchWorkTypes(AsyncOp::Started) => {
                self.resources.work_types = Deferred::Updating;
                Ok(Vec::new())
            }
            WizardAction::FetchWorkTypes(AsyncOp::Finished(result)) => {
                let effects = self.fetch_failure_alert(&result, now);
                self.resources.work_types = Deferred::Resolved(result);
                Ok(effects)
            }
            WizardAction::FetchCrewMembers(AsyncOp::Started) => {
                self.resources.crew_members = Deferred::Updating;
                Ok(Vec::new())
            }
            WizardAction::FetchCrewMembers(AsyncOp::Finished(result)) => {
                let effects = self.fetch_failure_alert(&result, now);
                self.resources.crew_members = Deferred::Resolved(result);
                Ok(effects)
            }
            WizardAction::FetchHistoricalIncidents { task_id, op } => {
                let deferred = match op {
                    AsyncOp::Started => Deferred::Updating,
                    AsyncOp::Finished(result) => Deferred::Resolved(result),
                };
                let effects = match deferred.error() {
                    Some(message) => self.raise_alert(message.to_string(), now),
                    None => Vec::new(),
                };
                self.resources.historical_incidents.insert(task_id, deferred);
                Ok(effects)
            }

            WizardAction::ConfirmActivityRemoval => {
                if self.pending_activity_removal.take().is_none() {
                    return Ok(Vec::new());
                }
                let pruned = self.pruned_activities();
                let tasks = self.resources.known_tasks();
                let step_effects = self.steps.high_energy_tasks.set_activities(pruned, &tasks);
                let mut effects = self.apply_step_effects(step_effects, now);
                effects.extend(self.start_save(now)?);
                Ok(effects)
            }
            WizardAction::CancelActivityRemoval => {
                self.pending_activity_removal = None;
                Ok(Vec::new())
            }
            WizardAction::AddRecommendedHazards => {
                let Some((sub_step, hazard_ids)) = self.pending_recommended_hazards.take() else {
                    return Ok(Vec::new());
                };
                self.answer_recommended_hazards(
                    &sub_step,
                    SubSectionAction::AddRecommendedHazards { hazard_ids },
                );
                self.start_save(now)
            }
            WizardAction::DismissRecommendedHazards => {
                let Some((sub_step, _)) = self.pending_recommended_hazards.take() else {
                    return Ok(Vec::new());
                };
                self.answer_recommended_hazards(
                    &sub_step,
                    SubSectionAction::DismissRecommendedHazards,
                );
                self.start_save(now)
            }
            WizardAction::DismissAlert(id) => {
                self.alerts.dismiss(id);
                Ok(Vec::new())
            }
            WizardAction::ExpireAlerts => {
                self.alerts.expire(now);
                Ok(Vec::new())
            }
        }
    }

    fn update_details(
        &mut self,
        action: ObservationDetailsAction,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        let previous = self.steps.observation_details.work_type_ids.clone();
        let ctx = DetailsContext {
            today: self.tenant.today(now),
            opcos: &self.opcos,
            work_types: self.resources.work_types(),
        };
        let step_effects = self.steps.observation_details.update(action, ctx);
        let mut effects = self.apply_step_effects(step_effects, now);
        let work_type_ids = self.steps.observation_details.work_type_ids.clone();
        if work_type_ids != previous {
            if work_type_ids.is_empty() {
                self.resources.tasks = Deferred::Resolved(Ok(Vec::new()));
            } else {
                effects.push(WizardEffect::FetchTasks { work_type_ids });
            }
        }
        effects
    }

    fn pruned_activities(&self) -> SelectedDuplicateActivities {
        self.steps
            .high_energy_tasks
            .activities
            .remove_activities_based_on_selected_work_types(
                &self.resources.known_tasks(),
                &self.steps.observation_details.work_type_ids,
            )
    }

    fn answer_recommended_hazards(
        &mut self,
        sub_step: &SubStep,
        action: SubSectionAction,
    ) {
        let max_copies = self.tenant.max_hazard_copies;
        if let Some(section) = self.steps.high_energy_tasks.sub_section_mut(sub_step) {
            section.update(action, max_copies);
        }
    }

    /// Library data is not a user edit: an unchanged step stays unchanged.
    fn apply_library_tasks(&mut self, tasks: &[LibraryTask]) {
        let step = StepName::HighEnergyTasks;
        let was_saved = !self.unsaved_steps().contains(&step);
        self.steps.high_energy_tasks.apply_library_tasks(tasks);
        if was_saved {
            let hash = self.steps.high_energy_tasks.make_snapshot();
            self.initial_snapshots.set(step, hash);
        }
    }

    fn fetch_failure_alert<T>(
        &mut self,
        result: &Result<T, String>,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        match result {
            Ok(_) => Vec::new(),
            Err(message) => self.raise_alert(message.clone(), now),
        }
    }

    fn apply_step_effects(
        &mut self,
        effects: Vec<StepEffect>,
        now: DateTime<Utc>,
    ) -> Vec<WizardEffect> {
        let mut out = Vec::new();
        for effect in effects {
            match effect {
                StepEffect::Alert(message) => out.extend(self.raise_alert(message, now)),
                StepEffect::UploadPhotos(local_ids) => {
                    out.push(WizardEffect::UploadPhotos { local_ids })
                }
                StepEffect::FetchHistoricalIncidents(task_ids) => {
                    for task_id in task_ids {
                        self.resources
                            .historical_incidents
                            .insert(task_id.clone(), Deferred::NotStarted);
                        out.push(WizardEffect::FetchHistoricalIncidents { task_id });
                    }
                }
            }
        }
        out
    }
}

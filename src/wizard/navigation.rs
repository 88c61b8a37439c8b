use super::actions::WizardEffect;
use super::error::WizardError;
use super::resources::Deferred;
use super::state::Wizard;
use crate::shared::ids::TaskId;
use crate::steps::high_energy_tasks::SubStep;
use crate::steps::summary::SummaryAction;
use crate::steps::StepName;

impl Wizard {
    fn ensure_step(&self, step: StepName) -> Result<(), WizardError> {
        if self.has_step(step) {
            Ok(())
        } else {
            Err(WizardError::UnknownStep {
                tenant: self.tenant.tenant.clone(),
                step,
            })
        }
    }

    /// Leaving a step makes its hidden validation errors visible.
    fn leave_current_step(&mut self) {
        match self.current_step {
            StepName::ObservationDetails => self.steps.observation_details.errors_enabled = true,
            StepName::HighEnergyTasks => {
                let tasks = &mut self.steps.high_energy_tasks;
                match &self.sub_step {
                    Some(sub_step) => {
                        if let Some(section) = tasks.sub_section_mut(sub_step) {
                            section.errors_enabled = true;
                        }
                    }
                    None => tasks.errors_enabled = true,
                }
            }
            StepName::Personnel
            | StepName::HistoricIncidents
            | StepName::AdditionalInformation
            | StepName::Photos
            | StepName::Summary => {}
        }
        self.form_error = None;
    }

    fn enter_step(&mut self, step: StepName, sub_step: Option<SubStep>) -> Vec<WizardEffect> {
        self.current_step = step;
        self.sub_step = sub_step;
        match step {
            StepName::Summary => {
                self.steps.summary.update(SummaryAction::MarkViewed);
                Vec::new()
            }
            StepName::HistoricIncidents => self.fetch_missing_incidents(),
            _ => Vec::new(),
        }
    }

    /// Fetches incidents for selected tasks that have none yet or whose
    /// fetch failed; earlier results are kept.
    pub(crate) fn fetch_missing_incidents(&mut self) -> Vec<WizardEffect> {
        let missing: Vec<TaskId> = self
            .selected_task_ids()
            .into_iter()
            .filter(|task_id| {
                self.resources
                    .historical_incidents
                    .get(task_id)
                    .map_or(true, |deferred| deferred.error().is_some())
            })
            .collect();
        missing
            .into_iter()
            .map(|task_id| {
                self.resources
                    .historical_incidents
                    .insert(task_id.clone(), Deferred::NotStarted);
                WizardEffect::FetchHistoricalIncidents { task_id }
            })
            .collect()
    }

    pub fn nav_to(&mut self, step: StepName) -> Result<Vec<WizardEffect>, WizardError> {
        self.ensure_step(step)?;
        self.leave_current_step();
        self.from_step = None;
        Ok(self.enter_step(step, None))
    }

    pub fn nav_to_with_from_step(
        &mut self,
        step: StepName,
        from_step: StepName,
    ) -> Result<Vec<WizardEffect>, WizardError> {
        self.ensure_step(step)?;
        self.ensure_step(from_step)?;
        self.leave_current_step();
        self.from_step = Some(from_step);
        Ok(self.enter_step(step, None))
    }

    /// Enters a sub-step. A sub-step whose task is gone is still entered and
    /// reported by `is_invalid_sub_step`.
    pub fn nav_to_sub_section(
        &mut self,
        sub_step: SubStep,
    ) -> Result<Vec<WizardEffect>, WizardError> {
        self.ensure_step(StepName::HighEnergyTasks)?;
        if self.current_step != StepName::HighEnergyTasks || self.sub_step.is_some() {
            self.leave_current_step();
        }
        Ok(self.enter_step(StepName::HighEnergyTasks, Some(sub_step)))
    }

    fn next_incomplete_sub_step(&self) -> Option<SubStep> {
        self.steps
            .high_energy_tasks
            .next_incomplete_sub_step(self.sub_step.as_ref(), |sub_step| {
                self.completed.contains_sub_step(sub_step)
            })
    }

    pub fn move_to_next_form_section(&mut self) -> Vec<WizardEffect> {
        if let Some(from_step) = self.from_step {
            if self.current_step == StepName::HighEnergyTasks {
                if let Some(sub_step) = self.next_incomplete_sub_step() {
                    return self.enter_step(StepName::HighEnergyTasks, Some(sub_step));
                }
            }
            self.from_step = None;
            return self.enter_step(from_step, None);
        }
        if self.current_step == StepName::HighEnergyTasks {
            let tasks = &self.steps.high_energy_tasks;
            let next = match &self.sub_step {
                None => tasks.first_sub_step(),
                Some(current) => tasks.next_sub_step(current),
            };
            if let Some(sub_step) = next {
                return self.enter_step(StepName::HighEnergyTasks, Some(sub_step));
            }
        }
        match self.next_step(self.current_step) {
            Some(step) => self.enter_step(step, None),
            None => Vec::new(),
        }
    }
}

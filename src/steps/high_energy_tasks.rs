use super::activities::SelectedDuplicateActivities;
use super::hazard_subsection::{HighEnergyTaskSubSection, SubSectionAction};
use super::hazard_validation::validate_task_hazard_data;
use super::{StepEffect, StepName};
use crate::config::TenantConfig;
use crate::ebo::{ActivityInput, HighEnergyTaskInput, SaveEboInput, SavedEboInfo, TaskInput};
use crate::form::FormValidationError;
use crate::library::{ActivityGroup, Hazard, LibraryTask, RiskLevel};
use crate::shared::hashing::snapshot_hash;
use crate::shared::ids::{ConnectorId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const NO_ACTIVITY_SELECTED: &str = "At least one activity with a task should be selected";

/// Pointer to one `(task, instance)` hazard form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubStep {
    pub task_id: TaskId,
    pub instance_id: u32,
}

impl SubStep {
    pub fn new(task_id: TaskId, instance_id: u32) -> Self {
        Self {
            task_id,
            instance_id,
        }
    }

    /// Key recorded in the completed-steps set once this sub-step is saved.
    pub fn completed_key(&self) -> String {
        format!(
            "{}:{}:{}",
            StepName::HighEnergyTasks,
            self.task_id,
            self.instance_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HighEnergyTasksAction {
    AddActivityInstance {
        activity_group: ActivityGroup,
        task_ids: BTreeSet<TaskId>,
    },
    RemoveActivityInstance {
        activity_name: String,
        instance_id: u32,
    },
    ToggleTask {
        activity_group: ActivityGroup,
        instance_id: u32,
        task_id: TaskId,
    },
    SetTasks {
        activity_group: ActivityGroup,
        instance_id: u32,
        task_ids: BTreeSet<TaskId>,
    },
    RemoveTask {
        activity_name: String,
        instance_id: u32,
        task_id: TaskId,
    },
    SubSection {
        task_id: TaskId,
        instance_id: u32,
        action: SubSectionAction,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct HighEnergyTasksContext<'a> {
    pub tasks: &'a [LibraryTask],
    pub hazards: &'a [Hazard],
    pub tenant: &'a TenantConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighEnergyTasks {
    pub activities: SelectedDuplicateActivities,
    pub sub_sections: Vec<HighEnergyTaskSubSection>,
    #[serde(skip)]
    pub errors_enabled: bool,
}

fn task_name(tasks: &[LibraryTask], task_id: &TaskId) -> String {
    tasks
        .iter()
        .find(|task| &task.id == task_id)
        .map(|task| task.name.clone())
        .unwrap_or_else(|| task_id.to_string())
}

/// Sub-sections for the current selection, ordered by activity then task
/// name.
///
/// Existing sub-sections are reused by `(task, instance)` so hazard edits and
/// connector ids survive; new ones start with the task's `Always` hazards.
pub fn get_sub_steps(
    activities: &SelectedDuplicateActivities,
    existing: &[HighEnergyTaskSubSection],
    tasks: &[LibraryTask],
) -> Result<Vec<HighEnergyTaskSubSection>, String> {
    let mut sub_sections = Vec::new();
    for selected in activities.selected_tasks() {
        if let Some(section) = existing
            .iter()
            .find(|section| section.is_for(&selected.task_id, selected.instance_id))
        {
            let mut section = section.clone();
            section.activity_name = selected.activity_name.clone();
            sub_sections.push(section);
            continue;
        }
        let connector_id = ConnectorId::generate()?;
        let section = match tasks.iter().find(|task| task.id == selected.task_id) {
            Some(task) => HighEnergyTaskSubSection::new(
                task,
                selected.instance_id,
                &selected.activity_name,
                connector_id,
            ),
            None => HighEnergyTaskSubSection {
                awaiting_library: true,
                ..HighEnergyTaskSubSection::new(
                    &LibraryTask {
                        id: selected.task_id.clone(),
                        name: selected.task_id.to_string(),
                        risk_level: RiskLevel::Unknown,
                        work_type_ids: BTreeSet::new(),
                        activity_groups: vec![selected.activity_group.clone()],
                        hazards: Vec::new(),
                    },
                    selected.instance_id,
                    &selected.activity_name,
                    connector_id,
                )
            },
        };
        sub_sections.push(section);
    }
    sort_sub_sections(&mut sub_sections);
    Ok(sub_sections)
}

fn sort_sub_sections(sub_sections: &mut [HighEnergyTaskSubSection]) {
    sub_sections.sort_by(|left, right| {
        (&left.activity_name, &left.task_name, left.instance_id).cmp(&(
            &right.activity_name,
            &right.task_name,
            right.instance_id,
        ))
    });
}

impl HighEnergyTasks {
    pub fn init(saved: Option<&SavedEboInfo>, tasks: &[LibraryTask]) -> Result<Self, String> {
        let Some(contents) = saved.map(|ebo| &ebo.contents) else {
            return Ok(Self::default());
        };
        let mut activities = SelectedDuplicateActivities::new();
        for activity in contents.activities.iter().flatten() {
            activities.set_tasks(
                ActivityGroup {
                    id: activity.id.clone(),
                    name: activity.name.clone(),
                },
                activity.instance_id,
                activity.tasks.iter().map(|task| task.id.clone()).collect(),
            );
        }
        let saved_sections: Vec<HighEnergyTaskSubSection> = contents
            .high_energy_tasks
            .iter()
            .flatten()
            .map(|input| {
                HighEnergyTaskSubSection::from_input(input, &task_name(tasks, &input.task_id))
            })
            .collect();
        let sub_sections = get_sub_steps(&activities, &saved_sections, tasks)?;
        Ok(Self {
            activities,
            sub_sections,
            errors_enabled: false,
        })
    }

    /// Re-reads the server's copy after a save, keeping error visibility.
    pub fn refresh_from_server(
        &mut self,
        saved: &SavedEboInfo,
        tasks: &[LibraryTask],
    ) -> Result<(), String> {
        let errors_enabled = self.errors_enabled;
        let section_errors: Vec<(SubStep, bool)> = self
            .sub_sections
            .iter()
            .map(|section| (section.sub_step(), section.errors_enabled))
            .collect();
        *self = Self::init(Some(saved), tasks)?;
        self.errors_enabled = errors_enabled;
        for (sub_step, enabled) in section_errors {
            if let Some(section) = self.sub_section_mut(&sub_step) {
                section.errors_enabled = enabled;
            }
        }
        Ok(())
    }

    /// Fills in task names and missing `Always` hazards once the library
    /// arrives, then restores ordering.
    pub fn apply_library_tasks(&mut self, tasks: &[LibraryTask]) {
        for section in &mut self.sub_sections {
            if let Some(task) = tasks.iter().find(|task| task.id == section.task_id) {
                section.task_name = task.name.clone();
                section.seed_from_library(task);
            }
        }
        sort_sub_sections(&mut self.sub_sections);
    }

    pub fn update(
        &mut self,
        action: HighEnergyTasksAction,
        ctx: HighEnergyTasksContext<'_>,
    ) -> Vec<StepEffect> {
        let mut activities = self.activities.clone();
        match action {
            HighEnergyTasksAction::AddActivityInstance {
                activity_group,
                task_ids,
            } => {
                activities.add_instance(activity_group, task_ids);
            }
            HighEnergyTasksAction::RemoveActivityInstance {
                activity_name,
                instance_id,
            } => activities.remove_instance(&activity_name, instance_id),
            HighEnergyTasksAction::ToggleTask {
                activity_group,
                instance_id,
                task_id,
            } => activities.toggle_task(activity_group, instance_id, task_id),
            HighEnergyTasksAction::SetTasks {
                activity_group,
                instance_id,
                task_ids,
            } => activities.set_tasks(activity_group, instance_id, task_ids),
            HighEnergyTasksAction::RemoveTask {
                activity_name,
                instance_id,
                task_id,
            } => activities.remove_task(&activity_name, instance_id, &task_id),
            HighEnergyTasksAction::SubSection {
                task_id,
                instance_id,
                action,
            } => {
                let max_copies = ctx.tenant.max_hazard_copies;
                return self
                    .sub_section_mut(&SubStep::new(task_id, instance_id))
                    .map(|section| section.update(action, max_copies))
                    .unwrap_or_default();
            }
        }
        self.set_activities(activities, ctx.tasks)
    }

    /// Replaces the selection and re-derives sub-sections. Newly selected
    /// tasks are reported so their historical incidents can be fetched.
    pub fn set_activities(
        &mut self,
        activities: SelectedDuplicateActivities,
        tasks: &[LibraryTask],
    ) -> Vec<StepEffect> {
        let previous = self.activities.task_ids();
        match get_sub_steps(&activities, &self.sub_sections, tasks) {
            Ok(sub_sections) => {
                let added: Vec<TaskId> = activities
                    .task_ids()
                    .into_iter()
                    .filter(|task_id| !previous.contains(task_id))
                    .collect();
                self.activities = activities;
                self.sub_sections = sub_sections;
                if added.is_empty() {
                    Vec::new()
                } else {
                    vec![StepEffect::FetchHistoricalIncidents(added)]
                }
            }
            Err(message) => vec![StepEffect::Alert(message)],
        }
    }

    pub fn sub_steps(&self) -> Vec<SubStep> {
        self.sub_sections
            .iter()
            .map(HighEnergyTaskSubSection::sub_step)
            .collect()
    }

    pub fn sub_section(&self, sub_step: &SubStep) -> Option<&HighEnergyTaskSubSection> {
        self.sub_sections
            .iter()
            .find(|section| section.is_for(&sub_step.task_id, sub_step.instance_id))
    }

    pub fn sub_section_mut(&mut self, sub_step: &SubStep) -> Option<&mut HighEnergyTaskSubSection> {
        self.sub_sections
            .iter_mut()
            .find(|section| section.is_for(&sub_step.task_id, sub_step.instance_id))
    }

    pub fn first_sub_step(&self) -> Option<SubStep> {
        self.sub_sections.first().map(HighEnergyTaskSubSection::sub_step)
    }

    /// Sub-step after `current` in presentation order.
    pub fn next_sub_step(&self, current: &SubStep) -> Option<SubStep> {
        let position = self
            .sub_sections
            .iter()
            .position(|section| section.is_for(&current.task_id, current.instance_id))?;
        self.sub_sections
            .get(position + 1)
            .map(HighEnergyTaskSubSection::sub_step)
    }

    /// First incomplete sub-step after `current`, wrapping around to the
    /// start. With no `current` the search starts at the first sub-step.
    pub fn next_incomplete_sub_step(
        &self,
        current: Option<&SubStep>,
        is_complete: impl Fn(&SubStep) -> bool,
    ) -> Option<SubStep> {
        let sub_steps = self.sub_steps();
        let start = current
            .and_then(|current| sub_steps.iter().position(|sub_step| sub_step == current))
            .map(|position| position + 1)
            .unwrap_or(0);
        sub_steps
            .iter()
            .cycle()
            .skip(start)
            .take(sub_steps.len())
            .find(|sub_step| !is_complete(sub_step))
            .cloned()
    }

    pub fn validate_activities(&self) -> Result<(), FormValidationError> {
        if self.activities.is_empty() {
            return Err(FormValidationError::new(NO_ACTIVITY_SELECTED));
        }
        Ok(())
    }

    pub fn activity_inputs(&self, tasks: &[LibraryTask]) -> Vec<ActivityInput> {
        self.activities
            .iter()
            .map(|(name, instance_id, instance)| ActivityInput {
                id: instance.activity_group.id.clone(),
                name: name.to_string(),
                instance_id,
                tasks: instance
                    .task_ids
                    .iter()
                    .map(|task_id| {
                        let library = tasks.iter().find(|task| &task.id == task_id);
                        TaskInput {
                            id: task_id.clone(),
                            name: library
                                .map(|task| task.name.clone())
                                .unwrap_or_else(|| task_id.to_string()),
                            risk_level: library.map(|task| task.risk_level).unwrap_or_default(),
                            instance_id,
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn high_energy_task_inputs(&self, hazards: &[Hazard]) -> Vec<HighEnergyTaskInput> {
        self.sub_sections
            .iter()
            .map(|section| section.to_high_energy_task_input(hazards))
            .collect()
    }

    /// Activities plus every sub-section as entered. Used when another step
    /// saves and the selection must travel with it.
    pub fn to_server_payload(&self, ctx: HighEnergyTasksContext<'_>) -> SaveEboInput {
        SaveEboInput {
            activities: Some(self.activity_inputs(ctx.tasks)),
            high_energy_tasks: Some(self.high_energy_task_inputs(ctx.hazards)),
            ..SaveEboInput::default()
        }
    }

    pub fn to_save_ebo_input(
        &self,
        ctx: HighEnergyTasksContext<'_>,
    ) -> Result<SaveEboInput, FormValidationError> {
        self.validate_activities()?;
        Ok(self.to_server_payload(ctx))
    }

    /// Payload for saving one sub-step: its hazards must validate.
    pub fn to_save_ebo_input_for_sub_step(
        &self,
        sub_step: &SubStep,
        ctx: HighEnergyTasksContext<'_>,
    ) -> Result<SaveEboInput, FormValidationError> {
        let section = self.sub_section(sub_step).ok_or_else(|| {
            FormValidationError::new(format!(
                "Task {} instance {} is no longer selected",
                sub_step.task_id, sub_step.instance_id
            ))
        })?;
        let validated = validate_task_hazard_data(section, ctx.hazards, ctx.tenant)?;
        let mut payload = self.to_save_ebo_input(ctx)?;
        if let Some(inputs) = payload.high_energy_tasks.as_mut() {
            for input in inputs.iter_mut() {
                if input.task_id == sub_step.task_id && input.instance_id == sub_step.instance_id {
                    input.hazards = validated.clone();
                }
            }
        }
        Ok(payload)
    }

    /// Hash of the selection and of each sub-step keyed by `(task, instance)`,
    /// so display ordering never reads as an edit.
    pub fn make_snapshot(&self) -> String {
        let sub_sections: BTreeMap<String, &HighEnergyTaskSubSection> = self
            .sub_sections
            .iter()
            .map(|section| (section.sub_step().completed_key(), section))
            .collect();
        snapshot_hash(&(&self.activities, sub_sections))
    }
}

impl HighEnergyTaskSubSection {
    pub fn sub_step(&self) -> SubStep {
        SubStep::new(self.task_id.clone(), self.instance_id)
    }
}

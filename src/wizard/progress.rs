//! Completion keys, snapshot hashes and the navigation badges built on them.

use crate::ebo::SavedEboInfo;
use crate::steps::high_energy_tasks::SubStep;
use crate::steps::StepName;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Keys of steps and sub-steps saved at least once: a step name, or
/// `highEnergyTasks:<taskId>:<instanceId>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletedSteps(BTreeSet<String>);

impl CompletedSteps {
    /// Steps whose slice is present in a saved EBO count as saved.
    pub fn from_saved(saved: Option<&SavedEboInfo>) -> Self {
        let mut completed = Self::default();
        let Some(contents) = saved.map(|ebo| &ebo.contents) else {
            return completed;
        };
        if contents.details.is_some() {
            completed.mark_step(StepName::ObservationDetails);
        }
        if contents.activities.as_ref().is_some_and(|a| !a.is_empty()) {
            completed.mark_step(StepName::HighEnergyTasks);
        }
        for task in contents.high_energy_tasks.iter().flatten() {
            if !task.hazards.is_empty() {
                completed.mark_sub_step(&SubStep::new(task.task_id.clone(), task.instance_id));
            }
        }
        if contents.historic_incidents.is_some() {
            completed.mark_step(StepName::HistoricIncidents);
        }
        if contents.additional_information.is_some() {
            completed.mark_step(StepName::AdditionalInformation);
        }
        if contents.photos.is_some() {
            completed.mark_step(StepName::Photos);
        }
        if contents.personnel.is_some() {
            completed.mark_step(StepName::Personnel);
        }
        if contents.summary.is_some_and(|summary| summary.viewed) {
            completed.mark_step(StepName::Summary);
        }
        completed
    }

    pub fn mark_step(&mut self, step: StepName) {
        self.0.insert(step.as_str().to_string());
    }

    pub fn mark_sub_step(&mut self, sub_step: &SubStep) {
        self.0.insert(sub_step.completed_key());
    }

    pub fn contains_step(&self, step: StepName) -> bool {
        self.0.contains(step.as_str())
    }

    pub fn contains_sub_step(&self, sub_step: &SubStep) -> bool {
        self.0.contains(&sub_step.completed_key())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

/// Snapshot hash per step, taken at init and after each successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EboSnapshots(BTreeMap<StepName, String>);

impl EboSnapshots {
    pub fn new(snapshots: impl IntoIterator<Item = (StepName, String)>) -> Self {
        Self(snapshots.into_iter().collect())
    }

    pub fn get(&self, step: StepName) -> Option<&str> {
        self.0.get(&step).map(String::as_str)
    }

    pub fn set(&mut self, step: StepName, hash: String) {
        self.0.insert(step, hash);
    }
}

/// Steps whose current hash differs from the initial one.
pub fn compare_ebo_snapshots(initial: &EboSnapshots, current: &EboSnapshots) -> Vec<StepName> {
    current
        .0
        .iter()
        .filter(|(step, hash)| initial.get(**step) != Some(hash.as_str()))
        .map(|(step, _)| *step)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Default,
    Current,
    Saved,
    Error,
}

impl Badge {
    pub fn as_str(self) -> &'static str {
        match self {
            Badge::Default => "default",
            Badge::Current => "current",
            Badge::Saved => "saved",
            Badge::Error => "error",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current wins, then a visible error, then saved.
pub fn badge_for(current: bool, has_visible_error: bool, saved: bool) -> Badge {
    if current {
        Badge::Current
    } else if has_visible_error {
        Badge::Error
    } else if saved {
        Badge::Saved
    } else {
        Badge::Default
    }
}

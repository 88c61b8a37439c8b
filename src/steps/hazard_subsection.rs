use super::StepEffect;
use crate::ebo::{HazardObservationInput, HighEnergyTaskInput};
use crate::form::{decode_energy_level, FormField};
use crate::library::{ApplicabilityLevel, Hazard, LibraryTask};
use crate::shared::hashing::snapshot_hash;
use crate::shared::ids::{ConnectorId, ControlId, HazardId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Copy index of the observation every selected hazard starts with.
pub const BASE_COPY_INDEX: u32 = 0;

/// One observation of one hazard within a sub-step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardFieldValues {
    pub description: String,
    pub energy_level: FormField<String, String, Option<f64>>,
    pub direct_controls_implemented: Option<bool>,
    pub direct_controls: BTreeSet<ControlId>,
    pub direct_controls_description: String,
    pub limited_controls: BTreeSet<ControlId>,
    pub limited_controls_description: String,
    pub no_direct_controls_reason: Option<String>,
}

impl Default for HazardFieldValues {
    fn default() -> Self {
        Self {
            description: String::new(),
            energy_level: FormField::new(decode_energy_level, String::new()),
            direct_controls_implemented: None,
            direct_controls: BTreeSet::new(),
            direct_controls_description: String::new(),
            limited_controls: BTreeSet::new(),
            limited_controls_description: String::new(),
            no_direct_controls_reason: None,
        }
    }
}

impl HazardFieldValues {
    pub fn from_input(input: &HazardObservationInput) -> Self {
        Self {
            description: input.description.clone(),
            energy_level: FormField::new(
                decode_energy_level,
                input
                    .energy_level
                    .map(|level| level.to_string())
                    .unwrap_or_default(),
            ),
            direct_controls_implemented: input.direct_controls_implemented,
            direct_controls: input.direct_controls.iter().cloned().collect(),
            direct_controls_description: input
                .direct_controls_description
                .clone()
                .unwrap_or_default(),
            limited_controls: input.limited_controls.iter().cloned().collect(),
            limited_controls_description: input
                .limited_controls_description
                .clone()
                .unwrap_or_default(),
            no_direct_controls_reason: input.reason.clone(),
        }
    }

    /// Payload for this copy as currently entered, without validation.
    pub fn to_input(
        &self,
        hazard_id: &HazardId,
        name: &str,
        copy_index: u32,
    ) -> HazardObservationInput {
        let non_blank = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        HazardObservationInput {
            id: hazard_id.clone(),
            name: name.to_string(),
            copy_index,
            description: self.description.trim().to_string(),
            energy_level: self.energy_level.value().copied().flatten(),
            direct_controls_implemented: self.direct_controls_implemented,
            direct_controls: self.direct_controls.iter().cloned().collect(),
            direct_controls_description: non_blank(&self.direct_controls_description),
            limited_controls: self.limited_controls.iter().cloned().collect(),
            limited_controls_description: non_blank(&self.limited_controls_description),
            reason: self.no_direct_controls_reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum HazardFieldChange {
    Description(String),
    EnergyLevel(String),
    DirectControlsImplemented(bool),
    ToggleDirectControl(ControlId),
    DirectControlsDescription(String),
    ToggleLimitedControl(ControlId),
    LimitedControlsDescription(String),
    NoDirectControlsReason(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubSectionAction {
    HazardObservedChanged {
        hazard_id: HazardId,
        observed: bool,
    },
    CopyHazard {
        hazard_id: HazardId,
    },
    DeleteHazardCopy {
        hazard_id: HazardId,
        copy_index: u32,
    },
    HazardFieldChanged {
        hazard_id: HazardId,
        copy_index: u32,
        change: HazardFieldChange,
    },
    AddRecommendedHazards {
        hazard_ids: Vec<HazardId>,
    },
    DismissRecommendedHazards,
}

/// Hazard observations for one `(task, instance)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighEnergyTaskSubSection {
    pub task_id: TaskId,
    pub instance_id: u32,
    pub activity_name: String,
    #[serde(skip)]
    pub task_name: String,
    pub connector_id: ConnectorId,
    pub selected_hazards: BTreeMap<HazardId, BTreeMap<u32, HazardFieldValues>>,
    /// `None` until the recommended hazards prompt was answered; `Some(true)`
    /// once they were added, `Some(false)` once dismissed.
    pub recommended_hazards_dismissed: Option<bool>,
    #[serde(skip)]
    pub errors_enabled: bool,
    /// Built before the task library arrived, so its `Always` hazards are
    /// still missing.
    #[serde(skip)]
    pub awaiting_library: bool,
}

impl HighEnergyTaskSubSection {
    /// Fresh sub-step seeded with the task's `Always` hazards.
    pub fn new(
        task: &LibraryTask,
        instance_id: u32,
        activity_name: &str,
        connector_id: ConnectorId,
    ) -> Self {
        let selected_hazards = task
            .hazards_with_applicability(ApplicabilityLevel::Always)
            .map(|hazard_id| {
                (
                    hazard_id.clone(),
                    BTreeMap::from([(BASE_COPY_INDEX, HazardFieldValues::default())]),
                )
            })
            .collect();
        Self {
            task_id: task.id.clone(),
            instance_id,
            activity_name: activity_name.to_string(),
            task_name: task.name.clone(),
            connector_id,
            selected_hazards,
            recommended_hazards_dismissed: None,
            errors_enabled: false,
            awaiting_library: false,
        }
    }

    pub fn from_input(input: &HighEnergyTaskInput, task_name: &str) -> Self {
        let mut selected_hazards: BTreeMap<HazardId, BTreeMap<u32, HazardFieldValues>> =
            BTreeMap::new();
        for hazard in &input.hazards {
            selected_hazards
                .entry(hazard.id.clone())
                .or_default()
                .insert(hazard.copy_index, HazardFieldValues::from_input(hazard));
        }
        Self {
            task_id: input.task_id.clone(),
            instance_id: input.instance_id,
            activity_name: input.activity_name.clone(),
            task_name: task_name.to_string(),
            connector_id: input.id.clone(),
            selected_hazards,
            recommended_hazards_dismissed: input.recommended_hazards_dismissed,
            errors_enabled: false,
            awaiting_library: false,
        }
    }

    pub fn is_for(&self, task_id: &TaskId, instance_id: u32) -> bool {
        &self.task_id == task_id && self.instance_id == instance_id
    }

    pub fn is_observed(&self, hazard_id: &HazardId) -> bool {
        self.selected_hazards.contains_key(hazard_id)
    }

    pub fn copy_count(&self, hazard_id: &HazardId) -> usize {
        self.selected_hazards
            .get(hazard_id)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub fn hazard_copy(&self, hazard_id: &HazardId, copy_index: u32) -> Option<&HazardFieldValues> {
        self.selected_hazards
            .get(hazard_id)
            .and_then(|copies| copies.get(&copy_index))
    }

    /// `Mostly` hazards not yet selected, while the prompt is still unanswered.
    pub fn pending_recommended_hazards(&self, task: Option<&LibraryTask>) -> Vec<HazardId> {
        if self.recommended_hazards_dismissed.is_some() {
            return Vec::new();
        }
        task.map(|task| {
            task.hazards_with_applicability(ApplicabilityLevel::Mostly)
                .filter(|hazard_id| !self.is_observed(hazard_id))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn update(&mut self, action: SubSectionAction, max_copies: usize) -> Vec<StepEffect> {
        match action {
            SubSectionAction::HazardObservedChanged {
                hazard_id,
                observed,
            } => {
                if observed {
                    self.observe(hazard_id);
                } else {
                    self.selected_hazards.remove(&hazard_id);
                }
            }
            SubSectionAction::CopyHazard { hazard_id } => {
                if let Some(copies) = self.selected_hazards.get_mut(&hazard_id) {
                    if copies.len() < max_copies {
                        let next = copies
                            .keys()
                            .next_back()
                            .map(|last| last + 1)
                            .unwrap_or(BASE_COPY_INDEX);
                        copies.insert(next, HazardFieldValues::default());
                    }
                }
            }
            SubSectionAction::DeleteHazardCopy {
                hazard_id,
                copy_index,
            } => {
                self.delete_copy(&hazard_id, copy_index);
            }
            SubSectionAction::HazardFieldChanged {
                hazard_id,
                copy_index,
                change,
            } => {
                if let Some(values) = self
                    .selected_hazards
                    .get_mut(&hazard_id)
                    .and_then(|copies| copies.get_mut(&copy_index))
                {
                    apply_field_change(values, change);
                }
            }
            SubSectionAction::AddRecommendedHazards { hazard_ids } => {
                for hazard_id in hazard_ids {
                    self.observe(hazard_id);
                }
                self.recommended_hazards_dismissed = Some(true);
            }
            SubSectionAction::DismissRecommendedHazards => {
                self.recommended_hazards_dismissed = Some(false);
            }
        }
        Vec::new()
    }

    /// Adds the task's `Always` hazards to a sub-step built without the
    /// library. Hazards already observed keep their values.
    pub fn seed_from_library(&mut self, task: &LibraryTask) {
        if !self.awaiting_library {
            return;
        }
        for hazard_id in task.hazards_with_applicability(ApplicabilityLevel::Always) {
            self.observe(hazard_id.clone());
        }
        self.awaiting_library = false;
    }

    fn observe(&mut self, hazard_id: HazardId) {
        self.selected_hazards
            .entry(hazard_id)
            .or_insert_with(|| BTreeMap::from([(BASE_COPY_INDEX, HazardFieldValues::default())]));
    }

    fn delete_copy(&mut self, hazard_id: &HazardId, copy_index: u32) {
        let Some(copies) = self.selected_hazards.get_mut(hazard_id) else {
            return;
        };
        if copy_index == BASE_COPY_INDEX && copies.len() > 1 {
            return;
        }
        copies.remove(&copy_index);
        if copies.is_empty() {
            self.selected_hazards.remove(hazard_id);
        }
    }

    /// Payload for this sub-step as entered, without validation.
    pub fn to_high_energy_task_input(&self, hazards: &[Hazard]) -> HighEnergyTaskInput {
        let hazards = self
            .selected_hazards
            .iter()
            .flat_map(|(hazard_id, copies)| {
                let name = hazards
                    .iter()
                    .find(|hazard| &hazard.id == hazard_id)
                    .map(|hazard| hazard.name.clone())
                    .unwrap_or_else(|| hazard_id.to_string());
                copies
                    .iter()
                    .map(move |(copy_index, values)| values.to_input(hazard_id, &name, *copy_index))
            })
            .collect();
        HighEnergyTaskInput {
            id: self.connector_id.clone(),
            task_id: self.task_id.clone(),
            instance_id: self.instance_id,
            activity_name: self.activity_name.clone(),
            recommended_hazards_dismissed: self.recommended_hazards_dismissed,
            hazards,
        }
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(self)
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn apply_field_change(values: &mut HazardFieldValues, change: HazardFieldChange) {
    match change {
        HazardFieldChange::Description(value) => values.description = value,
        HazardFieldChange::EnergyLevel(value) => values.energy_level.update(value),
        HazardFieldChange::DirectControlsImplemented(implemented) => {
            values.direct_controls_implemented = Some(implemented);
            if implemented {
                values.no_direct_controls_reason = None;
            } else {
                values.direct_controls.clear();
                values.direct_controls_description.clear();
            }
        }
        HazardFieldChange::ToggleDirectControl(control_id) => {
            toggle(&mut values.direct_controls, control_id)
        }
        HazardFieldChange::DirectControlsDescription(value) => {
            values.direct_controls_description = value
        }
        HazardFieldChange::ToggleLimitedControl(control_id) => {
            toggle(&mut values.limited_controls, control_id)
        }
        HazardFieldChange::LimitedControlsDescription(value) => {
            values.limited_controls_description = value
        }
        HazardFieldChange::NoDirectControlsReason(reason) => {
            values.no_direct_controls_reason = reason
        }
    }
}

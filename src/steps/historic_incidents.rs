use super::StepEffect;
use crate::ebo::{SaveEboInput, SavedEboInfo};
use crate::form::FormValidationError;
use crate::library::Incident;
use crate::shared::hashing::snapshot_hash;
use crate::shared::ids::{IncidentId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoricIncidentsAction {
    ToggleIncident { incident_id: IncidentId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricIncidents {
    pub selected: BTreeSet<IncidentId>,
}

impl HistoricIncidents {
    pub fn init(saved: Option<&SavedEboInfo>) -> Self {
        Self {
            selected: saved
                .and_then(|ebo| ebo.contents.historic_incidents.as_ref())
                .map(|ids| ids.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    pub fn update(&mut self, action: HistoricIncidentsAction) -> Vec<StepEffect> {
        match action {
            HistoricIncidentsAction::ToggleIncident { incident_id } => {
                if !self.selected.remove(&incident_id) {
                    self.selected.insert(incident_id);
                }
            }
        }
        Vec::new()
    }

    pub fn is_selected(&self, incident_id: &IncidentId) -> bool {
        self.selected.contains(incident_id)
    }

    pub fn to_save_ebo_input(&self) -> Result<SaveEboInput, FormValidationError> {
        Ok(SaveEboInput {
            historic_incidents: Some(self.selected.iter().cloned().collect()),
            ..SaveEboInput::default()
        })
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(self)
    }
}

/// Incidents fetched for the selected tasks, one entry per incident id.
pub fn visible_incidents(
    fetched: &BTreeMap<TaskId, Vec<Incident>>,
    task_ids: &BTreeSet<TaskId>,
) -> Vec<Incident> {
    let mut seen = BTreeSet::new();
    task_ids
        .iter()
        .filter_map(|task_id| fetched.get(task_id))
        .flatten()
        .filter(|incident| seen.insert(incident.id.clone()))
        .cloned()
        .collect()
}


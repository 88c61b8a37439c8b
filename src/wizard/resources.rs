use crate::library::{CrewMember, Hazard, Incident, LibraryTask, WorkType};
use crate::shared::ids::TaskId;
use std::collections::BTreeMap;

/// An async resource: not requested yet, in flight, or answered.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Deferred<T> {
    #[default]
    NotStarted,
    Updating,
    Resolved(Result<T, String>),
}

impl<T> Deferred<T> {
    pub fn is_updating(&self) -> bool {
        matches!(self, Deferred::Updating)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Deferred::Resolved(_))
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            Deferred::Resolved(Ok(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Deferred::Resolved(Err(message)) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardResources {
    pub tasks: Deferred<Vec<LibraryTask>>,
    pub hazards: Deferred<Vec<Hazard>>,
    pub work_types: Deferred<Vec<WorkType>>,
    pub crew_members: Deferred<Vec<CrewMember>>,
    pub historical_incidents: BTreeMap<TaskId, Deferred<Vec<Incident>>>,
    /// Every task seen across task fetches. Work type pruning needs tasks the
    /// current work types no longer return.
    pub task_library: BTreeMap<TaskId, LibraryTask>,
}

impl WizardResources {
    pub fn tasks(&self) -> &[LibraryTask] {
        self.tasks.ok().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hazards(&self) -> &[Hazard] {
        self.hazards.ok().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn work_types(&self) -> &[WorkType] {
        self.work_types.ok().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn crew_members(&self) -> &[CrewMember] {
        self.crew_members.ok().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn known_tasks(&self) -> Vec<LibraryTask> {
        self.task_library.values().cloned().collect()
    }

    pub fn remember_tasks(&mut self, tasks: &[LibraryTask]) {
        for task in tasks {
            self.task_library.insert(task.id.clone(), task.clone());
        }
    }

    /// Fetched incidents keyed by task, failed or pending fetches left out.
    pub fn resolved_incidents(&self) -> BTreeMap<TaskId, Vec<Incident>> {
        self.historical_incidents
            .iter()
            .filter_map(|(task_id, deferred)| {
                deferred
                    .ok()
                    .map(|incidents| (task_id.clone(), incidents.clone()))
            })
            .collect()
    }
}

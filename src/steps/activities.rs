use crate::library::{ActivityGroup, LibraryTask};
use crate::shared::ids::{TaskId, WorkTypeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInstance {
    pub activity_group: ActivityGroup,
    pub task_ids: BTreeSet<TaskId>,
}

/// One selected task inside one activity instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectedTask {
    pub activity_name: String,
    pub instance_id: u32,
    pub activity_group: ActivityGroup,
    pub task_id: TaskId,
}

/// Activity name -> instance id -> selected tasks.
///
/// The same activity may be picked several times; each pick is an instance
/// with its own task set. Instances without tasks and names without
/// instances never survive a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedDuplicateActivities(BTreeMap<String, BTreeMap<u32, ActivityInstance>>);

impl SelectedDuplicateActivities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn activity_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn instances(&self, activity_name: &str) -> Option<&BTreeMap<u32, ActivityInstance>> {
        self.0.get(activity_name)
    }

    pub fn instance(&self, activity_name: &str, instance_id: u32) -> Option<&ActivityInstance> {
        self.0
            .get(activity_name)
            .and_then(|instances| instances.get(&instance_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32, &ActivityInstance)> + '_ {
        self.0.iter().flat_map(|(name, instances)| {
            instances
                .iter()
                .map(move |(instance_id, instance)| (name.as_str(), *instance_id, instance))
        })
    }

    pub fn next_instance_id(&self, activity_name: &str) -> u32 {
        self.0
            .get(activity_name)
            .and_then(|instances| instances.keys().next_back().copied())
            .map(|last| last + 1)
            .unwrap_or(1)
    }

    /// Adds a new instance of `group` holding `task_ids`; returns its id.
    /// An empty task set adds nothing.
    pub fn add_instance(
        &mut self,
        group: ActivityGroup,
        task_ids: BTreeSet<TaskId>,
    ) -> Option<u32> {
        if task_ids.is_empty() {
            return None;
        }
        let instance_id = self.next_instance_id(&group.name);
        self.0.entry(group.name.clone()).or_default().insert(
            instance_id,
            ActivityInstance {
                activity_group: group,
                task_ids,
            },
        );
        Some(instance_id)
    }

    /// Replaces the task set of one instance, creating it when missing.
    pub fn set_tasks(
        &mut self,
        group: ActivityGroup,
        instance_id: u32,
        task_ids: BTreeSet<TaskId>,
    ) {
        self.0.entry(group.name.clone()).or_default().insert(
            instance_id,
            ActivityInstance {
                activity_group: group,
                task_ids,
            },
        );
        self.prune();
    }

    pub fn toggle_task(&mut self, group: ActivityGroup, instance_id: u32, task_id: TaskId) {
        let instance = self
            .0
            .entry(group.name.clone())
            .or_default()
            .entry(instance_id)
            .or_insert_with(|| ActivityInstance {
                activity_group: group,
                task_ids: BTreeSet::new(),
            });
        if !instance.task_ids.remove(&task_id) {
            instance.task_ids.insert(task_id);
        }
        self.prune();
    }

    pub fn remove_task(&mut self, activity_name: &str, instance_id: u32, task_id: &TaskId) {
        if let Some(instance) = self
            .0
            .get_mut(activity_name)
            .and_then(|instances| instances.get_mut(&instance_id))
        {
            instance.task_ids.remove(task_id);
        }
        self.prune();
    }

    pub fn remove_instance(&mut self, activity_name: &str, instance_id: u32) {
        if let Some(instances) = self.0.get_mut(activity_name) {
            instances.remove(&instance_id);
        }
        self.prune();
    }

    pub fn selected_tasks(&self) -> Vec<SelectedTask> {
        self.iter()
            .flat_map(|(name, instance_id, instance)| {
                instance.task_ids.iter().map(move |task_id| SelectedTask {
                    activity_name: name.to_string(),
                    instance_id,
                    activity_group: instance.activity_group.clone(),
                    task_id: task_id.clone(),
                })
            })
            .collect()
    }

    pub fn task_ids(&self) -> BTreeSet<TaskId> {
        self.iter()
            .flat_map(|(_, _, instance)| instance.task_ids.iter().cloned())
            .collect()
    }

    pub fn contains_task(&self, task_id: &TaskId, instance_id: u32) -> bool {
        self.iter()
            .any(|(_, id, instance)| id == instance_id && instance.task_ids.contains(task_id))
    }

    /// Tasks that would be dropped by `remove_activities_based_on_selected_work_types`.
    pub fn tasks_outside_work_types(
        &self,
        tasks: &[LibraryTask],
        work_type_ids: &BTreeSet<WorkTypeId>,
    ) -> Vec<SelectedTask> {
        self.selected_tasks()
            .into_iter()
            .filter(|selected| {
                tasks
                    .iter()
                    .find(|task| task.id == selected.task_id)
                    .is_some_and(|task| !task.matches_work_types(work_type_ids))
            })
            .collect()
    }

    /// Drops every task whose work types are not all selected. Tasks missing
    /// from the library are kept since nothing is known about them.
    pub fn remove_activities_based_on_selected_work_types(
        &self,
        tasks: &[LibraryTask],
        work_type_ids: &BTreeSet<WorkTypeId>,
    ) -> Self {
        let mut next = self.clone();
        for removed in self.tasks_outside_work_types(tasks, work_type_ids) {
            if let Some(instance) = next
                .0
                .get_mut(&removed.activity_name)
                .and_then(|instances| instances.get_mut(&removed.instance_id))
            {
                instance.task_ids.remove(&removed.task_id);
            }
        }
        next.prune();
        next
    }

    fn prune(&mut self) {
        for instances in self.0.values_mut() {
            instances.retain(|_, instance| !instance.task_ids.is_empty());
        }
        self.0.retain(|_, instances| !instances.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ids::ActivityGroupId;

    fn group(name: &str) -> ActivityGroup {
        ActivityGroup {
            id: ActivityGroupId::parse(&format!("ag-{}", name.to_lowercase())).expect("id"),
            name: name.to_string(),
        }
    }

    fn task(id: &str) -> TaskId {
        TaskId::parse(id).expect("task id")
    }

    #[test]
    fn instance_ids_increment_per_activity_name() {
        let mut selected = SelectedDuplicateActivities::new();
        let first = selected.add_instance(group("Excavation"), BTreeSet::from([task("t1")]));
        let second = selected.add_instance(group("Excavation"), BTreeSet::from([task("t2")]));
        let other = selected.add_instance(group("Lifting"), BTreeSet::from([task("t3")]));
        assert_eq!((first, second, other), (Some(1), Some(2), Some(1)));
        assert_eq!(
            selected.add_instance(group("Lifting"), BTreeSet::new()),
            None
        );
    }

    #[test]
    fn toggling_a_task_twice_prunes_empty_containers() {
        let mut selected = SelectedDuplicateActivities::new();
        selected.toggle_task(group("Excavation"), 1, task("t1"));
        assert!(selected.contains_task(&task("t1"), 1));
        selected.toggle_task(group("Excavation"), 1, task("t1"));
        assert!(selected.is_empty());
    }
}

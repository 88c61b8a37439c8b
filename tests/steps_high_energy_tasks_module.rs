use ebo_wizard::config::TenantConfig;
use ebo_wizard::library::{
    ActivityGroup, ApplicabilityLevel, Control, Hazard, LibraryTask, RiskLevel, TaskHazardLink,
};
use ebo_wizard::shared::ids::{ActivityGroupId, ControlId, HazardId, TaskId};
use ebo_wizard::steps::hazard_subsection::{HazardFieldChange, SubSectionAction};
use ebo_wizard::steps::high_energy_tasks::{
    HighEnergyTasks, HighEnergyTasksAction, HighEnergyTasksContext, SubStep, NO_ACTIVITY_SELECTED,
};
use ebo_wizard::steps::StepEffect;
use std::collections::BTreeSet;

fn group(name: &str) -> ActivityGroup {
    ActivityGroup {
        id: ActivityGroupId::parse(&format!("ag-{}", name.to_lowercase())).expect("group id"),
        name: name.to_string(),
    }
}

fn task_id(raw: &str) -> TaskId {
    TaskId::parse(raw).expect("task id")
}

fn library_task(id: &str, name: &str) -> LibraryTask {
    LibraryTask {
        id: task_id(id),
        name: name.to_string(),
        risk_level: RiskLevel::Medium,
        work_type_ids: BTreeSet::new(),
        activity_groups: vec![group("Alpha")],
        hazards: vec![TaskHazardLink {
            hazard_id: HazardId::parse("hz-load").expect("hazard id"),
            applicability: ApplicabilityLevel::Always,
        }],
    }
}

fn library() -> Vec<LibraryTask> {
    vec![
        library_task("t-2", "Beta task"),
        library_task("t-1", "Alpha task"),
        library_task("t-3", "Gamma task"),
    ]
}

fn hazards() -> Vec<Hazard> {
    vec![Hazard {
        id: HazardId::parse("hz-load").expect("hazard id"),
        name: "Suspended load".to_string(),
        energy_type: None,
        is_high_energy: true,
        direct_controls: vec![Control {
            id: ControlId::parse("dc-barricade").expect("control id"),
            name: "Barricade".to_string(),
        }],
        limited_controls: Vec::new(),
    }]
}

fn add_instance(
    step: &mut HighEnergyTasks,
    tasks: &[LibraryTask],
    hazards: &[Hazard],
    tenant: &TenantConfig,
    activity: &str,
    task_ids: &[&str],
) -> Vec<StepEffect> {
    step.update(
        HighEnergyTasksAction::AddActivityInstance {
            activity_group: group(activity),
            task_ids: task_ids.iter().map(|raw| task_id(raw)).collect(),
        },
        HighEnergyTasksContext {
            tasks,
            hazards,
            tenant,
        },
    )
}

#[test]
fn sub_steps_follow_activity_then_task_name() {
    let tenant = TenantConfig::for_tenant("urbint");
    let tasks = library();
    let hazards = hazards();
    let mut step = HighEnergyTasks::default();
    add_instance(&mut step, &tasks, &hazards, &tenant, "Bravo", &["t-3"]);
    add_instance(&mut step, &tasks, &hazards, &tenant, "Alpha", &["t-2", "t-1"]);

    let alpha_t1 = SubStep::new(task_id("t-1"), 1);
    let alpha_t2 = SubStep::new(task_id("t-2"), 1);
    let bravo_t3 = SubStep::new(task_id("t-3"), 1);
    assert_eq!(step.first_sub_step(), Some(alpha_t1.clone()));
    assert_eq!(step.next_sub_step(&alpha_t1), Some(alpha_t2.clone()));
    assert_eq!(step.next_sub_step(&alpha_t2), Some(bravo_t3.clone()));
    assert_eq!(step.next_sub_step(&bravo_t3), None);
    assert_eq!(
        step.next_incomplete_sub_step(None, |sub_step| sub_step == &alpha_t1),
        Some(alpha_t2.clone())
    );
}

#[test]
fn next_incomplete_sub_step_searches_forward_then_wraps() {
    let tenant = TenantConfig::for_tenant("urbint");
    let tasks = library();
    let hazards = hazards();
    let mut step = HighEnergyTasks::default();
    add_instance(&mut step, &tasks, &hazards, &tenant, "Bravo", &["t-3"]);
    add_instance(&mut step, &tasks, &hazards, &tenant, "Alpha", &["t-2", "t-1"]);

    let alpha_t1 = SubStep::new(task_id("t-1"), 1);
    let alpha_t2 = SubStep::new(task_id("t-2"), 1);
    let bravo_t3 = SubStep::new(task_id("t-3"), 1);
    let nothing_done = |_: &SubStep| false;
    assert_eq!(
        step.next_incomplete_sub_step(Some(&alpha_t2), nothing_done),
        Some(bravo_t3.clone())
    );
    assert_eq!(
        step.next_incomplete_sub_step(Some(&bravo_t3), nothing_done),
        Some(alpha_t1.clone())
    );
    assert_eq!(
        step.next_incomplete_sub_step(Some(&alpha_t1), |sub_step| sub_step != &alpha_t1),
        Some(alpha_t1.clone())
    );
    assert_eq!(step.next_incomplete_sub_step(Some(&alpha_t1), |_| true), None);
}

#[test]
fn existing_sub_sections_keep_their_state_when_selection_grows() {
    let tenant = TenantConfig::for_tenant("urbint");
    let tasks = library();
    let hazards = hazards();
    let mut step = HighEnergyTasks::default();
    let effects = add_instance(&mut step, &tasks, &hazards, &tenant, "Alpha", &["t-1"]);
    assert_eq!(
        effects,
        vec![StepEffect::FetchHistoricalIncidents(vec![task_id("t-1")])]
    );

    let sub_step = SubStep::new(task_id("t-1"), 1);
    let connector = step
        .sub_section(&sub_step)
        .expect("sub-section")
        .connector_id
        .clone();
    step.update(
        HighEnergyTasksAction::SubSection {
            task_id: task_id("t-1"),
            instance_id: 1,
            action: SubSectionAction::HazardFieldChanged {
                hazard_id: HazardId::parse("hz-load").expect("hazard id"),
                copy_index: 0,
                change: HazardFieldChange::Description("load over path".to_string()),
            },
        },
        HighEnergyTasksContext {
            tasks: &tasks,
            hazards: &hazards,
            tenant: &tenant,
        },
    );

    let effects = step.update(
        HighEnergyTasksAction::ToggleTask {
            activity_group: group("Alpha"),
            instance_id: 1,
            task_id: task_id("t-2"),
        },
        HighEnergyTasksContext {
            tasks: &tasks,
            hazards: &hazards,
            tenant: &tenant,
        },
    );
    assert_eq!(
        effects,
        vec![StepEffect::FetchHistoricalIncidents(vec![task_id("t-2")])]
    );
    let section = step.sub_section(&sub_step).expect("sub-section kept");
    assert_eq!(section.connector_id, connector);
    assert_eq!(
        section
            .hazard_copy(&HazardId::parse("hz-load").expect("hazard id"), 0)
            .map(|values| values.description.as_str()),
        Some("load over path")
    );
    assert_eq!(step.sub_steps().len(), 2);
}

#[test]
fn removing_an_instance_drops_its_sub_sections() {
    let tenant = TenantConfig::for_tenant("urbint");
    let tasks = library();
    let hazards = hazards();
    let mut step = HighEnergyTasks::default();
    add_instance(&mut step, &tasks, &hazards, &tenant, "Alpha", &["t-1"]);
    add_instance(&mut step, &tasks, &hazards, &tenant, "Alpha", &["t-1"]);
    assert_eq!(step.sub_steps().len(), 2);

    step.update(
        HighEnergyTasksAction::RemoveActivityInstance {
            activity_name: "Alpha".to_string(),
            instance_id: 1,
        },
        HighEnergyTasksContext {
            tasks: &tasks,
            hazards: &hazards,
            tenant: &tenant,
        },
    );
    assert_eq!(step.sub_steps(), vec![SubStep::new(task_id("t-1"), 2)]);

    step.update(
        HighEnergyTasksAction::RemoveTask {
            activity_name: "Alpha".to_string(),
            instance_id: 2,
            task_id: task_id("t-1"),
        },
        HighEnergyTasksContext {
            tasks: &tasks,
            hazards: &hazards,
            tenant: &tenant,
        },
    );
    assert!(step.sub_steps().is_empty());
    assert_eq!(
        step.validate_activities()
            .expect_err("nothing selected")
            .message,
        NO_ACTIVITY_SELECTED
    );
}

#[test]
fn sub_step_payload_carries_validated_hazards() {
    let tenant = TenantConfig::for_tenant("urbint");
    let tasks = library();
    let hazards = hazards();
    let mut step = HighEnergyTasks::default();
    add_instance(&mut step, &tasks, &hazards, &tenant, "Alpha", &["t-1", "t-2"]);
    let sub_step = SubStep::new(task_id("t-1"), 1);
    let ctx = HighEnergyTasksContext {
        tasks: &tasks,
        hazards: &hazards,
        tenant: &tenant,
    };
    assert!(step.to_save_ebo_input_for_sub_step(&sub_step, ctx).is_err());

    for change in [
        HazardFieldChange::DirectControlsImplemented(true),
        HazardFieldChange::ToggleDirectControl(ControlId::parse("dc-barricade").expect("id")),
    ] {
        step.update(
            HighEnergyTasksAction::SubSection {
                task_id: task_id("t-1"),
                instance_id: 1,
                action: SubSectionAction::HazardFieldChanged {
                    hazard_id: HazardId::parse("hz-load").expect("hazard id"),
                    copy_index: 0,
                    change,
                },
            },
            ctx,
        );
    }

    let payload = step
        .to_save_ebo_input_for_sub_step(&sub_step, ctx)
        .expect("payload");
    let activities = payload.activities.expect("activities");
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].tasks.len(), 2);
    let inputs = payload.high_energy_tasks.expect("high energy tasks");
    let saved = inputs
        .iter()
        .find(|input| input.task_id == task_id("t-1"))
        .expect("t-1 input");
    assert_eq!(saved.hazards[0].name, "Suspended load");
    assert_eq!(saved.hazards[0].direct_controls_implemented, Some(true));
}

use ebo_wizard::library::{
    ActivityGroup, ApplicabilityLevel, LibraryTask, RiskLevel, TaskHazardLink,
};
use ebo_wizard::shared::ids::{ActivityGroupId, ConnectorId, HazardId, TaskId};
use ebo_wizard::steps::hazard_subsection::{
    HazardFieldChange, HighEnergyTaskSubSection, SubSectionAction, BASE_COPY_INDEX,
};
use std::collections::BTreeSet;

const MAX_COPIES: usize = 6;

fn hazard(raw: &str) -> HazardId {
    HazardId::parse(raw).expect("hazard id")
}

fn rigging_task() -> LibraryTask {
    LibraryTask {
        id: TaskId::parse("task-rigging").expect("task id"),
        name: "Rigging".to_string(),
        risk_level: RiskLevel::High,
        work_type_ids: BTreeSet::new(),
        activity_groups: vec![ActivityGroup {
            id: ActivityGroupId::parse("ag-lifting").expect("group id"),
            name: "Lifting".to_string(),
        }],
        hazards: vec![
            TaskHazardLink {
                hazard_id: hazard("hz-load"),
                applicability: ApplicabilityLevel::Always,
            },
            TaskHazardLink {
                hazard_id: hazard("hz-wind"),
                applicability: ApplicabilityLevel::Mostly,
            },
            TaskHazardLink {
                hazard_id: hazard("hz-pinch"),
                applicability: ApplicabilityLevel::Mostly,
            },
            TaskHazardLink {
                hazard_id: hazard("hz-noise"),
                applicability: ApplicabilityLevel::Rarely,
            },
        ],
    }
}

fn fresh_section() -> HighEnergyTaskSubSection {
    HighEnergyTaskSubSection::new(
        &rigging_task(),
        1,
        "Lifting",
        ConnectorId::parse("conn-1").expect("connector id"),
    )
}

fn copy(section: &mut HighEnergyTaskSubSection, id: &str) {
    section.update(
        SubSectionAction::CopyHazard {
            hazard_id: hazard(id),
        },
        MAX_COPIES,
    );
}

#[test]
fn new_sub_section_starts_with_always_hazards_only() {
    let section = fresh_section();
    assert!(section.is_observed(&hazard("hz-load")));
    assert!(!section.is_observed(&hazard("hz-wind")));
    assert!(!section.is_observed(&hazard("hz-noise")));
    assert_eq!(section.copy_count(&hazard("hz-load")), 1);
    assert!(section
        .hazard_copy(&hazard("hz-load"), BASE_COPY_INDEX)
        .is_some());
}

#[test]
fn copies_stop_at_the_tenant_limit() {
    let mut section = fresh_section();
    for _ in 0..10 {
        copy(&mut section, "hz-load");
    }
    assert_eq!(section.copy_count(&hazard("hz-load")), MAX_COPIES);

    let before = section.clone();
    copy(&mut section, "hz-load");
    assert_eq!(section, before);

    copy(&mut section, "hz-not-observed");
    assert_eq!(section.copy_count(&hazard("hz-not-observed")), 0);
}

#[test]
fn base_copy_survives_while_siblings_exist() {
    let mut section = fresh_section();
    copy(&mut section, "hz-load");
    copy(&mut section, "hz-load");
    assert_eq!(section.copy_count(&hazard("hz-load")), 3);

    section.update(
        SubSectionAction::DeleteHazardCopy {
            hazard_id: hazard("hz-load"),
            copy_index: BASE_COPY_INDEX,
        },
        MAX_COPIES,
    );
    assert_eq!(section.copy_count(&hazard("hz-load")), 3);

    for copy_index in [1, 2] {
        section.update(
            SubSectionAction::DeleteHazardCopy {
                hazard_id: hazard("hz-load"),
                copy_index,
            },
            MAX_COPIES,
        );
    }
    assert_eq!(section.copy_count(&hazard("hz-load")), 1);

    section.update(
        SubSectionAction::DeleteHazardCopy {
            hazard_id: hazard("hz-load"),
            copy_index: BASE_COPY_INDEX,
        },
        MAX_COPIES,
    );
    assert!(!section.is_observed(&hazard("hz-load")));
}

#[test]
fn unobserving_removes_every_copy_and_reobserving_starts_clean() {
    let mut section = fresh_section();
    section.update(
        SubSectionAction::HazardFieldChanged {
            hazard_id: hazard("hz-load"),
            copy_index: BASE_COPY_INDEX,
            change: HazardFieldChange::Description("crane over walkway".to_string()),
        },
        MAX_COPIES,
    );
    copy(&mut section, "hz-load");

    section.update(
        SubSectionAction::HazardObservedChanged {
            hazard_id: hazard("hz-load"),
            observed: false,
        },
        MAX_COPIES,
    );
    assert!(!section.is_observed(&hazard("hz-load")));

    section.update(
        SubSectionAction::HazardObservedChanged {
            hazard_id: hazard("hz-load"),
            observed: true,
        },
        MAX_COPIES,
    );
    assert_eq!(section.copy_count(&hazard("hz-load")), 1);
    let values = section
        .hazard_copy(&hazard("hz-load"), BASE_COPY_INDEX)
        .expect("base copy");
    assert!(values.description.is_empty());
}

#[test]
fn recommended_hazards_prompt_is_answered_once() {
    let task = rigging_task();
    let mut section = fresh_section();
    assert_eq!(
        section.pending_recommended_hazards(Some(&task)),
        vec![hazard("hz-wind"), hazard("hz-pinch")]
    );

    section.update(
        SubSectionAction::AddRecommendedHazards {
            hazard_ids: vec![hazard("hz-wind")],
        },
        MAX_COPIES,
    );
    assert!(section.is_observed(&hazard("hz-wind")));
    assert_eq!(section.recommended_hazards_dismissed, Some(true));
    assert!(section.pending_recommended_hazards(Some(&task)).is_empty());
}

#[test]
fn dismissing_recommended_hazards_adds_nothing() {
    let task = rigging_task();
    let mut section = fresh_section();
    section.update(SubSectionAction::DismissRecommendedHazards, MAX_COPIES);
    assert_eq!(section.recommended_hazards_dismissed, Some(false));
    assert!(!section.is_observed(&hazard("hz-wind")));
    assert!(section.pending_recommended_hazards(Some(&task)).is_empty());
    assert!(fresh_section().pending_recommended_hazards(None).is_empty());
}

#[test]
fn payload_lists_every_copy_with_its_index() {
    let mut section = fresh_section();
    copy(&mut section, "hz-load");
    let input = section.to_high_energy_task_input(&[]);
    assert_eq!(input.id.as_str(), "conn-1");
    assert_eq!(input.activity_name, "Lifting");
    assert_eq!(
        input
            .hazards
            .iter()
            .map(|hazard| (hazard.id.as_str().to_string(), hazard.copy_index))
            .collect::<Vec<_>>(),
        vec![("hz-load".to_string(), 0), ("hz-load".to_string(), 1)]
    );
    assert_eq!(input.hazards[0].name, "hz-load");
}

use ebo_wizard::config::TenantConfig;
use ebo_wizard::form::energy_level_validation;
use ebo_wizard::library::{Control, Hazard};
use ebo_wizard::shared::ids::{ConnectorId, ControlId, HazardId, TaskId};
use ebo_wizard::steps::hazard_subsection::{
    HazardFieldChange, HighEnergyTaskSubSection, SubSectionAction, BASE_COPY_INDEX,
};
use ebo_wizard::steps::hazard_validation::{
    get_task_hazard_ids_with_error, validate_task_hazard_data, DIRECT_CONTROLS_UNANSWERED,
    DIRECT_CONTROL_REQUIRED, LIMITED_CONTROL_REQUIRED, NO_DIRECT_CONTROLS_REASON_REQUIRED,
    NO_HAZARD_OBSERVED, OTHER_DIRECT_CONTROL_DESCRIPTION_REQUIRED,
    OTHER_HAZARD_ENERGY_LEVEL_REQUIRED, UNKNOWN_NO_DIRECT_CONTROLS_REASON,
};
use std::collections::BTreeMap;

fn id(raw: &str) -> HazardId {
    HazardId::parse(raw).expect("hazard id")
}

fn control(raw: &str, name: &str) -> Control {
    Control {
        id: ControlId::parse(raw).expect("control id"),
        name: name.to_string(),
    }
}

fn library() -> Vec<Hazard> {
    vec![
        Hazard {
            id: id("hz-load"),
            name: "Suspended load".to_string(),
            energy_type: Some("gravity".to_string()),
            is_high_energy: true,
            direct_controls: vec![
                control("dc-barricade", "Barricade"),
                control("dc-other", "Other"),
            ],
            limited_controls: vec![control("lc-spotter", "Spotter")],
        },
        Hazard {
            id: id("hz-other"),
            name: "Other".to_string(),
            energy_type: None,
            is_high_energy: true,
            direct_controls: vec![control("dc-barricade", "Barricade")],
            limited_controls: Vec::new(),
        },
    ]
}

fn empty_section() -> HighEnergyTaskSubSection {
    HighEnergyTaskSubSection {
        task_id: TaskId::parse("task-1").expect("task id"),
        instance_id: 1,
        activity_name: "Lifting".to_string(),
        task_name: "Rigging".to_string(),
        connector_id: ConnectorId::parse("conn-1").expect("connector id"),
        selected_hazards: BTreeMap::new(),
        recommended_hazards_dismissed: None,
        errors_enabled: false,
        awaiting_library: false,
    }
}

fn observe(section: &mut HighEnergyTaskSubSection, hazard: &str) {
    section.update(
        SubSectionAction::HazardObservedChanged {
            hazard_id: id(hazard),
            observed: true,
        },
        6,
    );
}

fn change(section: &mut HighEnergyTaskSubSection, hazard: &str, change: HazardFieldChange) {
    section.update(
        SubSectionAction::HazardFieldChanged {
            hazard_id: id(hazard),
            copy_index: BASE_COPY_INDEX,
            change,
        },
        6,
    );
}

fn message(section: &HighEnergyTaskSubSection, tenant: &TenantConfig) -> String {
    validate_task_hazard_data(section, &library(), tenant)
        .expect_err("validation should fail")
        .message
}

#[test]
fn energy_level_validation_accepts_500_and_above() {
    assert!(!energy_level_validation("499"));
    assert!(energy_level_validation("500"));
    assert!(!energy_level_validation(""));
    assert!(!energy_level_validation("abc"));
}

#[test]
fn empty_sub_section_needs_an_observed_hazard() {
    let tenant = TenantConfig::for_tenant("urbint");
    assert_eq!(message(&empty_section(), &tenant), NO_HAZARD_OBSERVED);
}

#[test]
fn direct_controls_branch_is_checked_in_order() {
    let tenant = TenantConfig::for_tenant("urbint");
    let mut section = empty_section();
    observe(&mut section, "hz-load");
    assert_eq!(message(&section, &tenant), DIRECT_CONTROLS_UNANSWERED);

    change(&mut section, "hz-load", HazardFieldChange::DirectControlsImplemented(true));
    assert_eq!(message(&section, &tenant), DIRECT_CONTROL_REQUIRED);

    change(
        &mut section,
        "hz-load",
        HazardFieldChange::ToggleDirectControl(ControlId::parse("dc-other").expect("id")),
    );
    assert_eq!(
        message(&section, &tenant),
        OTHER_DIRECT_CONTROL_DESCRIPTION_REQUIRED
    );

    change(
        &mut section,
        "hz-load",
        HazardFieldChange::DirectControlsDescription("tag line".to_string()),
    );
    let observations = validate_task_hazard_data(&section, &library(), &tenant).expect("valid");
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].name, "Suspended load");
    assert_eq!(
        observations[0].direct_controls_description.as_deref(),
        Some("tag line")
    );
}

#[test]
fn limited_controls_reason_needs_a_limited_control() {
    let tenant = TenantConfig::for_tenant("urbint");
    let mut section = empty_section();
    observe(&mut section, "hz-load");
    change(&mut section, "hz-load", HazardFieldChange::DirectControlsImplemented(false));
    assert_eq!(message(&section, &tenant), NO_DIRECT_CONTROLS_REASON_REQUIRED);

    change(
        &mut section,
        "hz-load",
        HazardFieldChange::NoDirectControlsReason(Some("Not a tenant reason".to_string())),
    );
    assert_eq!(message(&section, &tenant), UNKNOWN_NO_DIRECT_CONTROLS_REASON);

    change(
        &mut section,
        "hz-load",
        HazardFieldChange::NoDirectControlsReason(Some(
            tenant.limited_controls_used_reason.clone(),
        )),
    );
    assert_eq!(message(&section, &tenant), LIMITED_CONTROL_REQUIRED);

    change(
        &mut section,
        "hz-load",
        HazardFieldChange::ToggleLimitedControl(ControlId::parse("lc-spotter").expect("id")),
    );
    validate_task_hazard_data(&section, &library(), &tenant).expect("valid");
}

#[test]
fn other_hazard_needs_at_least_500_energy() {
    let tenant = TenantConfig::for_tenant("urbint");
    let mut section = empty_section();
    observe(&mut section, "hz-other");
    change(&mut section, "hz-other", HazardFieldChange::DirectControlsImplemented(true));
    change(
        &mut section,
        "hz-other",
        HazardFieldChange::ToggleDirectControl(ControlId::parse("dc-barricade").expect("id")),
    );
    change(&mut section, "hz-other", HazardFieldChange::EnergyLevel("499".to_string()));
    assert_eq!(message(&section, &tenant), OTHER_HAZARD_ENERGY_LEVEL_REQUIRED);

    change(&mut section, "hz-other", HazardFieldChange::EnergyLevel("500".to_string()));
    let observations = validate_task_hazard_data(&section, &library(), &tenant).expect("valid");
    assert_eq!(observations[0].energy_level, Some(500.0));
}

#[test]
fn hazard_ids_with_error_cover_every_failing_copy() {
    let tenant = TenantConfig::for_tenant("urbint");
    let mut section = empty_section();
    observe(&mut section, "hz-load");
    observe(&mut section, "hz-other");
    change(&mut section, "hz-load", HazardFieldChange::DirectControlsImplemented(true));
    change(
        &mut section,
        "hz-load",
        HazardFieldChange::ToggleDirectControl(ControlId::parse("dc-barricade").expect("id")),
    );
    section.update(
        SubSectionAction::CopyHazard {
            hazard_id: id("hz-load"),
        },
        6,
    );

    let with_error = get_task_hazard_ids_with_error(&section, &library(), &tenant);
    assert_eq!(
        with_error.into_iter().collect::<Vec<_>>(),
        vec![id("hz-load"), id("hz-other")]
    );
}

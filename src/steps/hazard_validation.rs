//! Control-branch validation for observed hazard copies.

use super::hazard_subsection::{HazardFieldValues, HighEnergyTaskSubSection};
use crate::config::TenantConfig;
use crate::ebo::HazardObservationInput;
use crate::form::{first_error, FieldError, FormValidationError, MIN_OTHER_HAZARD_ENERGY_LEVEL};
use crate::library::Hazard;
use crate::shared::ids::HazardId;
use std::collections::BTreeSet;

pub const NO_HAZARD_OBSERVED: &str = "At least one hazard should be observed";
pub const DIRECT_CONTROLS_UNANSWERED: &str =
    "Please select whether direct controls were implemented";
pub const DIRECT_CONTROL_REQUIRED: &str =
    "When direct controls are implemented, at least one direct control should be selected";
pub const OTHER_DIRECT_CONTROL_DESCRIPTION_REQUIRED: &str =
    "Please describe the other direct control";
pub const OTHER_LIMITED_CONTROL_DESCRIPTION_REQUIRED: &str =
    "Please describe the other limited control";
pub const NO_DIRECT_CONTROLS_REASON_REQUIRED: &str =
    "Please select a reason why direct controls were not implemented";
pub const UNKNOWN_NO_DIRECT_CONTROLS_REASON: &str =
    "The selected reason is not available for this tenant";
pub const LIMITED_CONTROL_REQUIRED: &str = "When limited controls used is selected on indirect \
     controls, at least one limited controls should be selected";
pub const OTHER_HAZARD_ENERGY_LEVEL_REQUIRED: &str =
    "The energy level of the Other hazard should be at least 500 ft-lbs";

struct HazardRef<'a> {
    id: &'a HazardId,
    library: Option<&'a Hazard>,
}

impl HazardRef<'_> {
    fn name(&self) -> String {
        self.library
            .map(|hazard| hazard.name.clone())
            .unwrap_or_else(|| self.id.to_string())
    }

    fn is_other(&self) -> bool {
        self.library.is_some_and(Hazard::is_other)
    }

    fn any_other_direct(&self, values: &HazardFieldValues) -> bool {
        self.library.is_some_and(|hazard| {
            values
                .direct_controls
                .iter()
                .any(|control| hazard.is_other_direct_control(control))
        })
    }

    fn any_other_limited(&self, values: &HazardFieldValues) -> bool {
        self.library.is_some_and(|hazard| {
            values
                .limited_controls
                .iter()
                .any(|control| hazard.is_other_limited_control(control))
        })
    }
}

fn check(failed: bool, field: &str, message: &str) -> Option<FieldError> {
    failed.then(|| FieldError::new(field, message))
}

/// Every rule for one copy, in the order the controls appear on screen.
fn hazard_copy_errors(
    hazard: &HazardRef<'_>,
    values: &HazardFieldValues,
    tenant: &TenantConfig,
) -> Vec<Option<FieldError>> {
    let field = hazard.id.as_str();
    let limited_other_missing = hazard.any_other_limited(values)
        && values.limited_controls_description.trim().is_empty();
    let energy_check = check(
        hazard.is_other()
            && !values
                .energy_level
                .value()
                .copied()
                .flatten()
                .is_some_and(|level| level >= MIN_OTHER_HAZARD_ENERGY_LEVEL),
        field,
        OTHER_HAZARD_ENERGY_LEVEL_REQUIRED,
    );
    match values.direct_controls_implemented {
        None => vec![
            energy_check,
            check(true, field, DIRECT_CONTROLS_UNANSWERED),
        ],
        Some(true) => vec![
            energy_check,
            check(
                values.direct_controls.is_empty(),
                field,
                DIRECT_CONTROL_REQUIRED,
            ),
            check(
                hazard.any_other_direct(values)
                    && values.direct_controls_description.trim().is_empty(),
                field,
                OTHER_DIRECT_CONTROL_DESCRIPTION_REQUIRED,
            ),
            check(
                limited_other_missing,
                field,
                OTHER_LIMITED_CONTROL_DESCRIPTION_REQUIRED,
            ),
        ],
        Some(false) => {
            let reason = values.no_direct_controls_reason.as_deref();
            vec![
                energy_check,
                check(reason.is_none(), field, NO_DIRECT_CONTROLS_REASON_REQUIRED),
                check(
                    reason.is_some_and(|reason| {
                        !tenant
                            .no_direct_controls_reasons
                            .iter()
                            .any(|known| known == reason)
                    }),
                    field,
                    UNKNOWN_NO_DIRECT_CONTROLS_REASON,
                ),
                check(
                    reason.is_some_and(|reason| tenant.is_limited_controls_used_reason(reason))
                        && values.limited_controls.is_empty(),
                    field,
                    LIMITED_CONTROL_REQUIRED,
                ),
                check(
                    limited_other_missing,
                    field,
                    OTHER_LIMITED_CONTROL_DESCRIPTION_REQUIRED,
                ),
            ]
        }
    }
}

fn each_copy<'a>(
    section: &'a HighEnergyTaskSubSection,
    hazards: &'a [Hazard],
) -> impl Iterator<Item = (HazardRef<'a>, u32, &'a HazardFieldValues)> + 'a {
    section
        .selected_hazards
        .iter()
        .flat_map(move |(hazard_id, copies)| {
            let library = hazards.iter().find(|hazard| &hazard.id == hazard_id);
            copies.iter().map(move |(copy_index, values)| {
                (
                    HazardRef {
                        id: hazard_id,
                        library,
                    },
                    *copy_index,
                    values,
                )
            })
        })
}

/// Validated hazard observations for one sub-step, or the first failure.
pub fn validate_task_hazard_data(
    section: &HighEnergyTaskSubSection,
    hazards: &[Hazard],
    tenant: &TenantConfig,
) -> Result<Vec<HazardObservationInput>, FormValidationError> {
    if section.selected_hazards.is_empty() {
        return Err(FormValidationError::new(NO_HAZARD_OBSERVED));
    }
    let mut errors = Vec::new();
    let mut observations = Vec::new();
    for (hazard, copy_index, values) in each_copy(section, hazards) {
        errors.extend(hazard_copy_errors(&hazard, values, tenant));
        observations.push(values.to_input(hazard.id, &hazard.name(), copy_index));
    }
    match first_error(&errors) {
        Some(error) => Err(FormValidationError::new(error.message)),
        None => Ok(observations),
    }
}

/// Ids of every hazard with at least one failing copy.
pub fn get_task_hazard_ids_with_error(
    section: &HighEnergyTaskSubSection,
    hazards: &[Hazard],
    tenant: &TenantConfig,
) -> BTreeSet<HazardId> {
    each_copy(section, hazards)
        .filter(|(hazard, _, values)| {
            hazard_copy_errors(hazard, values, tenant)
                .iter()
                .any(Option::is_some)
        })
        .map(|(hazard, _, _)| hazard.id.clone())
        .collect()
}

use super::StepEffect;
use crate::ebo::{DetailsInput, GpsCoordinates, LocationInput, SaveEboInput, SavedEboInfo};
use crate::form::{
    decode_date, decode_latitude, decode_longitude, decode_optional_text, decode_required_text,
    decode_time, FieldError, FormField,
};
use crate::library::{OpCo, WorkType};
use crate::shared::hashing::snapshot_hash;
use crate::shared::ids::{DepartmentId, OpCoId, WorkTypeId};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const FIELD_OBSERVATION_DATE: &str = "observationDate";
pub const FIELD_OBSERVATION_TIME: &str = "observationTime";
pub const FIELD_WORK_TYPES: &str = "workTypes";
pub const FIELD_OPCO: &str = "opco";
pub const FIELD_SUB_OPCO: &str = "subOpco";
pub const FIELD_DEPARTMENT: &str = "department";
pub const FIELD_WORK_LOCATION: &str = "workLocation";
pub const FIELD_LOCATION: &str = "location";

const FUTURE_DATE_ALERT: &str = "Observation date cannot be in the future";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObservationDetailsAction {
    ObservationDateChanged { value: String },
    ObservationTimeChanged { value: String },
    WorkTypesChanged { work_type_ids: BTreeSet<WorkTypeId> },
    OpCoChanged { opco_id: Option<OpCoId> },
    SubOpCoChanged { opco_id: Option<OpCoId> },
    DepartmentChanged { department_id: Option<DepartmentId> },
    WorkLocationChanged { value: String },
    LocationNameChanged { value: String },
    LatitudeChanged { value: String },
    LongitudeChanged { value: String },
}

/// Inputs the reducer reads but does not own.
#[derive(Debug, Clone, Copy)]
pub struct DetailsContext<'a> {
    pub today: NaiveDate,
    pub opcos: &'a [OpCo],
    pub work_types: &'a [WorkType],
}

/// A location is either named (GPS optional) or GPS coordinates alone.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationLocation {
    Named {
        name: String,
        gps: Option<GpsCoordinates>,
    },
    GpsOnly(GpsCoordinates),
}

impl From<ObservationLocation> for LocationInput {
    fn from(value: ObservationLocation) -> Self {
        match value {
            ObservationLocation::Named { name, gps } => LocationInput {
                location_name: Some(name),
                gps_coordinates: gps,
            },
            ObservationLocation::GpsOnly(gps) => LocationInput {
                location_name: None,
                gps_coordinates: Some(gps),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDetails {
    pub observation_date: FormField<String, String, NaiveDate>,
    pub observation_time: FormField<String, String, NaiveTime>,
    pub work_type_ids: BTreeSet<WorkTypeId>,
    pub opco_id: Option<OpCoId>,
    pub sub_opco_id: Option<OpCoId>,
    pub department_id: Option<DepartmentId>,
    pub work_location: FormField<String, String, String>,
    pub location_name: FormField<String, String, Option<String>>,
    pub latitude: FormField<String, String, Option<f64>>,
    pub longitude: FormField<String, String, Option<f64>>,
    #[serde(skip)]
    pub errors_enabled: bool,
}

impl Default for ObservationDetails {
    fn default() -> Self {
        Self {
            observation_date: FormField::new(decode_date, String::new()),
            observation_time: FormField::new(decode_time, String::new()),
            work_type_ids: BTreeSet::new(),
            opco_id: None,
            sub_opco_id: None,
            department_id: None,
            work_location: FormField::new(decode_required_text, String::new()),
            location_name: FormField::new(decode_optional_text, String::new()),
            latitude: FormField::new(decode_latitude, String::new()),
            longitude: FormField::new(decode_longitude, String::new()),
            errors_enabled: false,
        }
    }
}

/// `HH:MM`, or `HH:MM:SS` when the saved time carries seconds.
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

fn format_coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ObservationDetails {
    pub fn init(saved: Option<&SavedEboInfo>) -> Self {
        let Some(details) = saved.and_then(|ebo| ebo.contents.details.as_ref()) else {
            return Self::default();
        };
        let gps = details.location.gps_coordinates;
        Self {
            observation_date: FormField::new(
                decode_date,
                details.observation_date.format("%Y-%m-%d").to_string(),
            ),
            observation_time: FormField::new(
                decode_time,
                format_time(details.observation_time),
            ),
            work_type_ids: details.work_types.iter().map(|wt| wt.id.clone()).collect(),
            opco_id: Some(details.opco_id.clone()),
            sub_opco_id: details.sub_opco_id.clone(),
            department_id: Some(details.department_id.clone()),
            work_location: FormField::new(decode_required_text, details.work_location.clone()),
            location_name: FormField::new(
                decode_optional_text,
                details.location.location_name.clone().unwrap_or_default(),
            ),
            latitude: FormField::new(decode_latitude, format_coordinate(gps.map(|g| g.latitude))),
            longitude: FormField::new(
                decode_longitude,
                format_coordinate(gps.map(|g| g.longitude)),
            ),
            errors_enabled: false,
        }
    }

    pub fn update(
        &mut self,
        action: ObservationDetailsAction,
        ctx: DetailsContext<'_>,
    ) -> Vec<StepEffect> {
        match action {
            ObservationDetailsAction::ObservationDateChanged { value } => {
                if let Ok(date) = decode_date(&value) {
                    if date > ctx.today {
                        return vec![StepEffect::Alert(FUTURE_DATE_ALERT.to_string())];
                    }
                }
                self.observation_date.update(value);
            }
            ObservationDetailsAction::ObservationTimeChanged { value } => {
                self.observation_time.update(value);
            }
            ObservationDetailsAction::WorkTypesChanged { work_type_ids } => {
                self.work_type_ids = work_type_ids;
            }
            ObservationDetailsAction::OpCoChanged { opco_id } => {
                if opco_id != self.opco_id {
                    self.sub_opco_id = None;
                }
                self.opco_id = opco_id;
            }
            ObservationDetailsAction::SubOpCoChanged { opco_id } => {
                self.sub_opco_id = opco_id;
            }
            ObservationDetailsAction::DepartmentChanged { department_id } => {
                self.department_id = department_id;
            }
            ObservationDetailsAction::WorkLocationChanged { value } => {
                self.work_location.update(value);
            }
            ObservationDetailsAction::LocationNameChanged { value } => {
                self.location_name.update(value);
            }
            ObservationDetailsAction::LatitudeChanged { value } => {
                self.latitude.update(value);
            }
            ObservationDetailsAction::LongitudeChanged { value } => {
                self.longitude.update(value);
            }
        }
        Vec::new()
    }

    /// Sub-OpCo is required only when the selected OpCo has a parent.
    pub fn sub_opco_required(&self, opcos: &[OpCo]) -> bool {
        let Some(selected) = &self.opco_id else {
            return false;
        };
        opcos
            .iter()
            .any(|opco| &opco.id == selected && opco.parent_id.is_some())
    }

    fn date_check(&self, today: NaiveDate) -> Option<FieldError> {
        match self.observation_date.val() {
            Ok(date) if *date > today => {
                Some(FieldError::new(FIELD_OBSERVATION_DATE, FUTURE_DATE_ALERT))
            }
            Ok(_) => None,
            Err(message) => Some(FieldError::new(FIELD_OBSERVATION_DATE, message.clone())),
        }
    }

    fn field_check<V>(field: &FormField<String, String, V>, name: &str) -> Option<FieldError> {
        field
            .error()
            .map(|message| FieldError::new(name, message.clone()))
    }

    fn required_check<T>(value: &Option<T>, name: &str, label: &str) -> Option<FieldError> {
        if value.is_none() {
            Some(FieldError::new(name, format!("{label} is required")))
        } else {
            None
        }
    }

    /// Location decoding: named first, then GPS-only.
    pub fn location(&self) -> Result<ObservationLocation, FieldError> {
        if let Some(message) = self.latitude.error().or_else(|| self.longitude.error()) {
            return Err(FieldError::new(FIELD_LOCATION, message.clone()));
        }
        let gps = match (
            self.latitude.value().copied().flatten(),
            self.longitude.value().copied().flatten(),
        ) {
            (Some(latitude), Some(longitude)) => Some(GpsCoordinates {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(FieldError::new(
                    FIELD_LOCATION,
                    "Latitude and longitude must be provided together",
                ))
            }
        };
        if let Some(name) = self.location_name.value().cloned().flatten() {
            return Ok(ObservationLocation::Named { name, gps });
        }
        gps.map(ObservationLocation::GpsOnly).ok_or_else(|| {
            FieldError::new(
                FIELD_LOCATION,
                "A location name or GPS coordinates are required",
            )
        })
    }

    /// Every check runs, in the order the fields appear on screen.
    pub fn field_errors(&self, ctx: DetailsContext<'_>) -> Vec<FieldError> {
        let sub_opco_missing = if self.sub_opco_required(ctx.opcos) && self.sub_opco_id.is_none() {
            Some(FieldError::new(FIELD_SUB_OPCO, "Sub OpCo is required"))
        } else {
            None
        };
        let work_types_missing = if self.work_type_ids.is_empty() {
            Some(FieldError::new(
                FIELD_WORK_TYPES,
                "At least one work type is required",
            ))
        } else {
            None
        };
        [
            self.date_check(ctx.today),
            Self::field_check(&self.observation_time, FIELD_OBSERVATION_TIME),
            work_types_missing,
            Self::required_check(&self.opco_id, FIELD_OPCO, "OpCo"),
            sub_opco_missing,
            Self::required_check(&self.department_id, FIELD_DEPARTMENT, "Department"),
            Self::field_check(&self.work_location, FIELD_WORK_LOCATION),
            self.location().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn first_invalid_field(&self, ctx: DetailsContext<'_>) -> Option<FieldError> {
        self.field_errors(ctx).into_iter().next()
    }

    pub fn is_valid(&self, ctx: DetailsContext<'_>) -> bool {
        self.field_errors(ctx).is_empty()
    }

    pub fn to_details_input(&self, ctx: DetailsContext<'_>) -> Result<DetailsInput, FieldError> {
        if let Some(error) = self.first_invalid_field(ctx) {
            return Err(error);
        }
        let missing = |name: &str| FieldError::new(name, "This field is required");
        let work_types = self
            .work_type_ids
            .iter()
            .map(|id| {
                ctx.work_types
                    .iter()
                    .find(|wt| &wt.id == id)
                    .cloned()
                    .unwrap_or_else(|| WorkType {
                        id: id.clone(),
                        name: id.to_string(),
                    })
            })
            .collect();
        Ok(DetailsInput {
            observation_date: *self
                .observation_date
                .value()
                .ok_or_else(|| missing(FIELD_OBSERVATION_DATE))?,
            observation_time: *self
                .observation_time
                .value()
                .ok_or_else(|| missing(FIELD_OBSERVATION_TIME))?,
            work_types,
            opco_id: self.opco_id.clone().ok_or_else(|| missing(FIELD_OPCO))?,
            sub_opco_id: self.sub_opco_id.clone(),
            department_id: self
                .department_id
                .clone()
                .ok_or_else(|| missing(FIELD_DEPARTMENT))?,
            work_location: self
                .work_location
                .value()
                .cloned()
                .ok_or_else(|| missing(FIELD_WORK_LOCATION))?,
            location: self.location()?.into(),
        })
    }

    pub fn to_save_ebo_input(&self, ctx: DetailsContext<'_>) -> Result<SaveEboInput, FieldError> {
        Ok(SaveEboInput {
            details: Some(self.to_details_input(ctx)?),
            ..SaveEboInput::default()
        })
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(self)
    }
}

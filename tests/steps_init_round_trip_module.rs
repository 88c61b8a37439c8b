use chrono::{NaiveDate, NaiveTime};
use ebo_wizard::ebo::{
    CrewMemberInput, DetailsInput, EboStatus, GpsCoordinates, LocationInput, PersonnelInput,
    PersonnelRole, SaveEboInput, SavedEboInfo, UserRef,
};
use ebo_wizard::library::{CrewMember, OpCo, WorkType};
use ebo_wizard::shared::ids::{CrewMemberId, DepartmentId, EboId, IncidentId, OpCoId, WorkTypeId};
use ebo_wizard::steps::additional_information::AdditionalInformation;
use ebo_wizard::steps::historic_incidents::{HistoricIncidents, HistoricIncidentsAction};
use ebo_wizard::steps::observation_details::{
    DetailsContext, ObservationDetails, ObservationDetailsAction,
};
use ebo_wizard::steps::personnel::{PersonnelAction, PersonnelSection, CREW_MEMBER_WITHOUT_ROLE};

fn saved(contents: SaveEboInput) -> SavedEboInfo {
    SavedEboInfo {
        id: EboId::parse("ebo-1").expect("ebo id"),
        status: EboStatus::InProgress,
        created_by: Some(UserRef {
            id: "u-1".to_string(),
            name: "Robin".to_string(),
        }),
        completed_by: None,
        contents,
    }
}

fn details(observation_time: NaiveTime) -> DetailsInput {
    DetailsInput {
        observation_date: NaiveDate::from_ymd_opt(2024, 5, 9).expect("date"),
        observation_time,
        work_types: vec![WorkType {
            id: WorkTypeId::parse("wt-gas").expect("id"),
            name: "Gas".to_string(),
        }],
        opco_id: OpCoId::parse("opco-north-gas").expect("id"),
        sub_opco_id: Some(OpCoId::parse("opco-north-gas-metro").expect("id")),
        department_id: DepartmentId::parse("dept-ops").expect("id"),
        work_location: "Main St".to_string(),
        location: LocationInput {
            location_name: Some("Regulator station".to_string()),
            gps_coordinates: Some(GpsCoordinates {
                latitude: 44.98,
                longitude: -93.27,
            }),
        },
    }
}

#[test]
fn observation_details_survive_init_and_save() {
    let opcos = vec![
        OpCo {
            id: OpCoId::parse("opco-north").expect("id"),
            name: "North".to_string(),
            parent_id: None,
        },
        OpCo {
            id: OpCoId::parse("opco-north-gas").expect("id"),
            name: "North Gas".to_string(),
            parent_id: Some(OpCoId::parse("opco-north").expect("id")),
        },
    ];
    let work_types = vec![WorkType {
        id: WorkTypeId::parse("wt-gas").expect("id"),
        name: "Gas".to_string(),
    }];
    let ctx = DetailsContext {
        today: NaiveDate::from_ymd_opt(2024, 5, 10).expect("date"),
        opcos: &opcos,
        work_types: &work_types,
    };

    for time in [
        NaiveTime::from_hms_opt(7, 30, 15).expect("time"),
        NaiveTime::from_hms_opt(7, 30, 0).expect("time"),
    ] {
        let ebo = saved(SaveEboInput {
            details: Some(details(time)),
            ..SaveEboInput::default()
        });
        let step = ObservationDetails::init(Some(&ebo));
        assert_eq!(step.to_details_input(ctx), Ok(details(time)));
    }

    let mut entered = ObservationDetails::init(Some(&saved(SaveEboInput {
        details: Some(details(NaiveTime::from_hms_opt(7, 30, 0).expect("time"))),
        ..SaveEboInput::default()
    })));
    entered.update(
        ObservationDetailsAction::ObservationTimeChanged {
            value: "07:30:15".to_string(),
        },
        ctx,
    );
    let payload = entered.to_details_input(ctx).expect("valid details");
    let reloaded = ObservationDetails::init(Some(&saved(SaveEboInput {
        details: Some(payload.clone()),
        ..SaveEboInput::default()
    })));
    assert_eq!(reloaded.observation_time.raw(), "07:30:15");
    assert_eq!(reloaded.to_details_input(ctx), Ok(payload));
}

#[test]
fn personnel_survives_init_and_save() {
    let personnel = PersonnelInput {
        observer: Some(UserRef {
            id: "u-2".to_string(),
            name: "Sam".to_string(),
        }),
        crew_members: vec![CrewMemberInput {
            id: CrewMemberId::parse("crew-1").expect("id"),
            name: "Alex".to_string(),
            roles: vec![PersonnelRole::Observed, PersonnelRole::CoObserver],
        }],
    };
    let ebo = saved(SaveEboInput {
        personnel: Some(personnel.clone()),
        ..SaveEboInput::default()
    });
    let section = PersonnelSection::init(Some(&ebo));
    assert_eq!(
        section.to_save_ebo_input().expect("payload").personnel,
        Some(personnel)
    );
}

#[test]
fn observer_defaults_to_the_creator() {
    let ebo = saved(SaveEboInput::default());
    let section = PersonnelSection::init(Some(&ebo));
    assert_eq!(
        section.observer.map(|user| user.name),
        Some("Robin".to_string())
    );
}

#[test]
fn crew_member_without_a_role_blocks_the_save() {
    let mut section = PersonnelSection::default();
    assert!(section.validate().is_err());
    section.update(PersonnelAction::ToggleCrewMember {
        crew_member: CrewMember {
            id: CrewMemberId::parse("crew-1").expect("id"),
            name: "Alex".to_string(),
            job_title: Some("Lineworker".to_string()),
        },
    });
    section.validate().expect("observed role by default");
    section.update(PersonnelAction::ToggleRole {
        crew_member_id: CrewMemberId::parse("crew-1").expect("id"),
        role: PersonnelRole::Observed,
    });
    assert_eq!(
        section.validate().expect_err("no role").message,
        CREW_MEMBER_WITHOUT_ROLE
    );
    assert!(section.touched);
}

#[test]
fn untouched_personnel_follows_the_server_copy() {
    let mut section = PersonnelSection::default();
    let ebo = saved(SaveEboInput {
        personnel: Some(PersonnelInput {
            observer: None,
            crew_members: vec![CrewMemberInput {
                id: CrewMemberId::parse("crew-9").expect("id"),
                name: "Jo".to_string(),
                roles: vec![PersonnelRole::Observed],
            }],
        }),
        ..SaveEboInput::default()
    });
    section.refresh_from_server(&ebo);
    assert_eq!(section.crew_members.len(), 1);

    let mut edited = PersonnelSection::default();
    edited.update(PersonnelAction::ObserverChanged { observer: None });
    edited.refresh_from_server(&ebo);
    assert!(edited.crew_members.is_empty());
}

#[test]
fn additional_information_and_incidents_survive_init_and_save() {
    let ebo = saved(SaveEboInput {
        additional_information: Some("Crew stopped work twice".to_string()),
        historic_incidents: Some(vec![
            IncidentId::parse("inc-1").expect("id"),
            IncidentId::parse("inc-2").expect("id"),
        ]),
        ..SaveEboInput::default()
    });

    let info = AdditionalInformation::init(Some(&ebo));
    assert_eq!(
        info.to_save_ebo_input()
            .expect("payload")
            .additional_information
            .as_deref(),
        Some("Crew stopped work twice")
    );

    let mut incidents = HistoricIncidents::init(Some(&ebo));
    assert_eq!(
        incidents.to_save_ebo_input().expect("payload").historic_incidents,
        ebo.contents.historic_incidents
    );
    incidents.update(HistoricIncidentsAction::ToggleIncident {
        incident_id: IncidentId::parse("inc-1").expect("id"),
    });
    assert!(!incidents.is_selected(&IncidentId::parse("inc-1").expect("id")));
}

use chrono::{DateTime, Utc};
use ebo_wizard::config::TenantConfig;
use ebo_wizard::ebo::{EboStatus, UserRef};
use ebo_wizard::gateway::FileEboStore;
use ebo_wizard::library::LibraryCatalog;
use ebo_wizard::runtime::{bootstrap_state_root, StatePaths, WizardRunner};
use ebo_wizard::shared::ids::{DepartmentId, OpCoId, WorkTypeId};
use ebo_wizard::steps::observation_details::ObservationDetailsAction;
use ebo_wizard::steps::photo_upload::{
    Downscaler, ImageDimensions, PassThroughDownscaler, SelectedFile,
};
use ebo_wizard::steps::photos::PhotosAction;
use ebo_wizard::steps::StepName;
use ebo_wizard::wizard::{AsyncOp, Wizard, WizardAction, WizardEffect, WizardInit};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-10T12:00:00Z")
        .expect("timestamp")
        .with_timezone(&Utc)
}

fn catalog() -> LibraryCatalog {
    serde_json::from_value(serde_json::json!({
        "workTypes": [{"id": "wt-gas", "name": "Gas"}],
        "hazards": [{"id": "hz-load", "name": "Suspended load"}],
        "tasks": [{
            "id": "t-rig",
            "name": "Rigging",
            "workTypeIds": ["wt-gas"],
            "activityGroups": [{"id": "ag-lifting", "name": "Lifting"}],
            "hazards": [{"hazardId": "hz-load", "applicability": "ALWAYS"}]
        }],
        "crewMembers": [{"id": "crew-1", "name": "Alex"}],
        "opcos": [{"id": "opco-south", "name": "South"}]
    }))
    .expect("parse catalog")
}

fn new_wizard(store: &FileEboStore) -> (Wizard, Vec<WizardEffect>) {
    Wizard::init(
        TenantConfig::for_tenant("urbint"),
        WizardInit {
            saved: None,
            opcos: store.catalog().opcos.clone(),
            current_user: Some(UserRef {
                id: "u-1".to_string(),
                name: "Robin".to_string(),
            }),
        },
    )
    .expect("init wizard")
}

fn photo(name: &str, width: u32, height: u32) -> SelectedFile {
    SelectedFile {
        name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        dimensions: Some(ImageDimensions { width, height }),
        bytes: vec![0xff, 0xd8, 0xff, 0xe0, 0x00],
        path: None,
    }
}

#[derive(Default)]
struct RecordingDownscaler {
    targets: RefCell<Vec<ImageDimensions>>,
    fail: bool,
}

impl Downscaler for RecordingDownscaler {
    fn downscale(&self, file: &SelectedFile, target: ImageDimensions) -> Result<Vec<u8>, String> {
        self.targets.borrow_mut().push(target);
        if self.fail {
            return Err(format!("could not decode {}", file.name));
        }
        Ok(vec![0xff, 0xd8])
    }
}

#[test]
fn init_loads_the_library_and_a_save_persists_the_ebo() {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path());
    bootstrap_state_root(&paths).expect("bootstrap");
    let store = FileEboStore::new(dir.path(), catalog(), None);
    let (wizard, effects) = new_wizard(&store);
    let mut runner = WizardRunner::new(wizard, &store, &store, &PassThroughDownscaler, paths);

    let surfaced = runner.start(effects, now()).expect("start");
    assert!(surfaced.is_empty(), "{surfaced:?}");
    assert_eq!(runner.wizard.resources.work_types().len(), 1);
    assert_eq!(runner.wizard.resources.crew_members().len(), 1);

    let details = vec![
        ObservationDetailsAction::ObservationDateChanged {
            value: "2024-05-09".to_string(),
        },
        ObservationDetailsAction::ObservationTimeChanged {
            value: "09:30".to_string(),
        },
        ObservationDetailsAction::WorkTypesChanged {
            work_type_ids: BTreeSet::from([WorkTypeId::parse("wt-gas").expect("id")]),
        },
        ObservationDetailsAction::OpCoChanged {
            opco_id: Some(OpCoId::parse("opco-south").expect("id")),
        },
        ObservationDetailsAction::DepartmentChanged {
            department_id: Some(DepartmentId::parse("dept-ops").expect("id")),
        },
        ObservationDetailsAction::WorkLocationChanged {
            value: "Main St".to_string(),
        },
        ObservationDetailsAction::LocationNameChanged {
            value: "Regulator station".to_string(),
        },
    ];
    for action in details {
        runner
            .dispatch_at(WizardAction::ObservationDetails(action), now())
            .expect("details action");
    }
    assert_eq!(runner.wizard.resources.tasks().len(), 1);

    let surfaced = runner
        .dispatch_at(WizardAction::SaveEbo(AsyncOp::Started), now())
        .expect("save");
    assert!(surfaced.is_empty(), "{surfaced:?}");
    let ebo_id = runner.wizard.ebo_id.clone().expect("saved ebo id");
    assert_eq!(runner.wizard.current_step, StepName::HighEnergyTasks);

    let stored = store.load(&ebo_id).expect("stored record");
    assert_eq!(stored.status, EboStatus::InProgress);
    assert_eq!(
        stored
            .contents
            .details
            .expect("details saved")
            .work_location,
        "Main St"
    );

    let log = fs::read_to_string(runner.paths().wizard_log_path()).expect("wizard log");
    assert!(log.contains("\"event\":\"ebo.save\""));
    assert!(log.contains("fetched 1 tasks"));
}

#[test]
fn user_facing_effects_are_handed_back() {
    let dir = tempdir().expect("tempdir");
    let store = FileEboStore::new(dir.path(), catalog(), None);
    let (wizard, _) = new_wizard(&store);
    let mut runner = WizardRunner::new(
        wizard,
        &store,
        &store,
        &PassThroughDownscaler,
        StatePaths::new(dir.path()),
    );
    let surfaced = runner
        .dispatch_at(WizardAction::SaveEbo(AsyncOp::Started), now())
        .expect("save");
    assert!(matches!(
        surfaced.as_slice(),
        [WizardEffect::FocusElement { .. }]
    ));
    assert!(store.list().expect("list").is_empty());
}

#[test]
fn large_photos_are_downscaled_then_uploaded() {
    let dir = tempdir().expect("tempdir");
    let store = FileEboStore::new(dir.path(), catalog(), None);
    let (wizard, _) = new_wizard(&store);
    let downscaler = RecordingDownscaler::default();
    let mut runner =
        WizardRunner::new(wizard, &store, &store, &downscaler, StatePaths::new(dir.path()));

    let surfaced = runner
        .dispatch_at(
            WizardAction::Photos(PhotosAction::FilesSelected {
                files: vec![photo("wide.jpg", 4000, 3000), photo("small.jpg", 640, 480)],
            }),
            now(),
        )
        .expect("select photos");
    assert!(surfaced.is_empty(), "{surfaced:?}");
    assert_eq!(
        downscaler.targets.borrow().as_slice(),
        &[ImageDimensions {
            width: 1080,
            height: 810
        }]
    );

    let photos = runner
        .wizard
        .steps
        .photos
        .to_save_ebo_input()
        .expect("uploads finished")
        .photos
        .expect("photos");
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].size, 2);
    assert_eq!(photos[1].size, 5);
    for uploaded in &photos {
        assert!(store.paths().files.join(uploaded.id.as_str()).exists());
    }
}

#[test]
fn failed_downscale_drops_the_file_with_an_alert() {
    let dir = tempdir().expect("tempdir");
    let store = FileEboStore::new(dir.path(), catalog(), None);
    let (wizard, _) = new_wizard(&store);
    let downscaler = RecordingDownscaler {
        fail: true,
        ..RecordingDownscaler::default()
    };
    let mut runner =
        WizardRunner::new(wizard, &store, &store, &downscaler, StatePaths::new(dir.path()));

    let surfaced = runner
        .dispatch_at(
            WizardAction::Photos(PhotosAction::FilesSelected {
                files: vec![photo("wide.jpg", 4000, 3000)],
            }),
            now(),
        )
        .expect("select photos");
    assert!(matches!(
        surfaced.as_slice(),
        [WizardEffect::ShowAlert { message, .. }] if message.contains("could not decode wide.jpg")
    ));
    assert!(!runner.wizard.steps.photos.uploads_in_progress());
    assert_eq!(
        runner
            .wizard
            .steps
            .photos
            .to_save_ebo_input()
            .expect("payload")
            .photos,
        Some(Vec::new())
    );
}

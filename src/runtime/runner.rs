use super::logging::append_wizard_log;
use super::{RunnerError, StatePaths};
use crate::ebo::PhotoInput;
use crate::gateway::{EboGateway, FileUploadGateway, GatewayError};
use crate::steps::photo_upload::{downscale_dimensions, Downscaler, UploadForm};
use crate::steps::photos::{PhotosAction, UploadState};
use crate::wizard::{AsyncOp, SaveKind, Wizard, WizardAction, WizardEffect};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Drives a `Wizard` synchronously: every effect that needs the outside
/// world runs through the gateways and comes back as a `Finished` action.
/// Effects meant for the user (alerts, focus, prompts, redirect) are
/// returned to the caller.
pub struct WizardRunner<'a> {
    pub wizard: Wizard,
    ebos: &'a dyn EboGateway,
    uploads: &'a dyn FileUploadGateway,
    downscaler: &'a dyn Downscaler,
    paths: StatePaths,
}

impl<'a> WizardRunner<'a> {
    pub fn new(
        wizard: Wizard,
        ebos: &'a dyn EboGateway,
        uploads: &'a dyn FileUploadGateway,
        downscaler: &'a dyn Downscaler,
        paths: StatePaths,
    ) -> Self {
        Self {
            wizard,
            ebos,
            uploads,
            downscaler,
            paths,
        }
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    /// Runs effects produced by `Wizard::init`.
    pub fn start(
        &mut self,
        effects: Vec<WizardEffect>,
        now: DateTime<Utc>,
    ) -> Result<Vec<WizardEffect>, RunnerError> {
        self.drain(effects.into(), now)
    }

    pub fn dispatch(&mut self, action: WizardAction) -> Result<Vec<WizardEffect>, RunnerError> {
        self.dispatch_at(action, Utc::now())
    }

    pub fn dispatch_at(
        &mut self,
        action: WizardAction,
        now: DateTime<Utc>,
    ) -> Result<Vec<WizardEffect>, RunnerError> {
        let effects = self.wizard.update(action, now)?;
        self.drain(effects.into(), now)
    }

    fn drain(
        &mut self,
        mut pending: VecDeque<WizardEffect>,
        now: DateTime<Utc>,
    ) -> Result<Vec<WizardEffect>, RunnerError> {
        let mut surfaced = Vec::new();
        while let Some(effect) = pending.pop_front() {
            match self.execute(effect) {
                Ok(follow_ups) => {
                    for action in follow_ups {
                        pending.extend(self.wizard.update(action, now)?);
                    }
                }
                Err(effect) => surfaced.push(effect),
            }
        }
        Ok(surfaced)
    }

    /// Gateway-backed effects turn into follow-up actions; anything else is
    /// handed back unchanged.
    fn execute(&self, effect: WizardEffect) -> Result<Vec<WizardAction>, WizardEffect> {
        let actions = match effect {
            WizardEffect::SaveEbo { kind, input } => {
                let (event, result) = match &kind {
                    SaveKind::Create => ("ebo.save", self.ebos.save_ebo(None, &input)),
                    SaveKind::Update(ebo_id) => {
                        ("ebo.save", self.ebos.save_ebo(Some(ebo_id), &input))
                    }
                    SaveKind::Complete(ebo_id) => {
                        ("ebo.complete", self.ebos.complete_ebo(ebo_id, &input))
                    }
                };
                let result = self.logged(event, result, |saved| {
                    format!("ebo {} is {}", saved.id, saved.status)
                });
                vec![WizardAction::SaveEbo(AsyncOp::Finished(result))]
            }
            WizardEffect::DeleteEbo { ebo_id } => {
                let result = self.ebos.delete_ebo(&ebo_id);
                let result = self.logged("ebo.delete", result, |deleted| {
                    format!("ebo {ebo_id} deleted: {deleted}")
                });
                vec![WizardAction::DeleteEbo(AsyncOp::Finished(result))]
            }
            WizardEffect::ReopenEbo { ebo_id } => {
                let result = self.ebos.reopen_ebo(&ebo_id);
                let result = self.logged("ebo.reopen", result, |saved| {
                    format!("ebo {} is {}", saved.id, saved.status)
                });
                vec![WizardAction::ReopenEbo(AsyncOp::Finished(result))]
            }
            WizardEffect::FetchTasks { work_type_ids } => {
                let result = self.ebos.get_tasks_for_work_types(&work_type_ids);
                let result = self.logged("library.fetch", result, |tasks| {
                    format!("fetched {} tasks", tasks.len())
                });
                vec![
                    WizardAction::FetchTasks(AsyncOp::Started),
                    WizardAction::FetchTasks(AsyncOp::Finished(result)),
                ]
            }
            WizardEffect::FetchHazards => {
                let result = self.ebos.get_high_energy_hazards();
                let result = self.logged("library.fetch", result, |hazards| {
                    format!("fetched {} hazards", hazards.len())
                });
                vec![
                    WizardAction::FetchHazards(AsyncOp::Started),
                    WizardAction::FetchHazards(AsyncOp::Finished(result)),
                ]
            }
            WizardEffect::FetchWorkTypes => {
                let result = self.ebos.get_work_types();
                let result = self.logged("library.fetch", result, |work_types| {
                    format!("fetched {} work types", work_types.len())
                });
                vec![
                    WizardAction::FetchWorkTypes(AsyncOp::Started),
                    WizardAction::FetchWorkTypes(AsyncOp::Finished(result)),
                ]
            }
            WizardEffect::FetchCrewMembers => {
                let result = self.ebos.get_crew_members();
                let result = self.logged("library.fetch", result, |crew| {
                    format!("fetched {} crew members", crew.len())
                });
                vec![
                    WizardAction::FetchCrewMembers(AsyncOp::Started),
                    WizardAction::FetchCrewMembers(AsyncOp::Finished(result)),
                ]
            }
            WizardEffect::FetchHistoricalIncidents { task_id } => {
                let result = self.ebos.get_historical_incidents(&task_id);
                let result = self.logged("library.fetch", result, |incidents| {
                    format!("fetched {} incidents for task {task_id}", incidents.len())
                });
                vec![
                    WizardAction::FetchHistoricalIncidents {
                        task_id: task_id.clone(),
                        op: AsyncOp::Started,
                    },
                    WizardAction::FetchHistoricalIncidents {
                        task_id,
                        op: AsyncOp::Finished(result),
                    },
                ]
            }
            WizardEffect::UploadPhotos { local_ids } => local_ids
                .into_iter()
                .flat_map(|local_id| self.upload_photo(local_id))
                .collect(),
            other => return Err(other),
        };
        Ok(actions)
    }

    /// One file through downscale, policy and upload. Failure at any stage
    /// drops the file.
    fn upload_photo(&self, local_id: u32) -> Vec<WizardAction> {
        let Some(file) = self.wizard.steps.photos.pending_file(local_id).cloned() else {
            return Vec::new();
        };
        let progressed = |state| {
            WizardAction::Photos(PhotosAction::UploadProgressed { local_id, state })
        };
        let mut actions = vec![progressed(UploadState::Downscaling)];
        let max_edge = self.wizard.tenant.photo_max_edge_px;
        let bytes = match file.dimensions {
            Some(dimensions) => {
                let target = downscale_dimensions(dimensions, max_edge);
                if target == dimensions {
                    Ok(file.bytes.clone())
                } else {
                    self.downscaler.downscale(&file, target)
                }
            }
            None => Ok(file.bytes.clone()),
        };
        let outcome = bytes.map_err(GatewayError::Upload).and_then(|bytes| {
            actions.push(progressed(UploadState::PolicyRequested));
            let policy = self
                .uploads
                .generate_file_upload_policies(1)?
                .into_iter()
                .next()
                .ok_or_else(|| GatewayError::Upload("no upload policy returned".to_string()))?;
            actions.push(progressed(UploadState::Uploading));
            let form = UploadForm::from_policy(&policy, &file, bytes);
            self.uploads.upload_file(&policy.url, &form)?;
            Ok(PhotoInput {
                name: file.name.clone(),
                display_name: file.name.clone(),
                size: form.size(),
                url: policy.object_url(),
                signed_url: policy.signed_url.clone(),
                id: policy.id,
            })
        });
        let outcome = self.logged("photos.upload", outcome, |photo| {
            format!("uploaded {} as {}", photo.name, photo.id)
        });
        actions.push(match outcome {
            Ok(photo) => WizardAction::Photos(PhotosAction::UploadSucceeded { local_id, photo }),
            Err(message) => WizardAction::Photos(PhotosAction::UploadFailed { local_id, message }),
        });
        actions
    }

    fn logged<T>(
        &self,
        event: &str,
        result: Result<T, GatewayError>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T, String> {
        match result {
            Ok(value) => {
                append_wizard_log(&self.paths, "info", event, &describe(&value));
                Ok(value)
            }
            Err(err) => {
                let message = err.to_string();
                append_wizard_log(&self.paths, "error", event, &message);
                Err(message)
            }
        }
    }
}

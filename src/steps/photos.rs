use super::photo_upload::SelectedFile;
use super::StepEffect;
use crate::ebo::{PhotoInput, SaveEboInput, SavedEboInfo};
use crate::form::FormValidationError;
use crate::shared::hashing::snapshot_hash;
use serde::{Deserialize, Serialize};

pub const UPLOADS_IN_PROGRESS: &str = "Please wait until every photo has finished uploading";

pub fn max_file_count_message(max_files: usize) -> String {
    format!("Maximum allowed file count ({max_files}) is exceeded")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Selected,
    Downscaling,
    PolicyRequested,
    Uploading,
    Uploaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPhoto {
    pub local_id: u32,
    pub state: UploadState,
    pub display_name: String,
    /// Held until the upload finishes.
    pub file: Option<SelectedFile>,
    pub photo: Option<PhotoInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhotosAction {
    FilesSelected { files: Vec<SelectedFile> },
    UploadProgressed { local_id: u32, state: UploadState },
    UploadSucceeded { local_id: u32, photo: PhotoInput },
    UploadFailed { local_id: u32, message: String },
    RemovePhoto { local_id: u32 },
    RenamePhoto { local_id: u32, display_name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotosSection {
    pub photos: Vec<TrackedPhoto>,
    pub selection_error: Option<String>,
    next_local_id: u32,
}

impl PhotosSection {
    pub fn init(saved: Option<&SavedEboInfo>) -> Self {
        let mut section = Self::default();
        for photo in saved
            .and_then(|ebo| ebo.contents.photos.as_ref())
            .into_iter()
            .flatten()
        {
            let local_id = section.allocate_id();
            section.photos.push(TrackedPhoto {
                local_id,
                state: UploadState::Uploaded,
                display_name: photo.display_name.clone(),
                file: None,
                photo: Some(photo.clone()),
            });
        }
        section
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_local_id += 1;
        self.next_local_id
    }

    pub fn photo(&self, local_id: u32) -> Option<&TrackedPhoto> {
        self.photos.iter().find(|photo| photo.local_id == local_id)
    }

    fn photo_mut(&mut self, local_id: u32) -> Option<&mut TrackedPhoto> {
        self.photos
            .iter_mut()
            .find(|photo| photo.local_id == local_id)
    }

    pub fn pending_file(&self, local_id: u32) -> Option<&SelectedFile> {
        self.photo(local_id).and_then(|photo| photo.file.as_ref())
    }

    pub fn update(&mut self, action: PhotosAction, max_files: usize) -> Vec<StepEffect> {
        match action {
            PhotosAction::FilesSelected { files } => return self.select(files, max_files),
            PhotosAction::UploadProgressed { local_id, state } => {
                if let Some(photo) = self.photo_mut(local_id) {
                    photo.state = state;
                }
            }
            PhotosAction::UploadSucceeded { local_id, photo } => {
                if let Some(tracked) = self.photo_mut(local_id) {
                    tracked.state = UploadState::Uploaded;
                    tracked.file = None;
                    tracked.photo = Some(PhotoInput {
                        display_name: tracked.display_name.clone(),
                        ..photo
                    });
                }
            }
            PhotosAction::UploadFailed { local_id, message } => {
                self.photos.retain(|photo| photo.local_id != local_id);
                return vec![StepEffect::Alert(message)];
            }
            PhotosAction::RemovePhoto { local_id } => {
                self.photos.retain(|photo| photo.local_id != local_id);
            }
            PhotosAction::RenamePhoto {
                local_id,
                display_name,
            } => {
                if let Some(tracked) = self.photo_mut(local_id) {
                    let display_name = display_name.trim().to_string();
                    if !display_name.is_empty() {
                        if let Some(photo) = tracked.photo.as_mut() {
                            photo.display_name = display_name.clone();
                        }
                        tracked.display_name = display_name;
                    }
                }
            }
        }
        Vec::new()
    }

    fn select(&mut self, files: Vec<SelectedFile>, max_files: usize) -> Vec<StepEffect> {
        if self.photos.len() + files.len() > max_files {
            self.selection_error = Some(max_file_count_message(max_files));
            return Vec::new();
        }
        self.selection_error = None;
        let mut queued = Vec::new();
        for file in files {
            if let Some(message) = file.constraint_error() {
                if self.selection_error.is_none() {
                    self.selection_error = Some(message);
                }
                continue;
            }
            let local_id = self.allocate_id();
            self.photos.push(TrackedPhoto {
                local_id,
                state: UploadState::Selected,
                display_name: file.name.clone(),
                file: Some(file),
                photo: None,
            });
            queued.push(local_id);
        }
        if queued.is_empty() {
            Vec::new()
        } else {
            vec![StepEffect::UploadPhotos(queued)]
        }
    }

    pub fn uploads_in_progress(&self) -> bool {
        self.photos
            .iter()
            .any(|photo| photo.state != UploadState::Uploaded)
    }

    pub fn uploaded_photos(&self) -> Vec<PhotoInput> {
        self.photos
            .iter()
            .filter_map(|photo| photo.photo.clone())
            .collect()
    }

    pub fn to_save_ebo_input(&self) -> Result<SaveEboInput, FormValidationError> {
        if self.uploads_in_progress() {
            return Err(FormValidationError::new(UPLOADS_IN_PROGRESS));
        }
        Ok(SaveEboInput {
            photos: Some(self.uploaded_photos()),
            ..SaveEboInput::default()
        })
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(&self.uploaded_photos())
    }
}

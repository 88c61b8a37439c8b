//! Pieces of the photo upload pipeline that do not touch the network:
//! target dimensions, the downscaler seam and the multipart form built from
//! an upload policy.

use crate::shared::ids::PhotoId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Size after scaling the long edge down to `max_edge`, keeping the aspect
/// ratio. Images already within the limit are returned unchanged.
pub fn downscale_dimensions(original: ImageDimensions, max_edge: u32) -> ImageDimensions {
    let long_edge = original.width.max(original.height);
    if long_edge <= max_edge || long_edge == 0 {
        return original;
    }
    let scale = |edge: u32| -> u32 {
        let scaled = (u64::from(edge) * u64::from(max_edge) + u64::from(long_edge) / 2)
            / u64::from(long_edge);
        u32::try_from(scaled).unwrap_or(max_edge).max(1)
    };
    if original.width >= original.height {
        ImageDimensions {
            width: max_edge,
            height: scale(original.height),
        }
    } else {
        ImageDimensions {
            width: scale(original.width),
            height: max_edge,
        }
    }
}

/// A file picked by the user, before upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    #[serde(default)]
    pub dimensions: Option<ImageDimensions>,
    #[serde(default)]
    pub bytes: Vec<u8>,
    /// Scripted selections may point at a file instead of inlining bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Per-file constraint check; `None` when the file is acceptable.
    pub fn constraint_error(&self) -> Option<String> {
        if !self.content_type.starts_with("image/") {
            return Some(format!("{} is not an image", self.name));
        }
        if self.bytes.is_empty() {
            return Some(format!("{} is empty", self.name));
        }
        if self.size() > MAX_PHOTO_BYTES {
            return Some(format!("{} is larger than 10 MB", self.name));
        }
        None
    }
}

/// Produces the bytes to upload for an image at the target size.
pub trait Downscaler {
    fn downscale(&self, file: &SelectedFile, target: ImageDimensions) -> Result<Vec<u8>, String>;
}

/// Uploads the original bytes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughDownscaler;

impl Downscaler for PassThroughDownscaler {
    fn downscale(&self, file: &SelectedFile, _target: ImageDimensions) -> Result<Vec<u8>, String> {
        Ok(file.bytes.clone())
    }
}

/// Signed upload slot for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadPolicy {
    pub id: PhotoId,
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub signed_url: Option<String>,
}

impl FileUploadPolicy {
    /// Object key the store will use, `key` field first, then the policy id.
    pub fn object_key(&self) -> String {
        self.fields
            .get("key")
            .cloned()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Public location of the uploaded object.
    pub fn object_url(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            urlencoding::encode(&self.object_key())
        )
    }
}

/// Multipart body: policy fields in policy order, then the file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadForm {
    pub fn from_policy(policy: &FileUploadPolicy, file: &SelectedFile, bytes: Vec<u8>) -> Self {
        let mut fields: Vec<(String, String)> = policy
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !policy.fields.contains_key("Content-Type") {
            fields.push(("Content-Type".to_string(), file.content_type.clone()));
        }
        Self {
            fields,
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            bytes,
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

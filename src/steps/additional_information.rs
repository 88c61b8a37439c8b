use super::StepEffect;
use crate::ebo::{SaveEboInput, SavedEboInfo};
use crate::form::{FormField, FormValidationError};
use crate::shared::hashing::snapshot_hash;
use serde::{Deserialize, Serialize};

pub const MAX_ADDITIONAL_INFORMATION_CHARS: usize = 5000;

fn decode_additional_information(raw: &String) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MAX_ADDITIONAL_INFORMATION_CHARS {
        return Err(format!(
            "Additional information must be at most {MAX_ADDITIONAL_INFORMATION_CHARS} characters"
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdditionalInformationAction {
    TextChanged { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInformation {
    pub text: FormField<String, String, String>,
}

impl Default for AdditionalInformation {
    fn default() -> Self {
        Self {
            text: FormField::new(decode_additional_information, String::new()),
        }
    }
}

impl AdditionalInformation {
    pub fn init(saved: Option<&SavedEboInfo>) -> Self {
        let raw = saved
            .and_then(|ebo| ebo.contents.additional_information.clone())
            .unwrap_or_default();
        Self {
            text: FormField::new(decode_additional_information, raw),
        }
    }

    pub fn update(&mut self, action: AdditionalInformationAction) -> Vec<StepEffect> {
        match action {
            AdditionalInformationAction::TextChanged { value } => self.text.update(value),
        }
        Vec::new()
    }

    pub fn to_save_ebo_input(&self) -> Result<SaveEboInput, FormValidationError> {
        let text = self.text.val().clone().map_err(FormValidationError::new)?;
        Ok(SaveEboInput {
            additional_information: Some(text),
            ..SaveEboInput::default()
        })
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(self)
    }
}

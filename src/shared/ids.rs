use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

const GENERATED_ID_BYTES: usize = 16;

pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits, '-' or '_'"
    ))
}

/// Random 128-bit value rendered as a dashed lowercase hex string.
pub fn generate_random_identifier() -> Result<String, String> {
    let mut bytes = [0_u8; GENERATED_ID_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|err| format!("failed to generate identifier randomness: {err}"))?;
    let hex = crate::shared::hashing::to_hex(&bytes);
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value($kind, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(|err| {
                    D::Error::custom(format!("invalid {} `{}`: {}", $kind, raw, err))
                })
            }
        }
    };
}

macro_rules! impl_generated_id {
    ($name:ident) => {
        impl $name {
            pub fn generate() -> Result<Self, String> {
                generate_random_identifier().map(Self)
            }
        }
    };
}

define_id_type!(EboId, "ebo id");
define_id_type!(TaskId, "task id");
define_id_type!(HazardId, "hazard id");
define_id_type!(ControlId, "control id");
define_id_type!(WorkTypeId, "work type id");
define_id_type!(CrewMemberId, "crew member id");
define_id_type!(IncidentId, "incident id");
define_id_type!(PhotoId, "photo id");
define_id_type!(ConnectorId, "connector id");
define_id_type!(OpCoId, "opco id");
define_id_type!(DepartmentId, "department id");
define_id_type!(ActivityGroupId, "activity group id");

impl_generated_id!(EboId);
impl_generated_id!(ConnectorId);
impl_generated_id!(PhotoId);

use super::ConfigError;
use crate::steps::StepName;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const XCEL_ENERGY_TENANT: &str = "xcelenergy";

const STANDARD_STEPS: [StepName; 7] = [
    StepName::ObservationDetails,
    StepName::HighEnergyTasks,
    StepName::AdditionalInformation,
    StepName::HistoricIncidents,
    StepName::Photos,
    StepName::Personnel,
    StepName::Summary,
];

const DEFAULT_LIMITED_CONTROLS_USED_REASON: &str = "Limited controls used";

/// Tenant-specific wizard behavior, passed explicitly to everything that
/// varies per tenant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TenantConfig {
    pub tenant: String,
    #[serde(default)]
    pub steps: Option<Vec<StepName>>,
    #[serde(default = "default_timezone", with = "crate::shared::serde_ext::timezone")]
    pub timezone: Tz,
    #[serde(default)]
    pub no_direct_controls_reasons: Vec<String>,
    #[serde(default = "default_limited_controls_used_reason")]
    pub limited_controls_used_reason: String,
    #[serde(default = "default_max_photo_files")]
    pub max_photo_files: usize,
    #[serde(default = "default_max_hazard_copies")]
    pub max_hazard_copies: usize,
    #[serde(default = "default_photo_max_edge_px")]
    pub photo_max_edge_px: u32,
    #[serde(default = "default_alert_ttl_seconds")]
    pub alert_ttl_seconds: i64,
}

fn default_timezone() -> Tz {
    chrono_tz::UTC
}

fn default_limited_controls_used_reason() -> String {
    DEFAULT_LIMITED_CONTROLS_USED_REASON.to_string()
}

fn default_max_photo_files() -> usize {
    10
}

fn default_max_hazard_copies() -> usize {
    6
}

fn default_photo_max_edge_px() -> u32 {
    1080
}

fn default_alert_ttl_seconds() -> i64 {
    4
}

fn preset_no_direct_controls_reasons(tenant: &str) -> Vec<String> {
    let reasons: &[&str] = if tenant == XCEL_ENERGY_TENANT {
        &[
            DEFAULT_LIMITED_CONTROLS_USED_REASON,
            "Direct control not practical",
            "Unaware of direct control",
            "Other",
        ]
    } else {
        &[
            DEFAULT_LIMITED_CONTROLS_USED_REASON,
            "Direct control not available",
            "Direct control not required by procedure",
            "Other",
        ]
    };
    reasons.iter().map(|reason| (*reason).to_string()).collect()
}

impl TenantConfig {
    pub fn for_tenant(tenant: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            steps: None,
            timezone: default_timezone(),
            no_direct_controls_reasons: preset_no_direct_controls_reasons(tenant),
            limited_controls_used_reason: default_limited_controls_used_reason(),
            max_photo_files: default_max_photo_files(),
            max_hazard_copies: default_max_hazard_copies(),
            photo_max_edge_px: default_photo_max_edge_px(),
            alert_ttl_seconds: default_alert_ttl_seconds(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if config.no_direct_controls_reasons.is_empty() {
            config.no_direct_controls_reasons = preset_no_direct_controls_reasons(&config.tenant);
        }
        Ok(config)
    }

    /// Ordered wizard steps. Explicit `steps` win over the tenant preset.
    pub fn step_order(&self) -> Vec<StepName> {
        if let Some(steps) = &self.steps {
            return steps.clone();
        }
        STANDARD_STEPS
            .iter()
            .copied()
            .filter(|step| !(self.tenant == XCEL_ENERGY_TENANT && *step == StepName::Personnel))
            .collect()
    }

    pub fn has_step(&self, step: StepName) -> bool {
        self.step_order().contains(&step)
    }

    pub fn last_step(&self) -> StepName {
        self.step_order()
            .last()
            .copied()
            .unwrap_or(StepName::Summary)
    }

    pub fn is_limited_controls_used_reason(&self, reason: &str) -> bool {
        reason == self.limited_controls_used_reason
    }

    /// Calendar date in the tenant's timezone at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tenant.trim().is_empty() {
            return Err(ConfigError::Tenant("tenant must be non-empty".to_string()));
        }
        if self.max_photo_files == 0 {
            return Err(ConfigError::Tenant(
                "max_photo_files must be >= 1".to_string(),
            ));
        }
        if self.max_hazard_copies == 0 {
            return Err(ConfigError::Tenant(
                "max_hazard_copies must be >= 1".to_string(),
            ));
        }
        if self.photo_max_edge_px == 0 {
            return Err(ConfigError::Tenant(
                "photo_max_edge_px must be >= 1".to_string(),
            ));
        }
        if self.alert_ttl_seconds < 1 {
            return Err(ConfigError::Tenant(
                "alert_ttl_seconds must be >= 1".to_string(),
            ));
        }
        if !self
            .no_direct_controls_reasons
            .iter()
            .any(|reason| self.is_limited_controls_used_reason(reason))
        {
            return Err(ConfigError::Tenant(format!(
                "no_direct_controls_reasons must include `{}`",
                self.limited_controls_used_reason
            )));
        }
        if let Some(steps) = &self.steps {
            validate_step_order(steps)?;
        }
        Ok(())
    }
}

fn validate_step_order(steps: &[StepName]) -> Result<(), ConfigError> {
    if steps.len() < 2
        || steps[0] != StepName::ObservationDetails
        || steps[1] != StepName::HighEnergyTasks
    {
        return Err(ConfigError::Tenant(
            "steps must start with observationDetails, highEnergyTasks".to_string(),
        ));
    }
    let mut seen = BTreeSet::new();
    for step in steps {
        if !seen.insert(*step) {
            return Err(ConfigError::Tenant(format!("step `{step}` is listed twice")));
        }
    }
    if let Some(position) = steps.iter().position(|step| *step == StepName::Summary) {
        if position + 1 != steps.len() {
            return Err(ConfigError::Tenant(
                "summary must be the last step when present".to_string(),
            ));
        }
    }
    Ok(())
}

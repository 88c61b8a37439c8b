use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EboStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
    Reopened,
}

impl EboStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (EboStatus::NotStarted, EboStatus::InProgress)
                | (EboStatus::NotStarted, EboStatus::Complete)
                | (EboStatus::InProgress, EboStatus::InProgress)
                | (EboStatus::InProgress, EboStatus::Complete)
                | (EboStatus::Complete, EboStatus::Reopened)
                | (EboStatus::Reopened, EboStatus::InProgress)
                | (EboStatus::Reopened, EboStatus::Complete)
        )
    }

    pub fn is_locked(self) -> bool {
        self == EboStatus::Complete
    }
}

impl std::fmt::Display for EboStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EboStatus::NotStarted => write!(f, "not_started"),
            EboStatus::InProgress => write!(f, "in_progress"),
            EboStatus::Complete => write!(f, "complete"),
            EboStatus::Reopened => write!(f, "reopened"),
        }
    }
}

use crate::ebo::EboStatus;
use crate::steps::StepName;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("step `{step}` is not part of tenant `{tenant}`")]
    UnknownStep { tenant: String, step: StepName },
    #[error("the EBO has not been saved yet")]
    NotSaved,
    #[error("EBO status `{from}` cannot move to `{to}`")]
    InvalidStatusTransition { from: EboStatus, to: EboStatus },
    #[error("the EBO is complete; reopen it before saving")]
    Locked,
    #[error("failed to build high energy task sub-steps: {0}")]
    SubSteps(String),
}

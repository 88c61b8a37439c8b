//! The wizard root: step sequencing, the save protocol and the resources the
//! steps share.

pub mod actions;
pub mod alerts;
pub mod error;
mod navigation;
pub mod progress;
pub mod resources;
mod save;
pub mod state;
mod update;

pub use actions::{AsyncOp, RemovedTask, SaveKind, WizardAction, WizardEffect};
pub use alerts::{Alert, AlertQueue};
pub use error::WizardError;
pub use progress::{Badge, CompletedSteps, EboSnapshots};
pub use resources::{Deferred, WizardResources};
pub use save::{SaveBlocked, INCOMPLETE_STEPS_MESSAGE};
pub use state::{SaveTarget, Wizard, WizardInit, WizardSteps};

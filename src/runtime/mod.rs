pub mod logging;
pub mod runner;
pub mod state_paths;

pub use logging::append_wizard_log;
pub use runner::WizardRunner;
pub use state_paths::{bootstrap_state_root, StatePaths};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to create state path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Gateway(#[from] crate::gateway::GatewayError),
    #[error(transparent)]
    Wizard(#[from] crate::wizard::WizardError),
}

pub mod catalog;
pub mod types;

pub use catalog::LibraryCatalog;
pub use types::{
    is_other_name, ActivityGroup, ApplicabilityLevel, Control, CrewMember, Department, Hazard,
    Incident, LibraryTask, OpCo, RiskLevel, TaskHazardLink, WorkType,
};

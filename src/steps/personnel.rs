use super::StepEffect;
use crate::ebo::{
    CrewMemberInput, PersonnelInput, PersonnelRole, SaveEboInput, SavedEboInfo, UserRef,
};
use crate::form::FormValidationError;
use crate::library::CrewMember;
use crate::shared::hashing::snapshot_hash;
use crate::shared::ids::CrewMemberId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const NO_CREW_MEMBER_SELECTED: &str = "At least one crew member should be selected";
pub const CREW_MEMBER_WITHOUT_ROLE: &str = "Every selected crew member needs at least one role";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PersonnelAction {
    ToggleCrewMember { crew_member: CrewMember },
    ToggleRole {
        crew_member_id: CrewMemberId,
        role: PersonnelRole,
    },
    ObserverChanged { observer: Option<UserRef> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCrewMember {
    pub name: String,
    pub roles: BTreeSet<PersonnelRole>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelSection {
    pub observer: Option<UserRef>,
    pub crew_members: BTreeMap<CrewMemberId, SelectedCrewMember>,
    #[serde(skip)]
    pub errors_enabled: bool,
    /// Set by any local edit; a dirty section is not overwritten by the
    /// server copy after a save of another step.
    #[serde(skip)]
    pub touched: bool,
}

impl PersonnelSection {
    /// The observer defaults to whoever created the EBO.
    pub fn init(saved: Option<&SavedEboInfo>) -> Self {
        let Some(ebo) = saved else {
            return Self::default();
        };
        let personnel = ebo.contents.personnel.as_ref();
        Self {
            observer: personnel
                .and_then(|personnel| personnel.observer.clone())
                .or_else(|| ebo.created_by.clone()),
            crew_members: personnel
                .map(|personnel| {
                    personnel
                        .crew_members
                        .iter()
                        .map(|member| {
                            (
                                member.id.clone(),
                                SelectedCrewMember {
                                    name: member.name.clone(),
                                    roles: member.roles.iter().copied().collect(),
                                },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),
            errors_enabled: false,
            touched: false,
        }
    }

    pub fn refresh_from_server(&mut self, saved: &SavedEboInfo) {
        if self.touched {
            return;
        }
        let errors_enabled = self.errors_enabled;
        *self = Self::init(Some(saved));
        self.errors_enabled = errors_enabled;
    }

    pub fn update(&mut self, action: PersonnelAction) -> Vec<StepEffect> {
        self.touched = true;
        match action {
            PersonnelAction::ToggleCrewMember { crew_member } => {
                if self.crew_members.remove(&crew_member.id).is_none() {
                    self.crew_members.insert(
                        crew_member.id,
                        SelectedCrewMember {
                            name: crew_member.name,
                            roles: BTreeSet::from([PersonnelRole::Observed]),
                        },
                    );
                }
            }
            PersonnelAction::ToggleRole {
                crew_member_id,
                role,
            } => {
                if let Some(member) = self.crew_members.get_mut(&crew_member_id) {
                    if !member.roles.remove(&role) {
                        member.roles.insert(role);
                    }
                }
            }
            PersonnelAction::ObserverChanged { observer } => self.observer = observer,
        }
        Vec::new()
    }

    pub fn validate(&self) -> Result<(), FormValidationError> {
        if self.crew_members.is_empty() {
            return Err(FormValidationError::new(NO_CREW_MEMBER_SELECTED));
        }
        if self.crew_members.values().any(|member| member.roles.is_empty()) {
            return Err(FormValidationError::new(CREW_MEMBER_WITHOUT_ROLE));
        }
        Ok(())
    }

    pub fn to_personnel_input(&self) -> PersonnelInput {
        PersonnelInput {
            observer: self.observer.clone(),
            crew_members: self
                .crew_members
                .iter()
                .map(|(id, member)| CrewMemberInput {
                    id: id.clone(),
                    name: member.name.clone(),
                    roles: member.roles.iter().copied().collect(),
                })
                .collect(),
        }
    }

    pub fn to_save_ebo_input(&self) -> Result<SaveEboInput, FormValidationError> {
        self.validate()?;
        Ok(SaveEboInput {
            personnel: Some(self.to_personnel_input()),
            ..SaveEboInput::default()
        })
    }

    pub fn make_snapshot(&self) -> String {
        snapshot_hash(self)
    }
}

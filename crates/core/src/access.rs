//! Project access rules.
//!
//! - read: admin, creator, owner, or any phase assignee
//! - update / delete / assign: admin, creator, owner
//! - change a phase's status: admin, creator, owner, or that phase's assignee
//!
//! Assignment eligibility: the assignee must be validated and hold the
//! phase's eligible role (admins are eligible for every phase).

use crate::error::CoreError;
use crate::roles::{has_role, is_admin};
use crate::types::DbId;
use crate::workflow::{eligible_role_for_phase, Phase, PhaseAssignments};

/// The acting user, as far as access decisions are concerned.
#[derive(Debug, Clone)]
pub struct Actor<'a> {
    pub user_id: DbId,
    pub roles: &'a [String],
}

impl Actor<'_> {
    pub fn is_admin(&self) -> bool {
        is_admin(self.roles)
    }
}

/// The parts of a project access decisions depend on.
#[derive(Debug, Clone)]
pub struct ProjectAccess<'a> {
    pub created_by: DbId,
    pub owner_id: DbId,
    pub assignments: &'a PhaseAssignments,
}

impl ProjectAccess<'_> {
    fn is_owner_or_creator(&self, user_id: DbId) -> bool {
        self.owner_id == user_id || self.created_by == user_id
    }

    fn is_assignee(&self, user_id: DbId) -> bool {
        self.assignments.values().any(|id| *id == user_id)
    }

    pub fn can_read(&self, actor: &Actor<'_>) -> bool {
        actor.is_admin()
            || self.is_owner_or_creator(actor.user_id)
            || self.is_assignee(actor.user_id)
    }

    pub fn can_manage(&self, actor: &Actor<'_>) -> bool {
        actor.is_admin() || self.is_owner_or_creator(actor.user_id)
    }

    pub fn can_change_phase_status(&self, actor: &Actor<'_>, phase: Phase) -> bool {
        self.can_manage(actor) || self.assignments.get(&phase) == Some(&actor.user_id)
    }

    pub fn ensure_read(&self, actor: &Actor<'_>) -> Result<(), CoreError> {
        if self.can_read(actor) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "You do not have access to this project".into(),
            ))
        }
    }

    pub fn ensure_manage(&self, actor: &Actor<'_>) -> Result<(), CoreError> {
        if self.can_manage(actor) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Only the project owner, creator, or an admin can modify this project".into(),
            ))
        }
    }

    pub fn ensure_change_phase_status(
        &self,
        actor: &Actor<'_>,
        phase: Phase,
    ) -> Result<(), CoreError> {
        if self.can_change_phase_status(actor, phase) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "You are not allowed to change the status of the {phase} phase"
            )))
        }
    }
}

/// Whether a user with `roles` may be assigned to `phase`.
pub fn is_eligible_for_phase<S: AsRef<str>>(roles: &[S], is_validated: bool, phase: Phase) -> bool {
    is_validated && (is_admin(roles) || has_role(roles, eligible_role_for_phase(phase)))
}

pub fn ensure_eligible_for_phase<S: AsRef<str>>(
    roles: &[S],
    is_validated: bool,
    phase: Phase,
) -> Result<(), CoreError> {
    if !is_validated {
        return Err(CoreError::Validation(
            "Only validated users can be assigned to a phase".into(),
        ));
    }
    if !is_eligible_for_phase(roles, is_validated, phase) {
        return Err(CoreError::Validation(format!(
            "User does not hold the '{}' role required for the {phase} phase",
            eligible_role_for_phase(phase)
        )));
    }
    Ok(())
}

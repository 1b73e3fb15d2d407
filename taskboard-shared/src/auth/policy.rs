/// Authorization policy
///
/// Pure, side-effect-free permission checks. Every rule is a function of the
/// actor's role and id plus the owning user of the resource under action;
/// nothing here touches the database, so the full rule set is unit-testable.
///
/// # Rules
///
/// - `admin` may perform any action unconditionally.
/// - `member` may create or update tasks only within projects they own, and
///   may never perform admin-gated actions (user management, deletions).
///
/// Authentication is a precondition: unauthenticated requests are rejected
/// by the middleware before any of these checks run.

use uuid::Uuid;

use super::principal::CurrentUser;

/// Project-scoped task actions a member can be denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Creating a new task in a project
    Create,

    /// Updating an existing task
    Update,
}

/// Error type for denied policy checks
///
/// Each variant carries a specific, user-facing rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Member acting on a project they do not own
    #[error("You can create tasks only in your own projects")]
    NotProjectOwnerCreate,

    /// Member updating a task in a project they do not own
    #[error("You can update tasks only in your own projects")]
    NotProjectOwnerUpdate,

    /// Non-admin attempting an admin-only action
    #[error("Administrator role is required for this action")]
    AdminRequired,
}

/// Checks whether the actor may perform `action` on a task in the project
/// owned by `project_owner_id`
///
/// Admins pass unconditionally; members pass only for their own projects.
///
/// # Errors
///
/// Returns the action-specific [`PolicyError`] variant when denied.
pub fn check_project_access(
    actor: &CurrentUser,
    project_owner_id: Uuid,
    action: TaskAction,
) -> Result<(), PolicyError> {
    if actor.is_admin() || project_owner_id == actor.id {
        return Ok(());
    }

    Err(match action {
        TaskAction::Create => PolicyError::NotProjectOwnerCreate,
        TaskAction::Update => PolicyError::NotProjectOwnerUpdate,
    })
}

/// Checks that the actor holds the admin role
///
/// Gates user creation/deletion and project/task deletion.
pub fn require_admin(actor: &CurrentUser) -> Result<(), PolicyError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(PolicyError::AdminRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn principal(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_passes_all_checks() {
        let admin = principal(UserRole::Admin);
        let other_owner = Uuid::new_v4();

        assert!(check_project_access(&admin, other_owner, TaskAction::Create).is_ok());
        assert!(check_project_access(&admin, other_owner, TaskAction::Update).is_ok());
        assert!(require_admin(&admin).is_ok());
    }

    #[test]
    fn test_member_allowed_in_own_project() {
        let member = principal(UserRole::Member);

        assert!(check_project_access(&member, member.id, TaskAction::Create).is_ok());
        assert!(check_project_access(&member, member.id, TaskAction::Update).is_ok());
    }

    #[test]
    fn test_member_denied_in_foreign_project() {
        let member = principal(UserRole::Member);
        let other_owner = Uuid::new_v4();

        assert_eq!(
            check_project_access(&member, other_owner, TaskAction::Create),
            Err(PolicyError::NotProjectOwnerCreate)
        );
        assert_eq!(
            check_project_access(&member, other_owner, TaskAction::Update),
            Err(PolicyError::NotProjectOwnerUpdate)
        );
    }

    #[test]
    fn test_member_denied_admin_actions() {
        let member = principal(UserRole::Member);

        assert_eq!(require_admin(&member), Err(PolicyError::AdminRequired));
    }

    #[test]
    fn test_denials_carry_specific_reasons() {
        let member = principal(UserRole::Member);
        let other_owner = Uuid::new_v4();

        let err = check_project_access(&member, other_owner, TaskAction::Create).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can create tasks only in your own projects"
        );

        let err = check_project_access(&member, other_owner, TaskAction::Update).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can update tasks only in your own projects"
        );
    }
}

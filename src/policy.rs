//! Role and ownership decisions, kept pure so they can be tested without an
//! HTTP layer or a database. Handlers resolve the actor and the resource
//! owner first, then ask [`authorize`] before touching any row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. The set is closed; the database enforces it with the
/// `user_role` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

/// The identity a request acts as: a resolved user or nobody at all.
/// Expired or invalid sessions resolve to `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: Uuid, role: Role },
}

/// Everything that goes through the policy engine. Reads stay out of this
/// enum; listing and viewing are open to everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateGig,
    EditGig,
    DeleteGig,
    CreatePost,
    EditPost,
    DeletePost,
    CreateCourse,
    EditCourse,
    DeleteCourse,
    EditProfile,
    ChangePassword,
    ViewAdminDashboard,
    ManageUsers,
    DeleteUser,
}

impl Action {
    /// Role gate for creation and admin actions. `None` means any
    /// authenticated role may proceed (ownership still applies for
    /// object-level mutations).
    fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Action::CreateGig => Some(&[Role::Student]),
            Action::CreateCourse => Some(&[Role::Teacher, Role::Admin]),
            Action::ViewAdminDashboard | Action::ManageUsers | Action::DeleteUser => {
                Some(&[Role::Admin])
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deny {
    Unauthenticated,
    Forbidden,
}

/// Decide whether `actor` may perform `action`, optionally against a
/// resource owned by `owner`. Checks run in a fixed order:
///
/// 1. every action here requires a logged-in identity;
/// 2. the action's role gate, independent of ownership;
/// 3. for owned resources, admin override or owner match.
pub fn authorize(actor: Actor, action: Action, owner: Option<Uuid>) -> Result<(), Deny> {
    let (id, role) = match actor {
        Actor::Anonymous => return Err(Deny::Unauthenticated),
        Actor::User { id, role } => (id, role),
    };

    if let Some(allowed) = action.allowed_roles() {
        if !allowed.contains(&role) {
            return Err(Deny::Forbidden);
        }
    }

    if let Some(owner) = owner {
        if role != Role::Admin && id != owner {
            return Err(Deny::Forbidden);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> Actor {
        Actor::User {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn anonymous_is_rejected_before_anything_else() {
        for action in [
            Action::CreateGig,
            Action::CreatePost,
            Action::EditPost,
            Action::ViewAdminDashboard,
        ] {
            assert_eq!(
                authorize(Actor::Anonymous, action, None),
                Err(Deny::Unauthenticated)
            );
        }
    }

    #[test]
    fn only_students_create_gigs() {
        assert_eq!(authorize(user(Role::Student), Action::CreateGig, None), Ok(()));
        assert_eq!(
            authorize(user(Role::Teacher), Action::CreateGig, None),
            Err(Deny::Forbidden)
        );
        assert_eq!(
            authorize(user(Role::Admin), Action::CreateGig, None),
            Err(Deny::Forbidden)
        );
    }

    #[test]
    fn teachers_and_admins_create_courses() {
        assert_eq!(
            authorize(user(Role::Teacher), Action::CreateCourse, None),
            Ok(())
        );
        assert_eq!(authorize(user(Role::Admin), Action::CreateCourse, None), Ok(()));
        assert_eq!(
            authorize(user(Role::Student), Action::CreateCourse, None),
            Err(Deny::Forbidden)
        );
    }

    #[test]
    fn any_authenticated_role_creates_posts() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(authorize(user(role), Action::CreatePost, None), Ok(()));
        }
    }

    #[test]
    fn owner_may_mutate_own_resource_repeatedly() {
        let id = Uuid::new_v4();
        let owner = Actor::User {
            id,
            role: Role::Student,
        };
        for _ in 0..3 {
            assert_eq!(authorize(owner, Action::EditGig, Some(id)), Ok(()));
            assert_eq!(authorize(owner, Action::DeleteGig, Some(id)), Ok(()));
        }
    }

    #[test]
    fn non_owner_non_admin_is_always_forbidden() {
        let owner_id = Uuid::new_v4();
        for role in [Role::Student, Role::Teacher] {
            assert_eq!(
                authorize(user(role), Action::EditPost, Some(owner_id)),
                Err(Deny::Forbidden)
            );
            assert_eq!(
                authorize(user(role), Action::DeletePost, Some(owner_id)),
                Err(Deny::Forbidden)
            );
        }
    }

    #[test]
    fn admin_overrides_ownership_everywhere() {
        let admin = user(Role::Admin);
        let owner_id = Uuid::new_v4();
        for action in [
            Action::EditGig,
            Action::DeleteGig,
            Action::EditPost,
            Action::DeletePost,
            Action::EditCourse,
            Action::DeleteCourse,
        ] {
            assert_eq!(authorize(admin, action, Some(owner_id)), Ok(()));
        }
    }

    #[test]
    fn course_edit_is_owner_or_admin_not_any_teacher() {
        let owner_id = Uuid::new_v4();
        let owning_teacher = Actor::User {
            id: owner_id,
            role: Role::Teacher,
        };
        assert_eq!(
            authorize(owning_teacher, Action::EditCourse, Some(owner_id)),
            Ok(())
        );
        assert_eq!(
            authorize(user(Role::Teacher), Action::EditCourse, Some(owner_id)),
            Err(Deny::Forbidden)
        );
    }

    #[test]
    fn role_gate_applies_even_when_owner_matches() {
        // A teacher cannot gain gig creation rights through any ownership
        // combination; the gate is checked before the owner.
        let id = Uuid::new_v4();
        let teacher = Actor::User {
            id,
            role: Role::Teacher,
        };
        assert_eq!(
            authorize(teacher, Action::CreateGig, Some(id)),
            Err(Deny::Forbidden)
        );
    }

    #[test]
    fn admin_surface_is_admin_only() {
        for action in [Action::ViewAdminDashboard, Action::ManageUsers, Action::DeleteUser] {
            assert_eq!(authorize(user(Role::Admin), action, None), Ok(()));
            assert_eq!(
                authorize(user(Role::Student), action, None),
                Err(Deny::Forbidden)
            );
            assert_eq!(
                authorize(user(Role::Teacher), action, None),
                Err(Deny::Forbidden)
            );
        }
    }

    #[test]
    fn profile_actions_need_only_authentication() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(authorize(user(role), Action::EditProfile, None), Ok(()));
            assert_eq!(authorize(user(role), Action::ChangePassword, None), Ok(()));
        }
    }

    #[test]
    fn role_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"teacher\"").unwrap(),
            Role::Teacher
        );
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}

/// The authenticated principal
///
/// After the JWT middleware validates a bearer token, the caller's identity
/// is carried through every handler and service call as a single value
/// object rather than being re-derived per layer.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::Claims;
/// use taskboard_shared::auth::principal::CurrentUser;
/// use taskboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let claims = Claims::new(Uuid::new_v4(), "jane@example.com".to_string(), UserRole::Admin);
/// let principal = CurrentUser::from_claims(&claims);
/// assert!(principal.is_admin());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::UserRole;

/// Identity of the caller, extracted from a validated token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub id: Uuid,

    /// Email at token issue time
    pub email: String,

    /// Role at token issue time
    pub role: UserRole,
}

impl CurrentUser {
    /// Builds the principal from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
        }
    }

    /// Whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "user@example.com".to_string(),
            UserRole::Member,
        );

        let principal = CurrentUser::from_claims(&claims);

        assert_eq!(principal.id, claims.sub);
        assert_eq!(principal.email, "user@example.com");
        assert_eq!(principal.role, UserRole::Member);
        assert!(!principal.is_admin());
    }

    #[test]
    fn test_is_admin() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "admin@example.com".to_string(),
            UserRole::Admin,
        );

        assert!(CurrentUser::from_claims(&claims).is_admin());
    }
}

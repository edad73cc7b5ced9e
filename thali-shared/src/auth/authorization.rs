/// Role checks for gated routes
///
/// The token gate only proves who the caller is. Routes that are limited to
/// particular roles check the [`AuthContext`] it attached against an allow
/// list.
///
/// # Example
///
/// ```
/// use thali_shared::auth::authorization::require_role;
/// use thali_shared::auth::middleware::AuthContext;
/// use thali_shared::models::role::Role;
/// use uuid::Uuid;
///
/// let ctx = AuthContext { principal_id: Uuid::new_v4(), email: None, role: Role::Owner };
/// assert!(require_role(&ctx, &[Role::Owner]).is_ok());
/// assert!(require_role(&ctx, &[Role::Delivery]).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::role::Role;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No [`AuthContext`] was attached (the gate did not run)
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Caller's role is not in the allow list
    #[error("Role {actual} is not allowed here")]
    InsufficientRole { actual: Role },
}

/// Succeeds when the caller's role is one of `allowed`
pub fn require_role(ctx: &AuthContext, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&ctx.role) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole { actual: ctx.role })
    }
}

/// Like [`require_role`], for an optional context read from extensions
pub fn require_role_opt(ctx: Option<&AuthContext>, allowed: &[Role]) -> Result<(), AuthzError> {
    require_role(ctx.ok_or(AuthzError::NotAuthenticated)?, allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            principal_id: Uuid::new_v4(),
            email: None,
            role,
        }
    }

    #[test]
    fn test_allowed_role() {
        assert!(require_role(&ctx(Role::Owner), &[Role::Owner]).is_ok());
        assert!(require_role(&ctx(Role::User), &[Role::User, Role::Owner]).is_ok());
    }

    #[test]
    fn test_disallowed_role() {
        assert_eq!(
            require_role(&ctx(Role::Delivery), &[Role::Owner]),
            Err(AuthzError::InsufficientRole { actual: Role::Delivery })
        );
    }

    #[test]
    fn test_missing_context() {
        assert_eq!(
            require_role_opt(None, &[Role::Owner]),
            Err(AuthzError::NotAuthenticated)
        );
    }
}

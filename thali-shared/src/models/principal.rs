/// Common view over the three authenticable record kinds
///
/// Users, delivery agents and owners live in separate tables with separate
/// email uniqueness scopes. The credential store only needs to look one up by
/// email and read back its hash and role, which this trait captures.

use async_trait::async_trait;
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use super::role::Role;

/// Which table a principal lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    DeliveryAgent,
    Owner,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::DeliveryAgent => "delivery_agent",
            PrincipalKind::Owner => "owner",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored identity that can be authenticated with email + password
#[async_trait]
pub trait Principal: Sized + Send + Sync {
    /// Table this principal is stored in
    const KIND: PrincipalKind;

    /// Looks the principal up by its (per-kind unique) email
    async fn lookup_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error>;

    fn id(&self) -> Uuid;

    fn email(&self) -> &str;

    /// Argon2id PHC string
    fn password_hash(&self) -> &str;

    fn role(&self) -> Role;
}

/// Credential store
///
/// Registration and authentication for the three principal kinds. Each kind
/// lives in its own table with its own email uniqueness scope; this module
/// turns "email + password" into a stored record or a typed failure.
///
/// # Uniqueness
///
/// Registration checks for an existing email before hashing, but the check
/// alone cannot stop two concurrent registrations of the same address. The
/// `*_email_key` unique constraints are the source of truth, and a violation
/// of one is reported as [`CredentialError::Conflict`] just like the
/// up-front check.
///
/// # Example
///
/// ```no_run
/// use thali_shared::auth::credentials::{CredentialStore, RegisterUser};
/// use thali_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = CredentialStore::new(pool);
///
/// store.register_user(RegisterUser {
///     username: "a".to_string(),
///     email: "a@x.com".to_string(),
///     password: "p1".to_string(),
///     role: None,
/// }).await?;
///
/// let user: User = store.authenticate("a@x.com", "p1", None).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::password::{hash_password, verify_password, PasswordError};
use crate::models::{
    delivery_agent::{CreateDeliveryAgent, DeliveryAgent},
    owner::{CreateOwner, Owner, DEFAULT_OWNER_USERNAME},
    principal::{Principal, PrincipalKind},
    role::Role,
    user::{CreateUser, User},
};

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A record with this email already exists for the principal kind
    #[error("A {0} with this email already exists")]
    Conflict(PrincipalKind),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password was right but the stored role differs from the expected one
    #[error("Role mismatch: expected {expected}, found {actual}")]
    RoleMismatch { expected: Role, actual: Role },

    /// Hashing or hash parsing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to [`Role::User`]
    pub role: Option<Role>,
}

/// Input for delivery agent registration
#[derive(Debug, Clone)]
pub struct RegisterDeliveryAgent {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Maps a unique violation on `kind`'s table to `Conflict`
fn map_insert_error(err: sqlx::Error, kind: PrincipalKind) -> CredentialError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return CredentialError::Conflict(kind);
        }
    }
    CredentialError::Database(err)
}

/// Registration and authentication over the principal tables
#[derive(Debug, Clone)]
pub struct CredentialStore {
    pool: PgPool,
}

impl CredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_email_free<P: Principal>(&self, email: &str) -> Result<(), CredentialError> {
        if P::lookup_by_email(&self.pool, email).await?.is_some() {
            debug!(kind = %P::KIND, "Registration rejected: email already taken");
            return Err(CredentialError::Conflict(P::KIND));
        }
        Ok(())
    }

    /// Registers a user
    ///
    /// # Errors
    ///
    /// - `Conflict` if the email is already registered as a user
    pub async fn register_user(&self, input: RegisterUser) -> Result<User, CredentialError> {
        self.ensure_email_free::<User>(&input.email).await?;

        let password_hash = hash_password(&input.password)?;
        let user = User::create(
            &self.pool,
            CreateUser {
                username: input.username,
                email: input.email,
                password_hash,
                role: input.role.unwrap_or_default(),
            },
        )
        .await
        .map_err(|e| map_insert_error(e, PrincipalKind::User))?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Registers a delivery agent
    ///
    /// # Errors
    ///
    /// - `Conflict` if the email is already registered as a delivery agent
    pub async fn register_delivery_agent(
        &self,
        input: RegisterDeliveryAgent,
    ) -> Result<DeliveryAgent, CredentialError> {
        self.ensure_email_free::<DeliveryAgent>(&input.email).await?;

        let password_hash = hash_password(&input.password)?;
        let agent = DeliveryAgent::create(
            &self.pool,
            CreateDeliveryAgent {
                name: input.name,
                email: input.email,
                password_hash,
                phone: input.phone,
            },
        )
        .await
        .map_err(|e| map_insert_error(e, PrincipalKind::DeliveryAgent))?;

        info!(delivery_agent_id = %agent.id, "Delivery agent registered");
        Ok(agent)
    }

    /// Authenticates a principal of kind `P`
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    /// The role is only compared after the password has been verified.
    pub async fn authenticate<P: Principal>(
        &self,
        email: &str,
        password: &str,
        expected_role: Option<Role>,
    ) -> Result<P, CredentialError> {
        let principal = P::lookup_by_email(&self.pool, email)
            .await?
            .ok_or(CredentialError::InvalidCredentials)?;

        if !verify_password(password, principal.password_hash())? {
            debug!(kind = %P::KIND, principal_id = %principal.id(), "Password mismatch");
            return Err(CredentialError::InvalidCredentials);
        }

        check_role(principal.role(), expected_role)?;

        debug!(
            kind = %P::KIND,
            principal_id = %principal.id(),
            email = %principal.email(),
            "Principal authenticated"
        );
        Ok(principal)
    }

    /// Returns the owner for `email`, creating it on first use
    ///
    /// Only the bootstrap-credential branch of owner login calls this. The
    /// password is hashed only when no owner row exists yet.
    pub async fn ensure_owner(&self, email: &str, password: &str) -> Result<Owner, CredentialError> {
        if let Some(owner) = Owner::find_by_email(&self.pool, email).await? {
            return Ok(owner);
        }

        let owner = Owner::ensure_exists(
            &self.pool,
            CreateOwner {
                username: DEFAULT_OWNER_USERNAME.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
            },
        )
        .await?;

        warn!(owner_id = %owner.id, "Owner account bootstrapped from configured credentials");
        Ok(owner)
    }
}

/// Rejects `actual` when an expected role is given and differs
pub fn check_role(actual: Role, expected: Option<Role>) -> Result<(), CredentialError> {
    match expected {
        Some(expected) if expected != actual => Err(CredentialError::RoleMismatch { expected, actual }),
        _ => Ok(()),
    }
}

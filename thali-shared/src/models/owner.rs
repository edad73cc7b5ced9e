/// Owner model
///
/// There is no owner registration endpoint. The single owner row is created
/// lazily by [`Owner::ensure_exists`] the first time the bootstrap
/// credentials are used, then reused.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE owners (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL,
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT owners_email_key UNIQUE (email)
/// );
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::principal::{Principal, PrincipalKind};
use super::role::Role;

/// Display name given to a lazily created owner
pub const DEFAULT_OWNER_USERNAME: &str = "Owner";

/// Owner account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Uuid,

    pub username: String,

    pub email: String,

    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Input for the ensure-exists insert
#[derive(Debug, Clone)]
pub struct CreateOwner {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl Owner {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM owners
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(owner)
    }

    /// Returns the owner with `data.email`, inserting it if absent
    ///
    /// Idempotent: when the row already exists (including when a concurrent
    /// call inserted it first) the stored row is returned unchanged and
    /// `data.password_hash` is discarded.
    pub async fn ensure_exists(pool: &PgPool, data: CreateOwner) -> Result<Self, sqlx::Error> {
        let inserted = sqlx::query_as::<_, Owner>(
            r#"
            INSERT INTO owners (username, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(owner) => Ok(owner),
            None => Owner::find_by_email(pool, &data.email)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub async fn count_by_email(pool: &PgPool, email: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM owners WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl Principal for Owner {
    const KIND: PrincipalKind = PrincipalKind::Owner;

    async fn lookup_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        Owner::find_by_email(pool, email).await
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn role(&self) -> Role {
        Role::Owner
    }
}

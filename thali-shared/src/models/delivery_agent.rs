/// Delivery agent model
///
/// Delivery agents register through their own endpoint and are stored apart
/// from users, so the same email may exist once as a user and once as an
/// agent. Their role is always [`Role::Delivery`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE delivery_agents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     phone TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT delivery_agents_email_key UNIQUE (email)
/// );
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::principal::{Principal, PrincipalKind};
use super::role::Role;

/// Delivery agent account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAgent {
    pub id: Uuid,

    pub name: String,

    pub email: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub phone: String,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a delivery agent
#[derive(Debug, Clone)]
pub struct CreateDeliveryAgent {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
}

impl DeliveryAgent {
    /// Inserts a new delivery agent
    pub async fn create(pool: &PgPool, data: CreateDeliveryAgent) -> Result<Self, sqlx::Error> {
        let agent = sqlx::query_as::<_, DeliveryAgent>(
            r#"
            INSERT INTO delivery_agents (name, email, password_hash, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, phone, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(agent)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let agent = sqlx::query_as::<_, DeliveryAgent>(
            r#"
            SELECT id, name, email, password_hash, phone, created_at
            FROM delivery_agents
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(agent)
    }

    pub async fn count_by_email(pool: &PgPool, email: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM delivery_agents WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl Principal for DeliveryAgent {
    const KIND: PrincipalKind = PrincipalKind::DeliveryAgent;

    async fn lookup_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        DeliveryAgent::find_by_email(pool, email).await
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
        Role::Delivery
    }
}

/// Product catalog model
///
/// Products are standalone rows with no relationships. Names are not unique
/// in general; only sample seeding treats the name as an identity.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     description TEXT,
///     price DOUBLE PRECISION NOT NULL,
///     category TEXT,
///     image TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    /// Image URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image: Option<String>,
}

const SAMPLE_IMAGE: &str = "https://via.placeholder.com/150";

/// Transaction-scoped advisory lock key held while seeding samples
pub const SEED_LOCK_KEY: i64 = 0x7448_414c_4953_4545;

/// The fixed sample menu seeded by `/add-sample-products`
pub fn sample_products() -> Vec<CreateProduct> {
    [
        ("North Indian Thali", "Full meal", 250.0),
        ("South Indian Thali", "Rice + Sambar", 220.0),
        ("Punjabi Thali", "Makki di Roti + Saag", 280.0),
    ]
    .into_iter()
    .map(|(name, description, price)| CreateProduct {
        name: name.to_string(),
        description: Some(description.to_string()),
        price,
        category: Some("thali".to_string()),
        image: Some(SAMPLE_IMAGE.to_string()),
    })
    .collect()
}

impl Product {
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, category, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, category, image, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.category)
        .bind(data.image)
        .fetch_one(pool)
        .await?;

        Ok(product)
    }

    /// Lists the whole catalog, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category, image, created_at
            FROM products
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(products)
    }

    /// Inserts `data` unless a product with the same name already exists
    ///
    /// Returns the new row, or `None` when the name was taken.
    /// The name check is not atomic across concurrent callers on its own;
    /// [`Product::seed_samples`] serializes calls with an advisory lock.
    pub async fn create_if_name_absent<'e, E>(
        executor: E,
        data: CreateProduct,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, category, image)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
            RETURNING id, name, description, price, category, image, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.category)
        .bind(data.image)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    /// Seeds the sample menu, skipping names already present
    ///
    /// Returns only the rows inserted by this call; a second call returns an
    /// empty list.
    ///
    /// Runs in one transaction holding [`SEED_LOCK_KEY`], so concurrent
    /// calls queue up and at most one row per sample name is ever inserted.
    pub async fn seed_samples(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::new();

        for sample in sample_products() {
            let name = sample.name.clone();
            match Product::create_if_name_absent(&mut *tx, sample).await? {
                Some(product) => inserted.push(product),
                None => debug!(name = %name, "Sample product already present"),
            }
        }

        tx.commit().await?;

        info!(inserted = inserted.len(), "Sample products seeded");
        Ok(inserted)
    }

    pub async fn count_by_name(pool: &PgPool, name: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE name = $1")
            .bind(name)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

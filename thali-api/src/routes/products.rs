/// Product catalog endpoints
///
/// # Endpoints
///
/// - `GET /products` - List every product, oldest first
/// - `POST /products` - Add a product
/// - `POST /add-sample-products` - Seed the sample menu (idempotent by name)
///
/// The two write endpoints are open unless `PROTECT_CATALOG_WRITES` is set,
/// in which case the router puts them behind the token gate and an owner
/// role check.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use thali_shared::models::product::{CreateProduct, Product};
use tracing::info;
use validator::Validate;

/// Create product request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,

    pub price: Option<f64>,

    pub category: Option<String>,

    /// Image URL
    pub image: Option<String>,
}

impl CreateProductRequest {
    fn into_create(self) -> ApiResult<CreateProduct> {
        self.validate()?;

        let price = self.price.ok_or_else(|| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "price".to_string(),
                message: "Price is required".to_string(),
            }])
        })?;

        Ok(CreateProduct {
            name: self.name,
            description: self.description,
            price,
            category: self.category,
            image: self.image,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProductResponse {
    pub message: String,

    pub product: Product,
}

/// Seeding result; `inserted` is omitted when nothing was added
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inserted: Vec<Product>,
}

impl SeedResponse {
    fn from_inserted(inserted: Vec<Product>) -> Self {
        let message = if inserted.is_empty() {
            "All sample products already exist, nothing added."
        } else {
            "Sample products added successfully"
        };

        Self {
            message: message.to_string(),
            inserted,
        }
    }
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = Product::list(&state.db).await?;
    Ok(Json(products))
}

/// `201 Created` with `{ "message": "Product added successfully", "product": {..} }`
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Missing name or price
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<CreateProductResponse>)> {
    let product = Product::create(&state.db, req.into_create()?).await?;

    info!(product_id = %product.id, name = %product.name, "Product added");

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product added successfully".to_string(),
            product,
        }),
    ))
}

/// Inserts each sample product whose name is not in the catalog yet
pub async fn add_sample_products(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    let inserted = Product::seed_samples(&state.db).await?;
    Ok(Json(SeedResponse::from_inserted(inserted)))
}

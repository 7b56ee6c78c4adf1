use axum::{
    extract::{Path, State},
    response::Json,
};
use model::entities::product;
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// Product response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    /// Remaining stock; absent means unlimited
    pub stock: Option<i32>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            image_url: model.image_url,
            stock: model.stock,
        }
    }
}

/// List the public catalog. No pagination, no filtering; the catalog is
/// public by design scope.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    responses(
        (status = 200, description = "Products retrieved successfully", body = Vec<ProductResponse>)
    )
)]
#[instrument]
pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = product::Entity::find().all(&state.db).await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// Get a single product by ID
#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_model = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    Ok(Json(ProductResponse::from(product_model)))
}

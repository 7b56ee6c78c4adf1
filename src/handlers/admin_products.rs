use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::product;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::handlers::products::ProductResponse;
use crate::schemas::{AppState, ErrorResponse};

const MAX_NAME_CHARS: usize = 255;
const MAX_DESCRIPTION_CHARS: usize = 2000;
const MAX_STOCK: i32 = 10_000;
const DEFAULT_NAME: &str = "Untitled product";

fn max_price() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

/// Product fields as submitted by an admin. Every field is optional;
/// normalization fills in the gaps.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock: Option<i32>,
}

/// Normalized product fields, ready to persist.
#[derive(Debug)]
struct NormalizedDraft {
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    stock: i32,
}

/// Clamp a draft to the allowed bounds. Runs identically on create and
/// update so the catalog invariants hold no matter what callers submit.
fn apply_limits(draft: ProductDraft) -> NormalizedDraft {
    let name = draft
        .name
        .map(|name| name.trim().chars().take(MAX_NAME_CHARS).collect::<String>())
        .unwrap_or_default();
    let name = if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    };

    let description = draft.description.map(|description| {
        description
            .trim()
            .chars()
            .take(MAX_DESCRIPTION_CHARS)
            .collect::<String>()
    });

    let mut price = draft.price.unwrap_or(Decimal::ZERO);
    if price < Decimal::ZERO {
        price = Decimal::ZERO;
    }
    if price > max_price() {
        price = max_price();
    }

    let stock = draft.stock.unwrap_or(0).clamp(0, MAX_STOCK);

    NormalizedDraft {
        name,
        description,
        price,
        image_url: draft.image_url,
        stock,
    }
}

/// List all products (admin view, same rows as the public catalog)
#[utoipa::path(
    get,
    path = "/api/admin/products",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Products retrieved successfully", body = Vec<ProductResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(_admin))]
pub async fn list_products(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = product::Entity::find().all(&state.db).await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "admin",
    security(("bearer" = [])),
    request_body = ProductDraft,
    responses(
        (status = 200, description = "Product created successfully", body = ProductResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(_admin))]
pub async fn create_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<ProductResponse>, ApiError> {
    let normalized = apply_limits(draft);

    let product_model = product::ActiveModel {
        name: Set(normalized.name),
        description: Set(normalized.description),
        price: Set(normalized.price),
        image_url: Set(normalized.image_url),
        stock: Set(Some(normalized.stock)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "Product created with ID: {}, name: {}",
        product_model.id, product_model.name
    );
    Ok(Json(ProductResponse::from(product_model)))
}

/// Update an existing product. All fields are overwritten from the
/// draft, then re-clamped.
#[utoipa::path(
    put,
    path = "/api/admin/products/{product_id}",
    tag = "admin",
    security(("bearer" = [])),
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    request_body = ProductDraft,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(_admin))]
pub async fn update_product(
    _admin: AdminUser,
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<ProductResponse>, ApiError> {
    let existing = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    let normalized = apply_limits(draft);

    let mut active: product::ActiveModel = existing.into();
    active.name = Set(normalized.name);
    active.description = Set(normalized.description);
    active.price = Set(normalized.price);
    active.image_url = Set(normalized.image_url);
    active.stock = Set(Some(normalized.stock));

    let updated = active.update(&state.db).await?;

    info!("Product {} updated", updated.id);
    Ok(Json(ProductResponse::from(updated)))
}

/// Delete a product. Unconditional: no referential check against cart
/// or order rows.
#[utoipa::path(
    delete,
    path = "/api/admin/products/{product_id}",
    tag = "admin",
    security(("bearer" = [])),
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product deleted successfully"),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(_admin))]
pub async fn delete_product(
    _admin: AdminUser,
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let result = product::Entity::delete_by_id(product_id)
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        warn!("Product {} not found for deletion", product_id);
        return Err(ApiError::NotFound(format!(
            "Product {product_id} not found"
        )));
    }

    info!("Product {} deleted", product_id);
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: Option<&str>, price: Option<Decimal>, stock: Option<i32>) -> ProductDraft {
        ProductDraft {
            name: name.map(str::to_string),
            description: None,
            price,
            image_url: None,
            stock,
        }
    }

    #[test]
    fn blank_name_gets_placeholder() {
        let normalized = apply_limits(draft(Some("   "), None, None));
        assert_eq!(normalized.name, DEFAULT_NAME);

        let normalized = apply_limits(draft(None, None, None));
        assert_eq!(normalized.name, DEFAULT_NAME);
    }

    #[test]
    fn long_name_truncated_after_trim() {
        let long = "x".repeat(400);
        let normalized = apply_limits(draft(Some(&long), None, None));
        assert_eq!(normalized.name.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn long_description_truncated() {
        let normalized = apply_limits(ProductDraft {
            name: Some("ok".to_string()),
            description: Some("d".repeat(5000)),
            price: None,
            image_url: None,
            stock: None,
        });
        assert_eq!(
            normalized.description.unwrap().chars().count(),
            MAX_DESCRIPTION_CHARS
        );
    }

    #[test]
    fn price_clamped_to_bounds() {
        let normalized = apply_limits(draft(Some("ok"), Some(Decimal::new(-100, 2)), None));
        assert_eq!(normalized.price, Decimal::ZERO);

        let normalized = apply_limits(draft(Some("ok"), Some(Decimal::new(20_000_000_000, 0)), None));
        assert_eq!(normalized.price, max_price());

        let normalized = apply_limits(draft(Some("ok"), None, None));
        assert_eq!(normalized.price, Decimal::ZERO);
    }

    #[test]
    fn stock_clamped_to_bounds() {
        assert_eq!(apply_limits(draft(Some("ok"), None, Some(-3))).stock, 0);
        assert_eq!(apply_limits(draft(Some("ok"), None, Some(50_000))).stock, MAX_STOCK);
        assert_eq!(apply_limits(draft(Some("ok"), None, None)).stock, 0);
        assert_eq!(apply_limits(draft(Some("ok"), None, Some(42))).stock, 42);
    }
}

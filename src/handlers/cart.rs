use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{cart_item, product};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::products::ProductResponse;
use crate::schemas::{AppState, ErrorResponse};

/// Optional quantity query parameter shared by the cart mutations
#[derive(Debug, Deserialize, ToSchema)]
pub struct CartQuantityQuery {
    pub quantity: Option<i32>,
}

/// Cart row with its embedded product
#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    pub product: ProductResponse,
    pub quantity: i32,
}

/// Get the current user's cart
#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "cart",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Cart retrieved successfully", body = Vec<CartItemResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current))]
pub async fn get_cart(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItemResponse>>, ApiError> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(current.user.id))
        .find_also_related(product::Entity)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(item, product_model)| {
            product_model.map(|p| CartItemResponse {
                id: item.id,
                product: ProductResponse::from(p),
                quantity: item.quantity,
            })
        })
        .collect();

    Ok(Json(items))
}

/// Add a product to the cart. Quantity defaults to 1; the stored
/// quantity never exceeds the product's current stock ceiling.
#[utoipa::path(
    post,
    path = "/api/cart/add/{product_id}",
    tag = "cart",
    security(("bearer" = [])),
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("quantity" = Option<i32>, Query, description = "Quantity to add, defaults to 1"),
    ),
    responses(
        (status = 200, description = "Product added to cart"),
        (status = 400, description = "Product out of stock", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current))]
pub async fn add_to_cart(
    current: CurrentUser,
    Path(product_id): Path<i32>,
    Query(query): Query<CartQuantityQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let product_model = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    // Non-positive or absent input coerces to 1.
    let requested = match query.quantity {
        Some(quantity) if quantity > 0 => quantity,
        _ => 1,
    };

    let ceiling = product_model.stock_ceiling();
    if matches!(ceiling, Some(limit) if limit <= 0) {
        return Err(ApiError::BadRequest(format!(
            "Product \"{}\" is out of stock",
            product_model.name
        )));
    }

    let existing = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(current.user.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&state.db)
        .await?;

    let current_quantity = existing.as_ref().map(|item| item.quantity).unwrap_or(0);
    let mut new_quantity = current_quantity.saturating_add(requested);
    if let Some(limit) = ceiling {
        if new_quantity > limit {
            new_quantity = limit;
        }
    }

    match existing {
        Some(item) => {
            let mut active: cart_item::ActiveModel = item.into();
            active.quantity = Set(new_quantity);
            active.update(&state.db).await?;
        }
        None => {
            cart_item::ActiveModel {
                user_id: Set(current.user.id),
                product_id: Set(product_id),
                quantity: Set(new_quantity),
                ..Default::default()
            }
            .insert(&state.db)
            .await?;
        }
    }

    debug!(
        "Cart updated for user {}: product {} quantity {}",
        current.user.id, product_id, new_quantity
    );
    Ok(StatusCode::OK)
}

/// Set the quantity of an existing cart row. A non-positive quantity
/// deletes the row; a vanished stock ceiling deletes it too.
#[utoipa::path(
    post,
    path = "/api/cart/set/{product_id}",
    tag = "cart",
    security(("bearer" = [])),
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("quantity" = Option<i32>, Query, description = "New quantity; non-positive deletes the row"),
    ),
    responses(
        (status = 200, description = "Cart row updated or deleted"),
        (status = 404, description = "No cart row for this product", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current))]
pub async fn set_quantity(
    current: CurrentUser,
    Path(product_id): Path<i32>,
    Query(query): Query<CartQuantityQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let item = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(current.user.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No cart row for product {product_id}")))?;

    let requested = query.quantity.unwrap_or(0);
    if requested <= 0 {
        item.delete(&state.db).await?;
        return Ok(StatusCode::OK);
    }

    let product_model = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product_id} not found")))?;

    let ceiling = product_model.stock_ceiling();
    if matches!(ceiling, Some(limit) if limit <= 0) {
        // Nothing left to sell, drop the row instead of keeping a stale one.
        item.delete(&state.db).await?;
        return Ok(StatusCode::OK);
    }

    let new_quantity = match ceiling {
        Some(limit) => requested.min(limit),
        None => requested,
    };

    let mut active: cart_item::ActiveModel = item.into();
    active.quantity = Set(new_quantity);
    active.update(&state.db).await?;

    Ok(StatusCode::OK)
}

/// Remove a product from the cart. Succeeds whether or not a row
/// existed.
#[utoipa::path(
    delete,
    path = "/api/cart/remove/{product_id}",
    tag = "cart",
    security(("bearer" = [])),
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Cart row removed if present"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current))]
pub async fn remove_from_cart(
    current: CurrentUser,
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let existing = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(current.user.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&state.db)
        .await?;

    if let Some(item) = existing {
        info!(
            "Removing cart row {} for user {}",
            item.id, current.user.id
        );
        item.delete(&state.db).await?;
    }

    Ok(StatusCode::OK)
}

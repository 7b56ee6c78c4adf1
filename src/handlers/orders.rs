use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use model::entities::{cart_item, order, order::OrderStatus, product};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// Optional checkout body selecting a subset of cart rows
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub cart_item_ids: Option<Vec<i32>>,
}

/// Order response model
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub total_price: Decimal,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at,
            status: model.status.to_value(),
            total_price: model.total_price,
        }
    }
}

/// Place an order from the current cart (or a selected subset of it).
///
/// Validation and stock decrements run inside one database transaction.
/// Each decrement is conditional (`stock >= quantity`), so two
/// concurrent checkouts against the same product cannot both drive the
/// stock below zero: the loser sees zero affected rows and the whole
/// order rolls back.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "orders",
    security(("bearer" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed successfully", body = OrderResponse),
        (status = 400, description = "Empty cart, empty selection or insufficient stock", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current, request))]
pub async fn create_order(
    current: CurrentUser,
    State(state): State<AppState>,
    request: Option<Json<CreateOrderRequest>>,
) -> Result<Json<OrderResponse>, ApiError> {
    let user_items = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(current.user.id))
        .all(&state.db)
        .await?;
    if user_items.is_empty() {
        return Err(ApiError::BadRequest("Cart is empty".to_string()));
    }

    // An explicit id list narrows the checkout to those rows only.
    let selected: Vec<cart_item::Model> =
        match request.as_ref().and_then(|r| r.cart_item_ids.as_ref()) {
            Some(ids) if !ids.is_empty() => {
                let wanted: HashSet<i32> = ids.iter().copied().collect();
                user_items
                    .into_iter()
                    .filter(|item| wanted.contains(&item.id))
                    .collect()
            }
            _ => user_items,
        };
    if selected.is_empty() {
        return Err(ApiError::BadRequest(
            "No cart items selected".to_string(),
        ));
    }

    let txn = state.db.begin().await?;

    let mut total = Decimal::ZERO;
    for item in &selected {
        if item.quantity <= 0 {
            continue;
        }

        let product_model = product::Entity::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Product {} not found", item.product_id))
            })?;

        // Null stock means an unlimited good; nothing to decrement.
        if product_model.stock.is_some() {
            let result = product::Entity::update_many()
                .col_expr(
                    product::Column::Stock,
                    Expr::col(product::Column::Stock).sub(item.quantity),
                )
                .filter(product::Column::Id.eq(product_model.id))
                .filter(product::Column::Stock.gte(item.quantity))
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                warn!(
                    "Checkout rejected for user {}: not enough stock for product {}",
                    current.user.id, product_model.id
                );
                txn.rollback().await?;
                return Err(ApiError::BadRequest(format!(
                    "Not enough stock for \"{}\"",
                    product_model.name
                )));
            }
        }

        total += product_model.price * Decimal::from(item.quantity);
    }

    let order_model = order::ActiveModel {
        user_id: Set(current.user.id),
        created_at: Set(Utc::now()),
        status: Set(OrderStatus::New),
        total_price: Set(total),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // Only the rows that were ordered leave the cart.
    let selected_ids: Vec<i32> = selected.iter().map(|item| item.id).collect();
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::Id.is_in(selected_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Order {} placed by user {} for {}",
        order_model.id, current.user.id, order_model.total_price
    );
    Ok(Json(OrderResponse::from(order_model)))
}

/// List the current user's orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "orders",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = Vec<OrderResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(current))]
pub async fn my_orders(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(current.user.id))
        .all(&state.db)
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

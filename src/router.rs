use crate::handlers::{
    admin_products::{create_product, delete_product, list_products, update_product},
    auth::{login, register},
    cart::{add_to_cart, get_cart, remove_from_cart, set_quantity},
    health::health_check,
    orders::{create_order, my_orders},
    products::{get_product, get_products},
    uploads::upload_image,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Registration and login
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Public catalog
        .route("/api/products", get(get_products))
        .route("/api/products/:product_id", get(get_product))
        // Cart routes
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add/:product_id", post(add_to_cart))
        .route("/api/cart/set/:product_id", post(set_quantity))
        .route("/api/cart/remove/:product_id", delete(remove_from_cart))
        // Checkout and order history
        .route("/api/orders", post(create_order))
        .route("/api/orders", get(my_orders))
        // Admin catalog management
        .route("/api/admin/products", get(list_products))
        .route("/api/admin/products", post(create_product))
        .route("/api/admin/products/:product_id", put(update_product))
        .route("/api/admin/products/:product_id", delete(delete_product))
        .route("/api/admin/upload-image", post(upload_image))
        // Uploaded images are served back read-only
        .nest_service("/uploads", ServeDir::new(&state.upload_root))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

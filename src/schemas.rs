use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::auth::TokenService;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Issues and verifies access tokens
    pub tokens: TokenService,
    /// Root directory for uploaded images
    pub upload_root: PathBuf,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::products::get_products,
        crate::handlers::products::get_product,
        crate::handlers::cart::get_cart,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::set_quantity,
        crate::handlers::cart::remove_from_cart,
        crate::handlers::orders::create_order,
        crate::handlers::orders::my_orders,
        crate::handlers::admin_products::list_products,
        crate::handlers::admin_products::create_product,
        crate::handlers::admin_products::update_product,
        crate::handlers::admin_products::delete_product,
        crate::handlers::uploads::upload_image,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::products::ProductResponse,
            crate::handlers::admin_products::ProductDraft,
            crate::handlers::cart::CartItemResponse,
            crate::handlers::orders::CreateOrderRequest,
            crate::handlers::orders::OrderResponse,
            crate::handlers::uploads::UploadResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "products", description = "Public product catalog"),
        (name = "cart", description = "Per-user shopping cart"),
        (name = "orders", description = "Checkout and order history"),
        (name = "admin", description = "Admin catalog and image management"),
    ),
    info(
        title = "ShopRust API",
        description = "E-commerce backend - catalog, cart, checkout and admin management",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Registers the bearer-token security scheme referenced by the
/// protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

use anyhow::Result;
use sea_orm::Database;
use std::path::PathBuf;
use tracing::info;

use crate::auth::TokenService;
use crate::schemas::AppState;

/// Runtime configuration, resolved from CLI arguments and environment
/// variables. The token-signing secret and lifetime live here and are
/// injected into the token service at construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    pub token_minutes: i64,
    /// Root directory for uploaded images.
    pub upload_dir: PathBuf,
}

/// Connect to the database and assemble shared application state.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    let tokens = TokenService::new(&config.jwt_secret, config.token_minutes);

    Ok(AppState {
        db,
        tokens,
        upload_root: config.upload_dir.clone(),
    })
}

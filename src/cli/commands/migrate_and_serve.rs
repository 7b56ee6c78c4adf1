use anyhow::Result;

use super::{init_database, serve};
use crate::config::AppConfig;

/// Convenience command for deployments: bring the schema up to date,
/// then serve.
pub async fn migrate_and_serve(config: &AppConfig) -> Result<()> {
    init_database(&config.database_url, None, None).await?;
    serve(config).await
}

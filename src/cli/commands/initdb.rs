use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use model::entities::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, warn};

use crate::auth::{hash_password, ROLE_ADMIN, ROLE_USER};

pub async fn init_database(
    database_url: &str,
    admin_username: Option<&str>,
    admin_password: Option<&str>,
) -> Result<()> {
    info!("Initializing database");

    let db: DatabaseConnection = Database::connect(database_url).await?;

    info!("Running database migrations");
    Migrator::up(&db, None).await?;
    info!("Database migrations completed successfully");

    if let (Some(username), Some(password)) = (admin_username, admin_password) {
        seed_admin(&db, username, password).await?;
    }

    info!("Database initialization completed successfully!");
    Ok(())
}

/// Create an admin account unless the username is already taken. Roles
/// are not mutable through the API, so admin provisioning happens here.
async fn seed_admin(db: &DatabaseConnection, username: &str, password: &str) -> Result<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        warn!("User '{}' already exists, skipping admin seed", username);
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        roles: Set(format!("{ROLE_USER},{ROLE_ADMIN}")),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Seeded admin user '{}'", username);
    Ok(())
}

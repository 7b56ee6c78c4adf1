#[cfg(test)]
pub mod test_utils {
    use crate::auth::{hash_password, TokenService, ROLE_ADMIN, ROLE_USER};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const ADMIN_USERNAME: &str = "admin@example.com";
    pub const ADMIN_PASSWORD: &str = "admin-password";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with a seeded admin account
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        let admin = user::ActiveModel {
            username: Set(ADMIN_USERNAME.to_string()),
            password_hash: Set(hash_password(ADMIN_PASSWORD).expect("Failed to hash password")),
            roles: Set(format!("{ROLE_USER},{ROLE_ADMIN}")),
            ..Default::default()
        };
        admin
            .insert(&db)
            .await
            .expect("Failed to create admin user");

        let tokens = TokenService::new("test-signing-secret", 60);
        let upload_root =
            std::env::temp_dir().join(format!("shoprust-test-uploads-{}", uuid::Uuid::new_v4()));

        AppState {
            db,
            tokens,
            upload_root,
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }
}

//! This file serves as the root for all SeaORM entity modules.
//! The data models for the shop backend live here: users, the product
//! catalog, per-user cart rows and frozen order snapshots.

pub mod cart_item;
pub mod order;
pub mod product;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::cart_item::Entity as CartItem;
    pub use super::order::Entity as Order;
    pub use super::product::Entity as Product;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use order::OrderStatus;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = user::ActiveModel {
            username: Set("alice@example.com".to_string()),
            password_hash: Set("$argon2id$dummy".to_string()),
            roles: Set("USER".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let widget = product::ActiveModel {
            name: Set("Widget".to_string()),
            description: Set(Some("A widget".to_string())),
            price: Set(Decimal::new(1999, 2)),
            image_url: Set(None),
            stock: Set(Some(10)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let row = cart_item::ActiveModel {
            user_id: Set(alice.id),
            product_id: Set(widget.id),
            quantity: Set(2),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // One row per (user, product): a second insert for the same pair
        // must hit the unique index.
        let duplicate = cart_item::ActiveModel {
            user_id: Set(alice.id),
            product_id: Set(widget.id),
            quantity: Set(1),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err());

        let order_row = order::ActiveModel {
            user_id: Set(alice.id),
            created_at: Set(Utc::now()),
            status: Set(OrderStatus::New),
            total_price: Set(Decimal::new(3998, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        assert_eq!(order_row.status, OrderStatus::New);

        // Cart rows resolve their product through an explicit join, not an
        // implicit object graph.
        let with_product = cart_item::Entity::find_by_id(row.id)
            .find_also_related(product::Entity)
            .one(&db)
            .await?
            .expect("cart row should exist");
        assert_eq!(with_product.1.expect("product should exist").id, widget.id);

        let alices_orders = order::Entity::find()
            .filter(order::Column::UserId.eq(alice.id))
            .all(&db)
            .await?;
        assert_eq!(alices_orders.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_role_names_parsing() {
        let admin = user::Model {
            id: 1,
            username: "admin@example.com".to_string(),
            password_hash: String::new(),
            roles: "USER,ADMIN".to_string(),
        };
        assert_eq!(admin.role_names(), vec!["USER", "ADMIN"]);
        assert!(admin.has_role("ADMIN"));
        assert!(!admin.has_role("SUPPORT"));
    }

    #[test]
    fn test_stock_ceiling() {
        let mut p = product::Model {
            id: 1,
            name: "x".to_string(),
            description: None,
            price: Decimal::ZERO,
            image_url: None,
            stock: Some(5),
        };
        assert_eq!(p.stock_ceiling(), Some(5));

        p.stock = Some(0);
        assert_eq!(p.stock_ceiling(), Some(0));

        // Null and negative both mean "unlimited".
        p.stock = None;
        assert_eq!(p.stock_ceiling(), None);
        p.stock = Some(-1);
        assert_eq!(p.stock_ceiling(), None);
    }
}

use sea_orm::entity::prelude::*;

/// A registered shop user. The username is email-shaped and doubles as
/// the login identity and the token subject.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 hash in PHC string format, never the plain password.
    pub password_hash: String,
    /// Comma-separated role names, e.g. "USER" or "USER,ADMIN".
    pub roles: String,
}

impl Model {
    pub fn role_names(&self) -> Vec<String> {
        self.roles
            .split(',')
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty())
            .collect()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role_names().iter().any(|r| r == role)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // A user owns cart rows and orders.
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItem,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

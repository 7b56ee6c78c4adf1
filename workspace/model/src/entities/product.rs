use sea_orm::entity::prelude::*;

/// A catalog product. Mutated only through the admin surface, which
/// normalizes every draft before it is persisted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub price: Decimal,
    /// Relative URL of the product image, as returned by the upload endpoint.
    pub image_url: Option<String>,
    /// Remaining stock. `None` means "unlimited".
    pub stock: Option<i32>,
}

impl Model {
    /// Effective purchasable ceiling for cart writes: `None` when stock is
    /// unbounded (null or negative), otherwise the stored stock value.
    pub fn stock_ceiling(&self) -> Option<i32> {
        match self.stock {
            Some(stock) if stock >= 0 => Some(stock),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItem,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

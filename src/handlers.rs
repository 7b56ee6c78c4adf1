pub mod admin_products;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod uploads;

pub mod shop;
pub mod user;

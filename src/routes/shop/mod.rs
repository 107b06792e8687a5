mod handler;
mod model;

pub use handler::{get_shop, get_shop_types, query_shops_by_type, update_shop};

// 缓存模块
// 包含缓存键构造、缓存数据结构与操作逻辑

pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

pub use models::session::SessionUser;
pub use store::{CacheStore, RedisCacheStore};

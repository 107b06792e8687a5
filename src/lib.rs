use config::Config;
use sqlx::PgPool;
use std::sync::Arc;

use cache::store::RedisCacheStore;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod result;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub cache: RedisCacheStore,
    pub config: Config,
}

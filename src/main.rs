use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use dianping_backend::{
    AppState,
    cache::operations::geo::GeoCacheOperations,
    cache::store::RedisCacheStore,
    config::Config,
    database::operations::shop::ShopOperation,
    middleware::{refresh_token, require_login},
    routes,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载并校验配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let cache = RedisCacheStore::new(Arc::new(redis_client));

    // 设置应用状态
    let state = AppState {
        db: Arc::new(pool),
        cache: cache.clone(),
        config: config.clone(),
    };

    // 启动时全量重建商铺地理索引
    rebuild_geo_index(&state).await;

    // 公开路由
    let public_routes = Router::new()
        .route("/users/code", post(routes::user::send_code))
        .route("/users/login", post(routes::user::login))
        .route("/shops/{id}", get(routes::shop::get_shop))
        .route("/shops/of-type", get(routes::shop::query_shops_by_type))
        .route("/shop-types", get(routes::shop::get_shop_types));

    // 需要登录的路由
    let protected_routes = Router::new()
        .route("/users/logout", post(routes::user::logout))
        .route("/users/me", get(routes::user::me))
        .route("/users/sign", post(routes::user::sign))
        .route("/users/sign/count", get(routes::user::sign_count))
        .route("/shops", put(routes::shop::update_shop))
        .layer(axum::middleware::from_fn(require_login));

    // token 刷新中间件作用于全部路由
    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            refresh_token,
        ));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}

/// 从数据库全量装载商铺位置到地理索引。
/// 索引在请求路径上只读，失败不阻止启动，只丢掉附近搜索能力
async fn rebuild_geo_index(state: &AppState) {
    let shop_op = ShopOperation::new(state.db.clone());
    match shop_op.find_all().await {
        Ok(shops) => {
            if let Err(e) = GeoCacheOperations::load_shop_index(&state.cache, &shops).await {
                tracing::error!("商铺地理索引装载失败: {}", e);
            }
        }
        Err(e) => tracing::error!("查询商铺列表失败，跳过地理索引重建: {}", e),
    }
}

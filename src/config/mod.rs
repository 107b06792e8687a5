use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::operations::entity::CachePolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("缺少环境变量 {0}")]
    MissingVar(String),
    #[error("空值缓存TTL({null_ttl}s)必须小于商铺缓存TTL({shop_ttl}s)")]
    NullTtlTooLong { null_ttl: u64, shop_ttl: u64 },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// 商铺正向缓存TTL（秒）
    pub cache_shop_ttl_secs: u64,
    /// 空值标记TTL（秒），必须严格小于正向缓存TTL
    pub cache_null_ttl_secs: u64,
    /// 商铺类型列表缓存TTL（秒）
    pub cache_shop_type_ttl_secs: u64,
    /// 互斥锁TTL（秒），兜底防止持有者崩溃后死锁
    pub lock_ttl_secs: u64,
    /// 抢锁失败后的重试间隔（毫秒）
    pub lock_retry_interval_ms: u64,
    /// 抢锁最大重试次数，超出返回繁忙
    pub lock_max_retries: u32,
    /// 短信验证码TTL（秒）
    pub login_code_ttl_secs: u64,
    /// 登录会话TTL（秒），每次访问滑动续期
    pub session_ttl_secs: u64,
    /// 分页默认每页条数
    pub default_page_size: usize,
    /// 附近商铺搜索半径上限（米）
    pub max_search_radius: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = Config {
            database_url: require_var("DATABASE_URL")?,
            redis_url: require_var("REDIS_URL")?,
            server_host: env_or("SERVER_HOST", "0.0.0.0".to_string()),
            server_port: env_or("SERVER_PORT", 8081),
            cache_shop_ttl_secs: env_or("CACHE_SHOP_TTL", 1800),
            cache_null_ttl_secs: env_or("CACHE_NULL_TTL", 120),
            cache_shop_type_ttl_secs: env_or("CACHE_SHOP_TYPE_TTL", 1800),
            lock_ttl_secs: env_or("LOCK_TTL", 10),
            lock_retry_interval_ms: env_or("LOCK_RETRY_INTERVAL_MS", 50),
            lock_max_retries: env_or("LOCK_MAX_RETRIES", 100),
            login_code_ttl_secs: env_or("LOGIN_CODE_TTL", 120),
            session_ttl_secs: env_or("SESSION_TTL", 1800),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", 5),
            max_search_radius: env_or("MAX_SEARCH_RADIUS", 5000.0),
        };
        config.validate()?;
        Ok(config)
    }

    /// 启动时校验配置约束。
    /// 空值TTL一旦配置得比正向TTL长，真实删除会被掩盖得比真实创建还久。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_null_ttl_secs >= self.cache_shop_ttl_secs {
            return Err(ConfigError::NullTtlTooLong {
                null_ttl: self.cache_null_ttl_secs,
                shop_ttl: self.cache_shop_ttl_secs,
            });
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn login_code_ttl(&self) -> Duration {
        Duration::from_secs(self.login_code_ttl_secs)
    }

    pub fn shop_type_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_shop_type_ttl_secs)
    }

    /// 商铺缓存旁路读取的TTL与抢锁参数
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            positive_ttl: Duration::from_secs(self.cache_shop_ttl_secs),
            negative_ttl: Duration::from_secs(self.cache_null_ttl_secs),
            lock_ttl: Duration::from_secs(self.lock_ttl_secs),
            lock_retry_interval: Duration::from_millis(self.lock_retry_interval_ms),
            lock_max_retries: self.lock_max_retries,
        }
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::operations::lock::CacheLock;
use crate::cache::store::{CacheError, CacheStore};
use crate::error::AppError;

/// 缓存旁路读取的TTL与抢锁参数
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// 正向缓存TTL
    pub positive_ttl: Duration,
    /// 空值标记TTL，必须短于正向TTL
    pub negative_ttl: Duration,
    /// 互斥锁TTL
    pub lock_ttl: Duration,
    /// 抢锁失败后的重试间隔
    pub lock_retry_interval: Duration,
    /// 抢锁最大重试次数，超出返回繁忙而不是无限递归
    pub lock_max_retries: u32,
}

/// 通用的实体缓存旁路读取。
///
/// 缓存穿透：数据库确认不存在时回写空字符串标记，短TTL内直接判定不存在，
/// 不再打到数据库；缓存击穿：互斥锁保证同一键同时只有一次数据库回源，
/// 未抢到锁的调用方短暂等待后从头重试整个读取。
pub struct EntityCacheOperations;

impl EntityCacheOperations {
    /// 按缓存旁路模式读取实体。缓存未命中时在互斥锁保护下回源 loader，
    /// 回填缓存后返回。数据不存在返回 `AppError::NotFound`
    pub async fn get_with_mutex<S, T, F, Fut>(
        store: &S,
        policy: CachePolicy,
        key: &str,
        lock_key: &str,
        loader: F,
    ) -> Result<T, AppError>
    where
        S: CacheStore,
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Option<T>, sqlx::Error>>,
    {
        let mut attempts: u32 = 0;
        loop {
            if let Some(json) = store.get(key).await? {
                if json.is_empty() {
                    // 空值标记：已确认不存在，不再触达数据库
                    return Err(AppError::NotFound);
                }
                match serde_json::from_str(&json) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        // 缓存内容损坏：当作未命中，走回源刷新
                        tracing::warn!(key, error = %e, "缓存内容反序列化失败，按未命中处理");
                    }
                }
            }

            // 真未命中，抢互斥锁回源
            match CacheLock::try_acquire(store, lock_key, policy.lock_ttl).await? {
                None => {
                    attempts += 1;
                    if attempts > policy.lock_max_retries {
                        return Err(AppError::CacheBusy);
                    }
                    tokio::time::sleep(policy.lock_retry_interval).await;
                }
                Some(lock) => {
                    let result = Self::reload(store, &policy, key, loader()).await;
                    // 无论回源成败都释放锁，失败只记录，不掩盖回源结果
                    if let Err(e) = lock.release(store).await {
                        tracing::warn!(lock_key, error = %e, "释放互斥锁失败");
                    }
                    return result;
                }
            }
        }
    }

    /// 持锁回源并回填缓存
    async fn reload<S, T, Fut>(
        store: &S,
        policy: &CachePolicy,
        key: &str,
        load: Fut,
    ) -> Result<T, AppError>
    where
        S: CacheStore,
        T: Serialize,
        Fut: Future<Output = Result<Option<T>, sqlx::Error>>,
    {
        match load.await? {
            None => {
                store.set_ex(key, "", policy.negative_ttl).await?;
                Err(AppError::NotFound)
            }
            Some(entity) => {
                let json = serde_json::to_string(&entity)?;
                store.set_ex(key, &json, policy.positive_ttl).await?;
                Ok(entity)
            }
        }
    }

    /// 更新路径的缓存失效：数据库先落库，再删除（而非覆盖）缓存键，
    /// 下一次读取回填。删除避免了并发下旧值覆盖新删除的竞态
    pub async fn evict<S: CacheStore>(store: &S, key: &str) -> Result<(), CacheError> {
        store.del(key).await
    }

    /// 列表整体缓存（无互斥、无空值标记），用于商铺类型这类小而全的列表
    pub async fn get_list<S, T, F, Fut>(
        store: &S,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<Vec<T>, AppError>
    where
        S: CacheStore,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, sqlx::Error>>,
    {
        if let Some(json) = store.get(key).await? {
            match serde_json::from_str(&json) {
                Ok(list) => return Ok(list),
                Err(e) => {
                    tracing::warn!(key, error = %e, "列表缓存反序列化失败，按未命中处理");
                }
            }
        }
        let list = loader().await?;
        let json = serde_json::to_string(&list)?;
        store.set_ex(key, &json, ttl).await?;
        Ok(list)
    }
}

use std::time::Duration;

use uuid::Uuid;

use crate::cache::store::{CacheError, CacheStore};

/// 基于缓存 set-if-absent 的短时互斥锁。
/// 获取时写入随机凭据，释放时比对凭据，锁过期被他人抢占后
/// 迟到的释放不会误删新持有者的锁。TTL 兜底持有者崩溃的情况。
pub struct CacheLock {
    key: String,
    token: String,
}

impl CacheLock {
    /// 尝试获取锁，抢占失败返回 None。检查与写入是同一条原子命令
    pub async fn try_acquire<S: CacheStore>(
        store: &S,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<CacheLock>, CacheError> {
        let token = Uuid::new_v4().simple().to_string();
        if store.set_nx_ex(key, &token, ttl).await? {
            Ok(Some(CacheLock {
                key: key.to_string(),
                token,
            }))
        } else {
            Ok(None)
        }
    }

    /// 释放锁。仅当锁仍由本持有者持有时删除
    pub async fn release<S: CacheStore>(self, store: &S) -> Result<(), CacheError> {
        let released = store.del_if_eq(&self.key, &self.token).await?;
        if !released {
            tracing::warn!(key = %self.key, "锁已过期或易主，跳过释放");
        }
        Ok(())
    }
}

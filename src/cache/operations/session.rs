use std::time::Duration;

use uuid::Uuid;

use crate::cache::keys::login_keys::{login_token_key, login_user_key};
use crate::cache::models::session::SessionUser;
use crate::cache::store::{CacheError, CacheStore};

/// 会话缓存操作。
///
/// 双向映射：token -> 用户快照走每次请求的热路径；
/// 用户id -> 当前token 仅为单端登录服务，签发新token时据此剔除旧会话。
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 登录成功后签发不可猜测的 token。
    /// 同一用户此前的会话立即失效（后登录者生效）
    pub async fn issue<S: CacheStore>(
        store: &S,
        user: &SessionUser,
        ttl: Duration,
    ) -> Result<String, CacheError> {
        let user_key = login_user_key(user.id);
        if let Some(old_token) = store.get(&user_key).await? {
            if !old_token.is_empty() {
                tracing::info!(user_id = user.id, "剔除旧会话");
                store.del(&login_token_key(&old_token)).await?;
            }
        }

        let token = Uuid::new_v4().simple().to_string();
        let token_key = login_token_key(&token);
        store.hset_all(&token_key, &user.to_fields()).await?;
        store.expire(&token_key, ttl).await?;
        store.set_ex(&user_key, &token, ttl).await?;

        Ok(token)
    }

    /// 解析 token 对应的登录用户，命中则滑动续期。
    /// 返回 None 表示匿名访问，不是错误
    pub async fn resolve<S: CacheStore>(
        store: &S,
        token: &str,
        ttl: Duration,
    ) -> Result<Option<SessionUser>, CacheError> {
        let token_key = login_token_key(token);
        let fields = store.hget_all(&token_key).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let Some(user) = SessionUser::from_fields(&fields) else {
            tracing::warn!("会话数据不完整，按未登录处理");
            return Ok(None);
        };

        // 每次成功访问都把过期时间推后一个完整TTL。
        // 反向指针必须同步续期：它一旦先于会话过期，
        // 再次登录就找不到旧 token，单端登录随之失效
        store.expire(&token_key, ttl).await?;
        store.set_ex(&login_user_key(user.id), token, ttl).await?;
        Ok(Some(user))
    }

    /// 退出登录：删除正向映射与反向指针。
    /// 先读出用户id再删除，且容忍正向映射已不存在（幂等）
    pub async fn revoke<S: CacheStore>(store: &S, token: &str) -> Result<(), CacheError> {
        let token_key = login_token_key(token);
        let fields = store.hget_all(&token_key).await?;
        let user_id = fields.get("id").and_then(|id| id.parse::<i64>().ok());

        store.del(&token_key).await?;

        if let Some(user_id) = user_id {
            store.del(&login_user_key(user_id)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::memory::MemoryCacheStore;

    const TTL: Duration = Duration::from_secs(1800);

    fn user(id: i64) -> SessionUser {
        SessionUser {
            id,
            nick_name: format!("user_{}", id),
            icon: String::new(),
        }
    }

    #[tokio::test]
    async fn issued_token_resolves_to_the_user() {
        let store = MemoryCacheStore::new();
        let token = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();

        let resolved = SessionCacheOperations::resolve(&store, &token, TTL)
            .await
            .unwrap();
        assert_eq!(resolved, Some(user(1)));
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_anonymous() {
        let store = MemoryCacheStore::new();
        let resolved = SessionCacheOperations::resolve(&store, "deadbeef", TTL)
            .await
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn second_login_invalidates_previous_session() {
        let store = MemoryCacheStore::new();
        let first = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();
        let second = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();

        assert_eq!(
            SessionCacheOperations::resolve(&store, &first, TTL)
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            SessionCacheOperations::resolve(&store, &second, TTL)
                .await
                .unwrap(),
            Some(user(1))
        );
    }

    #[tokio::test]
    async fn sessions_of_different_users_do_not_interfere() {
        let store = MemoryCacheStore::new();
        let token_a = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();
        let token_b = SessionCacheOperations::issue(&store, &user(2), TTL)
            .await
            .unwrap();

        assert_eq!(
            SessionCacheOperations::resolve(&store, &token_a, TTL)
                .await
                .unwrap(),
            Some(user(1))
        );
        assert_eq!(
            SessionCacheOperations::resolve(&store, &token_b, TTL)
                .await
                .unwrap(),
            Some(user(2))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_slides_the_expiration_window() {
        let store = MemoryCacheStore::new();
        let token = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();

        // 每次都在TTL内访问，会话永不过期，即使早已越过最初的过期点
        for _ in 0..4 {
            tokio::time::advance(Duration::from_secs(1500)).await;
            assert_eq!(
                SessionCacheOperations::resolve(&store, &token, TTL)
                    .await
                    .unwrap(),
                Some(user(1)),
            );
        }

        // 停止访问，超过TTL后过期
        tokio::time::advance(Duration::from_secs(1801)).await;
        assert_eq!(
            SessionCacheOperations::resolve(&store, &token, TTL)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sliding_refresh_keeps_single_active_session() {
        let store = MemoryCacheStore::new();
        let first = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();

        // 滑动续期让首个会话活过反向指针最初的过期点
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(1500)).await;
            assert!(
                SessionCacheOperations::resolve(&store, &first, TTL)
                    .await
                    .unwrap()
                    .is_some()
            );
        }

        // 再次登录必须仍能剔除旧会话
        let second = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();
        assert_eq!(
            SessionCacheOperations::resolve(&store, &first, TTL)
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            SessionCacheOperations::resolve(&store, &second, TTL)
                .await
                .unwrap(),
            Some(user(1))
        );
    }

    #[tokio::test]
    async fn revoke_removes_both_mappings_and_is_idempotent() {
        let store = MemoryCacheStore::new();
        let token = SessionCacheOperations::issue(&store, &user(1), TTL)
            .await
            .unwrap();

        SessionCacheOperations::revoke(&store, &token).await.unwrap();
        assert_eq!(
            SessionCacheOperations::resolve(&store, &token, TTL)
                .await
                .unwrap(),
            None
        );
        // 反向指针同步清理
        assert_eq!(store.get(&login_user_key(1)).await.unwrap(), None);

        // 重复撤销不报错
        SessionCacheOperations::revoke(&store, &token).await.unwrap();
    }
}

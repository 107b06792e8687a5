use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};

/// 缓存后端错误。网络或服务故障一律归为不可用，
/// 调用方不得将其与空值标记（确认不存在）混为一谈。
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("缓存服务不可用: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Unavailable(e.to_string())
    }
}

/// 缓存存储的窄接口。生产环境由 Redis 实现，测试使用内存实现。
#[allow(async_fn_in_trait)]
pub trait CacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 原子的 set-if-absent，互斥锁的基础。检查与写入必须是同一条命令
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// 仅当键的当前值等于期望值时删除，返回是否删除。用于带凭据的锁释放
    async fn del_if_eq(&self, key: &str, expected: &str) -> Result<bool, CacheError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn hset_all(&self, key: &str, fields: &[(String, String)]) -> Result<(), CacheError>;

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, CacheError>;

    /// 把字符串值的第 offset 位置 1
    async fn set_bit(&self, key: &str, offset: u32) -> Result<(), CacheError>;

    /// 读取前 bits 位组成的无符号整数（大端，第 0 位为最高位）。
    /// 键不存在时按全 0 处理
    async fn bit_field_get(&self, key: &str, bits: u32) -> Result<Option<u64>, CacheError>;

    async fn geo_add(&self, key: &str, members: &[(f64, f64, String)])
    -> Result<(), CacheError>;

    /// 以 (longitude, latitude) 为圆心按半径搜索，按距离升序返回
    /// 至多 limit 个 (成员, 距离米)
    async fn geo_search(
        &self,
        key: &str,
        longitude: f64,
        latitude: f64,
        radius: f64,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, CacheError>;
}

/// 释放锁的脚本：值匹配才删除，防止误删他人持有的锁
const DEL_IF_EQ_SCRIPT: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

#[derive(Clone)]
pub struct RedisCacheStore {
    client: Arc<RedisClient>,
}

impl RedisCacheStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    async fn conn(&self) -> Result<MultiplexedConnection, CacheError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn().await?;
        Ok(conn.get(key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn del_if_eq(&self, key: &str, expected: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let deleted: i64 = redis::Script::new(DEL_IF_EQ_SCRIPT)
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: () = conn.expire(key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn hset_all(&self, key: &str, fields: &[(String, String)]) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: () = conn.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, CacheError> {
        let mut conn = self.conn().await?;
        Ok(conn.hgetall(key).await?)
    }

    async fn set_bit(&self, key: &str, offset: u32) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: bool = conn.setbit(key, offset as usize, true).await?;
        Ok(())
    }

    async fn bit_field_get(&self, key: &str, bits: u32) -> Result<Option<u64>, CacheError> {
        let mut conn = self.conn().await?;
        // BITFIELD sign:5:202203 GET u14 0
        let values: Vec<Option<u64>> = redis::cmd("BITFIELD")
            .arg(key)
            .arg("GET")
            .arg(format!("u{}", bits))
            .arg(0)
            .query_async(&mut conn)
            .await?;
        Ok(values.into_iter().flatten().next())
    }

    async fn geo_add(
        &self,
        key: &str,
        members: &[(f64, f64, String)],
    ) -> Result<(), CacheError> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let mut cmd = redis::cmd("GEOADD");
        cmd.arg(key);
        for (longitude, latitude, member) in members {
            cmd.arg(*longitude).arg(*latitude).arg(member);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn geo_search(
        &self,
        key: &str,
        longitude: f64,
        latitude: f64,
        radius: f64,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, CacheError> {
        let mut conn = self.conn().await?;
        // GEOSEARCH key FROMLONLAT x y BYRADIUS r m ASC COUNT n WITHDIST
        let results: Vec<(String, f64)> = redis::cmd("GEOSEARCH")
            .arg(key)
            .arg("FROMLONLAT")
            .arg(longitude)
            .arg(latitude)
            .arg("BYRADIUS")
            .arg(radius)
            .arg("m")
            .arg("ASC")
            .arg("COUNT")
            .arg(limit)
            .arg("WITHDIST")
            .query_async(&mut conn)
            .await?;
        Ok(results)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! 内存版缓存存储，TTL 基于 tokio 虚拟时钟，供单元测试
    //! 模拟外部缓存的语义（含过期、set-if-absent、位图与地理索引）。

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{CacheError, CacheStore};

    enum Value {
        Str(String),
        Hash(HashMap<String, String>),
        Bits(Vec<u8>),
        Geo(Vec<(f64, f64, String)>),
    }

    struct Entry {
        value: Value,
        expires_at: Option<Instant>,
    }

    impl Entry {
        fn live(&self) -> bool {
            self.expires_at.is_none_or(|at| Instant::now() < at)
        }
    }

    #[derive(Default)]
    pub struct MemoryCacheStore {
        inner: Mutex<HashMap<String, Entry>>,
    }

    impl MemoryCacheStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn with_live<R>(
            &self,
            key: &str,
            f: impl FnOnce(Option<&mut Entry>) -> R,
        ) -> R {
            let mut map = self.inner.lock().unwrap();
            if map.get(key).is_some_and(|e| !e.live()) {
                map.remove(key);
            }
            f(map.get_mut(key))
        }

        fn insert(&self, key: &str, value: Value, ttl: Option<Duration>) {
            let mut map = self.inner.lock().unwrap();
            map.insert(
                key.to_string(),
                Entry {
                    value,
                    expires_at: ttl.map(|ttl| Instant::now() + ttl),
                },
            );
        }

        /// 测试断言用：键的剩余存活时间
        pub fn ttl_of(&self, key: &str) -> Option<Duration> {
            let mut map = self.inner.lock().unwrap();
            if map.get(key).is_some_and(|e| !e.live()) {
                map.remove(key);
            }
            map.get(key)
                .and_then(|e| e.expires_at)
                .map(|at| at.saturating_duration_since(Instant::now()))
        }
    }

    impl CacheStore for MemoryCacheStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.with_live(key, |entry| match entry.map(|e| &e.value) {
                Some(Value::Str(s)) => Some(s.clone()),
                _ => None,
            }))
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            self.insert(key, Value::Str(value.to_string()), Some(ttl));
            Ok(())
        }

        async fn set_nx_ex(
            &self,
            key: &str,
            value: &str,
            ttl: Duration,
        ) -> Result<bool, CacheError> {
            let mut map = self.inner.lock().unwrap();
            if map.get(key).is_some_and(|e| !e.live()) {
                map.remove(key);
            }
            if map.contains_key(key) {
                return Ok(false);
            }
            map.insert(
                key.to_string(),
                Entry {
                    value: Value::Str(value.to_string()),
                    expires_at: Some(Instant::now() + ttl),
                },
            );
            Ok(true)
        }

        async fn del(&self, key: &str) -> Result<(), CacheError> {
            self.inner.lock().unwrap().remove(key);
            Ok(())
        }

        async fn del_if_eq(&self, key: &str, expected: &str) -> Result<bool, CacheError> {
            let mut map = self.inner.lock().unwrap();
            let matches = map
                .get(key)
                .filter(|e| e.live())
                .is_some_and(|e| matches!(&e.value, Value::Str(s) if s == expected));
            if matches {
                map.remove(key);
            }
            Ok(matches)
        }

        async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
            self.with_live(key, |entry| {
                if let Some(entry) = entry {
                    entry.expires_at = Some(Instant::now() + ttl);
                }
            });
            Ok(())
        }

        async fn hset_all(
            &self,
            key: &str,
            fields: &[(String, String)],
        ) -> Result<(), CacheError> {
            let mut map = self.inner.lock().unwrap();
            if map.get(key).is_some_and(|e| !e.live()) {
                map.remove(key);
            }
            let entry = map.entry(key.to_string()).or_insert(Entry {
                value: Value::Hash(HashMap::new()),
                expires_at: None,
            });
            if let Value::Hash(hash) = &mut entry.value {
                for (field, value) in fields {
                    hash.insert(field.clone(), value.clone());
                }
            }
            Ok(())
        }

        async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, CacheError> {
            Ok(self.with_live(key, |entry| match entry.map(|e| &e.value) {
                Some(Value::Hash(hash)) => hash.clone(),
                _ => HashMap::new(),
            }))
        }

        async fn set_bit(&self, key: &str, offset: u32) -> Result<(), CacheError> {
            let mut map = self.inner.lock().unwrap();
            if map.get(key).is_some_and(|e| !e.live()) {
                map.remove(key);
            }
            let entry = map.entry(key.to_string()).or_insert(Entry {
                value: Value::Bits(Vec::new()),
                expires_at: None,
            });
            if let Value::Bits(bytes) = &mut entry.value {
                let byte_index = (offset / 8) as usize;
                if bytes.len() <= byte_index {
                    bytes.resize(byte_index + 1, 0);
                }
                bytes[byte_index] |= 0x80 >> (offset % 8);
            }
            Ok(())
        }

        async fn bit_field_get(&self, key: &str, bits: u32) -> Result<Option<u64>, CacheError> {
            Ok(self.with_live(key, |entry| {
                let bytes: &[u8] = match entry.map(|e| &e.value) {
                    Some(Value::Bits(bytes)) => bytes,
                    _ => &[],
                };
                let mut value: u64 = 0;
                for i in 0..bits {
                    let byte = bytes.get((i / 8) as usize).copied().unwrap_or(0);
                    let bit = (byte >> (7 - i % 8)) & 1;
                    value = (value << 1) | bit as u64;
                }
                Some(value)
            }))
        }

        async fn geo_add(
            &self,
            key: &str,
            members: &[(f64, f64, String)],
        ) -> Result<(), CacheError> {
            let mut map = self.inner.lock().unwrap();
            let entry = map.entry(key.to_string()).or_insert(Entry {
                value: Value::Geo(Vec::new()),
                expires_at: None,
            });
            if let Value::Geo(points) = &mut entry.value {
                for (longitude, latitude, member) in members {
                    points.retain(|(_, _, m)| m != member);
                    points.push((*longitude, *latitude, member.clone()));
                }
            }
            Ok(())
        }

        async fn geo_search(
            &self,
            key: &str,
            longitude: f64,
            latitude: f64,
            radius: f64,
            limit: usize,
        ) -> Result<Vec<(String, f64)>, CacheError> {
            Ok(self.with_live(key, |entry| {
                let points: &[(f64, f64, String)] = match entry.map(|e| &e.value) {
                    Some(Value::Geo(points)) => points,
                    _ => &[],
                };
                let mut results: Vec<(String, f64)> = points
                    .iter()
                    .map(|(lon, lat, member)| {
                        (member.clone(), haversine(longitude, latitude, *lon, *lat))
                    })
                    .filter(|(_, distance)| *distance <= radius)
                    .collect();
                results.sort_by(|a, b| a.1.total_cmp(&b.1));
                results.truncate(limit);
                results
            }))
        }
    }

    /// 球面距离（米），与 Redis GEO 使用相同的地球半径
    fn haversine(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_372_797.560856;
        let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (lon2 - lon1).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

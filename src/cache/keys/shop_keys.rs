/// 商铺缓存键前缀（正向缓存与空值标记共用）
const CACHE_SHOP_PREFIX: &str = "cache:shop:";

/// 商铺缓存重建互斥锁键前缀
const LOCK_SHOP_PREFIX: &str = "lock:shop:";

/// 商铺地理索引键前缀（按类型分片）
const SHOP_GEO_PREFIX: &str = "shop:geo:";

/// 商铺类型列表缓存键
const CACHE_SHOP_TYPE_KEY: &str = "cache:shop-type";

/// 生成商铺缓存键
pub fn shop_key(shop_id: i64) -> String {
    format!("{}{}", CACHE_SHOP_PREFIX, shop_id)
}

/// 生成商铺互斥锁键
pub fn shop_lock_key(shop_id: i64) -> String {
    format!("{}{}", LOCK_SHOP_PREFIX, shop_id)
}

/// 生成某类型商铺的地理索引键
pub fn shop_geo_key(type_id: i64) -> String {
    format!("{}{}", SHOP_GEO_PREFIX, type_id)
}

/// 商铺类型列表缓存键
pub fn shop_type_key() -> String {
    CACHE_SHOP_TYPE_KEY.to_string()
}

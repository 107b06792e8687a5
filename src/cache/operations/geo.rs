use std::collections::HashMap;

use crate::cache::keys::shop_keys::shop_geo_key;
use crate::cache::store::{CacheError, CacheStore};
use crate::database::models::shop::ShopEntity;

/// 商铺地理索引操作。
/// 索引按商铺类型分片，从数据库全量装载；请求路径上只读不写。
pub struct GeoCacheOperations;

impl GeoCacheOperations {
    /// 全量重建地理索引：按类型分组后批量写入
    pub async fn load_shop_index<S: CacheStore>(
        store: &S,
        shops: &[ShopEntity],
    ) -> Result<(), CacheError> {
        let mut by_type: HashMap<i64, Vec<(f64, f64, String)>> = HashMap::new();
        for shop in shops {
            by_type
                .entry(shop.type_id)
                .or_default()
                .push((shop.x, shop.y, shop.id.to_string()));
        }
        for (type_id, members) in &by_type {
            store.geo_add(&shop_geo_key(*type_id), members).await?;
        }
        tracing::info!(shops = shops.len(), types = by_type.len(), "商铺地理索引装载完成");
        Ok(())
    }

    /// 查询某类型中距离给定坐标最近的商铺，返回第 page 页（1 起始）的
    /// (商铺id, 距离米)，按距离升序。搜索有半径与候选数上限：
    /// 这是"找最近的若干个"，不是"找出全部"
    pub async fn search_nearby<S: CacheStore>(
        store: &S,
        type_id: i64,
        longitude: f64,
        latitude: f64,
        radius: f64,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<(i64, f64)>, CacheError> {
        let end = page * page_size;
        let candidates = store
            .geo_search(&shop_geo_key(type_id), longitude, latitude, radius, end)
            .await?;
        Ok(paginate(candidates, page, page_size))
    }
}

/// 截取候选列表的第 page 页。候选数不足页起点说明没有这一页，返回空
fn paginate(candidates: Vec<(String, f64)>, page: usize, page_size: usize) -> Vec<(i64, f64)> {
    let from = (page.saturating_sub(1)) * page_size;
    if candidates.len() <= from {
        return Vec::new();
    }
    candidates
        .into_iter()
        .skip(from)
        .take(page_size)
        .filter_map(|(member, distance)| member.parse().ok().map(|id: i64| (id, distance)))
        .collect()
}

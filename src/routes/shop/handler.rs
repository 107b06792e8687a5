use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::AppState;
use crate::cache::keys::shop_keys::{shop_key, shop_lock_key, shop_type_key};
use crate::cache::operations::entity::EntityCacheOperations;
use crate::cache::operations::geo::GeoCacheOperations;
use crate::database::models::shop::{ShopEntity, ShopTypeEntity, ShopWithDistance};
use crate::database::operations::shop::ShopOperation;
use crate::error::AppError;
use crate::result::ApiResult;

use super::model::ShopsByTypeQuery;

/// 根据ID查询商铺，缓存旁路读取
pub async fn get_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<i64>,
) -> Result<Json<ApiResult<ShopEntity>>, AppError> {
    let shop_op = ShopOperation::new(state.db.clone());
    let shop = EntityCacheOperations::get_with_mutex(
        &state.cache,
        state.config.cache_policy(),
        &shop_key(shop_id),
        &shop_lock_key(shop_id),
        || shop_op.find_by_id(shop_id),
    )
    .await?;

    Ok(Json(ApiResult::success(shop)))
}

/// 更新商铺信息：先落库，再删除（而非覆盖）缓存
pub async fn update_shop(
    State(state): State<AppState>,
    Json(shop): Json<ShopEntity>,
) -> Result<Json<ApiResult<()>>, AppError> {
    let shop_op = ShopOperation::new(state.db.clone());
    shop_op.update(&shop).await?;

    EntityCacheOperations::evict(&state.cache, &shop_key(shop.id)).await?;
    Ok(Json(ApiResult::success(())))
}

/// 按类型分页查询商铺。带坐标时走地理索引按距离排序，
/// 再按索引给出的顺序从数据库补全商铺详情
pub async fn query_shops_by_type(
    State(state): State<AppState>,
    Query(query): Query<ShopsByTypeQuery>,
) -> Result<Json<ApiResult<Vec<ShopWithDistance>>>, AppError> {
    let page = query.current.max(1);
    let page_size = state.config.default_page_size;
    let shop_op = ShopOperation::new(state.db.clone());

    let (x, y) = match (query.x, query.y) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            // 无坐标，普通分页
            let shops = shop_op.page_by_type(query.type_id, page, page_size).await?;
            let shops = shops
                .into_iter()
                .map(|shop| ShopWithDistance {
                    shop,
                    distance: None,
                })
                .collect();
            return Ok(Json(ApiResult::success(shops)));
        }
    };

    let candidates = GeoCacheOperations::search_nearby(
        &state.cache,
        query.type_id,
        x,
        y,
        state.config.max_search_radius,
        page,
        page_size,
    )
    .await?;
    if candidates.is_empty() {
        // 没有这一页了
        return Ok(Json(ApiResult::success(Vec::new())));
    }

    let ids: Vec<i64> = candidates.iter().map(|(id, _)| *id).collect();
    let distance_by_id: HashMap<i64, f64> = candidates.into_iter().collect();

    // 保持地理索引的距离排序补全详情
    let shops = shop_op.find_by_ids_ordered(&ids).await?;
    let shops = shops
        .into_iter()
        .map(|shop| ShopWithDistance {
            distance: distance_by_id.get(&shop.id).copied(),
            shop,
        })
        .collect();

    Ok(Json(ApiResult::success(shops)))
}

/// 商铺类型列表，整体缓存
pub async fn get_shop_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResult<Vec<ShopTypeEntity>>>, AppError> {
    let shop_op = ShopOperation::new(state.db.clone());
    let types = EntityCacheOperations::get_list(
        &state.cache,
        &shop_type_key(),
        state.config.shop_type_ttl(),
        || shop_op.find_all_types(),
    )
    .await?;

    Ok(Json(ApiResult::success(types)))
}

use serde::{Deserialize, Serialize};

/// 商铺实体，缓存中以整体 JSON 存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShopEntity {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub images: String,
    pub area: String,
    pub address: String,
    /// 经度
    pub x: f64,
    /// 纬度
    pub y: f64,
    pub avg_price: i64,
    pub sold: i32,
    pub comments: i32,
    /// 评分，单位 0.1 分
    pub score: i32,
    pub open_hours: String,
}

/// 商铺类型
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShopTypeEntity {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub sort: i32,
}

/// 附近商铺查询结果，附带与查询坐标的距离（米）
#[derive(Debug, Serialize)]
pub struct ShopWithDistance {
    #[serde(flatten)]
    pub shop: ShopEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

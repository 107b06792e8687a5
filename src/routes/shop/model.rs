use serde::Deserialize;

/// 按类型查询商铺的参数。
/// x/y 同时给出时按距离排序分页，否则按数据库普通分页
#[derive(Debug, Deserialize)]
pub struct ShopsByTypeQuery {
    pub type_id: i64,
    #[serde(default = "first_page")]
    pub current: usize,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

fn first_page() -> usize {
    1
}

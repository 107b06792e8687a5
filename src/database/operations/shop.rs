use std::sync::Arc;

use sqlx::{Error as SqlxError, PgPool};

use crate::database::models::shop::{ShopEntity, ShopTypeEntity};

const SHOP_COLUMNS: &str =
    "id, name, type_id, images, area, address, x, y, avg_price, sold, comments, score, open_hours";

/// 商铺存储库，处理所有与商铺相关的数据库操作
pub struct ShopOperation {
    db: Arc<PgPool>,
}

impl ShopOperation {
    /// 创建新的商铺存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 根据ID查找商铺
    pub async fn find_by_id(&self, shop_id: i64) -> Result<Option<ShopEntity>, SqlxError> {
        let shop = sqlx::query_as::<_, ShopEntity>(&format!(
            "SELECT {} FROM tb_shop WHERE id = $1",
            SHOP_COLUMNS
        ))
        .bind(shop_id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(shop)
    }

    /// 更新商铺信息，商铺不存在时返回 RowNotFound
    pub async fn update(&self, shop: &ShopEntity) -> Result<(), SqlxError> {
        let result = sqlx::query(
            r#"
            UPDATE tb_shop
            SET name = $2, type_id = $3, images = $4, area = $5, address = $6,
                x = $7, y = $8, avg_price = $9, sold = $10, comments = $11,
                score = $12, open_hours = $13
            WHERE id = $1
            "#,
        )
        .bind(shop.id)
        .bind(&shop.name)
        .bind(shop.type_id)
        .bind(&shop.images)
        .bind(&shop.area)
        .bind(&shop.address)
        .bind(shop.x)
        .bind(shop.y)
        .bind(shop.avg_price)
        .bind(shop.sold)
        .bind(shop.comments)
        .bind(shop.score)
        .bind(&shop.open_hours)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SqlxError::RowNotFound);
        }
        Ok(())
    }

    /// 全量查询商铺，用于地理索引重建
    pub async fn find_all(&self) -> Result<Vec<ShopEntity>, SqlxError> {
        let shops = sqlx::query_as::<_, ShopEntity>(&format!(
            "SELECT {} FROM tb_shop ORDER BY id",
            SHOP_COLUMNS
        ))
        .fetch_all(&*self.db)
        .await?;

        Ok(shops)
    }

    /// 按ID列表批量查询，结果顺序与传入的ID列表一致。
    /// 地理搜索按距离排好了序，这里不能让数据库打乱它
    pub async fn find_by_ids_ordered(&self, ids: &[i64]) -> Result<Vec<ShopEntity>, SqlxError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let shops = sqlx::query_as::<_, ShopEntity>(&format!(
            "SELECT {} FROM tb_shop WHERE id = ANY($1) ORDER BY array_position($1, id)",
            SHOP_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&*self.db)
        .await?;

        Ok(shops)
    }

    /// 按类型分页查询（无坐标时的普通分页）
    pub async fn page_by_type(
        &self,
        type_id: i64,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<ShopEntity>, SqlxError> {
        let offset = (page.saturating_sub(1)) * page_size;
        let shops = sqlx::query_as::<_, ShopEntity>(&format!(
            "SELECT {} FROM tb_shop WHERE type_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            SHOP_COLUMNS
        ))
        .bind(type_id)
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&*self.db)
        .await?;

        Ok(shops)
    }

    /// 查询全部商铺类型，按 sort 升序
    pub async fn find_all_types(&self) -> Result<Vec<ShopTypeEntity>, SqlxError> {
        let types = sqlx::query_as::<_, ShopTypeEntity>(
            "SELECT id, name, icon, sort FROM tb_shop_type ORDER BY sort ASC",
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(types)
    }
}

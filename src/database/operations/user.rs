use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::{Error as SqlxError, PgPool};

use crate::database::models::user::UserEntity;

const USER_COLUMNS: &str = "id, phone, password, nick_name, icon, created_at";

/// 用户昵称前缀，验证码首次登录自动建号时使用
const NICK_NAME_PREFIX: &str = "user_";

/// 用户存储库
pub struct UserOperation {
    db: Arc<PgPool>,
}

impl UserOperation {
    /// 创建新的用户存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 根据手机号查找用户
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<UserEntity>, SqlxError> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM tb_user WHERE phone = $1",
            USER_COLUMNS
        ))
        .bind(phone)
        .fetch_optional(&*self.db)
        .await?;

        Ok(user)
    }

    /// 用手机号创建新用户（验证码首次登录），昵称随机生成
    pub async fn create_with_phone(&self, phone: &str) -> Result<UserEntity, SqlxError> {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let nick_name = format!("{}{}", NICK_NAME_PREFIX, suffix);

        let user = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO tb_user (phone, nick_name, icon, created_at)
            VALUES ($1, $2, '', NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(phone)
        .bind(&nick_name)
        .fetch_one(&*self.db)
        .await?;

        Ok(user)
    }
}

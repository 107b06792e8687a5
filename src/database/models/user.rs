use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub phone: String,
    /// bcrypt 哈希，仅验证码注册的用户为空
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub nick_name: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::database::models::user::UserEntity;

/// 登录用户的会话快照（脱敏，只保留展示所需字段）。
/// 在缓存中以 hash 存储，这里提供显式的字段编解码。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub nick_name: String,
    pub icon: String,
}

impl SessionUser {
    pub fn from_entity(user: &UserEntity) -> Self {
        Self {
            id: user.id,
            nick_name: user.nick_name.clone(),
            icon: user.icon.clone(),
        }
    }

    /// 展平为 hash 字段
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            ("id".to_string(), self.id.to_string()),
            ("nick_name".to_string(), self.nick_name.clone()),
            ("icon".to_string(), self.icon.clone()),
        ]
    }

    /// 从 hash 字段还原，字段缺失或 id 非法返回 None
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        let id = fields.get("id")?.parse().ok()?;
        Some(Self {
            id,
            nick_name: fields.get("nick_name")?.clone(),
            icon: fields.get("icon").cloned().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_round_trip() {
        let user = SessionUser {
            id: 7,
            nick_name: "user_abc".to_string(),
            icon: "/icons/7.png".to_string(),
        };
        let fields: HashMap<String, String> = user.to_fields().into_iter().collect();
        assert_eq!(SessionUser::from_fields(&fields), Some(user));
    }

    #[test]
    fn malformed_id_yields_none() {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), "not-a-number".to_string());
        fields.insert("nick_name".to_string(), "x".to_string());
        assert_eq!(SessionUser::from_fields(&fields), None);
    }

    #[test]
    fn missing_fields_yield_none() {
        assert_eq!(SessionUser::from_fields(&HashMap::new()), None);
    }
}

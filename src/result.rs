use serde::{Deserialize, Serialize};

/// 统一的接口出参。code 为 0 表示成功；
/// 成功带 content，失败带 error_message，二者不会同时出现
#[derive(Serialize, Deserialize)]
pub struct ApiResult<T: Serialize> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<T>,
}

impl<T: Serialize> ApiResult<T> {
    pub fn success(content: T) -> Self {
        Self {
            code: 0,
            error_message: None,
            content: Some(content),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            error_message: Some(message.into()),
            content: None,
        }
    }
}

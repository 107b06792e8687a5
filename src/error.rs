use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crate::cache::store::CacheError;
use crate::result::ApiResult;

/// 应用统一错误类型
#[derive(Debug)]
pub enum AppError {
    /// 未登录或会话已失效
    Unauthorized,
    /// 数据不存在（缓存空值标记或数据库均未命中）
    NotFound,
    /// 请求参数错误
    BadRequest(String),
    /// 互斥锁等待超时，缓存重建繁忙
    CacheBusy,
    /// 缓存服务暂时不可用（网络或后端故障，与空值标记严格区分）
    CacheUnavailable(String),
    /// 数据库错误
    DatabaseError(String),
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "未授权访问".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "数据不存在".to_string()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::CacheBusy => (
                StatusCode::SERVICE_UNAVAILABLE,
                "服务繁忙，请稍后重试".to_string(),
            ),
            AppError::CacheUnavailable(e) => {
                tracing::error!("缓存服务不可用: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "服务暂时不可用".to_string(),
                )
            }
            AppError::DatabaseError(e) => {
                tracing::error!("数据库错误: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部服务器错误".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "内部服务器错误".to_string(),
            ),
        };

        // 错误响应与成功响应共用同一出参结构
        let body = Json(ApiResult::<()>::error(status.as_u16() as i32, error_message));

        (status, body).into_response()
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::Unavailable(message) => AppError::CacheUnavailable(message),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::CacheUnavailable(e.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        tracing::error!("序列化错误: {}", e);
        AppError::InternalServerError
    }
}

use axum::{
    Json,
    extract::{Extension, State},
    http::HeaderMap,
};
use rand::Rng;

use crate::AppState;
use crate::cache::keys::login_keys::login_code_key;
use crate::cache::models::session::SessionUser;
use crate::cache::operations::session::SessionCacheOperations;
use crate::cache::operations::sign::SignCacheOperations;
use crate::cache::store::CacheStore;
use crate::database::models::user::UserEntity;
use crate::database::operations::user::UserOperation;
use crate::error::AppError;
use crate::result::ApiResult;
use crate::utils::{is_valid_phone, verify_password};

use super::model::{LoginRequest, SendCodeRequest};

/// 发送短信验证码。
/// 实际短信通道不在本服务范围内，验证码写入缓存后以日志模拟下发
pub async fn send_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Result<Json<ApiResult<()>>, AppError> {
    if !is_valid_phone(&req.phone) {
        return Err(AppError::BadRequest("手机号格式错误".to_string()));
    }

    let code = format!("{:06}", rand::rng().random_range(0..1_000_000));
    state
        .cache
        .set_ex(
            &login_code_key(&req.phone),
            &code,
            state.config.login_code_ttl(),
        )
        .await?;

    tracing::debug!(phone = %req.phone, code = %code, "发送短信验证码成功");
    Ok(Json(ApiResult::success(())))
}

/// 用户登录，验证码或密码二选一，成功返回会话 token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResult<String>>, AppError> {
    if !is_valid_phone(&req.phone) {
        return Err(AppError::BadRequest("手机号格式错误".to_string()));
    }

    let user_op = UserOperation::new(state.db.clone());
    let user = user_op.find_by_phone(&req.phone).await?;

    if let Some(code) = req.code.as_deref().filter(|c| !c.is_empty()) {
        // 验证码登录
        let cached_code = state.cache.get(&login_code_key(&req.phone)).await?;
        if cached_code.as_deref() != Some(code) {
            return Err(AppError::BadRequest("验证码错误".to_string()));
        }

        // 首次登录自动创建用户
        let user = match user {
            Some(user) => user,
            None => user_op.create_with_phone(&req.phone).await?,
        };

        let token = issue_session(&state, &user).await?;
        Ok(Json(ApiResult::success(token)))
    } else if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        // 密码登录，不能自动建号
        let Some(user) = user else {
            return Err(AppError::BadRequest("手机号不存在".to_string()));
        };

        let verified = user
            .password
            .as_deref()
            .map(|hash| verify_password(password, hash))
            .transpose()
            .map_err(|_| AppError::InternalServerError)?
            .unwrap_or(false);
        if !verified {
            return Err(AppError::BadRequest("密码输入错误".to_string()));
        }

        let token = issue_session(&state, &user).await?;
        Ok(Json(ApiResult::success(token)))
    } else {
        Err(AppError::BadRequest("登录失败".to_string()))
    }
}

async fn issue_session(state: &AppState, user: &UserEntity) -> Result<String, AppError> {
    let session_user = SessionUser::from_entity(user);
    let token = SessionCacheOperations::issue(
        &state.cache,
        &session_user,
        state.config.session_ttl(),
    )
    .await?;
    Ok(token)
}

/// 退出登录，撤销当前会话（幂等）
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResult<()>>, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !token.is_empty() {
        SessionCacheOperations::revoke(&state.cache, token).await?;
    }
    Ok(Json(ApiResult::success(())))
}

/// 当前登录用户信息
pub async fn me(
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResult<SessionUser>>, AppError> {
    Ok(Json(ApiResult::success(user)))
}

/// 今日签到
pub async fn sign(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResult<()>>, AppError> {
    let today = chrono::Local::now().date_naive();
    SignCacheOperations::check_in(&state.cache, user.id, today).await?;
    Ok(Json(ApiResult::success(())))
}

/// 截止今天的连续签到天数
pub async fn sign_count(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResult<u32>>, AppError> {
    let today = chrono::Local::now().date_naive();
    let streak = SignCacheOperations::current_streak(&state.cache, user.id, today).await?;
    Ok(Json(ApiResult::success(streak)))
}

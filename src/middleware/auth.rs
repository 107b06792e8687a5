use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::cache::models::session::SessionUser;
use crate::cache::operations::session::SessionCacheOperations;
use crate::error::AppError;

/// token 刷新中间件，作用于全部路由。
/// 请求携带 token 且会话有效时，把登录用户放入请求扩展并滑动续期；
/// 无 token 或会话不存在按匿名放行。缓存故障直接报错，
/// 不能降级成匿名，否则故障期间登录用户会被误判为未登录
pub async fn refresh_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !token.is_empty() {
        if let Some(user) =
            SessionCacheOperations::resolve(&state.cache, token, state.config.session_ttl())
                .await?
        {
            request.extensions_mut().insert(user);
        }
    }

    Ok(next.run(request).await)
}

/// 登录校验中间件，作用于受保护路由。
/// 依赖 refresh_token 在前面解析出的请求扩展
pub async fn require_login(request: Request, next: Next) -> Result<Response, AppError> {
    if request.extensions().get::<SessionUser>().is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

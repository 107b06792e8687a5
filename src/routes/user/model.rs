use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

/// 登录请求：带 code 走验证码登录（首次自动建号），
/// 带 password 走密码登录
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub code: Option<String>,
    pub password: Option<String>,
}

/// 短信验证码键前缀
const LOGIN_CODE_PREFIX: &str = "login:code:";

/// 会话正向映射键前缀：token -> 用户快照
const LOGIN_TOKEN_PREFIX: &str = "login:token:";

/// 会话反向指针键前缀：用户id -> 当前token，仅用于单端登录剔除旧会话
const LOGIN_USER_PREFIX: &str = "login:user:";

/// 生成验证码缓存键
pub fn login_code_key(phone: &str) -> String {
    format!("{}{}", LOGIN_CODE_PREFIX, phone)
}

/// 生成会话正向映射键
pub fn login_token_key(token: &str) -> String {
    format!("{}{}", LOGIN_TOKEN_PREFIX, token)
}

/// 生成会话反向指针键
pub fn login_user_key(user_id: i64) -> String {
    format!("{}{}", LOGIN_USER_PREFIX, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_keys_use_expected_namespaces() {
        assert_eq!(login_code_key("13812345678"), "login:code:13812345678");
        assert_eq!(login_token_key("abc"), "login:token:abc");
        assert_eq!(login_user_key(9), "login:user:9");
    }
}

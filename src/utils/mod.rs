use bcrypt::verify;

/// 校验明文密码与 bcrypt 哈希是否匹配。
/// 本服务只做校验，密码哈希由数据初始化流程写入
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 校验大陆手机号：11位数字，1开头，第二位3~9
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 11
        && phone.as_bytes()[0] == b'1'
        && (b'3'..=b'9').contains(&phone.as_bytes()[1])
        && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_phone_numbers_pass() {
        assert!(is_valid_phone("13812345678"));
        assert!(is_valid_phone("19900000000"));
    }

    #[test]
    fn invalid_phone_numbers_fail() {
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("1381234567")); // 太短
        assert!(!is_valid_phone("138123456789")); // 太长
        assert!(!is_valid_phone("23812345678")); // 非1开头
        assert!(!is_valid_phone("12812345678")); // 第二位非法
        assert!(!is_valid_phone("1381234567a")); // 含非数字
    }

    #[test]
    fn password_verification_round_trip() {
        let hashed = bcrypt::hash("123456", bcrypt::DEFAULT_COST).unwrap();
        assert!(verify_password("123456", &hashed).unwrap());
        assert!(!verify_password("654321", &hashed).unwrap());
    }
}

use chrono::{Datelike, NaiveDate};

/// 签到位图键前缀
const SIGN_PREFIX: &str = "sign:";

/// 生成某用户某月的签到位图键，如 sign:5:202203
pub fn sign_key(user_id: i64, date: NaiveDate) -> String {
    format!("{}{}:{}{:02}", SIGN_PREFIX, user_id, date.year(), date.month())
}

use chrono::{Datelike, NaiveDate};

use crate::cache::keys::sign_keys::sign_key;
use crate::cache::store::{CacheError, CacheStore};

/// 签到位图操作。
/// 每用户每月一个位图，一位对应一天，1 表示已签到。
pub struct SignCacheOperations;

impl SignCacheOperations {
    /// 签到：把当月位图的第 (day-1) 位置 1，重复签到效果幂等
    pub async fn check_in<S: CacheStore>(
        store: &S,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<(), CacheError> {
        let key = sign_key(user_id, date);
        store.set_bit(&key, date.day() - 1).await
    }

    /// 截止 date 当天的连续签到天数。
    /// 读出本月前 day 位组成的无符号整数（当天落在最低位），
    /// 从最低位起数连续的 1，遇 0 截止；中断一天即归零
    pub async fn current_streak<S: CacheStore>(
        store: &S,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<u32, CacheError> {
        let key = sign_key(user_id, date);
        let Some(num) = store.bit_field_get(&key, date.day()).await? else {
            return Ok(0);
        };
        Ok(count_trailing_ones(num))
    }
}

/// 从最低位开始统计连续 1 的个数
fn count_trailing_ones(mut num: u64) -> u32 {
    let mut count = 0;
    while num & 1 == 1 {
        count += 1;
        num >>= 1;
    }
    count
}

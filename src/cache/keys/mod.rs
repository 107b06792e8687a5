// 缓存键统一在此构造，保证各组件命名空间一致

pub mod login_keys;
pub mod shop_keys;
pub mod sign_keys;

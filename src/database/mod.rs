// 数据库模块
// 包含实体模型与数据库操作逻辑，仅在缓存未命中或索引重建时触达

pub mod models;
pub mod operations;

//! 存储层
//!
//! - `traits`: 引擎依赖的抽象操作
//! - `redis_store`: 生产用 Redis 实现
//! - `memory_store`: 内存实现（测试、基准、本地演示）

mod memory_store;
mod redis_store;
mod traits;

pub use memory_store::MemoryRewardStore;
pub use redis_store::RedisRewardStore;
pub use traits::*;

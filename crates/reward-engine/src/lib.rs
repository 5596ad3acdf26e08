//! 条件奖励引擎
//!
//! 当调用方报告"用户触发了某个条件"时，查找该条件关联的奖励，
//! 过滤已禁用和已达领取上限的奖励，用调用方提供的探针取值并按奖励的
//! 比较器判断是否满足，最后对满足的奖励逐个通知发放处理器并记一次领取。
//!
//! ## 核心功能
//!
//! - **条件开关**：只有激活集合中的条件才会触发评估
//! - **奖励目录**：把存储中的松散记录规整为强类型的奖励定义
//! - **领取账本**：按用户记录领取次数，支持每用户上限
//! - **谓词评估**：按名称查找比较器，同一批候选并发评估
//! - **奖励发放**：按 `rid` 路由到发放处理器，串行执行"通知 -> 记账"
//!
//! ## 模块结构
//!
//! - `engine`: 编排入口
//! - `gate` / `catalog` / `ledger`: 存储之上的三个读写组件
//! - `evaluator` / `comparator` / `probe`: 谓词评估与扩展点
//! - `award`: 发放处理器注册与调度
//! - `store`: 存储抽象及 Redis、内存实现
//! - `keys`: 存储键生成
//! - `models`: 领域模型
//! - `error`: 错误类型定义

pub mod award;
pub mod catalog;
pub mod comparator;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod keys;
pub mod ledger;
pub mod models;
pub mod probe;
pub mod store;

pub use award::{AwardDispatcher, AwardHandler, AwardRegistry, LoggingAwardHandler, WILDCARD};
pub use comparator::{BuiltinOp, Comparator, ComparatorRegistry};
pub use engine::RewardEngine;
pub use error::{Result, RewardError};
pub use keys::KeySpace;
pub use models::*;
pub use probe::Probe;
pub use store::{MemoryRewardStore, RedisRewardStore, RewardStore};

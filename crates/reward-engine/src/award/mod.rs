//! 奖励发放模块
//!
//! ## 模块结构
//!
//! - `handler`: 发放处理器 Trait 与日志处理器
//! - `registry`: 按 `rid` 路由的处理器注册表，支持通配处理器
//! - `dispatcher`: 串行执行"通知 → 记领取"

mod dispatcher;
mod handler;
mod registry;

pub use dispatcher::AwardDispatcher;
pub use handler::{AwardHandler, LoggingAwardHandler};
pub use registry::{AwardRegistry, WILDCARD};

//! 发放处理器注册表
//!
//! 以 `rid` 为 key 管理处理器，同一个 `rid` 可以挂多个处理器，按注册顺序执行。
//! 以 [`WILDCARD`] 注册的处理器会收到所有奖励的通知，排在专属处理器之后。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::handler::AwardHandler;

/// 通配路由键
pub const WILDCARD: &str = "*";

/// 发放处理器注册表
#[derive(Default)]
pub struct AwardRegistry {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn AwardHandler>>>>,
}

impl AwardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `rid` 追加一个处理器
    pub fn register(&self, rid: impl Into<String>, handler: Arc<dyn AwardHandler>) -> &Self {
        let rid = rid.into();
        debug!(
            rid = %rid,
            description = handler.description(),
            "注册发放处理器"
        );
        self.handlers.write().entry(rid).or_default().push(handler);
        self
    }

    /// 注册接收全部奖励的处理器
    pub fn register_wildcard(&self, handler: Arc<dyn AwardHandler>) -> &Self {
        self.register(WILDCARD, handler)
    }

    /// 某个 `rid` 应通知的处理器：专属处理器在前，通配处理器在后
    pub fn handlers_for(&self, rid: &str) -> Vec<Arc<dyn AwardHandler>> {
        let handlers = self.handlers.read();
        let specific = handlers.get(rid).into_iter().flatten();
        let wildcard = (rid != WILDCARD)
            .then(|| handlers.get(WILDCARD))
            .flatten()
            .into_iter()
            .flatten();
        specific.chain(wildcard).cloned().collect()
    }

    pub fn contains(&self, rid: &str) -> bool {
        self.handlers.read().contains_key(rid)
    }

    /// 已注册的路由键（排序后返回）
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self.handlers.read().keys().cloned().collect();
        routes.sort();
        routes
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

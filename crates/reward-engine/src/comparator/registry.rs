//! 比较器注册表
//!
//! 以名称为 key 管理比较器实例。查找发生在每次评估时，因此启动后再注册的
//! 比较器也会立即生效；未注册的名称由评估器按"不满足"处理。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use super::Comparator;
use super::builtin::{BuiltinComparator, BuiltinOp};
use crate::error::Result;

/// 比较器注册表
pub struct ComparatorRegistry {
    comparators: RwLock<HashMap<String, Arc<dyn Comparator>>>,
}

impl ComparatorRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            comparators: RwLock::new(HashMap::new()),
        }
    }

    /// 创建包含全部内置比较器的注册表
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for op in BuiltinOp::ALL {
            registry.register(Arc::new(BuiltinComparator::new(op)));
        }
        info!(
            count = registry.len(),
            names = ?registry.names(),
            "内置比较器初始化完成"
        );
        registry
    }

    /// 注册比较器，同名比较器会被替换
    pub fn register(&self, comparator: Arc<dyn Comparator>) -> &Self {
        let name = comparator.name().to_string();
        debug!(name = %name, "注册比较器");
        self.comparators.write().insert(name, comparator);
        self
    }

    /// 以闭包注册比较器
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F) -> &Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.register(Arc::new(FnComparator::new(name, f)))
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> Option<Arc<dyn Comparator>> {
        self.comparators.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.comparators.read().contains_key(name)
    }

    /// 已注册的名称（排序后返回）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.comparators.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.comparators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparators.read().is_empty()
    }
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// 闭包比较器
pub struct FnComparator<F> {
    name: String,
    f: F,
}

impl<F> FnComparator<F>
where
    F: Fn(&Value, &Value) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> Comparator for FnComparator<F>
where
    F: Fn(&Value, &Value) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn compare(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok((self.f)(left, right))
    }
}

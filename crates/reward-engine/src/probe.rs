//! 取值探针
//!
//! 调用方提供"产生当前度量值"的能力。引擎只认一个统一的异步接口 [`Probe`]，
//! 同步取值通过适配器提升为异步，无需在运行时判断调用约定。
//!
//! ```ignore
//! use reward_engine::probe;
//!
//! let constant = probe::from_value(3);
//! let sync = probe::from_fn(|| Ok(serde_json::json!(post_count())));
//! let deferred = probe::from_async(|| async { fetch_streak().await });
//! ```

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// 取值探针
///
/// 每个候选奖励评估时各调用一次，调用之间没有顺序保证
#[async_trait]
pub trait Probe: Send + Sync {
    async fn produce(&self) -> Result<Value>;
}

/// 常量探针
#[derive(Debug, Clone)]
pub struct ValueProbe {
    value: Value,
}

#[async_trait]
impl Probe for ValueProbe {
    async fn produce(&self) -> Result<Value> {
        Ok(self.value.clone())
    }
}

/// 同步函数探针
pub struct FnProbe<F> {
    f: F,
}

#[async_trait]
impl<F> Probe for FnProbe<F>
where
    F: Fn() -> Result<Value> + Send + Sync,
{
    async fn produce(&self) -> Result<Value> {
        (self.f)()
    }
}

/// 异步函数探针
pub struct AsyncFnProbe<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Probe for AsyncFnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    async fn produce(&self) -> Result<Value> {
        (self.f)().await
    }
}

/// 由常量构造探针
pub fn from_value(value: impl Into<Value>) -> ValueProbe {
    ValueProbe {
        value: value.into(),
    }
}

/// 将同步函数提升为探针
pub fn from_fn<F>(f: F) -> FnProbe<F>
where
    F: Fn() -> Result<Value> + Send + Sync,
{
    FnProbe { f }
}

/// 将返回 Future 的函数包装为探针
pub fn from_async<F, Fut>(f: F) -> AsyncFnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    AsyncFnProbe { f }
}

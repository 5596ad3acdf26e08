//! 比较器扩展点
//!
//! 奖励的 `conditional` 字段按名称选择比较器，比较器判断探针取值（left）
//! 是否满足奖励阈值（right）。引擎不假设任何比较语义。
//!
//! ## 模块结构
//!
//! - `registry`: 按名称注册和查找比较器，支持运行期追加
//! - `builtin`: 内置比较器（eq / neq / gt / gte / lt / lte / in / contains）

mod builtin;
mod registry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use builtin::{BuiltinComparator, BuiltinOp};
pub use registry::{ComparatorRegistry, FnComparator};

/// 比较器 Trait
///
/// 实现应是 `(left, right)` 的纯函数；返回错误会使本次检查整体失败
#[async_trait]
pub trait Comparator: Send + Sync {
    /// 注册名称，对应奖励的 `conditional`
    fn name(&self) -> &str;

    async fn compare(&self, left: &Value, right: &Value) -> Result<bool>;
}

//! 内置比较器
//!
//! 存储中的阈值通常是字符串，数值比较会把数字字符串转换为浮点数。
//! 操作数无法比较时返回 `false` 而不是错误。

use async_trait::async_trait;
use serde_json::Value;

use super::Comparator;
use crate::error::Result;

/// 内置比较操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// right 为数组（或逗号分隔字符串），left 等于其中任意一项
    In,
    /// left 为字符串时做子串匹配，为数组时做元素匹配
    Contains,
}

impl BuiltinOp {
    pub const ALL: [BuiltinOp; 8] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::Contains,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Contains => "contains",
        }
    }

    pub fn apply(&self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Eq => loose_eq(left, right),
            Self::Neq => !loose_eq(left, right),
            Self::Gt => compare(left, right, |a, b| a > b),
            Self::Gte => compare(left, right, |a, b| a >= b),
            Self::Lt => compare(left, right, |a, b| a < b),
            Self::Lte => compare(left, right, |a, b| a <= b),
            Self::In => in_list(left, right),
            Self::Contains => contains(left, right),
        }
    }
}

impl std::fmt::Display for BuiltinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 内置比较器
#[derive(Debug, Clone, Copy)]
pub struct BuiltinComparator {
    op: BuiltinOp,
}

impl BuiltinComparator {
    pub fn new(op: BuiltinOp) -> Self {
        Self { op }
    }
}

#[async_trait]
impl Comparator for BuiltinComparator {
    fn name(&self) -> &str {
        self.op.name()
    }

    async fn compare(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.op.apply(left, right))
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        // "NaN"、"inf" 之类的文本不当作数字
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// 相等比较，数值统一转为浮点数（避免 1 与 "1"、100 与 100.0 不等）
fn loose_eq(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (as_f64(left), as_f64(right)) {
        return (a - b).abs() < f64::EPSILON;
    }
    match (left, right) {
        (Value::String(a), Value::Bool(b)) | (Value::Bool(b), Value::String(a)) => {
            a == &b.to_string()
        }
        _ => left == right,
    }
}

fn compare<F>(left: &Value, right: &Value, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (as_f64(left), as_f64(right)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn in_list(left: &Value, right: &Value) -> bool {
    match right {
        Value::Array(items) => items.iter().any(|item| loose_eq(left, item)),
        Value::String(s) => s
            .split(',')
            .any(|item| loose_eq(left, &Value::String(item.trim().to_string()))),
        _ => false,
    }
}

fn contains(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::Array(items), needle) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}

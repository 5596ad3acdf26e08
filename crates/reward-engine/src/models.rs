//! 奖励领域模型
//!
//! 存储层返回的是松散类型的字符串哈希，这里在目录边界统一规整为强类型结构。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 存储层对象（哈希）：字段名 -> 字符串值
pub type StoreObject = HashMap<String, String>;

/// 奖励载荷
///
/// 由奖励自身 id 解析出的不透明数据，原样交给发放处理器。
/// 已删除或从未配置的载荷为 `None`。
pub type RewardPayload = Option<StoreObject>;

/// 有序集合成员及其分数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

/// 奖励记录缺陷
///
/// 记录形状不合法时不抛错，而是按"不可领取"处理并记录原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDefect {
    #[error("缺少字段: {0}")]
    MissingField(&'static str),

    #[error("claimable 不是非负整数: {0:?}")]
    InvalidClaimable(String),
}

/// 奖励定义
///
/// 描述一条可发放奖励的规则与领取上限
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardDefinition {
    /// 奖励唯一标识
    pub id: String,
    /// 发放处理器路由键，可与 id 不同
    pub rid: String,
    /// 是否禁用
    pub disabled: bool,
    /// 每用户领取上限，0 表示不限
    pub claimable: u64,
    /// 比较器名称
    pub conditional: String,
    /// 比较器阈值
    pub value: Value,
}

impl RewardDefinition {
    /// 从存储对象规整出奖励定义
    ///
    /// - `disabled` 只有字面量 `"true"` 视为禁用
    /// - `claimable` 必须是非负整数（允许前后空白）
    /// - `value` 优先按 JSON 标量解析，失败则保留原始字符串
    /// - 缺少 `conditional` 视为空名称，之后比较器查找失败即不可领取
    pub fn from_object(object: &StoreObject) -> Result<Self, RecordDefect> {
        let id = non_empty(object, "id").ok_or(RecordDefect::MissingField("id"))?;
        let rid = non_empty(object, "rid").ok_or(RecordDefect::MissingField("rid"))?;

        let raw_claimable = object
            .get("claimable")
            .ok_or(RecordDefect::MissingField("claimable"))?;
        let claimable = raw_claimable
            .trim()
            .parse::<u64>()
            .map_err(|_| RecordDefect::InvalidClaimable(raw_claimable.clone()))?;

        Ok(Self {
            id,
            rid,
            disabled: object.get("disabled").is_some_and(|d| d == "true"),
            claimable,
            conditional: object.get("conditional").cloned().unwrap_or_default(),
            value: object
                .get("value")
                .map(|v| parse_scalar(v))
                .unwrap_or(Value::Null),
        })
    }

    /// 是否不限领取次数
    pub fn is_unlimited(&self) -> bool {
        self.claimable == 0
    }

    /// 在已领取 `claimed` 次的前提下是否仍可领取
    pub fn has_remaining_claims(&self, claimed: u64) -> bool {
        self.is_unlimited() || claimed < self.claimable
    }
}

fn non_empty(object: &StoreObject, field: &str) -> Option<String> {
    object.get(field).filter(|v| !v.is_empty()).cloned()
}

/// 将存储中的字符串阈值解析为 JSON 值
///
/// `"1"` -> 数字 1，`"true"` -> 布尔，`"gold"` -> 字符串 "gold"
pub fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// 发放事件
///
/// 交给发放处理器的通知内容
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardEvent {
    pub uid: String,
    /// 奖励定义
    pub reward_data: RewardDefinition,
    /// 奖励载荷
    pub reward: RewardPayload,
    pub awarded_at: DateTime<Utc>,
}

/// 跳过发放的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoOpReason {
    /// 条件未激活
    ConditionInactive,
    /// 没有启用且未达上限的候选奖励
    NoCandidates,
    /// 候选奖励的谓词均不满足
    NoneSatisfied,
}

impl NoOpReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConditionInactive => "CONDITION_INACTIVE",
            Self::NoCandidates => "NO_CANDIDATES",
            Self::NoneSatisfied => "NONE_SATISFIED",
        }
    }
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次条件检查的终态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    NoOp { reason: NoOpReason },
    Awarded { reward_ids: Vec<String> },
}

impl CheckOutcome {
    pub fn no_op(reason: NoOpReason) -> Self {
        Self::NoOp { reason }
    }

    pub fn is_awarded(&self) -> bool {
        matches!(self, Self::Awarded { .. })
    }

    /// 已发放的奖励 id，未发放时为空
    pub fn awarded_ids(&self) -> &[String] {
        match self {
            Self::Awarded { reward_ids } => reward_ids,
            Self::NoOp { .. } => &[],
        }
    }

    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoOp { reason } => reason.as_str(),
            Self::Awarded { .. } => "AWARDED",
        }
    }
}

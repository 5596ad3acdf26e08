//! 奖励目录
//!
//! 负责"条件 -> 奖励 id -> 奖励定义 -> 奖励载荷"的解析，并在此边界把
//! 存储中松散类型的记录规整为 [`RewardDefinition`]。
//!
//! 静态过滤规则：
//! - 不存在（已删除）的定义丢弃
//! - 形状不合法的定义丢弃并记录告警
//! - `disabled` 的定义丢弃

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::keys::KeySpace;
use crate::models::{RewardDefinition, RewardPayload};
use crate::store::RewardStore;

/// 奖励目录
pub struct RewardCatalog {
    store: Arc<dyn RewardStore>,
    keys: KeySpace,
}

impl RewardCatalog {
    pub fn new(store: Arc<dyn RewardStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// 条件关联的奖励 id
    pub async fn ids_for_condition(&self, condition: &str) -> Result<Vec<String>> {
        self.store
            .members_of(&self.keys.condition_rewards(condition))
            .await
    }

    /// 批量加载奖励定义
    ///
    /// 结果与 `ids` 按位置对齐；缺失或不合法的记录为 `None`
    pub async fn load_by_ids(&self, ids: &[String]) -> Result<Vec<Option<RewardDefinition>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.keys.reward(id)).collect();
        let objects = self.store.batch_get(&keys).await?;

        Ok(ids
            .iter()
            .zip(objects)
            .map(|(id, object)| {
                let object = object?;
                match RewardDefinition::from_object(&object) {
                    Ok(reward) => Some(reward),
                    Err(defect) => {
                        warn!(reward_id = %id, %defect, "奖励定义不合法，按不可领取处理");
                        None
                    }
                }
            })
            .collect())
    }

    /// 加载条件下全部启用的候选奖励
    pub async fn load_enabled(&self, condition: &str) -> Result<Vec<RewardDefinition>> {
        let ids = self.ids_for_condition(condition).await?;
        let rewards = self.load_by_ids(&ids).await?;
        Ok(Self::filter_enabled(rewards))
    }

    /// 丢弃缺失和已禁用的定义，保持原有顺序
    pub fn filter_enabled(rewards: Vec<Option<RewardDefinition>>) -> Vec<RewardDefinition> {
        rewards
            .into_iter()
            .flatten()
            .filter(|reward| {
                if reward.disabled {
                    debug!(reward_id = %reward.id, "奖励已禁用，跳过");
                }
                !reward.disabled
            })
            .collect()
    }

    /// 批量加载奖励载荷
    ///
    /// 以奖励自身 id（而非 rid）为键，每个输入对应一个输出，按位置对齐
    pub async fn load_payloads(&self, rewards: &[RewardDefinition]) -> Result<Vec<RewardPayload>> {
        if rewards.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = rewards
            .iter()
            .map(|reward| self.keys.reward_payload(&reward.id))
            .collect();
        let mut payloads = self.store.batch_get(&keys).await?;

        // 存储实现理应按位置对齐返回，这里兜底补齐
        payloads.resize(rewards.len(), None);
        Ok(payloads)
    }
}

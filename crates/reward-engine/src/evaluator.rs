//! 条件评估器
//!
//! 对每个候选奖励：调用探针取值，再按奖励的 `conditional` 找到比较器，
//! 以 `{left: 取值, right: 奖励阈值}` 判断是否满足。
//!
//! 同一批候选并发评估，等待全部完成；任一评估失败则整批失败（try_join_all 语义），
//! 其余未完成的评估随之被丢弃。

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use reward_shared::observability::metrics::record_reward_evaluation;

use crate::comparator::ComparatorRegistry;
use crate::error::Result;
use crate::models::RewardDefinition;
use crate::probe::Probe;

/// 条件评估器
pub struct ConditionEvaluator {
    comparators: Arc<ComparatorRegistry>,
}

impl ConditionEvaluator {
    pub fn new(comparators: Arc<ComparatorRegistry>) -> Self {
        Self { comparators }
    }

    pub fn comparators(&self) -> &Arc<ComparatorRegistry> {
        &self.comparators
    }

    /// 判断单个奖励的谓词是否成立
    ///
    /// 比较器在调用时才按名称查找；未注册的名称视为不满足
    pub async fn is_satisfied(&self, reward: &RewardDefinition, probe: &dyn Probe) -> Result<bool> {
        let value = probe.produce().await?;

        let Some(comparator) = self.comparators.get(&reward.conditional) else {
            debug!(
                reward_id = %reward.id,
                conditional = %reward.conditional,
                "比较器未注册，按不满足处理"
            );
            record_reward_evaluation(&reward.conditional, false);
            return Ok(false);
        };

        let satisfied = comparator.compare(&value, &reward.value).await?;
        debug!(
            reward_id = %reward.id,
            conditional = %reward.conditional,
            left = %value,
            right = %reward.value,
            satisfied,
            "谓词评估完成"
        );
        record_reward_evaluation(&reward.conditional, satisfied);
        Ok(satisfied)
    }

    /// 并发评估全部候选，结果与输入按位置对齐
    pub async fn evaluate_all(
        &self,
        rewards: &[RewardDefinition],
        probe: &dyn Probe,
    ) -> Result<Vec<bool>> {
        try_join_all(
            rewards
                .iter()
                .map(|reward| self.is_satisfied(reward, probe)),
        )
        .await
    }

    /// 保留谓词成立的奖励，保持原有相对顺序
    pub async fn filter_satisfied(
        &self,
        rewards: Vec<RewardDefinition>,
        probe: &dyn Probe,
    ) -> Result<Vec<RewardDefinition>> {
        let flags = self.evaluate_all(&rewards, probe).await?;
        Ok(rewards
            .into_iter()
            .zip(flags)
            .filter_map(|(reward, satisfied)| satisfied.then_some(reward))
            .collect())
    }
}

//! 发放调度
//!
//! 对每个已满足的奖励依次执行：通知处理器 → 记一次领取。
//! 严格串行：前一个奖励记账完成后才通知下一个奖励。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use reward_shared::observability::metrics::record_reward_award;

use super::registry::AwardRegistry;
use crate::error::Result;
use crate::ledger::ClaimLedger;
use crate::models::{AwardEvent, RewardDefinition, RewardPayload};

/// 发放调度器
pub struct AwardDispatcher {
    registry: Arc<AwardRegistry>,
    ledger: Arc<ClaimLedger>,
}

impl AwardDispatcher {
    pub fn new(registry: Arc<AwardRegistry>, ledger: Arc<ClaimLedger>) -> Self {
        Self { registry, ledger }
    }

    /// 发放奖励，返回已记账的奖励 id
    ///
    /// `payloads` 与 `rewards` 按位置对齐，缺失的位置按 `None` 处理。
    /// 处理器或记账失败时立即返回错误，此前已完成的奖励不回滚。
    pub async fn award(
        &self,
        uid: &str,
        rewards: &[RewardDefinition],
        payloads: Vec<RewardPayload>,
    ) -> Result<Vec<String>> {
        let mut payloads = payloads.into_iter();
        let mut awarded = Vec::with_capacity(rewards.len());

        for reward in rewards {
            let event = AwardEvent {
                uid: uid.to_string(),
                reward_data: reward.clone(),
                reward: payloads.next().flatten(),
                awarded_at: Utc::now(),
            };

            let handlers = self.registry.handlers_for(&reward.rid);
            if handlers.is_empty() {
                debug!(rid = %reward.rid, reward_id = %reward.id, "没有注册发放处理器");
            }

            for handler in handlers {
                if let Err(e) = handler.on_award(&event).await {
                    warn!(
                        uid = %uid,
                        reward_id = %reward.id,
                        rid = %reward.rid,
                        handler = handler.description(),
                        error = %e,
                        "发放处理器失败，终止本次发放"
                    );
                    return Err(e);
                }
            }

            let claimed = self.ledger.record_claim(uid, &reward.id).await?;
            record_reward_award(&reward.rid);
            info!(
                uid = %uid,
                reward_id = %reward.id,
                rid = %reward.rid,
                claimed,
                "奖励发放完成"
            );
            awarded.push(reward.id.clone());
        }

        Ok(awarded)
    }
}

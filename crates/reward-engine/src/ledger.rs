//! 领取账本
//!
//! 按用户记录每个奖励的领取次数（有序集合，member 为奖励 id，score 为次数）。
//!
//! ## 并发说明
//!
//! `filter_unclaimed` 与 `record_claim` 之间没有加锁，也没有比较后递增：
//! 同一用户对同一奖励的两次并发检查可能都读到低于上限的计数并各自发放，
//! 导致有上限的奖励被超发。这是"先读后增"模式的已知竞态，当前保留该行为。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::keys::KeySpace;
use crate::models::RewardDefinition;
use crate::store::RewardStore;

/// 领取账本
pub struct ClaimLedger {
    store: Arc<dyn RewardStore>,
    keys: KeySpace,
    page_limit: isize,
}

impl ClaimLedger {
    /// `page_limit` 为读取领取记录时的分页大小，负数表示不限
    pub fn new(store: Arc<dyn RewardStore>, keys: KeySpace, page_limit: isize) -> Self {
        Self {
            store,
            keys,
            page_limit,
        }
    }

    /// 用户全部领取计数：奖励 id -> 次数
    pub async fn claim_counts(&self, uid: &str) -> Result<HashMap<String, u64>> {
        let entries = self
            .store
            .range_by_score(
                &self.keys.user_rewards(uid),
                0.0,
                f64::INFINITY,
                0,
                self.page_limit,
            )
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| (entry.member, entry.score.max(0.0) as u64))
            .collect())
    }

    /// 过滤掉已达领取上限的奖励（纯过滤，不写存储）
    ///
    /// 没有领取记录的奖励按 0 次计算；`claimable == 0` 表示不限次数
    pub async fn filter_unclaimed(
        &self,
        uid: &str,
        rewards: Vec<RewardDefinition>,
    ) -> Result<Vec<RewardDefinition>> {
        if rewards.is_empty() {
            return Ok(rewards);
        }

        let counts = self.claim_counts(uid).await?;

        Ok(rewards
            .into_iter()
            .filter(|reward| {
                let claimed = counts.get(&reward.id).copied().unwrap_or(0);
                let remaining = reward.has_remaining_claims(claimed);
                if !remaining {
                    debug!(
                        reward_id = %reward.id,
                        claimed,
                        claimable = reward.claimable,
                        "已达领取上限"
                    );
                }
                remaining
            })
            .collect())
    }

    /// 记录一次领取，计数 +1（记录不存在时创建），返回新计数
    pub async fn record_claim(&self, uid: &str, reward_id: &str) -> Result<u64> {
        let score = self
            .store
            .increment_score(&self.keys.user_rewards(uid), 1.0, reward_id)
            .await?;
        Ok(score.max(0.0) as u64)
    }
}

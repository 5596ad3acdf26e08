//! 奖励引擎
//!
//! 对外唯一的入口：检查条件并为用户发放奖励。
//!
//! ## 处理流程
//!
//! 1. 条件开关 -> 2. 加载候选并过滤禁用 -> 3. 领取上限过滤
//!    -> 4. 并发评估谓词 -> 5. 加载载荷 -> 6. 串行发放并记账
//!
//! 任一步骤得到空集合即提前结束（no-op），不再访问存储。

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use reward_shared::config::EngineConfig;
use reward_shared::observability::metrics::record_reward_check;

use crate::award::{AwardDispatcher, AwardRegistry};
use crate::catalog::RewardCatalog;
use crate::comparator::ComparatorRegistry;
use crate::error::{Result, RewardError};
use crate::evaluator::ConditionEvaluator;
use crate::gate::ConditionGate;
use crate::keys::KeySpace;
use crate::ledger::ClaimLedger;
use crate::models::{CheckOutcome, NoOpReason};
use crate::probe::Probe;
use crate::store::RewardStore;

/// 奖励引擎
///
/// 无内部可变状态，可在多个任务间共享（`Arc<RewardEngine>`）。
/// 比较器与发放处理器通过注册表持有，引擎构造之后注册的扩展同样生效。
pub struct RewardEngine {
    gate: ConditionGate,
    catalog: RewardCatalog,
    ledger: Arc<ClaimLedger>,
    evaluator: ConditionEvaluator,
    dispatcher: AwardDispatcher,
    awards: Arc<AwardRegistry>,
}

impl RewardEngine {
    pub fn new(
        store: Arc<dyn RewardStore>,
        comparators: Arc<ComparatorRegistry>,
        awards: Arc<AwardRegistry>,
        config: &EngineConfig,
    ) -> Self {
        let keys = KeySpace::new(config.key_prefix.clone());
        let ledger = Arc::new(ClaimLedger::new(
            store.clone(),
            keys.clone(),
            config.claim_page_limit,
        ));

        Self {
            gate: ConditionGate::new(store.clone(), keys.clone()),
            catalog: RewardCatalog::new(store, keys),
            evaluator: ConditionEvaluator::new(comparators),
            dispatcher: AwardDispatcher::new(awards.clone(), ledger.clone()),
            ledger,
            awards,
        }
    }

    /// 比较器注册表
    pub fn comparators(&self) -> &Arc<ComparatorRegistry> {
        self.evaluator.comparators()
    }

    /// 发放处理器注册表
    pub fn awards(&self) -> &Arc<AwardRegistry> {
        &self.awards
    }

    /// 检查条件并为用户发放奖励
    ///
    /// 存储、比较器、探针和发放处理器的错误都原样返回。发放阶段中途失败时，
    /// 失败之前已通知并记账的奖励保持已发放状态。
    #[instrument(skip_all, fields(uid = %uid, condition = %condition))]
    pub async fn check_condition_and_reward_user(
        &self,
        uid: &str,
        condition: &str,
        probe: &dyn Probe,
    ) -> Result<CheckOutcome> {
        let start = Instant::now();
        let result = self.run_check(uid, condition, probe).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => {
                record_reward_check(outcome.label(), elapsed);
                debug!(outcome = outcome.label(), elapsed, "条件检查完成");
            }
            Err(e) => {
                record_reward_check(e.error_code(), elapsed);
                warn!(error = %e, code = e.error_code(), "条件检查失败");
            }
        }

        result
    }

    async fn run_check(&self, uid: &str, condition: &str, probe: &dyn Probe) -> Result<CheckOutcome> {
        if uid.is_empty() {
            return Err(RewardError::Validation("uid 不能为空".to_string()));
        }
        if condition.is_empty() {
            return Err(RewardError::Validation("condition 不能为空".to_string()));
        }

        if !self.gate.is_active(condition).await? {
            debug!("条件未激活");
            return Ok(CheckOutcome::no_op(NoOpReason::ConditionInactive));
        }

        let enabled = self.catalog.load_enabled(condition).await?;
        let candidates = self.ledger.filter_unclaimed(uid, enabled).await?;
        if candidates.is_empty() {
            debug!("没有可领取的候选奖励");
            return Ok(CheckOutcome::no_op(NoOpReason::NoCandidates));
        }

        let satisfied = self.evaluator.filter_satisfied(candidates, probe).await?;
        if satisfied.is_empty() {
            debug!("候选奖励均不满足条件");
            return Ok(CheckOutcome::no_op(NoOpReason::NoneSatisfied));
        }

        let payloads = self.catalog.load_payloads(&satisfied).await?;
        let reward_ids = self.dispatcher.award(uid, &satisfied, payloads).await?;

        info!(awarded = ?reward_ids, "奖励发放完成");
        Ok(CheckOutcome::Awarded { reward_ids })
    }
}

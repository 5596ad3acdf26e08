//! RewardEngine 端到端测试
//!
//! 使用 MemoryRewardStore 覆盖完整的"条件 -> 候选 -> 上限 -> 评估 -> 发放"流程，
//! 不依赖外部服务。

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Barrier;

use reward_engine::{
    AwardEvent, AwardHandler, AwardRegistry, CheckOutcome, ComparatorRegistry, MemoryRewardStore,
    NoOpReason, Result, RewardEngine, RewardError, probe,
};
use reward_shared::config::EngineConfig;

// ==================== 辅助类型 ====================

/// 记录每次通知，并在通知时读取当前领取计数
struct RecordingHandler {
    store: Arc<MemoryRewardStore>,
    prefix: String,
    seen: Mutex<Vec<(String, Option<f64>)>>,
}

impl RecordingHandler {
    fn new(store: Arc<MemoryRewardStore>) -> Self {
        Self::with_prefix(store, "")
    }

    fn with_prefix(store: Arc<MemoryRewardStore>, prefix: &str) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen_ids(&self) -> Vec<String> {
        self.seen.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl AwardHandler for RecordingHandler {
    async fn on_award(&self, event: &AwardEvent) -> Result<()> {
        let key = format!("{}uid:{}:rewards", self.prefix, event.uid);
        let score = self.store.score(&key, &event.reward_data.id);
        self.seen
            .lock()
            .push((event.reward_data.id.clone(), score));
        Ok(())
    }
}

/// 记录通知顺序，对指定奖励失败的处理器
struct FailOn {
    target: &'static str,
    notified: Mutex<Vec<String>>,
}

impl FailOn {
    fn new(target: &'static str) -> Self {
        Self {
            target,
            notified: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AwardHandler for FailOn {
    async fn on_award(&self, event: &AwardEvent) -> Result<()> {
        self.notified.lock().push(event.reward_data.id.clone());
        if event.reward_data.id == self.target {
            return Err(RewardError::AwardHandler {
                rid: event.reward_data.rid.clone(),
                message: "downstream unavailable".to_string(),
            });
        }
        Ok(())
    }
}

struct Fixture {
    store: Arc<MemoryRewardStore>,
    comparators: Arc<ComparatorRegistry>,
    awards: Arc<AwardRegistry>,
    engine: RewardEngine,
}

fn fixture() -> Fixture {
    fixture_with(EngineConfig::default())
}

fn fixture_with(config: EngineConfig) -> Fixture {
    let store = Arc::new(MemoryRewardStore::new());
    let comparators = Arc::new(ComparatorRegistry::with_builtins());
    let awards = Arc::new(AwardRegistry::new());
    let engine = RewardEngine::new(store.clone(), comparators.clone(), awards.clone(), &config);
    Fixture {
        store,
        comparators,
        awards,
        engine,
    }
}

/// 写入一条奖励定义并挂到条件下
fn seed_reward(
    store: &MemoryRewardStore,
    condition: &str,
    id: &str,
    claimable: &str,
    conditional: &str,
    value: &str,
) {
    store.add_to_set(format!("condition:{}:rewards", condition), id);
    store.put_object(
        format!("rewards:id:{}", id),
        [
            ("id", id),
            ("rid", "badge"),
            ("claimable", claimable),
            ("conditional", conditional),
            ("value", value),
        ],
    );
}

fn activate(store: &MemoryRewardStore, condition: &str) {
    store.add_to_set("conditions:active", condition);
}

// ==================== 基本流程 ====================

#[tokio::test]
async fn test_daily_login_awards_and_records_claim() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");
    f.store
        .put_object("rewards:id:R1:rewards", [("title", "First Login")]);

    let handler = Arc::new(RecordingHandler::new(f.store.clone()));
    f.awards.register("badge", handler.clone());

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CheckOutcome::Awarded {
            reward_ids: vec!["R1".to_string()]
        }
    );
    assert_eq!(handler.seen_ids(), ["R1"]);
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), Some(1.0));
}

#[tokio::test]
async fn test_award_event_carries_definition_and_payload() {
    struct Capture(Mutex<Option<AwardEvent>>);

    #[async_trait]
    impl AwardHandler for Capture {
        async fn on_award(&self, event: &AwardEvent) -> Result<()> {
            *self.0.lock() = Some(event.clone());
            Ok(())
        }
    }

    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");
    f.store
        .put_object("rewards:id:R1:rewards", [("title", "First Login")]);

    let capture = Arc::new(Capture(Mutex::new(None)));
    f.awards.register("badge", capture.clone());

    f.engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();

    let event = capture.0.lock().clone().unwrap();
    assert_eq!(event.uid, "u1");
    assert_eq!(event.reward_data.id, "R1");
    assert_eq!(event.reward_data.value, json!(1));
    let payload = event.reward.unwrap();
    assert_eq!(payload.get("title").map(String::as_str), Some("First Login"));
}

#[tokio::test]
async fn test_already_claimed_is_noop_without_notification() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");
    f.store.set_score("uid:u1:rewards", "R1", 1.0);

    let handler = Arc::new(RecordingHandler::new(f.store.clone()));
    f.awards.register("badge", handler.clone());

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();

    assert_eq!(outcome, CheckOutcome::no_op(NoOpReason::NoCandidates));
    assert!(handler.seen_ids().is_empty());
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), Some(1.0));
}

#[tokio::test]
async fn test_inactive_condition_is_noop() {
    let f = fixture();
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();

    assert_eq!(outcome, CheckOutcome::no_op(NoOpReason::ConditionInactive));
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), None);
}

#[tokio::test]
async fn test_unsatisfied_predicate_not_awarded() {
    let f = fixture();
    activate(&f.store, "level-up");
    seed_reward(&f.store, "level-up", "R2", "1", "eq", "gold");

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "level-up", &probe::from_value("silver"))
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutcome::no_op(NoOpReason::NoneSatisfied));

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "level-up", &probe::from_value("gold"))
        .await
        .unwrap();
    assert_eq!(outcome.awarded_ids(), ["R2".to_string()]);
}

// ==================== 静态过滤 ====================

#[tokio::test]
async fn test_disabled_reward_is_never_evaluated() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "0", "gte", "1");
    seed_reward(&f.store, "daily-login", "R2", "0", "gte", "1");
    f.store.put_object(
        "rewards:id:R2",
        [
            ("id", "R2"),
            ("rid", "badge"),
            ("claimable", "0"),
            ("conditional", "gte"),
            ("value", "1"),
            ("disabled", "true"),
        ],
    );

    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let probe = probe::from_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(json!(1))
    });

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe)
        .await
        .unwrap();
    assert_eq!(outcome.awarded_ids(), ["R1".to_string()]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.store.score("uid:u1:rewards", "R2"), None);
}

#[tokio::test]
async fn test_deleted_and_malformed_definitions_are_skipped() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");
    // R2 的定义已被删除，id 仍挂在条件下
    seed_reward(&f.store, "daily-login", "R2", "1", "gte", "1");
    f.store.delete_object("rewards:id:R2");
    // R3 的 claimable 不合法
    seed_reward(&f.store, "daily-login", "R3", "lots", "gte", "1");

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();
    assert_eq!(outcome.awarded_ids(), ["R1".to_string()]);
    assert_eq!(f.store.score("uid:u1:rewards", "R2"), None);
    assert_eq!(f.store.score("uid:u1:rewards", "R3"), None);
}

// ==================== 领取上限 ====================

#[tokio::test]
async fn test_unlimited_reward_awarded_every_time() {
    let f = fixture();
    activate(&f.store, "post-created");
    seed_reward(&f.store, "post-created", "R3", "0", "gte", "1");

    for _ in 0..3 {
        let outcome = f
            .engine
            .check_condition_and_reward_user("u1", "post-created", &probe::from_value(1))
            .await
            .unwrap();
        assert!(outcome.is_awarded());
    }
    assert_eq!(f.store.score("uid:u1:rewards", "R3"), Some(3.0));
}

#[tokio::test]
async fn test_cap_reached_after_claimable_awards() {
    let f = fixture();
    activate(&f.store, "post-created");
    seed_reward(&f.store, "post-created", "R1", "2", "gte", "1");

    for expected in [true, true, false] {
        let outcome = f
            .engine
            .check_condition_and_reward_user("u1", "post-created", &probe::from_value(1))
            .await
            .unwrap();
        assert_eq!(outcome.is_awarded(), expected);
    }
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), Some(2.0));
    // 其他用户不受影响
    assert_eq!(f.store.score("uid:u2:rewards", "R1"), None);
}

// ==================== 发放顺序与失败 ====================

#[tokio::test]
async fn test_claim_recorded_after_notification() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "0", "gte", "1");
    f.store.set_score("uid:u1:rewards", "R1", 4.0);

    let handler = Arc::new(RecordingHandler::new(f.store.clone()));
    f.awards.register("badge", handler.clone());

    f.engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();

    // 通知时看到的是递增前的计数
    assert_eq!(*handler.seen.lock(), [("R1".to_string(), Some(4.0))]);
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), Some(5.0));
}

#[tokio::test]
async fn test_handler_failure_leaves_later_rewards_unrecorded() {
    let f = fixture();
    activate(&f.store, "daily-login");
    for id in ["R1", "R2", "R3"] {
        seed_reward(&f.store, "daily-login", id, "1", "gte", "1");
    }
    let handler = Arc::new(FailOn::new("R2"));
    f.awards.register("badge", handler.clone());

    let err = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap_err();
    assert!(matches!(err, RewardError::AwardHandler { .. }));

    // 集合成员顺序不固定：失败之前的奖励已记账，失败的和之后的都未记账
    let notified = handler.notified.lock().clone();
    assert_eq!(notified.last().map(String::as_str), Some("R2"));
    for id in ["R1", "R2", "R3"] {
        let recorded = f.store.score("uid:u1:rewards", id).is_some();
        let before_failure = notified.iter().any(|n| n == id) && id != "R2";
        assert_eq!(recorded, before_failure, "reward {}", id);
    }
}

#[tokio::test]
async fn test_wildcard_handler_notified_for_every_reward() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");
    seed_reward(&f.store, "daily-login", "R2", "1", "lte", "5");

    let audit = Arc::new(RecordingHandler::new(f.store.clone()));
    f.awards.register_wildcard(audit.clone());

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(3))
        .await
        .unwrap();

    let mut awarded = outcome.awarded_ids().to_vec();
    awarded.sort();
    assert_eq!(awarded, ["R1", "R2"]);
    // 通知顺序与发放顺序一致
    assert_eq!(audit.seen_ids(), outcome.awarded_ids());
}

#[tokio::test]
async fn test_candidate_evaluations_run_concurrently() {
    let f = fixture();
    activate(&f.store, "daily-login");
    for id in ["R1", "R2", "R3"] {
        seed_reward(&f.store, "daily-login", id, "0", "gte", "1");
    }

    // 三次取值必须同时到达屏障才能继续，串行评估会一直阻塞
    let barrier = Arc::new(Barrier::new(3));
    let probe = probe::from_async(move || {
        let barrier = barrier.clone();
        async move {
            barrier.wait().await;
            Ok::<_, RewardError>(json!(1))
        }
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        f.engine
            .check_condition_and_reward_user("u1", "daily-login", &probe),
    )
    .await
    .expect("评估未并发执行")
    .unwrap();

    let mut awarded = outcome.awarded_ids().to_vec();
    awarded.sort();
    assert_eq!(awarded, ["R1", "R2", "R3"]);
}

// ==================== 扩展点 ====================

#[tokio::test]
async fn test_unknown_comparator_until_late_registration() {
    let f = fixture();
    activate(&f.store, "streak");
    seed_reward(&f.store, "streak", "R1", "1", "divisible-by", "7");

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "streak", &probe::from_value(14))
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutcome::no_op(NoOpReason::NoneSatisfied));

    f.comparators.register_fn("divisible-by", |left, right| {
        match (left.as_u64(), right.as_u64()) {
            (Some(l), Some(r)) if r != 0 => l % r == 0,
            _ => false,
        }
    });

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "streak", &probe::from_value(14))
        .await
        .unwrap();
    assert_eq!(outcome.awarded_ids(), ["R1".to_string()]);
}

#[tokio::test]
async fn test_async_probe_failure_propagates() {
    let f = fixture();
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");

    let probe = probe::from_async(|| async {
        tokio::task::yield_now().await;
        Err::<serde_json::Value, _>(RewardError::Probe("metrics backend down".to_string()))
    });

    let err = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe)
        .await
        .unwrap_err();
    assert!(matches!(err, RewardError::Probe(_)));
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), None);
}

// ==================== 配置 ====================

#[tokio::test]
async fn test_key_prefix_namespaces_every_key() {
    let f = fixture_with(EngineConfig {
        key_prefix: Some("tenant-a".to_string()),
        ..EngineConfig::default()
    });

    // 无前缀的数据不可见
    activate(&f.store, "daily-login");
    seed_reward(&f.store, "daily-login", "R1", "1", "gte", "1");
    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutcome::no_op(NoOpReason::ConditionInactive));

    f.store.add_to_set("tenant-a:conditions:active", "daily-login");
    f.store
        .add_to_set("tenant-a:condition:daily-login:rewards", "R1");
    f.store.put_object(
        "tenant-a:rewards:id:R1",
        [
            ("id", "R1"),
            ("rid", "badge"),
            ("claimable", "1"),
            ("conditional", "gte"),
            ("value", "1"),
        ],
    );

    let handler = Arc::new(RecordingHandler::with_prefix(f.store.clone(), "tenant-a:"));
    f.awards.register("badge", handler.clone());

    let outcome = f
        .engine
        .check_condition_and_reward_user("u1", "daily-login", &probe::from_value(1))
        .await
        .unwrap();
    assert_eq!(outcome.awarded_ids(), ["R1".to_string()]);
    assert_eq!(f.store.score("tenant-a:uid:u1:rewards", "R1"), Some(1.0));
    assert_eq!(f.store.score("uid:u1:rewards", "R1"), None);
    assert_eq!(*handler.seen.lock(), [("R1".to_string(), None)]);
}

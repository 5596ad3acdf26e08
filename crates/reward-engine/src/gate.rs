//! 条件开关

use std::sync::Arc;

use crate::error::Result;
use crate::keys::KeySpace;
use crate::store::RewardStore;

/// 条件开关
///
/// 判断条件是否在激活集合中。查询失败直接向上传播，不重试。
pub struct ConditionGate {
    store: Arc<dyn RewardStore>,
    keys: KeySpace,
}

impl ConditionGate {
    pub fn new(store: Arc<dyn RewardStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    pub async fn is_active(&self, condition: &str) -> Result<bool> {
        self.store
            .is_member(&self.keys.active_conditions(), condition)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewardError;
    use crate::store::MockRewardStore;

    #[tokio::test]
    async fn test_is_active_queries_active_set() {
        let mut store = MockRewardStore::new();
        store
            .expect_is_member()
            .withf(|key, member| key == "conditions:active" && member == "daily-login")
            .times(1)
            .returning(|_, _| Ok(true));

        let gate = ConditionGate::new(Arc::new(store), KeySpace::default());
        assert!(gate.is_active("daily-login").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockRewardStore::new();
        store
            .expect_is_member()
            .returning(|_, _| Err(RewardError::Store("connection refused".to_string())));

        let gate = ConditionGate::new(Arc::new(store), KeySpace::default());
        let err = gate.is_active("daily-login").await.unwrap_err();
        assert!(matches!(err, RewardError::Store(_)));
    }
}

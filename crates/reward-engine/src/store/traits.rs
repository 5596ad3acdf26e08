//! 存储 Trait 定义
//!
//! 引擎只依赖这组抽象操作，便于替换底层存储并支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ScoredMember, StoreObject};

/// 奖励存储接口
///
/// 集合、哈希和有序集合的最小操作集。实现方负责把底层错误转换为 `RewardError`，
/// 引擎不做重试。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// 集合成员判断
    async fn is_member(&self, set_key: &str, member: &str) -> Result<bool>;

    /// 集合全部成员
    async fn members_of(&self, set_key: &str) -> Result<Vec<String>>;

    /// 批量读取哈希对象，结果与 `keys` 按位置对齐，不存在的对象为 `None`
    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<StoreObject>>>;

    /// 按分数区间读取有序集合（闭区间），`limit` 为负数表示不限
    async fn range_by_score(
        &self,
        sorted_set_key: &str,
        min_score: f64,
        max_score: f64,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<ScoredMember>>;

    /// 增加成员分数，成员不存在时以 0 起算，返回新分数
    async fn increment_score(&self, sorted_set_key: &str, delta: f64, member: &str) -> Result<f64>;
}

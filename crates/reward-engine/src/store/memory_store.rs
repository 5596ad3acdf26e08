//! 内存存储实现
//!
//! 语义与 Redis 实现保持一致，用于单元/集成测试、基准测试和本地演示。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use dashmap::DashMap;

use super::traits::RewardStore;
use crate::error::Result;
use crate::models::{ScoredMember, StoreObject};

/// 内存奖励存储
#[derive(Debug, Default)]
pub struct MemoryRewardStore {
    sets: DashMap<String, HashSet<String>>,
    objects: DashMap<String, StoreObject>,
    sorted_sets: DashMap<String, HashMap<String, f64>>,
}

impl MemoryRewardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向集合添加成员
    pub fn add_to_set(&self, set_key: impl Into<String>, member: impl Into<String>) {
        self.sets
            .entry(set_key.into())
            .or_default()
            .insert(member.into());
    }

    /// 从集合移除成员
    pub fn remove_from_set(&self, set_key: &str, member: &str) {
        if let Some(mut set) = self.sets.get_mut(set_key) {
            set.remove(member);
        }
    }

    /// 写入哈希对象（整体覆盖）
    pub fn put_object<I, K, V>(&self, key: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let object: StoreObject = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.objects.insert(key.into(), object);
    }

    /// 删除哈希对象
    pub fn delete_object(&self, key: &str) {
        self.objects.remove(key);
    }

    /// 直接设置有序集合成员分数
    pub fn set_score(&self, sorted_set_key: impl Into<String>, member: impl Into<String>, score: f64) {
        self.sorted_sets
            .entry(sorted_set_key.into())
            .or_default()
            .insert(member.into(), score);
    }

    /// 读取有序集合成员分数
    pub fn score(&self, sorted_set_key: &str, member: &str) -> Option<f64> {
        self.sorted_sets
            .get(sorted_set_key)
            .and_then(|zset| zset.get(member).copied())
    }
}

#[async_trait]
impl RewardStore for MemoryRewardStore {
    async fn is_member(&self, set_key: &str, member: &str) -> Result<bool> {
        Ok(self
            .sets
            .get(set_key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn members_of(&self, set_key: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .get(set_key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<StoreObject>>> {
        Ok(keys
            .iter()
            .map(|key| {
                self.objects
                    .get(key)
                    .map(|obj| obj.value().clone())
                    .filter(|obj| !obj.is_empty())
            })
            .collect())
    }

    async fn range_by_score(
        &self,
        sorted_set_key: &str,
        min_score: f64,
        max_score: f64,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<ScoredMember>> {
        let Some(zset) = self.sorted_sets.get(sorted_set_key) else {
            return Ok(Vec::new());
        };

        let mut members: Vec<ScoredMember> = zset
            .iter()
            .filter(|(_, score)| **score >= min_score && **score <= max_score)
            .map(|(member, score)| ScoredMember::new(member.clone(), *score))
            .collect();
        drop(zset);

        // 与 Redis 一致：先按分数，再按成员字典序
        members.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.member.cmp(&b.member))
        });

        let skip = offset.max(0) as usize;
        let iter = members.into_iter().skip(skip);
        Ok(if limit < 0 {
            iter.collect()
        } else {
            iter.take(limit as usize).collect()
        })
    }

    async fn increment_score(&self, sorted_set_key: &str, delta: f64, member: &str) -> Result<f64> {
        let mut zset = self.sorted_sets.entry(sorted_set_key.to_string()).or_default();
        let score = zset.entry(member.to_string()).or_insert(0.0);
        *score += delta;
        Ok(*score)
    }
}

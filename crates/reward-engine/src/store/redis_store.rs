//! Redis 存储实现
//!
//! 直接映射到 SISMEMBER / SMEMBERS / HGETALL / ZRANGEBYSCORE / ZINCRBY

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::{debug, instrument};

use reward_shared::config::RedisConfig;
use reward_shared::connection::RedisConnector;

use super::traits::RewardStore;
use crate::error::Result;
use crate::models::{ScoredMember, StoreObject};

/// Redis 奖励存储
///
/// 建立一次多路复用连接后在所有调用间共享（clone 开销很小）
#[derive(Clone)]
pub struct RedisRewardStore {
    conn: MultiplexedConnection,
}

impl RedisRewardStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// 根据配置建立连接并做一次健康检查
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let connector = RedisConnector::new(config)?;
        connector.health_check().await?;
        let conn = connector.connection().await?;
        Ok(Self::new(conn))
    }
}

/// 分数边界转为 Redis 参数，无穷大写作 +inf / -inf
fn score_bound(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

#[async_trait]
impl RewardStore for RedisRewardStore {
    async fn is_member(&self, set_key: &str, member: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = redis::cmd("SISMEMBER")
            .arg(set_key)
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(exists)
    }

    async fn members_of(&self, set_key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(set_key)
            .query_async(&mut conn)
            .await?;
        Ok(members)
    }

    #[instrument(skip(self, keys), fields(count = keys.len()))]
    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<StoreObject>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("HGETALL").arg(key);
        }

        let mut conn = self.conn.clone();
        let objects: Vec<StoreObject> = pipe.query_async(&mut conn).await?;
        debug!("批量读取 {} 个对象", objects.len());

        // HGETALL 对不存在的键返回空哈希
        Ok(objects
            .into_iter()
            .map(|obj| if obj.is_empty() { None } else { Some(obj) })
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
        let mut conn = self.conn.clone();
        let pairs: Vec<(String, f64)> = redis::cmd("ZRANGEBYSCORE")
            .arg(sorted_set_key)
            .arg(score_bound(min_score))
            .arg(score_bound(max_score))
            .arg("WITHSCORES")
            .arg("LIMIT")
            .arg(offset)
            .arg(limit)
            .query_async(&mut conn)
            .await?;

        Ok(pairs
            .into_iter()
            .map(|(member, score)| ScoredMember { member, score })
            .collect())
    }

    async fn increment_score(&self, sorted_set_key: &str, delta: f64, member: &str) -> Result<f64> {
        let mut conn = self.conn.clone();
        let score: f64 = redis::cmd("ZINCRBY")
            .arg(sorted_set_key)
            .arg(delta)
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(score)
    }
}

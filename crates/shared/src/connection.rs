//! Redis 连接管理模块
//!
//! 封装 Redis 客户端创建、多路复用连接获取和健康检查。

use crate::config::RedisConfig;
use crate::error::{Result, SharedError};
use redis::Client;
use redis::aio::MultiplexedConnection;
use tracing::info;

/// Redis 连接器
///
/// 持有 Client，按需建立多路复用连接。MultiplexedConnection 本身可廉价 clone，
/// 上层存储实现通常只建立一次连接后复用。
#[derive(Clone)]
pub struct RedisConnector {
    client: Client,
}

impl RedisConnector {
    /// 创建 Redis 客户端
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!("Redis client created");
        Ok(Self { client })
    }

    /// 获取连接
    pub async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(SharedError::from)
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(SharedError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
        };
        let err = RedisConnector::new(&config).err().unwrap();
        assert_eq!(err.code(), "REDIS_ERROR");
    }

    #[test]
    fn test_valid_url_accepted_without_connecting() {
        let config = RedisConfig::default();
        assert!(RedisConnector::new(&config).is_ok());
    }
}

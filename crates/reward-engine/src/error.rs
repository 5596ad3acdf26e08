//! 奖励引擎错误类型
//!
//! 存储和扩展点（比较器、发放处理器、探针）的失败一律原样向调用方传播；
//! 奖励数据形状异常（缺失、字段格式错误）不在此列，由目录层按"不可领取"吸收。

use thiserror::Error;

use reward_shared::error::SharedError;

/// 奖励引擎错误类型
#[derive(Debug, Error)]
pub enum RewardError {
    // === 扩展点错误 ===
    #[error("比较器执行失败: conditional={conditional}, {message}")]
    Comparator {
        conditional: String,
        message: String,
    },

    #[error("发放处理器执行失败: rid={rid}, {message}")]
    AwardHandler { rid: String, message: String },

    #[error("取值探针执行失败: {0}")]
    Probe(String),

    // === 系统错误 ===
    #[error("存储错误: {0}")]
    Store(String),

    #[error("Redis 错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Shared(#[from] SharedError),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 奖励引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, RewardError>;

impl RewardError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(_) | Self::Redis(_) => true,
            Self::Shared(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// 是否由外部扩展点（比较器、处理器、探针）引发
    pub fn is_extension_error(&self) -> bool {
        matches!(
            self,
            Self::Comparator { .. } | Self::AwardHandler { .. } | Self::Probe(_)
        )
    }

    /// 获取错误码（用于日志和指标）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Comparator { .. } => "COMPARATOR_FAILED",
            Self::AwardHandler { .. } => "AWARD_HANDLER_FAILED",
            Self::Probe(_) => "PROBE_FAILED",
            Self::Store(_) => "STORE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Shared(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

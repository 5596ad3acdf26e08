//! 发放处理器 Trait 定义

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::models::AwardEvent;

/// 发放处理器 Trait
///
/// 奖励被判定为可发放时，按奖励的 `rid` 路由到已注册的处理器。
/// 处理器负责实际的权益下发（发券、加积分、推送通知等），引擎只负责
/// 在处理器成功返回后记一次领取。
///
/// # 示例
///
/// ```ignore
/// struct BadgeHandler {
///     client: BadgeServiceClient,
/// }
///
/// #[async_trait]
/// impl AwardHandler for BadgeHandler {
///     async fn on_award(&self, event: &AwardEvent) -> Result<()> {
///         self.client.grant(&event.uid, &event.reward_data.id).await?;
///         Ok(())
///     }
/// }
/// ```
///
/// # 失败语义
///
/// 返回错误会中止本次发放：当前奖励不记领取，后续奖励不再通知，
/// 此前已通知并记账的奖励保持不变。
#[async_trait]
pub trait AwardHandler: Send + Sync {
    /// 处理器描述，用于日志
    fn description(&self) -> &'static str {
        "award handler"
    }

    async fn on_award(&self, event: &AwardEvent) -> Result<()>;
}

/// 仅记录日志的处理器
///
/// 命令行工具默认以通配方式注册，便于观察发放结果
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAwardHandler;

#[async_trait]
impl AwardHandler for LoggingAwardHandler {
    fn description(&self) -> &'static str {
        "logging"
    }

    async fn on_award(&self, event: &AwardEvent) -> Result<()> {
        info!(
            uid = %event.uid,
            reward_id = %event.reward_data.id,
            rid = %event.reward_data.rid,
            has_payload = event.reward.is_some(),
            awarded_at = %event.awarded_at,
            "奖励已发放"
        );
        Ok(())
    }
}

//! 奖励引擎命令行入口
//!
//! 连接 Redis，对指定用户执行一次条件检查并输出结果。

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use reward_engine::models::parse_scalar;
use reward_engine::{
    AwardRegistry, ComparatorRegistry, LoggingAwardHandler, RedisRewardStore, RewardEngine, probe,
};
use reward_shared::{config::AppConfig, observability};

/// 条件奖励检查工具
#[derive(Parser, Debug)]
#[command(name = "reward-engine")]
#[command(version, about = "检查条件并为用户发放奖励")]
struct Cli {
    /// 用户 ID
    #[arg(short, long)]
    uid: String,

    /// 条件名称，如 daily-login
    #[arg(short, long)]
    condition: String,

    /// 探针取值，按 JSON 解析，解析失败时作为字符串（如 3、true、gold）
    #[arg(short, long)]
    value: String,

    /// 覆盖配置中的 Redis 地址
    #[arg(long)]
    redis_url: Option<String>,

    /// 覆盖配置中的键前缀
    #[arg(long)]
    key_prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. 加载配置，命令行参数优先
    let mut config = AppConfig::load("reward-engine").context("加载配置失败")?;
    if let Some(url) = cli.redis_url {
        config.redis.url = url;
    }
    if cli.key_prefix.is_some() {
        config.engine.key_prefix = cli.key_prefix;
    }

    // 2. 可观测性
    let _guard = observability::init(&config.service_name, &config.observability).await?;
    info!(environment = %config.environment, "Configuration loaded");

    // 3. 存储与扩展点
    let store = RedisRewardStore::connect(&config.redis)
        .await
        .context("连接 Redis 失败")?;
    info!("Redis connection established");

    let comparators = Arc::new(ComparatorRegistry::with_builtins());
    let awards = Arc::new(AwardRegistry::new());
    awards.register_wildcard(Arc::new(LoggingAwardHandler));

    let engine = RewardEngine::new(Arc::new(store), comparators, awards, &config.engine);

    // 4. 执行检查
    let probe = probe::from_value(parse_scalar(&cli.value));
    let outcome = engine
        .check_condition_and_reward_user(&cli.uid, &cli.condition, &probe)
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

//! 诊所洞察命令行工具

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info};

use clinic_admin::{logging, ConfigManager, InsightsService};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "clinic-cli")]
#[command(about = "为诊所生成仪表盘洞察（患者、预约、财务、临床）")]
struct Args {
    /// 诊所所有者ID
    owner_id: String,

    /// 快照目录，覆盖配置中的 source.data_dir
    #[arg(short, long)]
    data_dir: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 锚点日期 (YYYY-MM-DD)，默认今天
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// 日志级别，覆盖配置中的 logging.level
    #[arg(short, long)]
    log_level: Option<String>,

    /// 在标准错误输出 Prometheus 指标
    #[arg(long)]
    metrics: bool,

    /// 输出单行 JSON
    #[arg(long)]
    compact: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("无效日期 {}: {}", value, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置，命令行参数优先
    let loaded = match &args.config {
        Some(path) => ConfigManager::new(path)?,
        None => ConfigManager::from_env()?,
    };
    let mut config = loaded.get_config().await;
    if let Some(data_dir) = &args.data_dir {
        config.source.data_dir = data_dir.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.metrics {
        config.metrics.enabled = true;
    }
    let config_manager = Arc::new(ConfigManager::from_config(config.clone())?);

    // 初始化日志
    logging::init_logging(&config.logging)?;

    info!("Generating insights for owner {}", args.owner_id);
    info!("  Data directory: {}", config.source.data_dir);
    info!(
        "  Windows: {} months, {} days",
        config.insights.monthly_window, config.insights.daily_window
    );

    let service = InsightsService::from_config(config_manager).await?;
    let report = match service.generate_report(&args.owner_id, args.as_of).await {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to generate insights: {:#}", e);
            return Err(e);
        }
    };

    let output = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("Failed to serialize report")?;
    println!("{}", output);

    if args.metrics {
        if let Some(text) = service.metrics_text()? {
            eprintln!("{}", text);
        }
    }

    Ok(())
}

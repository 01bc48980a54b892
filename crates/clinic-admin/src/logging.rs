//! 日志初始化
//!
//! 按配置安装全局 tracing 订阅者，`RUST_LOG` 优先于配置文件中的级别

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// 构造日志过滤器
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    filter_from_config(config)
}

fn filter_from_config(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level: {}", config.level))
}

/// 安装全局日志订阅者
///
/// 重复调用时返回错误，调用方可以忽略。
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match config.format.as_str() {
        "compact" => builder.compact().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_config() {
        let config = LoggingConfig {
            level: "clinic_insights=debug,warn".to_string(),
            ..Default::default()
        };
        assert!(filter_from_config(&config).is_ok());

        let config = LoggingConfig {
            level: "clinic=notalevel".to_string(),
            ..Default::default()
        };
        assert!(filter_from_config(&config).is_err());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}

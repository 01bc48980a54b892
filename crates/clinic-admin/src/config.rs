//! 配置管理
//!
//! 提供统一的配置管理功能：默认值、TOML 文件、`CLINIC__` 前缀的环境变量覆盖，以及规则校验

use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};
use tracing::{info, error};
use config::{Config, Environment, File};
use chrono::NaiveDate;

use clinic_insights::InsightsContext;
use clinic_insights::context::{DEFAULT_DAILY_WINDOW, DEFAULT_MONTHLY_WINDOW, DEFAULT_TOP_MEDICATIONS};

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<ClinicConfig>>,
    /// 配置文件路径
    config_path: Option<String>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 系统完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// 洞察计算配置
    pub insights: InsightsSettings,
    /// 数据源配置
    pub source: SourceConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 指标导出配置
    pub metrics: MetricsConfig,
}

/// 洞察计算配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsSettings {
    /// 月度序列覆盖的月份数
    pub monthly_window: u32,
    /// 每日序列覆盖的天数
    pub daily_window: u32,
    /// 常用药品榜单长度
    pub top_medications: usize,
}

/// 数据源配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 快照文件目录
    pub data_dir: String,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或 EnvFilter 指令
    pub level: String,
    /// 输出格式：full / compact / pretty
    pub format: String,
    /// 是否输出 target
    pub with_target: bool,
}

/// 指标导出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 是否启用
    pub enabled: bool,
    /// 指标名前缀
    pub namespace: String,
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: String,
    /// 验证函数
    validator: fn(&ClinicConfig) -> Result<()>,
    /// 错误消息
    error_message: String,
}

impl ConfigManager {
    /// 从文件和环境变量创建配置管理器
    pub fn new(config_path: &str) -> Result<Self> {
        let config = Self::load_config(Some(config_path))?;
        Self::with_config(config, Some(config_path.to_string()))
    }

    /// 仅使用默认值和环境变量
    pub fn from_env() -> Result<Self> {
        let config = Self::load_config(None)?;
        Self::with_config(config, None)
    }

    /// 使用给定配置，不关联文件
    pub fn from_config(config: ClinicConfig) -> Result<Self> {
        Self::with_config(config, None)
    }

    fn with_config(config: ClinicConfig, config_path: Option<String>) -> Result<Self> {
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            validator,
        })
    }

    /// 加载配置：默认值 < 文件 < 环境变量
    fn load_config(config_path: Option<&str>) -> Result<ClinicConfig> {
        let defaults = Config::try_from(&ClinicConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix("CLINIC").separator("__"))
            .build()?;

        let config: ClinicConfig = settings.try_deserialize()
            .context("Failed to deserialize configuration")?;

        info!("Configuration loaded from: {}", config_path.unwrap_or("<defaults>"));
        Ok(config)
    }

    /// 获取配置
    pub async fn get_config(&self) -> ClinicConfig {
        let config = self.config.read().await;
        config.clone()
    }

    /// 按配置生成聚合上下文
    pub async fn insights_context(&self, as_of: Option<NaiveDate>) -> InsightsContext {
        let config = self.config.read().await;
        let base = match as_of {
            Some(date) => InsightsContext::as_of(date),
            None => InsightsContext::today(),
        };
        base.with_monthly_window(config.insights.monthly_window)
            .with_daily_window(config.insights.daily_window)
            .with_top_medications(config.insights.top_medications)
    }

    /// 更新配置
    pub async fn update_config(&self, new_config: ClinicConfig) -> Result<()> {
        // 验证新配置
        self.validator.validate(&new_config)?;

        {
            let mut config = self.config.write().await;
            *config = new_config;
        }

        if self.config_path.is_some() {
            self.save_config().await?;
        }

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 保存配置到文件
    pub async fn save_config(&self) -> Result<()> {
        let path = self.config_path.as_deref()
            .ok_or_else(|| anyhow::anyhow!("No configuration file associated"))?;

        let config = self.config.read().await;
        let config_str = toml::to_string_pretty(&*config)
            .context("Failed to serialize configuration")?;

        tokio::fs::write(path, config_str).await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path);
        Ok(())
    }

    /// 重新加载配置
    pub async fn reload_config(&self) -> Result<()> {
        let new_config = Self::load_config(self.config_path.as_deref())?;
        self.validator.validate(&new_config)?;

        let mut config = self.config.write().await;
        *config = new_config;

        info!("Configuration reloaded");
        Ok(())
    }

    /// 按点分路径读取配置值
    pub async fn get_value<T>(&self, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let config = self.config.read().await;
        let value = Self::extract_nested_value(&config, path)
            .context(format!("Configuration path not found: {}", path))?;

        serde_json::from_value(value)
            .context("Failed to deserialize configuration value")
    }

    /// 提取嵌套值
    fn extract_nested_value(config: &ClinicConfig, path: &str) -> Result<serde_json::Value> {
        let config_json = serde_json::to_value(config)
            .context("Failed to serialize config to JSON")?;

        let mut current = &config_json;
        for part in path.split('.') {
            match current {
                serde_json::Value::Object(map) => {
                    current = map.get(part)
                        .ok_or_else(|| anyhow::anyhow!("Path segment not found: {}", part))?;
                }
                _ => return Err(anyhow::anyhow!("Invalid path at segment: {}", part)),
            }
        }

        Ok(current.clone())
    }

    /// 验证当前配置
    pub async fn validate_config(&self) -> Result<()> {
        let config = self.config.read().await;
        self.validator.validate(&config)
    }
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "insights.monthly_window".to_string(),
                validator: |config| {
                    let months = config.insights.monthly_window;
                    if months == 0 || months > 120 {
                        Err(anyhow::anyhow!("Monthly window must be between 1 and 120, got {}", months))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid monthly window".to_string(),
            },
            ValidationRule {
                field_path: "insights.daily_window".to_string(),
                validator: |config| {
                    let days = config.insights.daily_window;
                    if days == 0 || days > 366 {
                        Err(anyhow::anyhow!("Daily window must be between 1 and 366, got {}", days))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid daily window".to_string(),
            },
            ValidationRule {
                field_path: "insights.top_medications".to_string(),
                validator: |config| {
                    if config.insights.top_medications == 0 {
                        Err(anyhow::anyhow!("Top medications count cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid top medications count".to_string(),
            },
            ValidationRule {
                field_path: "source.data_dir".to_string(),
                validator: |config| {
                    if config.source.data_dir.trim().is_empty() {
                        Err(anyhow::anyhow!("Data directory cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid data directory".to_string(),
            },
            ValidationRule {
                field_path: "logging.format".to_string(),
                validator: |config| {
                    match config.logging.format.as_str() {
                        "full" | "compact" | "pretty" => Ok(()),
                        other => Err(anyhow::anyhow!("Unsupported log format: {}", other)),
                    }
                },
                error_message: "Invalid logging format".to_string(),
            },
            ValidationRule {
                field_path: "metrics.namespace".to_string(),
                validator: |config| {
                    let ns = &config.metrics.namespace;
                    let valid = !ns.is_empty()
                        && ns.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                        && !ns.starts_with(|c: char| c.is_ascii_digit());
                    if valid {
                        Ok(())
                    } else {
                        Err(anyhow::anyhow!("Invalid metrics namespace: {:?}", ns))
                    }
                },
                error_message: "Invalid metrics namespace".to_string(),
            },
        ];

        Self {
            validation_rules,
        }
    }

    /// 验证配置
    pub fn validate(&self, config: &ClinicConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("{}: {}", rule.error_message, e));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            insights: InsightsSettings::default(),
            source: SourceConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            monthly_window: DEFAULT_MONTHLY_WINDOW,
            daily_window: DEFAULT_DAILY_WINDOW,
            top_medications: DEFAULT_TOP_MEDICATIONS,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data/snapshots".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "full".to_string(),
            with_target: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: "clinic".to_string(),
        }
    }
}

//! # 诊所运维模块
//!
//! 提供配置管理、日志初始化、指标导出，以及把数据源和洞察引擎串起来的报告服务

pub mod config;
pub mod logging;
pub mod monitoring;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use clinic_insights::{InsightsEngine, JsonFileSource, PracticeInsights, RecordSource};

pub use config::{ClinicConfig, ConfigManager};
pub use monitoring::InsightsMetrics;

/// 一次洞察报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub insights: PracticeInsights,
}

/// 洞察服务
///
/// 集成配置、数据源和指标的统一入口点
pub struct InsightsService {
    /// 配置管理器
    config_manager: Arc<ConfigManager>,
    /// 记录数据源
    source: Arc<dyn RecordSource>,
    /// 指标收集器，未启用时为空
    metrics: Option<Arc<InsightsMetrics>>,
}

impl InsightsService {
    /// 按配置创建服务，数据源为配置目录下的 JSON 快照
    pub async fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.get_config().await;
        let source = Arc::new(JsonFileSource::new(&config.source.data_dir));
        Self::with_source(config_manager, source).await
    }

    /// 使用指定数据源创建服务
    pub async fn with_source(
        config_manager: Arc<ConfigManager>,
        source: Arc<dyn RecordSource>,
    ) -> Result<Self> {
        let config = config_manager.get_config().await;
        let metrics = if config.metrics.enabled {
            Some(Arc::new(InsightsMetrics::new(&config.metrics.namespace)?))
        } else {
            None
        };

        Ok(Self {
            config_manager,
            source,
            metrics,
        })
    }

    /// 为所有者生成洞察报告，未指定日期时以今天为锚点
    pub async fn generate_report(&self, owner_id: &str, as_of: Option<NaiveDate>) -> Result<InsightsReport> {
        let started = Instant::now();

        let snapshot = self
            .source
            .load_snapshot(owner_id)
            .await
            .with_context(|| format!("Failed to load records for owner {}", owner_id))?;

        let context = self.config_manager.insights_context(as_of).await;
        let engine = InsightsEngine::new(context);
        let insights = engine.generate(&snapshot);

        if let Some(metrics) = &self.metrics {
            metrics.record(&insights, started.elapsed());
        }

        let report = InsightsReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            insights,
        };

        info!(
            "Generated insights report {} for owner {} in {:?}",
            report.report_id,
            owner_id,
            started.elapsed()
        );
        Ok(report)
    }

    /// 导出当前指标
    pub fn metrics_text(&self) -> Result<Option<String>> {
        match &self.metrics {
            Some(metrics) => metrics.render().map(Some),
            None => {
                warn!("Metrics requested but metrics are disabled");
                Ok(None)
            }
        }
    }
}

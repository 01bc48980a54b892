//! 洞察指标
//!
//! 把每次生成的洞察摘要写入 Prometheus 指标，按所有者打标签

use std::time::Duration;

use anyhow::Result;
use prometheus::{GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry};
use tracing::debug;

use clinic_insights::PracticeInsights;

const OWNER_LABEL: &str = "owner";

/// 洞察指标收集器
#[derive(Debug, Clone)]
pub struct InsightsMetrics {
    /// Prometheus指标注册表
    registry: Registry,
    /// 报告生成次数
    reports_total: IntCounterVec,
    /// 报告生成耗时
    report_duration: HistogramVec,
    /// 已付发票总额
    revenue_total: GaugeVec,
    /// 未结金额
    outstanding_amount: GaugeVec,
    /// 患者总数
    patients_total: IntGaugeVec,
    /// 未来一周预约数
    upcoming_appointments: IntGaugeVec,
    /// 有效处方数
    active_prescriptions: IntGaugeVec,
    /// 平均回款天数
    average_payment_days: GaugeVec,
}

impl InsightsMetrics {
    /// 创建新的指标收集器
    pub fn new(namespace: &str) -> Result<Self> {
        let registry = Registry::new();
        let owner = &[OWNER_LABEL];

        let reports_total = IntCounterVec::new(
            Opts::new("reports_total", "Total number of generated insight reports").namespace(namespace),
            owner,
        )?;

        let report_duration = HistogramVec::new(
            HistogramOpts::new("report_duration_seconds", "Insight report generation time in seconds")
                .namespace(namespace),
            owner,
        )?;

        let revenue_total = GaugeVec::new(
            Opts::new("revenue_total", "Sum of paid invoice totals").namespace(namespace),
            owner,
        )?;

        let outstanding_amount = GaugeVec::new(
            Opts::new("outstanding_amount", "Sum of unpaid invoice totals").namespace(namespace),
            owner,
        )?;

        let patients_total = IntGaugeVec::new(
            Opts::new("patients_total", "Number of patients").namespace(namespace),
            owner,
        )?;

        let upcoming_appointments = IntGaugeVec::new(
            Opts::new("upcoming_appointments", "Appointments in the upcoming daily window").namespace(namespace),
            owner,
        )?;

        let active_prescriptions = IntGaugeVec::new(
            Opts::new("active_prescriptions", "Number of active prescriptions").namespace(namespace),
            owner,
        )?;

        let average_payment_days = GaugeVec::new(
            Opts::new("average_payment_days", "Average days from invoice creation to payment").namespace(namespace),
            owner,
        )?;

        // 注册所有指标
        registry.register(Box::new(reports_total.clone()))?;
        registry.register(Box::new(report_duration.clone()))?;
        registry.register(Box::new(revenue_total.clone()))?;
        registry.register(Box::new(outstanding_amount.clone()))?;
        registry.register(Box::new(patients_total.clone()))?;
        registry.register(Box::new(upcoming_appointments.clone()))?;
        registry.register(Box::new(active_prescriptions.clone()))?;
        registry.register(Box::new(average_payment_days.clone()))?;

        Ok(Self {
            registry,
            reports_total,
            report_duration,
            revenue_total,
            outstanding_amount,
            patients_total,
            upcoming_appointments,
            active_prescriptions,
            average_payment_days,
        })
    }

    /// 记录一次报告
    pub fn record(&self, insights: &PracticeInsights, elapsed: Duration) {
        let owner = [insights.owner_id.as_str()];

        self.reports_total.with_label_values(&owner).inc();
        self.report_duration.with_label_values(&owner).observe(elapsed.as_secs_f64());
        self.revenue_total.with_label_values(&owner).set(insights.financial.total_revenue);
        self.outstanding_amount
            .with_label_values(&owner)
            .set(insights.financial.outstanding_amount);
        self.patients_total
            .with_label_values(&owner)
            .set(insights.patients.total_patients as i64);
        self.upcoming_appointments
            .with_label_values(&owner)
            .set(insights.appointments.upcoming_count as i64);
        self.active_prescriptions
            .with_label_values(&owner)
            .set(insights.clinical.active_prescriptions as i64);

        // 没有可计算的发票时移除旧值，避免沿用上一次的结果
        match insights.financial.average_payment_days {
            Some(days) => self.average_payment_days.with_label_values(&owner).set(days as f64),
            None => {
                let _ = self.average_payment_days.remove_label_values(&owner);
            }
        }

        debug!("Recorded insight metrics for owner {}", insights.owner_id);
    }

    /// 导出 Prometheus 文本格式
    pub fn render(&self) -> Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

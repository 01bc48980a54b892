//! 财务洞察
//!
//! 月度收入按发票创建月份（`createdAt`）归属，而不是付款月份（`paidAt`）。
//! 改为按付款日期会改变已报告的月度数字，因此保持现有口径。

use serde::Serialize;

use clinic_core::date::{resolve_date, resolve_datetime};
use clinic_core::utils::sanitize_amount;
use clinic_core::{Invoice, InvoiceStatus};

use crate::context::InsightsContext;
use crate::distribution::{group_and_count, Distribution, UNKNOWN_LABEL};
use crate::series::{compute_period_comparison, PeriodComparison, TimeSeries};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// 财务统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInsights {
    /// 已付发票金额合计
    pub total_revenue: f64,
    /// 未付且未取消发票金额合计
    pub outstanding_amount: f64,
    pub monthly_revenue: TimeSeries<f64>,
    pub status_distribution: Distribution,
    pub paid_invoice_count: usize,
    /// 平均回款天数，没有可计算的发票时为 `None`
    pub average_payment_days: Option<i64>,
    pub revenue_growth: Option<PeriodComparison>,
}

fn is_paid(invoice: &Invoice) -> bool {
    InvoiceStatus::Paid.matches(invoice.status.as_deref())
}

fn is_outstanding(invoice: &Invoice) -> bool {
    let status = invoice.status.as_deref();
    !InvoiceStatus::Paid.matches(status) && !InvoiceStatus::Cancelled.matches(status)
}

/// 计算财务洞察
pub fn compute_financial_insights(invoices: &[Invoice], ctx: &InsightsContext) -> FinancialInsights {
    let paid: Vec<&Invoice> = invoices.iter().filter(|i| is_paid(i)).collect();

    let total_revenue: f64 = paid.iter().map(|i| sanitize_amount(i.total)).sum();
    let outstanding_amount: f64 = invoices
        .iter()
        .filter(|i| is_outstanding(i))
        .map(|i| sanitize_amount(i.total))
        .sum();

    let monthly_revenue = ctx.monthly().sum(
        paid.iter().copied(),
        |i| resolve_date(i.created_at.as_ref()),
        |i| sanitize_amount(i.total),
    );

    let status_distribution = group_and_count(invoices, |i| i.status.as_deref(), UNKNOWN_LABEL);
    let average_payment_days = average_payment_days(invoices);

    let revenue_growth = if invoices.is_empty() {
        None
    } else {
        compute_period_comparison(&monthly_revenue)
    };

    FinancialInsights {
        total_revenue,
        outstanding_amount,
        monthly_revenue,
        status_distribution,
        paid_invoice_count: paid.len(),
        average_payment_days,
        revenue_growth,
    }
}

/// 平均回款天数
///
/// 只统计 `createdAt` 和 `paidAt` 都能解析的已付发票；每张发票的天数先四舍五入，
/// 平均值再四舍五入。缺少 `paidAt` 的发票既不计入分子也不计入分母。
pub fn average_payment_days(invoices: &[Invoice]) -> Option<i64> {
    let days: Vec<f64> = invoices
        .iter()
        .filter(|i| is_paid(i))
        .filter_map(|i| {
            let created = resolve_datetime(i.created_at.as_ref())?;
            let paid = resolve_datetime(i.paid_at.as_ref())?;
            let elapsed = (paid - created).num_seconds() as f64 / SECONDS_PER_DAY;
            Some(elapsed.round())
        })
        .collect();

    if days.is_empty() {
        return None;
    }
    let average = days.iter().sum::<f64>() / days.len() as f64;
    Some(average.round() as i64)
}

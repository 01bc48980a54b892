//! 预约洞察

use serde::Serialize;

use clinic_core::date::resolve_date;
use clinic_core::{Appointment, AppointmentStatus};

use crate::context::InsightsContext;
use crate::distribution::{group_and_count, Distribution, NOT_SPECIFIED_LABEL, UNKNOWN_LABEL};
use crate::series::{compute_period_comparison, PeriodComparison, TimeSeries};

/// 预约统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInsights {
    pub total_appointments: usize,
    /// 按预约日期（不是创建时间）统计的月度预约数
    pub monthly_appointments: TimeSeries<u64>,
    /// 从今天开始的每日预约数，不区分状态
    pub next_week: TimeSeries<u64>,
    pub upcoming_count: u64,
    pub status_distribution: Distribution,
    pub type_distribution: Distribution,
    /// 已完成预约占比（百分比，保留一位小数）
    pub completion_rate: Option<f64>,
    /// 爽约占比（百分比，保留一位小数）
    pub no_show_rate: Option<f64>,
    pub appointment_growth: Option<PeriodComparison>,
}

/// 计算预约洞察
pub fn compute_appointment_insights(
    appointments: &[Appointment],
    ctx: &InsightsContext,
) -> AppointmentInsights {
    let appointment_date = |a: &Appointment| resolve_date(a.date.as_ref());

    let monthly_appointments = ctx.monthly().count(appointments, appointment_date);
    let next_week = ctx.upcoming_days().count(appointments, appointment_date);
    let upcoming_count = next_week.total();

    let status_distribution = group_and_count(appointments, |a| a.status.as_deref(), UNKNOWN_LABEL);
    let type_distribution = group_and_count(
        appointments,
        |a| a.appointment_type.as_deref(),
        NOT_SPECIFIED_LABEL,
    );

    let total = appointments.len();
    let completed = status_distribution.get(AppointmentStatus::Completed.as_str());
    let no_shows = status_distribution.get(AppointmentStatus::NoShow.as_str());

    let appointment_growth = if appointments.is_empty() {
        None
    } else {
        compute_period_comparison(&monthly_appointments)
    };

    AppointmentInsights {
        total_appointments: total,
        monthly_appointments,
        next_week,
        upcoming_count,
        status_distribution,
        type_distribution,
        completion_rate: percentage(completed, total),
        no_show_rate: percentage(no_shows, total),
        appointment_growth,
    }
}

/// `part / total` 的百分比，保留一位小数；总数为零时无意义
fn percentage(part: u64, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let pct = part as f64 / total as f64 * 100.0;
    Some((pct * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use clinic_core::DateLike;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn appointment(date: Option<DateLike>, status: &str, kind: Option<&str>) -> Appointment {
        Appointment {
            date,
            status: Some(status.to_string()),
            appointment_type: kind.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_week_is_dense_and_ignores_status() {
        let ctx = InsightsContext::as_of(today());
        let appointments = vec![
            appointment(Some(today().into()), "Scheduled", Some("Consultation")),
            appointment(Some(today().into()), "Cancelled", Some("Follow-up")),
            appointment(Some((today() + Duration::days(6)).into()), "Scheduled", None),
            appointment(Some((today() + Duration::days(7)).into()), "Scheduled", None),
            appointment(Some((today() - Duration::days(1)).into()), "Completed", None),
        ];

        let insights = compute_appointment_insights(&appointments, &ctx);
        assert_eq!(insights.next_week.len(), 7);
        assert_eq!(insights.next_week.values(), vec![2, 0, 0, 0, 0, 0, 1]);
        assert_eq!(insights.upcoming_count, 3);
        assert_eq!(insights.next_week.points[0].period_start, today());
    }

    #[test]
    fn test_monthly_uses_appointment_date() {
        let ctx = InsightsContext::as_of(today()).with_monthly_window(3);
        let appointments = vec![
            appointment(Some("2024-04-03".into()), "Completed", None),
            appointment(Some("2024-06-01T09:30:00".into()), "Completed", None),
            appointment(Some("2024-06-20".into()), "Scheduled", None),
            appointment(Some("someday".into()), "No-Show", None),
            appointment(None, "Scheduled", None),
        ];

        let insights = compute_appointment_insights(&appointments, &ctx);
        assert_eq!(insights.monthly_appointments.values(), vec![1, 0, 2]);
        assert_eq!(insights.total_appointments, 5);
        assert_eq!(insights.completion_rate, Some(40.0));
        assert_eq!(insights.no_show_rate, Some(20.0));
        assert_eq!(insights.status_distribution.labels(), vec!["Completed", "Scheduled", "No-Show"]);
        assert_eq!(insights.type_distribution.get("Not specified"), 5);

        let growth = insights.appointment_growth.unwrap();
        assert_eq!(growth.percent_delta, 100.0);
    }

    #[test]
    fn test_loaded_offset_date_counts_on_written_day() {
        let ctx = InsightsContext::as_of(today());
        let loaded: Appointment =
            serde_json::from_value(serde_json::json!({ "date": "2024-06-21T22:00:00-04:00" })).unwrap();

        let insights = compute_appointment_insights(&[loaded], &ctx);
        assert_eq!(insights.next_week.values(), vec![0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(insights.upcoming_count, 1);
    }

    #[test]
    fn test_empty_appointments() {
        let ctx = InsightsContext::as_of(today());
        let insights = compute_appointment_insights(&[], &ctx);
        assert_eq!(insights.monthly_appointments.len(), 6);
        assert_eq!(insights.next_week.values(), vec![0; 7]);
        assert_eq!(insights.completion_rate, None);
        assert_eq!(insights.no_show_rate, None);
        assert!(insights.appointment_growth.is_none());
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), Some(33.3));
        assert_eq!(percentage(2, 3), Some(66.7));
        assert_eq!(percentage(0, 0), None);
    }
}

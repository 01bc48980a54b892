//! 患者洞察

use serde::Serialize;

use clinic_core::date::resolve_date;
use clinic_core::{Patient, PatientStatus};

use crate::context::InsightsContext;
use crate::distribution::{group_and_count, Distribution, NOT_SPECIFIED_LABEL, UNKNOWN_LABEL};
use crate::series::{compute_period_comparison, PeriodComparison, TimeSeries};

/// 患者统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInsights {
    pub total_patients: usize,
    pub active_patients: usize,
    pub gender_distribution: Distribution,
    pub status_distribution: Distribution,
    /// 按 `createdAt` 月份统计的新患者数
    pub monthly_new_patients: TimeSeries<u64>,
    pub new_patient_growth: Option<PeriodComparison>,
}

/// 计算患者洞察
///
/// `createdAt` 缺失或无法解析的患者不进入月度序列，但仍计入两个分布。
pub fn compute_patient_insights(patients: &[Patient], ctx: &InsightsContext) -> PatientInsights {
    let gender_distribution = group_and_count(patients, |p| p.gender.as_deref(), NOT_SPECIFIED_LABEL);
    let status_distribution = group_and_count(patients, |p| p.status.as_deref(), UNKNOWN_LABEL);

    let monthly_new_patients = ctx
        .monthly()
        .count(patients, |p| resolve_date(p.created_at.as_ref()));
    let new_patient_growth = if patients.is_empty() {
        None
    } else {
        compute_period_comparison(&monthly_new_patients)
    };

    let active_patients = patients
        .iter()
        .filter(|p| PatientStatus::Active.matches(p.status.as_deref()))
        .count();

    PatientInsights {
        total_patients: patients.len(),
        active_patients,
        gender_distribution,
        status_distribution,
        monthly_new_patients,
        new_patient_growth,
    }
}

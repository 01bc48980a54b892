//! 临床洞察
//!
//! 处方和病历只做过滤和计数。

use serde::Serialize;

use clinic_core::date::resolve_date;
use clinic_core::{MedicalRecord, Prescription, PrescriptionStatus};

use crate::context::InsightsContext;
use crate::distribution::{group_and_count, Distribution, UNKNOWN_LABEL};
use crate::series::TimeSeries;

/// 药品名缺失时的标签
pub const UNNAMED_MEDICINE_LABEL: &str = "Unnamed";
/// 病历类型缺失时的标签
pub const OTHER_RECORD_LABEL: &str = "Other";

/// 临床统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalInsights {
    pub total_prescriptions: usize,
    pub active_prescriptions: usize,
    pub prescription_status_distribution: Distribution,
    /// 处方中出现次数最多的药品
    pub top_medications: Distribution,
    pub monthly_prescriptions: TimeSeries<u64>,
    pub total_medical_records: usize,
    pub record_type_distribution: Distribution,
}

/// 计算临床洞察
pub fn compute_clinical_insights(
    prescriptions: &[Prescription],
    medical_records: &[MedicalRecord],
    ctx: &InsightsContext,
) -> ClinicalInsights {
    let active_prescriptions = prescriptions
        .iter()
        .filter(|p| PrescriptionStatus::Active.matches(p.status.as_deref()))
        .count();

    let prescription_status_distribution =
        group_and_count(prescriptions, |p| p.status.as_deref(), UNKNOWN_LABEL);

    let medication_counts = group_and_count(
        prescriptions.iter().flat_map(|p| p.medicines.iter()),
        |m| m.name.as_deref(),
        UNNAMED_MEDICINE_LABEL,
    );

    let monthly_prescriptions = ctx
        .monthly()
        .count(prescriptions, |p| resolve_date(p.created_at.as_ref()));

    let record_type_distribution =
        group_and_count(medical_records, |r| r.record_type.as_deref(), OTHER_RECORD_LABEL);

    ClinicalInsights {
        total_prescriptions: prescriptions.len(),
        active_prescriptions,
        prescription_status_distribution,
        top_medications: medication_counts.top(ctx.top_medications),
        monthly_prescriptions,
        total_medical_records: medical_records.len(),
        record_type_distribution,
    }
}

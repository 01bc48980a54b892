//! 洞察引擎
//!
//! 对一个诊所的记录快照运行全部聚合，产出仪表盘各标签页需要的数据

use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;

use clinic_core::PracticeSnapshot;

use crate::{
    appointments::{compute_appointment_insights, AppointmentInsights},
    clinical::{compute_clinical_insights, ClinicalInsights},
    context::InsightsContext,
    financial::{compute_financial_insights, FinancialInsights},
    patients::{compute_patient_insights, PatientInsights},
};

/// 单个诊所的全部洞察
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeInsights {
    pub owner_id: String,
    pub as_of: NaiveDate,
    pub patients: PatientInsights,
    pub appointments: AppointmentInsights,
    pub financial: FinancialInsights,
    pub clinical: ClinicalInsights,
}

/// 对快照运行全部聚合
pub fn compute_practice_insights(snapshot: &PracticeSnapshot, ctx: &InsightsContext) -> PracticeInsights {
    PracticeInsights {
        owner_id: snapshot.owner_id.clone(),
        as_of: ctx.as_of,
        patients: compute_patient_insights(&snapshot.patients, ctx),
        appointments: compute_appointment_insights(&snapshot.appointments, ctx),
        financial: compute_financial_insights(&snapshot.invoices, ctx),
        clinical: compute_clinical_insights(&snapshot.prescriptions, &snapshot.medical_records, ctx),
    }
}

/// 洞察引擎
///
/// 无内部可变状态，可在多个线程间共享；每次调用都基于传入的快照重新计算。
#[derive(Debug, Clone)]
pub struct InsightsEngine {
    context: InsightsContext,
}

impl InsightsEngine {
    /// 创建新的洞察引擎
    pub fn new(context: InsightsContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &InsightsContext {
        &self.context
    }

    /// 生成快照的洞察
    pub fn generate(&self, snapshot: &PracticeSnapshot) -> PracticeInsights {
        let span = tracing::info_span!("practice_insights", owner = %snapshot.owner_id);
        let _guard = span.enter();

        let started = Instant::now();
        let insights = compute_practice_insights(snapshot, &self.context);

        tracing::info!(
            "Computed insights for owner {} from {} records as of {} in {:?}",
            snapshot.owner_id,
            snapshot.record_count(),
            self.context.as_of,
            started.elapsed()
        );
        tracing::debug!(
            "Owner {}: revenue {:.2}, outstanding {:.2}, {} upcoming appointments",
            snapshot.owner_id,
            insights.financial.total_revenue,
            insights.financial.outstanding_amount,
            insights.appointments.upcoming_count
        );

        insights
    }
}

impl Default for InsightsEngine {
    fn default() -> Self {
        Self::new(InsightsContext::today())
    }
}

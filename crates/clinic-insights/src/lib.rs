//! # 诊所洞察模块
//!
//! 把一个诊所的原始记录转换为仪表盘使用的派生数据，包括：
//! - 稠密时间序列：月度新患者、预约、收入，未来一周每日预约
//! - 分类分布：性别、状态、类型，按首次出现顺序排列
//! - 环比：最近两个周期的绝对与百分比变化
//!
//! 所有聚合都是纯函数：不修改输入、不做 I/O、不持有跨调用状态。

pub mod appointments;
pub mod clinical;
pub mod context;
pub mod distribution;
pub mod engine;
pub mod financial;
pub mod patients;
pub mod series;
pub mod source;
pub mod window;

// 重新导出主要类型
pub use appointments::{compute_appointment_insights, AppointmentInsights};
pub use clinical::{compute_clinical_insights, ClinicalInsights};
pub use context::InsightsContext;
pub use distribution::{group_and_count, Distribution, NOT_SPECIFIED_LABEL, UNKNOWN_LABEL};
pub use engine::{compute_practice_insights, InsightsEngine, PracticeInsights};
pub use financial::{average_payment_days, compute_financial_insights, FinancialInsights};
pub use patients::{compute_patient_insights, PatientInsights};
pub use series::{compute_period_comparison, PeriodComparison, PeriodUnit, SeriesPoint, TimeSeries};
pub use source::{InMemorySource, JsonFileSource, RecordSource};
pub use window::{Period, PeriodWindow};

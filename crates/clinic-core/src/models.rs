//! 核心数据模型定义
//!
//! 记录由外部文档存储拥有和修改，这里只描述读取形态。除 `id` 外字段均可缺失；
//! 状态字段保留原始字符串，未知状态原样透传。

use serde::{Deserialize, Serialize};

use crate::date::DateLike;
use crate::utils::{lenient_amount, lenient_date, lenient_id, lenient_list, lenient_string};

/// 患者基本信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateLike>,
}

/// 预约
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_name: Option<String>,
    /// 预约日期（不是创建时间）
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<DateLike>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub appointment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: Option<String>,
}

/// 发票
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateLike>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub paid_at: Option<DateLike>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<DateLike>,
}

/// 处方中的单个药品
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
}

/// 处方
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub medicines: Vec<Medicine>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateLike>,
}

/// 病历记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<DateLike>,
}

/// 单个诊所（所有者）的记录快照
///
/// 数据源负责按所有者过滤，聚合层假定快照内的记录都属于 `owner_id`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSnapshot {
    #[serde(default, deserialize_with = "lenient_id")]
    pub owner_id: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub patients: Vec<Patient>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub appointments: Vec<Appointment>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub invoices: Vec<Invoice>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub prescriptions: Vec<Prescription>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub medical_records: Vec<MedicalRecord>,
}

impl PracticeSnapshot {
    /// 创建空快照
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    /// 快照中的记录总数
    pub fn record_count(&self) -> usize {
        self.patients.len()
            + self.appointments.len()
            + self.invoices.len()
            + self.prescriptions.len()
            + self.medical_records.len()
    }
}

/// 为已知状态生成 `as_str` / `matches`
macro_rules! known_status {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// 存储中使用的原始标签
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// 原始状态字符串是否等于该状态（区分大小写）
            pub fn matches(&self, raw: Option<&str>) -> bool {
                raw == Some(self.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

known_status!(
    /// 患者状态
    PatientStatus {
        Active => "Active",
        Inactive => "Inactive",
        Archived => "Archived",
        Pending => "Pending",
    }
);

known_status!(
    /// 预约状态
    AppointmentStatus {
        Scheduled => "Scheduled",
        Completed => "Completed",
        Cancelled => "Cancelled",
        NoShow => "No-Show",
    }
);

known_status!(
    /// 发票状态
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
);

known_status!(
    /// 处方状态
    PrescriptionStatus {
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_matching_is_exact() {
        assert!(InvoiceStatus::Paid.matches(Some("paid")));
        assert!(!InvoiceStatus::Paid.matches(Some("Paid")));
        assert!(!InvoiceStatus::Paid.matches(None));
        assert_eq!(AppointmentStatus::NoShow.as_str(), "No-Show");
        assert_eq!(PrescriptionStatus::Active.to_string(), "active");
    }

    #[test]
    fn test_snapshot_deserializes_loose_records() {
        let snapshot: PracticeSnapshot = serde_json::from_value(serde_json::json!({
            "ownerId": "owner-1",
            "patients": [
                { "id": "p1", "gender": "Female", "createdAt": "2024-01-05" },
                { "id": "p2", "gender": null, "status": 3, "createdAt": { "seconds": 1704067200, "nanoseconds": 0 } },
                { "id": "p3", "createdAt": "garbage" }
            ],
            "invoices": [
                { "id": "i1", "status": "paid", "total": "120.50" },
                { "id": "i2", "total": null, "paidAt": false }
            ],
            "prescriptions": [
                { "id": "rx1", "medicines": [{ "name": "Amoxicillin" }, "bad"] },
                { "id": "rx2", "medicines": null }
            ],
            "appointments": "not a list"
        }))
        .unwrap();

        assert_eq!(snapshot.owner_id, "owner-1");
        assert_eq!(snapshot.patients.len(), 3);
        assert_eq!(snapshot.patients[1].status.as_deref(), Some("3"));
        assert!(snapshot.patients[1].gender.is_none());
        assert!(snapshot.patients[2].created_at.as_ref().unwrap().to_date().is_none());
        assert_eq!(snapshot.invoices[0].total, Some(120.5));
        assert!(snapshot.invoices[1].paid_at.as_ref().unwrap().to_date().is_none());
        assert_eq!(snapshot.prescriptions[0].medicines.len(), 1);
        assert!(snapshot.prescriptions[1].medicines.is_empty());
        assert!(snapshot.appointments.is_empty());
        assert_eq!(snapshot.record_count(), 7);
    }
}

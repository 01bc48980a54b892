//! 洞察聚合演示程序
//!
//! 构造一个示例诊所的记录快照，展示患者、预约、财务和临床四类洞察，以及报告服务和指标导出

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Local, Months, NaiveDate};

use clinic_admin::{ClinicConfig, ConfigManager, InsightsService};
use clinic_core::{Appointment, DateLike, Invoice, MedicalRecord, Medicine, Patient, PracticeSnapshot, Prescription};
use clinic_insights::{InMemorySource, InsightsContext, InsightsEngine, TimeSeries};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let today = Local::now().date_naive();
    let snapshot = create_sample_snapshot("demo-clinic", today);
    println!("🏥 诊所洞察演示 (截至 {})\n", today);
    println!("✅ 创建了包含 {} 条记录的示例快照", snapshot.record_count());

    // 1. 直接使用洞察引擎
    let engine = InsightsEngine::new(InsightsContext::as_of(today));
    let insights = engine.generate(&snapshot);

    println!("\n👥 患者:");
    println!("   总数: {}，活跃: {}", insights.patients.total_patients, insights.patients.active_patients);
    for (label, count) in insights.patients.gender_distribution.iter() {
        println!("   {}: {}", label, count);
    }
    print_series("每月新患者", &insights.patients.monthly_new_patients);
    if let Some(growth) = &insights.patients.new_patient_growth {
        println!("   环比: {:+} ({:+.1}%)", growth.absolute_delta, growth.percent_delta);
    }

    println!("\n📅 预约:");
    print_series("未来一周", &insights.appointments.next_week);
    println!("   即将到来: {}", insights.appointments.upcoming_count);
    if let Some(rate) = insights.appointments.completion_rate {
        println!("   完成率: {:.1}%", rate);
    }
    if let Some(rate) = insights.appointments.no_show_rate {
        println!("   爽约率: {:.1}%", rate);
    }

    println!("\n💰 财务:");
    println!("   已收: {:.2}，未结: {:.2}", insights.financial.total_revenue, insights.financial.outstanding_amount);
    print_series("月度收入", &insights.financial.monthly_revenue);
    match insights.financial.average_payment_days {
        Some(days) => println!("   平均回款天数: {}", days),
        None => println!("   平均回款天数: 无数据"),
    }

    println!("\n💊 临床:");
    println!("   有效处方: {}/{}", insights.clinical.active_prescriptions, insights.clinical.total_prescriptions);
    for (name, count) in insights.clinical.top_medications.iter() {
        println!("   {}: {}", name, count);
    }

    // 2. 通过报告服务生成，并导出指标
    let mut config = ClinicConfig::default();
    config.insights.monthly_window = 12;
    let config_manager = Arc::new(ConfigManager::from_config(config)?);

    let source = InMemorySource::new();
    source.put(snapshot).await;
    let service = InsightsService::with_source(config_manager, Arc::new(source)).await?;

    let report = service.generate_report("demo-clinic", Some(today)).await?;
    println!("\n📊 报告 {} 生成于 {}", report.report_id, report.generated_at);
    println!(
        "   12 个月收入合计: {:.2}",
        report.insights.financial.monthly_revenue.total()
    );

    if let Some(text) = service.metrics_text()? {
        println!("\n📈 Prometheus 指标:\n{}", text);
    }

    Ok(())
}

fn print_series<T: std::fmt::Display>(title: &str, series: &TimeSeries<T>) {
    let rendered: Vec<String> = series
        .points
        .iter()
        .map(|p| format!("{}={}", p.period_label, p.value))
        .collect();
    println!("   {}: {}", title, rendered.join(", "));
}

fn months_ago(today: NaiveDate, months: u32) -> DateLike {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(today)
        .into()
}

fn create_sample_snapshot(owner_id: &str, today: NaiveDate) -> PracticeSnapshot {
    let mut snapshot = PracticeSnapshot::new(owner_id);

    let genders = ["Female", "Male", "Female", "Other", "Male", "Female"];
    let statuses = ["Active", "Active", "Inactive", "Active", "Archived", "Active"];
    snapshot.patients = (0..12)
        .map(|i| Patient {
            id: format!("p{}", i),
            first_name: Some(format!("Patient{}", i)),
            gender: Some(genders[i % genders.len()].to_string()),
            status: Some(statuses[i % statuses.len()].to_string()),
            created_at: Some(months_ago(today, (i % 5) as u32)),
            ..Default::default()
        })
        .collect();

    let appointment_statuses = ["Completed", "Completed", "No-Show", "Cancelled", "Scheduled"];
    let types = ["Checkup", "Follow-up", "Consultation"];
    snapshot.appointments = (0..15)
        .map(|i| {
            let offset = i as i64 - 8;
            Appointment {
                id: format!("a{}", i),
                patient_id: Some(format!("p{}", i % 12)),
                date: Some((today + Duration::days(offset * 3)).into()),
                status: Some(appointment_statuses[i % appointment_statuses.len()].to_string()),
                appointment_type: Some(types[i % types.len()].to_string()),
                ..Default::default()
            }
        })
        .collect();

    snapshot.invoices = (0..10)
        .map(|i| {
            let created = today - Duration::days(i as i64 * 17);
            let paid = i % 3 != 0;
            Invoice {
                id: format!("inv{}", i),
                invoice_number: Some(format!("INV-{:04}", i + 1)),
                status: Some(if paid { "paid" } else { "pending" }.to_string()),
                total: Some(80.0 + i as f64 * 12.5),
                created_at: Some(created.into()),
                paid_at: paid.then(|| (created + Duration::days(i as i64 % 7)).into()),
                ..Default::default()
            }
        })
        .collect();

    let medicines = ["Amoxicillin", "Ibuprofen", "Metformin", "Lisinopril"];
    snapshot.prescriptions = (0..8)
        .map(|i| Prescription {
            id: format!("rx{}", i),
            status: Some(if i % 3 == 0 { "completed" } else { "active" }.to_string()),
            medicines: (0..=(i % 3))
                .map(|j| Medicine {
                    name: Some(medicines[(i + j) % medicines.len()].to_string()),
                    ..Default::default()
                })
                .collect(),
            created_at: Some(months_ago(today, (i % 4) as u32)),
            ..Default::default()
        })
        .collect();

    snapshot.medical_records = ["Lab", "Imaging", "Lab", "Consultation"]
        .iter()
        .enumerate()
        .map(|(i, kind)| MedicalRecord {
            id: format!("mr{}", i),
            record_type: Some(kind.to_string()),
            ..Default::default()
        })
        .collect();

    snapshot
}

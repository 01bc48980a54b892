//! 日期归一化
//!
//! 文档数据库中的时间字段有多种形态：原生时间、ISO 字符串、`{seconds, nanoseconds}`
//! 时间戳包装、毫秒数。`DateLike` 把它们收拢成一个类型，所有分桶操作都通过
//! [`DateLike::to_date`] / [`DateLike::to_datetime`] 解析，无法解析时返回 `None`。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文档存储中的 `{seconds, nanoseconds}` 时间戳
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
    #[serde(alias = "_seconds")]
    pub seconds: i64,
    #[serde(alias = "_nanoseconds", default)]
    pub nanoseconds: u32,
}

/// 可转换为日期的值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateLike {
    /// 时间戳包装对象
    Timestamp(StoreTimestamp),
    /// 毫秒级 Unix 时间
    Millis(f64),
    /// 原生时间值，只由代码构造；反序列化时字符串一律保留为 `Text`，以保留书写时的日期
    #[serde(skip_deserializing)]
    Native(DateTime<Utc>),
    /// 其他文本形式
    Text(String),
    /// 任何无法识别的形态，解析结果恒为 `None`
    Unrecognized(serde_json::Value),
}

/// 可接受的无时区日期时间格式
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl DateLike {
    /// 解析为 UTC 时刻
    ///
    /// 不带时区的文本按 UTC 解释，纯日期取当天零点。
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            DateLike::Timestamp(ts) => DateTime::from_timestamp(ts.seconds, ts.nanoseconds),
            DateLike::Millis(ms) => millis_to_datetime(*ms),
            DateLike::Native(dt) => Some(*dt),
            DateLike::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Some(dt.with_timezone(&Utc));
                }
                if let Some(naive) = parse_naive_datetime(text) {
                    return Some(naive.and_utc());
                }
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }
            DateLike::Unrecognized(_) => None,
        }
    }

    /// 解析为日历日期
    ///
    /// 文本值保留书写时的本地日期（带偏移的时间不换算到 UTC），
    /// 数值型时间戳按 UTC 取日期。
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            DateLike::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Some(dt.date_naive());
                }
                if let Some(naive) = parse_naive_datetime(text) {
                    return Some(naive.date());
                }
                NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
            }
            other => other.to_datetime().map(|dt| dt.date_naive()),
        }
    }
}

fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() || ms.abs() > i64::MAX as f64 {
        return None;
    }
    let ms = ms.round() as i64;
    let nanos = (ms.rem_euclid(1000) * 1_000_000) as u32;
    DateTime::from_timestamp(ms.div_euclid(1000), nanos)
}

fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

impl From<NaiveDate> for DateLike {
    fn from(date: NaiveDate) -> Self {
        DateLike::Text(date.format("%Y-%m-%d").to_string())
    }
}

impl From<DateTime<Utc>> for DateLike {
    fn from(dt: DateTime<Utc>) -> Self {
        DateLike::Native(dt)
    }
}

impl From<&str> for DateLike {
    fn from(text: &str) -> Self {
        DateLike::Text(text.to_string())
    }
}

/// 解析可选日期字段
pub fn resolve_date(value: Option<&DateLike>) -> Option<NaiveDate> {
    value.and_then(DateLike::to_date)
}

/// 解析可选时刻字段
pub fn resolve_datetime(value: Option<&DateLike>) -> Option<DateTime<Utc>> {
    value.and_then(DateLike::to_datetime)
}

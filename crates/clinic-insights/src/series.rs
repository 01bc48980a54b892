//! 时间序列与环比
//!
//! 所有月度/每日序列都是稠密的：窗口内每个周期都有一个点，空周期取零值。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::AddAssign;

/// 周期单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Month,
    Day,
}

/// 可作为序列值的数值类型
pub trait SeriesValue: Copy + Default + AddAssign + PartialEq + Debug {
    fn as_f64(self) -> f64;
}

impl SeriesValue for u64 {
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl SeriesValue for f64 {
    fn as_f64(self) -> f64 {
        self
    }
}

/// 序列中的一个点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint<T> {
    pub period_label: String,
    pub period_start: NaiveDate,
    pub value: T,
}

/// 按时间升序排列的稠密序列
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries<T> {
    pub unit: PeriodUnit,
    pub points: Vec<SeriesPoint<T>>,
}

impl<T: SeriesValue> TimeSeries<T> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 按时间顺序的值
    pub fn values(&self) -> Vec<T> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// 按时间顺序的标签
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.period_label.as_str()).collect()
    }

    /// 全部周期的合计
    pub fn total(&self) -> T {
        let mut total = T::default();
        for point in &self.points {
            total += point.value;
        }
        total
    }

    /// 最近一个周期
    pub fn last(&self) -> Option<&SeriesPoint<T>> {
        self.points.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint<T>> {
        self.points.iter()
    }
}

/// 最近周期与上一周期的比较
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub current: f64,
    pub previous: f64,
    pub absolute_delta: f64,
    pub percent_delta: f64,
}

impl PeriodComparison {
    /// 比较两个值
    ///
    /// 上一周期为零时增长率固定记为 100%，不产生无穷大或 NaN。
    pub fn between(current: f64, previous: f64) -> Self {
        let absolute_delta = current - previous;
        let percent_delta = if previous == 0.0 {
            100.0
        } else {
            absolute_delta / previous * 100.0
        };

        Self {
            current,
            previous,
            absolute_delta,
            percent_delta,
        }
    }

    /// 比较值列表的最后两个元素，不足两个时返回 `None`
    pub fn from_values<T: SeriesValue>(values: &[T]) -> Option<Self> {
        match values {
            [.., previous, current] => Some(Self::between(current.as_f64(), previous.as_f64())),
            _ => None,
        }
    }
}

/// 计算序列最后两个周期的环比
pub fn compute_period_comparison<T: SeriesValue>(series: &TimeSeries<T>) -> Option<PeriodComparison> {
    PeriodComparison::from_values(&series.values())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(values: &[u64]) -> TimeSeries<u64> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TimeSeries {
            unit: PeriodUnit::Day,
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| SeriesPoint {
                    period_label: format!("d{}", i),
                    period_start: start + chrono::Duration::days(i as i64),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn test_comparison_of_last_two_points() {
        let cmp = compute_period_comparison(&series_of(&[5, 10, 15])).unwrap();
        assert_eq!(cmp.current, 15.0);
        assert_eq!(cmp.previous, 10.0);
        assert_eq!(cmp.absolute_delta, 5.0);
        assert_eq!(cmp.percent_delta, 50.0);

        let cmp = compute_period_comparison(&series_of(&[8, 4])).unwrap();
        assert_eq!(cmp.absolute_delta, -4.0);
        assert_eq!(cmp.percent_delta, -50.0);
    }

    #[test]
    fn test_zero_previous_reports_hundred_percent() {
        let mut values = vec![7, 0];
        values.push(3);
        let cmp = compute_period_comparison(&series_of(&values)).unwrap();
        assert_eq!(cmp.percent_delta, 100.0);
        assert!(cmp.percent_delta.is_finite());

        // 0 -> 0 同样记为 100%
        let cmp = PeriodComparison::between(0.0, 0.0);
        assert_eq!(cmp.percent_delta, 100.0);
        assert_eq!(cmp.absolute_delta, 0.0);
    }

    #[test]
    fn test_comparison_needs_two_points() {
        assert!(compute_period_comparison(&series_of(&[])).is_none());
        assert!(compute_period_comparison(&series_of(&[4])).is_none());
        assert!(PeriodComparison::from_values::<f64>(&[]).is_none());
    }

    #[test]
    fn test_series_helpers() {
        let series = series_of(&[1, 2, 3]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.total(), 6);
        assert_eq!(series.values(), vec![1, 2, 3]);
        assert_eq!(series.labels(), vec!["d0", "d1", "d2"]);
        assert_eq!(series.last().map(|p| p.value), Some(3));
    }
}

//! 周期窗口
//!
//! 窗口是一组连续的日历周期（月或日），每个周期为左闭右开区间 `[start, end)`。
//! 尾随窗口从锚点向前回溯生成标签后再反转为升序；前瞻窗口从锚点向后生成。

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::series::{PeriodUnit, SeriesPoint, SeriesValue, TimeSeries};

/// 单个周期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub label: String,
    pub start: NaiveDate,
    /// 不包含
    pub end: NaiveDate,
}

impl Period {
    fn month(start: NaiveDate) -> Option<Self> {
        let end = start.checked_add_months(Months::new(1))?;
        Some(Self {
            label: start.format("%b %Y").to_string(),
            start,
            end,
        })
    }

    fn day(start: NaiveDate) -> Option<Self> {
        let end = start.checked_add_signed(Duration::days(1))?;
        Some(Self {
            label: start.format("%a %b %d").to_string(),
            start,
            end,
        })
    }

    /// 日期是否落在周期内
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// 连续周期窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodWindow {
    unit: PeriodUnit,
    periods: Vec<Period>,
}

impl PeriodWindow {
    /// 以锚点所在月份结尾的 `length` 个自然月
    pub fn trailing_months(anchor: NaiveDate, length: u32) -> Self {
        let first_of_month = anchor.with_day(1).unwrap_or(anchor);
        let mut periods: Vec<Period> = (0..length)
            .map_while(|back| {
                first_of_month
                    .checked_sub_months(Months::new(back))
                    .and_then(Period::month)
            })
            .collect();
        periods.reverse();

        Self {
            unit: PeriodUnit::Month,
            periods,
        }
    }

    /// 以锚点当天结尾的 `length` 天
    pub fn trailing_days(anchor: NaiveDate, length: u32) -> Self {
        let mut periods: Vec<Period> = (0..length)
            .map_while(|back| {
                anchor
                    .checked_sub_signed(Duration::days(back as i64))
                    .and_then(Period::day)
            })
            .collect();
        periods.reverse();

        Self {
            unit: PeriodUnit::Day,
            periods,
        }
    }

    /// 从锚点当天开始的 `length` 天（今天到今天 + length - 1）
    pub fn leading_days(anchor: NaiveDate, length: u32) -> Self {
        let periods = (0..length)
            .map_while(|ahead| {
                anchor
                    .checked_add_signed(Duration::days(ahead as i64))
                    .and_then(Period::day)
            })
            .collect();

        Self {
            unit: PeriodUnit::Day,
            periods,
        }
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// 日期所在周期的下标，窗口外返回 `None`
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.periods.partition_point(|p| p.start <= date).checked_sub(1)?;
        self.periods[idx].contains(date).then_some(idx)
    }

    /// 按周期计数
    pub fn count<'a, T: 'a, I, D>(&self, records: I, date_fn: D) -> TimeSeries<u64>
    where
        I: IntoIterator<Item = &'a T>,
        D: Fn(&'a T) -> Option<NaiveDate>,
    {
        self.accumulate(records, date_fn, |_| 1u64)
    }

    /// 按周期求和
    pub fn sum<'a, T: 'a, I, D, V>(&self, records: I, date_fn: D, value_fn: V) -> TimeSeries<f64>
    where
        I: IntoIterator<Item = &'a T>,
        D: Fn(&'a T) -> Option<NaiveDate>,
        V: Fn(&'a T) -> f64,
    {
        self.accumulate(records, date_fn, value_fn)
    }

    /// 构建稠密序列：每个周期一个点，无日期或窗口外的记录被跳过
    pub fn accumulate<'a, T: 'a, I, D, V, N>(&self, records: I, date_fn: D, value_fn: V) -> TimeSeries<N>
    where
        I: IntoIterator<Item = &'a T>,
        D: Fn(&'a T) -> Option<NaiveDate>,
        V: Fn(&'a T) -> N,
        N: SeriesValue,
    {
        let mut buckets = vec![N::default(); self.periods.len()];
        let mut undated = 0usize;
        let mut outside = 0usize;

        for record in records {
            let Some(date) = date_fn(record) else {
                undated += 1;
                continue;
            };
            match self.index_of(date) {
                Some(idx) => buckets[idx] += value_fn(record),
                None => outside += 1,
            }
        }

        if undated > 0 || outside > 0 {
            tracing::debug!(
                "Dense {:?} series skipped {} undated and {} out-of-window records",
                self.unit,
                undated,
                outside
            );
        }

        TimeSeries {
            unit: self.unit,
            points: self
                .periods
                .iter()
                .zip(buckets)
                .map(|(period, value)| SeriesPoint {
                    period_label: period.label.clone(),
                    period_start: period.start,
                    value,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trailing_months_are_ascending_and_cross_year() {
        let window = PeriodWindow::trailing_months(date(2024, 2, 20), 4);
        let starts: Vec<NaiveDate> = window.periods().iter().map(|p| p.start).collect();
        assert_eq!(
            starts,
            vec![date(2023, 11, 1), date(2023, 12, 1), date(2024, 1, 1), date(2024, 2, 1)]
        );
        assert_eq!(window.periods()[0].label, "Nov 2023");
        assert_eq!(window.periods()[3].end, date(2024, 3, 1));
        assert_eq!(window.unit(), PeriodUnit::Month);
    }

    #[test]
    fn test_day_windows() {
        let next = PeriodWindow::leading_days(date(2024, 12, 29), 7);
        assert_eq!(next.len(), 7);
        assert_eq!(next.periods()[0].start, date(2024, 12, 29));
        assert_eq!(next.periods()[6].start, date(2025, 1, 4));
        assert_eq!(next.periods()[0].label, "Sun Dec 29");

        let past = PeriodWindow::trailing_days(date(2024, 3, 2), 3);
        let starts: Vec<NaiveDate> = past.periods().iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)]);
    }

    #[test]
    fn test_index_of_bounds() {
        let window = PeriodWindow::trailing_months(date(2024, 6, 15), 3);
        assert_eq!(window.index_of(date(2024, 4, 1)), Some(0));
        assert_eq!(window.index_of(date(2024, 5, 31)), Some(1));
        assert_eq!(window.index_of(date(2024, 6, 30)), Some(2));
        assert_eq!(window.index_of(date(2024, 3, 31)), None);
        assert_eq!(window.index_of(date(2024, 7, 1)), None);

        let empty = PeriodWindow::trailing_months(date(2024, 6, 15), 0);
        assert!(empty.is_empty());
        assert_eq!(empty.index_of(date(2024, 6, 1)), None);
    }

    #[test]
    fn test_dense_series_fills_empty_periods() {
        let window = PeriodWindow::trailing_months(date(2024, 6, 15), 6);
        let dates = vec![Some(date(2024, 6, 3)), Some(date(2024, 2, 10)), None, Some(date(2023, 1, 1))];

        let series = window.count(&dates, |d| *d);
        assert_eq!(series.len(), 6);
        assert_eq!(series.values(), vec![0, 1, 0, 0, 0, 1]);

        let empty: Vec<Option<NaiveDate>> = Vec::new();
        let series = window.count(&empty, |d| *d);
        assert_eq!(series.len(), 6);
        assert!(series.values().iter().all(|v| *v == 0));
    }

    #[test]
    fn test_sum_series() {
        let window = PeriodWindow::trailing_days(date(2024, 1, 3), 3);
        let rows = vec![(date(2024, 1, 1), 10.0), (date(2024, 1, 3), 2.5), (date(2024, 1, 3), 1.5)];
        let series = window.sum(&rows, |r| Some(r.0), |r| r.1);
        assert_eq!(series.values(), vec![10.0, 0.0, 4.0]);
        assert_eq!(series.total(), 14.0);
    }
}

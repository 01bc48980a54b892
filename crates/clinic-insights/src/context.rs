//! 聚合上下文
//!
//! 锚点日期和窗口长度显式传入每个聚合函数，同样的快照和上下文总得到同样的结果。

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::window::PeriodWindow;

/// 默认月度窗口长度
pub const DEFAULT_MONTHLY_WINDOW: u32 = 6;
/// 默认每日窗口长度
pub const DEFAULT_DAILY_WINDOW: u32 = 7;
/// 默认常用药品数量
pub const DEFAULT_TOP_MEDICATIONS: usize = 5;

/// 聚合上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsContext {
    /// 锚点日期（"今天"）
    pub as_of: NaiveDate,
    /// 月度序列覆盖的月份数
    pub monthly_window: u32,
    /// 每日序列覆盖的天数
    pub daily_window: u32,
    /// 常用药品榜单长度
    pub top_medications: usize,
}

impl InsightsContext {
    /// 以指定日期为锚点，其余取默认值
    pub fn as_of(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            monthly_window: DEFAULT_MONTHLY_WINDOW,
            daily_window: DEFAULT_DAILY_WINDOW,
            top_medications: DEFAULT_TOP_MEDICATIONS,
        }
    }

    /// 以本地当天为锚点
    pub fn today() -> Self {
        Self::as_of(Local::now().date_naive())
    }

    pub fn with_monthly_window(mut self, months: u32) -> Self {
        self.monthly_window = months;
        self
    }

    pub fn with_daily_window(mut self, days: u32) -> Self {
        self.daily_window = days;
        self
    }

    pub fn with_top_medications(mut self, count: usize) -> Self {
        self.top_medications = count;
        self
    }

    /// 截至锚点月份的尾随月度窗口
    pub fn monthly(&self) -> PeriodWindow {
        PeriodWindow::trailing_months(self.as_of, self.monthly_window)
    }

    /// 从锚点当天开始的每日窗口
    pub fn upcoming_days(&self) -> PeriodWindow {
        PeriodWindow::leading_days(self.as_of, self.daily_window)
    }
}

impl Default for InsightsContext {
    fn default() -> Self {
        Self::today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_and_windows() {
        let as_of = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let ctx = InsightsContext::as_of(as_of)
            .with_monthly_window(12)
            .with_daily_window(14)
            .with_top_medications(3);

        assert_eq!(ctx.monthly().len(), 12);
        assert_eq!(ctx.upcoming_days().len(), 14);
        assert_eq!(ctx.upcoming_days().periods()[0].start, as_of);
        assert_eq!(ctx.top_medications, 3);
    }

    #[test]
    fn test_defaults() {
        let ctx = InsightsContext::as_of(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(ctx.monthly_window, DEFAULT_MONTHLY_WINDOW);
        assert_eq!(ctx.daily_window, DEFAULT_DAILY_WINDOW);
        assert_eq!(ctx.top_medications, DEFAULT_TOP_MEDICATIONS);
    }
}

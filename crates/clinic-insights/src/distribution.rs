//! 分类分布
//!
//! 标签顺序为扫描输入时首次出现的顺序（图例依赖这一顺序），不做排序。

use serde::ser::{Serialize, SerializeMap, Serializer};

use clinic_core::utils::non_empty;

/// 缺失状态的默认标签
pub const UNKNOWN_LABEL: &str = "Unknown";
/// 缺失性别/类型的默认标签
pub const NOT_SPECIFIED_LABEL: &str = "Not specified";

/// 标签到计数的有序映射
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    entries: Vec<(String, u64)>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标签计数加一
    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    /// 标签计数增加 `count`，新标签追加在末尾
    pub fn add(&mut self, label: &str, count: u64) {
        match self.entries.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, value)) => *value += count,
            None => self.entries.push((label.to_string(), count)),
        }
    }

    /// 标签的计数，不存在时为 0
    pub fn get(&self, label: &str) -> u64 {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// 所有桶的计数之和
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// 计数最高的 `n` 个标签；计数相同时保持首次出现顺序
    pub fn top(&self, n: usize) -> Distribution {
        let mut entries = self.entries.clone();
        // 稳定排序保证并列时的先后
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        Distribution { entries }
    }

    pub fn into_entries(self) -> Vec<(String, u64)> {
        self.entries
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// 按键函数分组计数
///
/// 键缺失或为空字符串的记录计入 `default_label`，因此计数总和恒等于记录数。
pub fn group_and_count<'a, T: 'a, I, F>(records: I, key_fn: F, default_label: &str) -> Distribution
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut distribution = Distribution::new();
    for record in records {
        let label = non_empty(key_fn(record)).unwrap_or(default_label);
        distribution.increment(label);
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order_and_defaults() {
        let genders = vec![Some("Male"), None, Some("Female"), Some("Male"), Some(""), Some("Other")];
        let dist = group_and_count(&genders, |g| *g, NOT_SPECIFIED_LABEL);

        assert_eq!(dist.labels(), vec!["Male", "Not specified", "Female", "Other"]);
        assert_eq!(dist.get("Male"), 2);
        assert_eq!(dist.get("Not specified"), 2);
        assert_eq!(dist.get("missing"), 0);
        assert_eq!(dist.total(), genders.len() as u64);
    }

    #[test]
    fn test_unknown_labels_pass_through() {
        let statuses = vec![Some("paid"), Some("refunded"), Some("paid"), Some("PAID")];
        let dist = group_and_count(&statuses, |s| *s, UNKNOWN_LABEL);
        assert_eq!(dist.labels(), vec!["paid", "refunded", "PAID"]);
        assert_eq!(dist.get("paid"), 2);
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut dist = Distribution::new();
        dist.increment("Zeta");
        dist.increment("Alpha");
        dist.add("Zeta", 2);
        let json = serde_json::to_string(&dist).unwrap();
        assert_eq!(json, r#"{"Zeta":3,"Alpha":1}"#);
    }

    #[test]
    fn test_top_keeps_ties_stable() {
        let mut dist = Distribution::new();
        for label in ["b", "a", "c", "a", "c", "d"] {
            dist.increment(label);
        }
        let top = dist.top(3);
        assert_eq!(top.into_entries(), vec![
            ("a".to_string(), 2),
            ("c".to_string(), 2),
            ("b".to_string(), 1),
        ]);
        assert!(Distribution::new().top(5).is_empty());
    }
}

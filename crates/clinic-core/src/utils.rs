//! 通用工具函数
//!
//! 记录来自松散类型的文档存储，字段可能缺失、为 null 或类型不符。
//! 这里的反序列化辅助函数把不符合预期的值降级为 `None`/空值，而不是让整批记录解析失败。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::date::DateLike;

/// 宽松读取字符串：数字和布尔值转为文本，其他形态视为缺失
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// 宽松读取文档ID，缺失时为空字符串
pub fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// 宽松读取金额：接受数字或数字字符串
pub fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// 宽松读取日期字段
pub fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateLike>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value(value.clone()).unwrap_or(DateLike::Unrecognized(value)),
        ),
    })
}

/// 宽松读取列表：非数组视为空，数组中无法解析的元素被跳过
pub fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// 把金额规整为非负有限值
pub fn sanitize_amount(amount: Option<f64>) -> f64 {
    match amount {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// 取非空标签，空字符串视为缺失
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_string")]
        label: Option<String>,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "lenient_list")]
        tags: Vec<String>,
    }

    #[test]
    fn test_lenient_fields() {
        let probe: Probe = serde_json::from_value(serde_json::json!({
            "label": 42,
            "amount": "12.5",
            "tags": ["a", 1, "b"],
        }))
        .unwrap();
        assert_eq!(probe.label.as_deref(), Some("42"));
        assert_eq!(probe.amount, Some(12.5));
        assert_eq!(probe.tags, vec!["a".to_string(), "b".to_string()]);

        let probe: Probe = serde_json::from_value(serde_json::json!({
            "label": { "nested": true },
            "amount": [1, 2],
            "tags": "oops",
        }))
        .unwrap();
        assert!(probe.label.is_none());
        assert!(probe.amount.is_none());
        assert!(probe.tags.is_empty());

        let probe: Probe = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(probe.label.is_none());
    }

    #[test]
    fn test_sanitize_amount() {
        assert_eq!(sanitize_amount(Some(10.0)), 10.0);
        assert_eq!(sanitize_amount(Some(-5.0)), 0.0);
        assert_eq!(sanitize_amount(Some(f64::NAN)), 0.0);
        assert_eq!(sanitize_amount(None), 0.0);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("Male")), Some("Male"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}

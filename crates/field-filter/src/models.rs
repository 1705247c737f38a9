//! 过滤器配置模型

use crate::operators::Op;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 声明式过滤器配置
///
/// 各操作符对 `name` / `value` / `sub_filters` 的要求见 [`crate::compiler`]。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub op: Op,
    /// 以 "." 分隔的字段路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 字面量；IN / ANY_IN 为逗号分隔的列表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, alias = "sub_specs", skip_serializing_if = "Vec::is_empty")]
    pub sub_filters: Vec<FilterSpec>,
}

impl FilterSpec {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            ..Default::default()
        }
    }

    /// 带字段和值的条件，如 EQUAL / IN / LT
    pub fn condition(op: Op, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op,
            name: Some(name.into()),
            value: Some(value.into()),
            sub_filters: Vec::new(),
        }
    }

    pub fn has(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(Op::Has)
        }
    }

    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::condition(Op::Equal, name, value)
    }

    pub fn group(op: Op, sub_filters: Vec<FilterSpec>) -> Self {
        Self {
            sub_filters,
            ..Self::new(op)
        }
    }

    pub fn and(sub_filters: Vec<FilterSpec>) -> Self {
        Self::group(Op::And, sub_filters)
    }

    pub fn or(sub_filters: Vec<FilterSpec>) -> Self {
        Self::group(Op::Or, sub_filters)
    }

    pub fn not(sub_filters: Vec<FilterSpec>) -> Self {
        Self::group(Op::Not, sub_filters)
    }

    pub fn partial(name: impl Into<String>, sub_filters: Vec<FilterSpec>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::group(Op::Partial, sub_filters)
        }
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_serialization() {
        let spec = FilterSpec::and(vec![
            FilterSpec::equal("a.b.int32_value", "1"),
            FilterSpec::partial("a", vec![FilterSpec::has("b")]),
        ]);

        let json = serde_json::to_string_pretty(&spec).unwrap();
        println!("{}", json);

        let parsed = FilterSpec::from_json(&json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_spec_deserialization() {
        let json = r#"
        {
            "op": "NOT",
            "sub_filters": [
                {"op": "EQUAL", "name": "a.b.int32_value", "value": "1"},
                {"op": "ANY_IN", "name": "a.b.int32_values", "value": "1,2"}
            ]
        }
        "#;

        let spec = FilterSpec::from_json(json).unwrap();
        assert_eq!(spec.op, Op::Not);
        assert_eq!(spec.sub_filters.len(), 2);
        assert_eq!(spec.sub_filters[1].op, Op::AnyIn);
        assert_eq!(spec.sub_filters[1].value.as_deref(), Some("1,2"));
    }

    #[test]
    fn test_sub_specs_alias_and_missing_op() {
        let spec = FilterSpec::from_json(r#"{"sub_specs": [{"op": "TRUE"}]}"#).unwrap();
        assert_eq!(spec.op, Op::Invalid);
        assert_eq!(spec.sub_filters, vec![FilterSpec::new(Op::True)]);
    }

    #[test]
    fn test_display_is_compact_json() {
        let spec = FilterSpec::equal("a", "1");
        assert_eq!(spec.to_string(), r#"{"op":"EQUAL","name":"a","value":"1"}"#);
    }
}

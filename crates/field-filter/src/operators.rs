//! 过滤器操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 过滤操作符
///
/// `Invalid` 是缺省值，只用于承接缺失或无法识别的 `op`，编译时总是被拒绝。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Op {
    #[default]
    Invalid,

    // 存在性检查
    Has,

    // 比较
    Equal,
    Gt,
    Lt,

    // 包含检查
    In,
    AnyIn,

    // 字符串匹配（保留，未实现）
    Regexp,

    // 逻辑组合
    Or,
    And,
    Not,

    // 子消息
    Partial,

    True,
}

impl Op {
    /// 逻辑组合类操作符，需要 sub_filters
    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Invalid => "INVALID",
            Self::Has => "HAS",
            Self::Equal => "EQUAL",
            Self::Gt => "GT",
            Self::Lt => "LT",
            Self::In => "IN",
            Self::AnyIn => "ANY_IN",
            Self::Regexp => "REGEXP",
            Self::Or => "OR",
            Self::And => "AND",
            Self::Not => "NOT",
            Self::Partial => "PARTIAL",
            Self::True => "TRUE",
        };
        write!(f, "{}", s)
    }
}

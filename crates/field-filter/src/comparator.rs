//! 整数字段比较
//!
//! LT / GT 共用。字面量的宽度和符号与字段类型一致，在构建时确定。

use crate::accessor;
use crate::coercion::parse_literal;
use crate::error::{FilterError, Result};
use crate::operators::Op;
use crate::path::FieldPath;
use crate::reflect::ReflectMessage;
use crate::value::Value;
use std::cmp::Ordering;

/// 带宽度和符号的整数字面量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerLiteral {
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
}

impl IntegerLiteral {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int32(v) => Some(Self::Int32(v)),
            Value::UInt32(v) => Some(Self::UInt32(v)),
            Value::Int64(v) => Some(Self::Int64(v)),
            Value::UInt64(v) => Some(Self::UInt64(v)),
            _ => None,
        }
    }

    /// 字段值与字面量的大小关系，类型不一致时返回 `None`
    fn compare_field(&self, field: &Value) -> Option<Ordering> {
        match (field, self) {
            (Value::Int32(a), Self::Int32(b)) => Some(a.cmp(b)),
            (Value::UInt32(a), Self::UInt32(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Self::Int64(b)) => Some(a.cmp(b)),
            (Value::UInt64(a), Self::UInt64(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// 比较结果，字段未设置时为 `Invalid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerCompareResult {
    Invalid,
    LessThan,
    Equal,
    GreaterThan,
}

impl From<Ordering> for IntegerCompareResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::LessThan,
            Ordering::Equal => Self::Equal,
            Ordering::Greater => Self::GreaterThan,
        }
    }
}

/// 整数字段与字面量的比较器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerComparator {
    path: FieldPath,
    literal: IntegerLiteral,
}

impl IntegerComparator {
    /// 字段必须是整数类型，`value` 按字段类型解析
    pub fn new(path: FieldPath, value: &str, op: Op) -> Result<Self> {
        let kind = path.last().kind();
        if !kind.is_integer() {
            return Err(FilterError::UnsupportedField {
                field: path.name().to_string(),
                kind: kind.to_string(),
                op,
            });
        }

        let parsed = parse_literal(value, &kind)?;
        let literal = IntegerLiteral::from_value(parsed).ok_or_else(|| {
            FilterError::InvalidLiteral {
                kind: kind.to_string(),
                input: value.to_string(),
            }
        })?;

        Ok(Self { path, literal })
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn literal(&self) -> IntegerLiteral {
        self.literal
    }

    /// 读取字段并与字面量比较
    pub fn compare(&self, record: &dyn ReflectMessage) -> IntegerCompareResult {
        let field = accessor::read(record, &self.path);
        if !field.is_set {
            return IntegerCompareResult::Invalid;
        }
        self.literal
            .compare_field(&field.value)
            .map_or(IntegerCompareResult::Invalid, IntegerCompareResult::from)
    }
}

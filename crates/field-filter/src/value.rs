//! 过滤器可比较的值

use crate::reflect::ReflectValue;
use std::fmt;

/// 过滤器支持的字段值
///
/// 浮点数不在其中：浮点字段在构建过滤器时就被拒绝。枚举以编号表示。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Bool(bool),
    String(String),
    Enum(i32),
}

impl Value {
    /// 将反射层的值转换为过滤器值，浮点数返回 `None`
    pub fn from_reflect(value: ReflectValue) -> Option<Self> {
        Some(match value {
            ReflectValue::Int32(v) => Self::Int32(v),
            ReflectValue::UInt32(v) => Self::UInt32(v),
            ReflectValue::Int64(v) => Self::Int64(v),
            ReflectValue::UInt64(v) => Self::UInt64(v),
            ReflectValue::Bool(v) => Self::Bool(v),
            ReflectValue::String(v) => Self::String(v),
            ReflectValue::Enum(v) => Self::Enum(v),
            ReflectValue::Float(_) | ReflectValue::Double(_) => return None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
        }
    }
}

impl From<Value> for ReflectValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Int32(v) => Self::Int32(v),
            Value::UInt32(v) => Self::UInt32(v),
            Value::Int64(v) => Self::Int64(v),
            Value::UInt64(v) => Self::UInt64(v),
            Value::Bool(v) => Self::Bool(v),
            Value::String(v) => Self::String(v),
            Value::Enum(v) => Self::Enum(v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::Enum(v) => write!(f, "{}", v),
        }
    }
}

/// 从记录读取到的字段值
///
/// 字段未设置时 `value` 为该类型的默认值，`is_set` 为 false。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub is_set: bool,
    pub value: Value,
}

impl FieldValue {
    pub fn new(is_set: bool, value: Value) -> Self {
        Self { is_set, value }
    }

    /// 已设置且等于 `expected`
    pub fn is_set_to(&self, expected: &Value) -> bool {
        self.is_set && &self.value == expected
    }
}

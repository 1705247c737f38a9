//! 记录中存储的字段值

use std::fmt;

/// 反射层读写的标量值
///
/// 枚举以编号存储，和 proto 的线上表示一致。
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectValue {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    Enum(i32),
}

impl ReflectValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
        }
    }
}

impl fmt::Display for ReflectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::Enum(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for ReflectValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for ReflectValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u32> for ReflectValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<u64> for ReflectValue {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<bool> for ReflectValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ReflectValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ReflectValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

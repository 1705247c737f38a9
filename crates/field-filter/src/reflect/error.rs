//! 反射层错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("类型重复定义: {0}")]
    DuplicateType(String),

    #[error("字段重复定义: {message}.{field}")]
    DuplicateField { message: String, field: String },

    #[error("未知类型: {0}")]
    UnknownType(String),

    #[error("字段 {message}.{field} 缺少 type_name")]
    MissingTypeName { message: String, field: String },

    #[error("枚举 {0} 至少需要一个值")]
    EmptyEnum(String),

    #[error("消息 {message} 不包含字段 {field}")]
    UnknownField { message: String, field: String },

    #[error("字段 {field} 类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
}

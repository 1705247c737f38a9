//! 过滤器错误类型

use crate::operators::Op;
use crate::reflect::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("过滤器配置无效: {reason}. 输入 FilterSpec: {spec}")]
    InvalidSpec { reason: String, spec: String },

    #[error("字段路径无效: {path} ({reason})")]
    InvalidPath { path: String, reason: String },

    #[error("字面量无法转换为 {kind}: '{input}'")]
    InvalidLiteral { kind: String, input: String },

    #[error("不支持的操作符: {op}. 输入 FilterSpec: {spec}")]
    UnsupportedOperator { op: Op, spec: String },

    #[error("操作符 {op} 不支持字段 {field} 的类型 {kind}")]
    UnsupportedField { field: String, kind: String, op: Op },

    #[error("消息转换为过滤器失败: {0}")]
    Conversion(String),

    #[error("模式错误: {0}")]
    Schema(#[from] SchemaError),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;

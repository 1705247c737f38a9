//! 字段过滤器引擎
//!
//! 按消息模式将声明式过滤器配置编译成执行树，再对记录求值：
//! - JSON 过滤器配置解析（[`FilterSpec`]）
//! - 按模式校验和编译（[`compile`]）
//! - 短路求值（[`FilterNode::matches`]）
//! - 由示例记录生成等值过滤器（[`derive_spec`]）
//!
//! 记录通过 [`reflect`] 中的反射接口访问，[`DynamicMessage`] 是其内置实现。

pub mod accessor;
pub mod by_example;
pub mod coercion;
pub mod comparator;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod operators;
pub mod path;
pub mod reflect;
pub mod value;

pub use by_example::derive_spec;
pub use comparator::{IntegerCompareResult, IntegerComparator, IntegerLiteral};
pub use compiler::compile;
pub use error::{FilterError, Result};
pub use evaluator::FilterNode;
pub use models::FilterSpec;
pub use operators::Op;
pub use path::{FieldPath, RepeatedRule};
pub use reflect::{
    DescriptorPool, DynamicMessage, MessageDescriptor, ReflectMessage, ReflectMessageMut,
    SchemaDef, SchemaError,
};
pub use value::{FieldValue, Value};

//! 消息反射层
//!
//! 过滤器只依赖 [`ReflectMessage`] / [`ReflectMessageMut`] 两个 trait 和描述符类型；
//! [`DynamicMessage`] 是基于 [`DescriptorPool`] 的通用实现。

pub mod descriptor;
pub mod error;
pub mod message;
pub mod value;

pub use descriptor::{
    DescriptorPool, EnumDef, EnumDescriptor, EnumValueDef, EnumValueDescriptor, FieldDef,
    FieldDescriptor, FieldType, Kind, MessageDef, MessageDescriptor, SchemaDef,
};
pub use error::SchemaError;
pub use message::{DynamicMessage, ReflectMessage, ReflectMessageMut};
pub use value::ReflectValue;

//! 消息描述符
//!
//! 由 [`SchemaDef`] 构建不可变的描述符图。所有描述符共享同一个 `Arc` 池，
//! 克隆开销只是一次引用计数，可以被多个过滤器树同时持有。

use super::error::SchemaError;
use super::value::ReflectValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

// ==================== 模式定义（可序列化输入） ====================

/// 字段类型名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    Bool,
    String,
    Enum,
    Message,
}

/// 字段定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// 消息或枚举字段引用的类型名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub repeated: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, number: u32, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            field_type,
            type_name: None,
            repeated: false,
        }
    }

    pub fn message(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::new(name, number, FieldType::Message)
        }
    }

    pub fn enumeration(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::new(name, number, FieldType::Enum)
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

/// 消息定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// 枚举值定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
}

/// 枚举定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, values: &[(&str, i32)]) -> Self {
        Self {
            name: name.into(),
            values: values
                .iter()
                .map(|(name, number)| EnumValueDef {
                    name: name.to_string(),
                    number: *number,
                })
                .collect(),
        }
    }
}

/// 完整的模式定义
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub messages: Vec<MessageDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

impl SchemaDef {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ==================== 描述符池 ====================

#[derive(Debug)]
struct PoolInner {
    messages: Vec<MessageInner>,
    enums: Vec<EnumInner>,
    message_names: HashMap<String, usize>,
}

#[derive(Debug)]
struct MessageInner {
    name: String,
    fields: Vec<FieldInner>,
    by_name: HashMap<String, usize>,
}

#[derive(Debug)]
struct FieldInner {
    name: String,
    number: u32,
    kind: KindIndex,
    repeated: bool,
}

#[derive(Debug, Clone, Copy)]
enum KindIndex {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Enum(usize),
    Message(usize),
}

#[derive(Debug)]
struct EnumInner {
    name: String,
    values: Vec<EnumValueDef>,
}

/// 描述符池，持有一组相互引用的消息和枚举类型
#[derive(Debug, Clone)]
pub struct DescriptorPool {
    inner: Arc<PoolInner>,
}

impl DescriptorPool {
    /// 从模式定义构建描述符池
    pub fn from_schema(schema: &SchemaDef) -> Result<Self, SchemaError> {
        let mut message_names = HashMap::new();
        for (i, message) in schema.messages.iter().enumerate() {
            if message_names.insert(message.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateType(message.name.clone()));
            }
        }

        let mut enum_names = HashMap::new();
        for (i, def) in schema.enums.iter().enumerate() {
            if message_names.contains_key(&def.name)
                || enum_names.insert(def.name.clone(), i).is_some()
            {
                return Err(SchemaError::DuplicateType(def.name.clone()));
            }
            if def.values.is_empty() {
                return Err(SchemaError::EmptyEnum(def.name.clone()));
            }
        }

        let mut messages = Vec::with_capacity(schema.messages.len());
        for message in &schema.messages {
            let mut fields = Vec::with_capacity(message.fields.len());
            let mut by_name = HashMap::new();
            let mut numbers = HashSet::new();

            for field in &message.fields {
                if by_name.insert(field.name.clone(), fields.len()).is_some() {
                    return Err(SchemaError::DuplicateField {
                        message: message.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if !numbers.insert(field.number) {
                    return Err(SchemaError::DuplicateField {
                        message: message.name.clone(),
                        field: field.number.to_string(),
                    });
                }

                let kind = resolve_kind(message, field, &message_names, &enum_names)?;
                fields.push(FieldInner {
                    name: field.name.clone(),
                    number: field.number,
                    kind,
                    repeated: field.repeated,
                });
            }

            messages.push(MessageInner {
                name: message.name.clone(),
                fields,
                by_name,
            });
        }

        let enums = schema
            .enums
            .iter()
            .map(|def| EnumInner {
                name: def.name.clone(),
                values: def.values.clone(),
            })
            .collect();

        Ok(Self {
            inner: Arc::new(PoolInner {
                messages,
                enums,
                message_names,
            }),
        })
    }

    /// 从 JSON 模式定义构建
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Self::from_schema(&SchemaDef::from_json(json)?)
    }

    /// 按名称查找消息类型
    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        self.inner
            .message_names
            .get(name)
            .map(|&index| MessageDescriptor {
                pool: self.inner.clone(),
                index,
            })
    }
}

fn resolve_kind(
    message: &MessageDef,
    field: &FieldDef,
    message_names: &HashMap<String, usize>,
    enum_names: &HashMap<String, usize>,
) -> Result<KindIndex, SchemaError> {
    let lookup = |names: &HashMap<String, usize>| -> Result<usize, SchemaError> {
        let type_name = field
            .type_name
            .as_deref()
            .ok_or_else(|| SchemaError::MissingTypeName {
                message: message.name.clone(),
                field: field.name.clone(),
            })?;
        names
            .get(type_name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))
    };

    Ok(match field.field_type {
        FieldType::Int32 => KindIndex::Int32,
        FieldType::Int64 => KindIndex::Int64,
        FieldType::Uint32 => KindIndex::UInt32,
        FieldType::Uint64 => KindIndex::UInt64,
        FieldType::Float => KindIndex::Float,
        FieldType::Double => KindIndex::Double,
        FieldType::Bool => KindIndex::Bool,
        FieldType::String => KindIndex::String,
        FieldType::Enum => KindIndex::Enum(lookup(enum_names)?),
        FieldType::Message => KindIndex::Message(lookup(message_names)?),
    })
}

// ==================== 消息描述符 ====================

/// 消息类型描述符
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: Arc<PoolInner>,
    index: usize,
}

impl MessageDescriptor {
    fn inner(&self) -> &MessageInner {
        &self.pool.messages[self.index]
    }

    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// 按声明顺序遍历字段
    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        (0..self.inner().fields.len()).map(move |index| FieldDescriptor {
            message: self.clone(),
            index,
        })
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .by_name
            .get(name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.inner()
            .fields
            .iter()
            .position(|f| f.number == number)
            .map(|index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageDescriptor({})", self.name())
    }
}

// ==================== 字段描述符 ====================

/// 字段描述符
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    fn inner(&self) -> &FieldInner {
        &self.message.inner().fields[self.index]
    }

    pub fn name(&self) -> &str {
        &self.inner().name
    }

    pub fn number(&self) -> u32 {
        self.inner().number
    }

    pub fn is_repeated(&self) -> bool {
        self.inner().repeated
    }

    /// 字段所属的消息类型
    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    pub fn kind(&self) -> Kind {
        let pool = &self.message.pool;
        match self.inner().kind {
            KindIndex::Int32 => Kind::Int32,
            KindIndex::Int64 => Kind::Int64,
            KindIndex::UInt32 => Kind::UInt32,
            KindIndex::UInt64 => Kind::UInt64,
            KindIndex::Float => Kind::Float,
            KindIndex::Double => Kind::Double,
            KindIndex::Bool => Kind::Bool,
            KindIndex::String => Kind::String,
            KindIndex::Enum(index) => Kind::Enum(EnumDescriptor {
                pool: pool.clone(),
                index,
            }),
            KindIndex::Message(index) => Kind::Message(MessageDescriptor {
                pool: pool.clone(),
                index,
            }),
        }
    }

    /// 未设置时读取到的默认值，消息字段没有标量默认值
    pub fn default_value(&self) -> Option<ReflectValue> {
        self.kind().default_value()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldDescriptor({}.{}: {}{})",
            self.message.name(),
            self.name(),
            if self.is_repeated() { "repeated " } else { "" },
            self.kind()
        )
    }
}

/// 字段类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Enum(EnumDescriptor),
    Message(MessageDescriptor),
}

impl Kind {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::UInt32 | Self::UInt64)
    }

    pub fn default_value(&self) -> Option<ReflectValue> {
        Some(match self {
            Self::Int32 => ReflectValue::Int32(0),
            Self::Int64 => ReflectValue::Int64(0),
            Self::UInt32 => ReflectValue::UInt32(0),
            Self::UInt64 => ReflectValue::UInt64(0),
            Self::Float => ReflectValue::Float(0.0),
            Self::Double => ReflectValue::Double(0.0),
            Self::Bool => ReflectValue::Bool(false),
            Self::String => ReflectValue::String(String::new()),
            // proto2 语义：未设置的枚举字段取第一个声明的值
            Self::Enum(descriptor) => ReflectValue::Enum(descriptor.default_value().number()),
            Self::Message(_) => return None,
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::UInt32 => write!(f, "uint32"),
            Self::UInt64 => write!(f, "uint64"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Enum(e) => write!(f, "enum {}", e.name()),
            Self::Message(m) => write!(f, "message {}", m.name()),
        }
    }
}

// ==================== 枚举描述符 ====================

/// 枚举类型描述符
#[derive(Clone)]
pub struct EnumDescriptor {
    pool: Arc<PoolInner>,
    index: usize,
}

impl EnumDescriptor {
    fn inner(&self) -> &EnumInner {
        &self.pool.enums[self.index]
    }

    pub fn name(&self) -> &str {
        &self.inner().name
    }

    pub fn values(&self) -> impl Iterator<Item = EnumValueDescriptor> + '_ {
        self.inner()
            .values
            .iter()
            .enumerate()
            .map(|(index, v)| EnumValueDescriptor::new(index, v))
    }

    pub fn get_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        self.values().find(|v| v.name() == name)
    }

    /// 按枚举编号查找，存在别名时返回第一个声明的值
    pub fn get_value(&self, number: i32) -> Option<EnumValueDescriptor> {
        self.values().find(|v| v.number() == number)
    }

    pub fn default_value(&self) -> EnumValueDescriptor {
        // 构建时已保证枚举至少有一个值
        EnumValueDescriptor::new(0, &self.inner().values[0])
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool) && self.index == other.index
    }
}

impl Eq for EnumDescriptor {}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumDescriptor({})", self.name())
    }
}

/// 枚举值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    index: usize,
    name: String,
    number: i32,
}

impl EnumValueDescriptor {
    fn new(index: usize, def: &EnumValueDef) -> Self {
        Self {
            index,
            name: def.name.clone(),
            number: def.number,
        }
    }

    /// 声明顺序中的位置
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> i32 {
        self.number
    }
}

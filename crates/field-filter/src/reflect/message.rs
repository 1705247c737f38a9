//! 消息反射接口与动态消息实现

use super::descriptor::{FieldDescriptor, Kind, MessageDescriptor};
use super::error::SchemaError;
use super::value::ReflectValue;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// 只读反射接口
///
/// 所有方法的 `field` 参数必须属于 `self.descriptor()`，否则行为未定义（实现可以 panic）。
pub trait ReflectMessage: fmt::Debug {
    fn descriptor(&self) -> MessageDescriptor;

    /// 单值字段是否被显式设置；重复字段返回是否非空
    fn has_field(&self, field: &FieldDescriptor) -> bool;

    /// 单值标量字段的值，未设置时返回默认值；消息字段返回 `None`
    fn get_value(&self, field: &FieldDescriptor) -> Option<ReflectValue>;

    /// 单值消息字段，未设置时返回 `None`
    fn get_message(&self, field: &FieldDescriptor) -> Option<&dyn ReflectMessage>;

    fn repeated_len(&self, field: &FieldDescriptor) -> usize;

    /// 重复标量字段的第 `index` 个元素；越界或字段不是标量时返回 `None`
    fn get_repeated_value(&self, field: &FieldDescriptor, index: usize) -> Option<ReflectValue>;

    /// 已设置的字段，按字段编号升序
    fn set_fields(&self) -> Vec<FieldDescriptor>;
}

/// 可写反射接口
pub trait ReflectMessageMut: ReflectMessage {
    fn set_value(&mut self, field: &FieldDescriptor, value: ReflectValue)
    -> Result<(), SchemaError>;

    fn push_value(
        &mut self,
        field: &FieldDescriptor,
        value: ReflectValue,
    ) -> Result<(), SchemaError>;

    /// 获取单值消息字段，未设置时先创建一个空消息
    fn message_mut(
        &mut self,
        field: &FieldDescriptor,
    ) -> Result<&mut dyn ReflectMessageMut, SchemaError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Value(ReflectValue),
    Message(Box<DynamicMessage>),
    Values(Vec<ReflectValue>),
    Messages(Vec<DynamicMessage>),
}

/// 基于描述符的动态消息
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<u32, Slot>,
}

impl DynamicMessage {
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// 按名称查找本消息的字段
    pub fn field_by_name(&self, name: &str) -> Result<FieldDescriptor, SchemaError> {
        self.descriptor
            .get_field_by_name(name)
            .ok_or_else(|| SchemaError::UnknownField {
                message: self.descriptor.name().to_string(),
                field: name.to_string(),
            })
    }

    /// 添加一个重复消息字段元素并返回其可变引用
    pub fn push_message(
        &mut self,
        field: &FieldDescriptor,
    ) -> Result<&mut DynamicMessage, SchemaError> {
        let Kind::Message(descriptor) = field.kind() else {
            return Err(mismatch(field, "message", &field.kind().to_string()));
        };
        if !field.is_repeated() {
            return Err(mismatch(field, "repeated message", "message"));
        }

        let slot = self
            .fields
            .entry(field.number())
            .or_insert_with(|| Slot::Messages(Vec::new()));
        match slot {
            Slot::Messages(messages) => {
                messages.push(DynamicMessage::new(descriptor));
                let last = messages.len() - 1;
                Ok(&mut messages[last])
            }
            _ => Err(mismatch(field, "repeated message", "scalar")),
        }
    }

    /// 从 JSON 对象解码
    ///
    /// 枚举字段接受名称或编号；64 位整数接受数字或字符串；`null` 视为未设置。
    pub fn from_json(descriptor: MessageDescriptor, json: &JsonValue) -> Result<Self, SchemaError> {
        let JsonValue::Object(map) = json else {
            return Err(SchemaError::TypeMismatch {
                field: descriptor.name().to_string(),
                expected: "object".to_string(),
                actual: json_type_name(json).to_string(),
            });
        };

        let mut message = Self::new(descriptor);
        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            let field = message.field_by_name(name)?;

            if field.is_repeated() {
                let JsonValue::Array(items) = value else {
                    return Err(mismatch(&field, "array", json_type_name(value)));
                };
                for item in items {
                    match field.kind() {
                        Kind::Message(sub) => {
                            let decoded = Self::from_json(sub, item)?;
                            *message.push_message(&field)? = decoded;
                        }
                        kind => message.push_value(&field, decode_scalar(&field, &kind, item)?)?,
                    }
                }
            } else {
                match field.kind() {
                    Kind::Message(sub) => {
                        let decoded = Self::from_json(sub, value)?;
                        message
                            .fields
                            .insert(field.number(), Slot::Message(Box::new(decoded)));
                    }
                    kind => message.set_value(&field, decode_scalar(&field, &kind, value)?)?,
                }
            }
        }

        Ok(message)
    }
}

impl ReflectMessage for DynamicMessage {
    fn descriptor(&self) -> MessageDescriptor {
        self.descriptor.clone()
    }

    fn has_field(&self, field: &FieldDescriptor) -> bool {
        match self.fields.get(&field.number()) {
            None => false,
            Some(Slot::Values(values)) => !values.is_empty(),
            Some(Slot::Messages(messages)) => !messages.is_empty(),
            Some(_) => true,
        }
    }

    fn get_value(&self, field: &FieldDescriptor) -> Option<ReflectValue> {
        match self.fields.get(&field.number()) {
            Some(Slot::Value(value)) => Some(value.clone()),
            _ => field.default_value(),
        }
    }

    fn get_message(&self, field: &FieldDescriptor) -> Option<&dyn ReflectMessage> {
        match self.fields.get(&field.number()) {
            Some(Slot::Message(message)) => Some(message.as_ref()),
            _ => None,
        }
    }

    fn repeated_len(&self, field: &FieldDescriptor) -> usize {
        match self.fields.get(&field.number()) {
            Some(Slot::Values(values)) => values.len(),
            Some(Slot::Messages(messages)) => messages.len(),
            _ => 0,
        }
    }

    fn get_repeated_value(&self, field: &FieldDescriptor, index: usize) -> Option<ReflectValue> {
        match self.fields.get(&field.number()) {
            Some(Slot::Values(values)) => values.get(index).cloned(),
            _ => None,
        }
    }

    fn set_fields(&self) -> Vec<FieldDescriptor> {
        self.fields
            .keys()
            .filter_map(|&number| self.descriptor.get_field(number))
            .filter(|field| self.has_field(field))
            .collect()
    }
}

impl ReflectMessageMut for DynamicMessage {
    fn set_value(
        &mut self,
        field: &FieldDescriptor,
        value: ReflectValue,
    ) -> Result<(), SchemaError> {
        if field.is_repeated() {
            return Err(mismatch(field, "singular field", "repeated field"));
        }
        check_kind(field, &value)?;
        self.fields.insert(field.number(), Slot::Value(value));
        Ok(())
    }

    fn push_value(
        &mut self,
        field: &FieldDescriptor,
        value: ReflectValue,
    ) -> Result<(), SchemaError> {
        if !field.is_repeated() {
            return Err(mismatch(field, "repeated field", "singular field"));
        }
        check_kind(field, &value)?;
        match self
            .fields
            .entry(field.number())
            .or_insert_with(|| Slot::Values(Vec::new()))
        {
            Slot::Values(values) => {
                values.push(value);
                Ok(())
            }
            _ => Err(mismatch(field, "repeated scalar", "repeated message")),
        }
    }

    fn message_mut(
        &mut self,
        field: &FieldDescriptor,
    ) -> Result<&mut dyn ReflectMessageMut, SchemaError> {
        let Kind::Message(descriptor) = field.kind() else {
            return Err(mismatch(field, "message", &field.kind().to_string()));
        };
        if field.is_repeated() {
            return Err(mismatch(field, "singular message", "repeated message"));
        }

        match self
            .fields
            .entry(field.number())
            .or_insert_with(|| Slot::Message(Box::new(DynamicMessage::new(descriptor))))
        {
            Slot::Message(message) => Ok(message.as_mut()),
            _ => Err(mismatch(field, "message", "scalar")),
        }
    }
}

fn mismatch(field: &FieldDescriptor, expected: &str, actual: &str) -> SchemaError {
    SchemaError::TypeMismatch {
        field: field.name().to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn check_kind(field: &FieldDescriptor, value: &ReflectValue) -> Result<(), SchemaError> {
    let kind = field.kind();
    let ok = matches!(
        (&kind, value),
        (Kind::Int32, ReflectValue::Int32(_))
            | (Kind::Int64, ReflectValue::Int64(_))
            | (Kind::UInt32, ReflectValue::UInt32(_))
            | (Kind::UInt64, ReflectValue::UInt64(_))
            | (Kind::Float, ReflectValue::Float(_))
            | (Kind::Double, ReflectValue::Double(_))
            | (Kind::Bool, ReflectValue::Bool(_))
            | (Kind::String, ReflectValue::String(_))
            | (Kind::Enum(_), ReflectValue::Enum(_))
    );
    // 枚举值必须在枚举中声明
    if let (Kind::Enum(descriptor), ReflectValue::Enum(number)) = (&kind, value) {
        if descriptor.get_value(*number).is_none() {
            return Err(mismatch(field, descriptor.name(), &number.to_string()));
        }
    }
    if ok {
        Ok(())
    } else {
        Err(mismatch(field, &kind.to_string(), value.type_name()))
    }
}

fn decode_scalar(
    field: &FieldDescriptor,
    kind: &Kind,
    json: &JsonValue,
) -> Result<ReflectValue, SchemaError> {
    let err = || mismatch(field, &kind.to_string(), json_type_name(json));

    // 整数既可以是 JSON 数字，也可以是字符串（避免 64 位精度丢失）
    fn integer<T: std::str::FromStr + TryFrom<i64> + TryFrom<u64>>(json: &JsonValue) -> Option<T> {
        match json {
            JsonValue::Number(n) => n
                .as_i64()
                .and_then(|v| T::try_from(v).ok())
                .or_else(|| n.as_u64().and_then(|v| T::try_from(v).ok())),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    Ok(match kind {
        Kind::Int32 => ReflectValue::Int32(integer(json).ok_or_else(err)?),
        Kind::Int64 => ReflectValue::Int64(integer(json).ok_or_else(err)?),
        Kind::UInt32 => ReflectValue::UInt32(integer(json).ok_or_else(err)?),
        Kind::UInt64 => ReflectValue::UInt64(integer(json).ok_or_else(err)?),
        Kind::Float => ReflectValue::Float(json.as_f64().ok_or_else(err)? as f32),
        Kind::Double => ReflectValue::Double(json.as_f64().ok_or_else(err)?),
        Kind::Bool => ReflectValue::Bool(json.as_bool().ok_or_else(err)?),
        Kind::String => ReflectValue::String(json.as_str().ok_or_else(err)?.to_string()),
        Kind::Enum(descriptor) => {
            let value = match json {
                JsonValue::String(name) => descriptor.get_value_by_name(name),
                JsonValue::Number(n) => n
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .and_then(|number| descriptor.get_value(number)),
                _ => None,
            };
            ReflectValue::Enum(value.ok_or_else(err)?.number())
        }
        Kind::Message(_) => return Err(err()),
    })
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::descriptor::{
        DescriptorPool, EnumDef, FieldDef, FieldType, MessageDef, SchemaDef,
    };
    use serde_json::json;

    fn event_descriptor() -> MessageDescriptor {
        let schema = SchemaDef {
            messages: vec![
                MessageDef::new(
                    "Event",
                    vec![
                        FieldDef::new("id", 1, FieldType::String),
                        FieldDef::new("amount", 2, FieldType::Uint64),
                        FieldDef::enumeration("kind", 3, "Kind"),
                        FieldDef::message("user", 4, "User"),
                        FieldDef::new("tags", 5, FieldType::String).repeated(),
                        FieldDef::message("items", 6, "User").repeated(),
                    ],
                ),
                MessageDef::new("User", vec![FieldDef::new("vip", 1, FieldType::Bool)]),
            ],
            enums: vec![EnumDef::new("Kind", &[("PURCHASE", 1), ("REFUND", 2)])],
        };
        DescriptorPool::from_schema(&schema)
            .unwrap()
            .get_message_by_name("Event")
            .unwrap()
    }

    #[test]
    fn test_presence_and_defaults() {
        let descriptor = event_descriptor();
        let mut message = DynamicMessage::new(descriptor.clone());
        let amount = message.field_by_name("amount").unwrap();

        assert!(!message.has_field(&amount));
        assert_eq!(message.get_value(&amount), Some(ReflectValue::UInt64(0)));

        message.set_value(&amount, ReflectValue::UInt64(0)).unwrap();
        assert!(message.has_field(&amount));
        assert_eq!(message.set_fields(), vec![amount]);
    }

    #[test]
    fn test_set_value_type_mismatch() {
        let mut message = DynamicMessage::new(event_descriptor());
        let amount = message.field_by_name("amount").unwrap();

        let result = message.set_value(&amount, ReflectValue::Int32(1));
        assert!(matches!(result, Err(SchemaError::TypeMismatch { .. })));
    }

    #[test]
    fn test_set_value_undeclared_enum() {
        let mut message = DynamicMessage::new(event_descriptor());
        let kind = message.field_by_name("kind").unwrap();

        let result = message.set_value(&kind, ReflectValue::Enum(99));
        assert!(matches!(result, Err(SchemaError::TypeMismatch { .. })));
        assert!(!message.has_field(&kind));

        message.set_value(&kind, ReflectValue::Enum(2)).unwrap();
        assert_eq!(message.get_value(&kind), Some(ReflectValue::Enum(2)));
    }

    #[test]
    fn test_message_mut_materializes() {
        let mut message = DynamicMessage::new(event_descriptor());
        let user = message.field_by_name("user").unwrap();
        assert!(message.get_message(&user).is_none());

        let vip = {
            let sub = message.message_mut(&user).unwrap();
            let vip = sub.descriptor().get_field_by_name("vip").unwrap();
            sub.set_value(&vip, ReflectValue::Bool(true)).unwrap();
            vip
        };

        let sub = message.get_message(&user).unwrap();
        assert_eq!(sub.get_value(&vip), Some(ReflectValue::Bool(true)));
    }

    #[test]
    fn test_from_json() {
        let message = DynamicMessage::from_json(
            event_descriptor(),
            &json!({
                "id": "order-1",
                "amount": "18446744073709551615",
                "kind": "REFUND",
                "user": {"vip": true},
                "tags": ["a", "b"],
                "items": [{"vip": false}, {}]
            }),
        )
        .unwrap();

        let amount = message.field_by_name("amount").unwrap();
        let kind = message.field_by_name("kind").unwrap();
        let tags = message.field_by_name("tags").unwrap();
        let items = message.field_by_name("items").unwrap();

        assert_eq!(message.get_value(&amount), Some(ReflectValue::UInt64(u64::MAX)));
        assert_eq!(message.get_value(&kind), Some(ReflectValue::Enum(2)));
        assert_eq!(message.repeated_len(&tags), 2);
        assert_eq!(
            message.get_repeated_value(&tags, 1),
            Some(ReflectValue::String("b".to_string()))
        );
        assert_eq!(message.repeated_len(&items), 2);
        assert_eq!(message.set_fields().len(), 6);
    }

    #[test]
    fn test_from_json_unknown_field() {
        let result = DynamicMessage::from_json(event_descriptor(), &json!({"missing": 1}));
        assert!(matches!(result, Err(SchemaError::UnknownField { .. })));
    }

    #[test]
    fn test_from_json_out_of_range() {
        let descriptor = event_descriptor();
        let result = DynamicMessage::from_json(descriptor.clone(), &json!({"amount": -1}));
        assert!(matches!(result, Err(SchemaError::TypeMismatch { .. })));

        let result = DynamicMessage::from_json(descriptor, &json!({"kind": "UNKNOWN"}));
        assert!(matches!(result, Err(SchemaError::TypeMismatch { .. })));
    }
}

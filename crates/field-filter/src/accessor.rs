//! 按字段路径读写记录
//!
//! 读取时未设置的中间消息等价于空消息，不会报错。

use crate::error::Result;
use crate::path::FieldPath;
use crate::reflect::{ReflectMessage, ReflectMessageMut, ReflectValue};
use crate::value::{FieldValue, Value};

/// 获取目标字段所在的消息，任一中间消息未设置时返回 `None`
pub fn parent<'a>(
    record: &'a dyn ReflectMessage,
    path: &FieldPath,
) -> Option<&'a dyn ReflectMessage> {
    let mut current = record;
    for field in path.parents() {
        current = current.get_message(field)?;
    }
    Some(current)
}

/// 读取单值标量字段及其是否被设置
///
/// 路径必须指向过滤器支持的标量类型，否则 panic；构建过滤器时已经排除这种情况。
pub fn read(record: &dyn ReflectMessage, path: &FieldPath) -> FieldValue {
    let field = path.last();
    match parent(record, path) {
        Some(message) => {
            FieldValue::new(message.has_field(field), to_value(message.get_value(field)))
        }
        None => FieldValue::new(false, to_value(field.default_value())),
    }
}

/// 按存储顺序读取重复字段的全部元素，不去重
pub fn read_all(record: &dyn ReflectMessage, path: &FieldPath) -> Vec<Value> {
    let Some(message) = parent(record, path) else {
        return Vec::new();
    };
    let field = path.last();
    (0..message.repeated_len(field))
        .map(|i| to_value(message.get_repeated_value(field, i)))
        .collect()
}

/// 重复字段的元素数量
pub fn count(record: &dyn ReflectMessage, path: &FieldPath) -> usize {
    parent(record, path).map_or(0, |message| message.repeated_len(path.last()))
}

/// 单值字段是否被设置，重复字段是否非空
pub fn has(record: &dyn ReflectMessage, path: &FieldPath) -> bool {
    let field = path.last();
    if field.is_repeated() {
        count(record, path) > 0
    } else {
        parent(record, path).is_some_and(|message| message.has_field(field))
    }
}

/// 读取单值消息字段，未设置时返回 `None`
pub fn read_message<'a>(
    record: &'a dyn ReflectMessage,
    path: &FieldPath,
) -> Option<&'a dyn ReflectMessage> {
    parent(record, path)?.get_message(path.last())
}

/// 写入单值标量字段，自动创建中间消息
pub fn write(record: &mut dyn ReflectMessageMut, path: &FieldPath, value: Value) -> Result<()> {
    let mut current = record;
    for field in path.parents() {
        current = current.message_mut(field)?;
    }
    current.set_value(path.last(), ReflectValue::from(value))?;
    Ok(())
}

fn to_value(value: Option<ReflectValue>) -> Value {
    match value.and_then(Value::from_reflect) {
        Some(value) => value,
        None => unreachable!("字段类型不受过滤器支持，应在构建时被拒绝"),
    }
}

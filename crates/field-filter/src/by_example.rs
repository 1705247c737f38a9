//! 由示例记录生成过滤器配置
//!
//! 对记录中每个已设置的字段生成一个条件，组合为 AND：
//! 标量字段为 EQUAL，子消息为 PARTIAL 并递归生成。

use crate::error::{FilterError, Result};
use crate::models::FilterSpec;
use crate::reflect::{FieldDescriptor, Kind, ReflectMessage, ReflectValue};
use tracing::instrument;

/// 从记录生成等值匹配的过滤器配置
///
/// 重复字段和浮点字段不受支持，遇到时立即失败。空记录得到没有子条件的 AND，无法编译。
#[instrument(skip_all, fields(message = %record.descriptor().name()))]
pub fn derive_spec(record: &dyn ReflectMessage) -> Result<FilterSpec> {
    let sub_filters = record
        .set_fields()
        .iter()
        .map(|field| derive_field(record, field))
        .collect::<Result<Vec<_>>>()?;
    Ok(FilterSpec::and(sub_filters))
}

fn derive_field(record: &dyn ReflectMessage, field: &FieldDescriptor) -> Result<FilterSpec> {
    if field.is_repeated() {
        return Err(FilterError::Conversion(format!(
            "不支持重复字段 {}, 记录: {:?}",
            field.name(),
            record
        )));
    }

    let kind = field.kind();
    if let Kind::Message(_) = kind {
        let sub = record.get_message(field).ok_or_else(|| {
            FilterError::Conversion(format!("子消息 {} 未设置", field.name()))
        })?;
        return Ok(FilterSpec::partial(field.name(), vec![derive_spec(sub)?]));
    }

    let value = record.get_value(field).ok_or_else(|| {
        FilterError::Conversion(format!("无法读取字段 {}", field.name()))
    })?;
    let literal = match (&kind, value) {
        (Kind::Enum(descriptor), ReflectValue::Enum(number)) => descriptor
            .get_value(number)
            .map_or_else(|| number.to_string(), |v| v.name().to_string()),
        (_, ReflectValue::Float(_) | ReflectValue::Double(_)) => {
            return Err(FilterError::Conversion(format!(
                "不支持的字段类型 {}: {}, 记录: {:?}",
                kind,
                field.name(),
                record
            )));
        }
        (_, ReflectValue::String(s)) => s,
        (_, other) => other.to_string(),
    };

    Ok(FilterSpec::equal(field.name(), literal))
}

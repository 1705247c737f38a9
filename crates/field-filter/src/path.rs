//! 字段路径解析
//!
//! 将 "a.b.c" 形式的字段名解析为描述符链。除最后一段外，每一段都必须是非重复的消息字段。

use crate::error::{FilterError, Result};
use crate::reflect::{FieldDescriptor, Kind, MessageDescriptor};

/// 路径最后一段对重复字段的要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatedRule {
    /// 最后一段不能是重复字段
    Forbid,
    /// 最后一段可以是重复字段
    Allow,
    /// 最后一段必须是重复字段
    Require,
}

/// 解析后的字段路径，非空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl FieldPath {
    /// 在 `descriptor` 中解析 `name`
    pub fn resolve(descriptor: &MessageDescriptor, name: &str, rule: RepeatedRule) -> Result<Self> {
        let invalid = |reason: String| FilterError::InvalidPath {
            path: name.to_string(),
            reason,
        };

        let segments: Vec<&str> = name.split('.').collect();
        let mut fields = Vec::with_capacity(segments.len());
        let mut current = descriptor.clone();

        for (i, segment) in segments.iter().enumerate() {
            let field = current.get_field_by_name(segment).ok_or_else(|| {
                invalid(format!("消息 {} 不包含字段 '{}'", current.name(), segment))
            })?;

            if i + 1 < segments.len() {
                if field.is_repeated() {
                    return Err(invalid(format!("路径中不允许重复字段: {}", segment)));
                }
                current = match field.kind() {
                    Kind::Message(sub) => sub,
                    kind => {
                        return Err(invalid(format!(
                            "字段 {} 的类型为 {}, 不是消息",
                            segment, kind
                        )));
                    }
                };
            }
            fields.push(field);
        }

        // split 至少产生一段，失败时上面已经返回
        let Some(last) = fields.last() else {
            return Err(invalid("字段路径为空".to_string()));
        };

        match rule {
            RepeatedRule::Forbid if last.is_repeated() => {
                Err(invalid(format!("路径中不允许重复字段: {}", last.name())))
            }
            RepeatedRule::Require if !last.is_repeated() => {
                Err(invalid(format!("字段 {} 必须是重复字段", last.name())))
            }
            _ => Ok(Self {
                name: name.to_string(),
                fields,
            }),
        }
    }

    /// 原始的点分字段名
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// 目标字段
    pub fn last(&self) -> &FieldDescriptor {
        &self.fields[self.fields.len() - 1]
    }

    /// 目标字段之前的消息字段
    pub fn parents(&self) -> &[FieldDescriptor] {
        &self.fields[..self.fields.len() - 1]
    }
}

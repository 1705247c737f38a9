//! 过滤器执行树
//!
//! 构建完成后不可变，可在多个线程间共享并发求值。AND / OR 短路求值。

use crate::accessor;
use crate::by_example::derive_spec;
use crate::comparator::{IntegerCompareResult, IntegerComparator};
use crate::compiler;
use crate::error::Result;
use crate::models::FilterSpec;
use crate::path::FieldPath;
use crate::reflect::{MessageDescriptor, ReflectMessage};
use crate::value::Value;
use std::collections::HashSet;

/// 编译后的过滤器节点
///
/// 描述符按所属模式池的身份比较，`PartialEq` 只在同一个 [`crate::DescriptorPool`] 内有意义。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    True,
    /// 单值字段已设置，或重复字段非空
    Has(FieldPath),
    Equal(FieldPath, Value),
    In(FieldPath, HashSet<Value>),
    /// 重复字段中任一元素在集合内
    AnyIn(FieldPath, HashSet<Value>),
    LessThan(IntegerComparator),
    GreaterThan(IntegerComparator),
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
    /// 子消息已设置且满足全部子节点，子节点按子消息类型构建
    Partial(FieldPath, Vec<FilterNode>),
}

impl FilterNode {
    /// 按 `descriptor` 编译过滤器配置，见 [`compiler::compile`]
    pub fn new(descriptor: &MessageDescriptor, spec: &FilterSpec) -> Result<Self> {
        compiler::compile(descriptor, spec)
    }

    /// 由示例记录构建过滤器，只匹配所有已设置字段都与示例相同的记录
    ///
    /// 等价于先 [`derive_spec`] 再按记录的消息类型编译，失败条件同两者。
    pub fn from_record(record: &dyn ReflectMessage) -> Result<Self> {
        let spec = derive_spec(record)?;
        compiler::compile(&record.descriptor(), &spec)
    }

    /// 判断记录是否满足过滤条件
    pub fn matches(&self, record: &dyn ReflectMessage) -> bool {
        match self {
            Self::True => true,
            Self::Has(path) => accessor::has(record, path),
            Self::Equal(path, expected) => accessor::read(record, path).is_set_to(expected),
            Self::In(path, values) => {
                let field = accessor::read(record, path);
                field.is_set && values.contains(&field.value)
            }
            Self::AnyIn(path, values) => accessor::read_all(record, path)
                .iter()
                .any(|value| values.contains(value)),
            Self::LessThan(comparator) => {
                comparator.compare(record) == IntegerCompareResult::LessThan
            }
            Self::GreaterThan(comparator) => {
                comparator.compare(record) == IntegerCompareResult::GreaterThan
            }
            Self::And(children) => children.iter().all(|child| child.matches(record)),
            Self::Or(children) => children.iter().any(|child| child.matches(record)),
            Self::Not(child) => !child.matches(record),
            Self::Partial(path, children) => match accessor::read_message(record, path) {
                Some(sub) => children.iter().all(|child| child.matches(sub)),
                None => false,
            },
        }
    }
}

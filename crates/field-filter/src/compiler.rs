//! 过滤器编译器
//!
//! 按消息类型校验 [`FilterSpec`] 并编译成 [`FilterNode`] 执行树。任一节点不合法时整体失败，
//! 路径、字面量和字段类型错误统一报告为 [`FilterError::InvalidSpec`]，附带出错的那一层配置。
//!
//! | 操作符 | 必填 | 路径要求 |
//! |---|---|---|
//! | TRUE | 无，且不能有 name / value / sub_filters | - |
//! | HAS | name | 最后一段可以是重复字段 |
//! | EQUAL / IN | name, value | 不允许重复字段 |
//! | ANY_IN | name, value | 最后一段必须是重复字段 |
//! | LT / GT | name, value | 不允许重复字段，字段必须是整数 |
//! | AND / OR / NOT | 至少一个 sub_filters | - |
//! | PARTIAL | name, 至少一个 sub_filters | 不允许重复字段，字段必须是消息 |

use crate::coercion::{parse_literal, parse_literal_set};
use crate::comparator::IntegerComparator;
use crate::error::{FilterError, Result};
use crate::evaluator::FilterNode;
use crate::models::FilterSpec;
use crate::operators::Op;
use crate::path::{FieldPath, RepeatedRule};
use crate::reflect::{Kind, MessageDescriptor};
use tracing::{debug, instrument, warn};

/// 按 `descriptor` 描述的消息类型编译过滤器
#[instrument(skip_all, fields(message = %descriptor.name(), op = %spec.op))]
pub fn compile(descriptor: &MessageDescriptor, spec: &FilterSpec) -> Result<FilterNode> {
    build(descriptor, spec)
}

/// 递归构建节点
fn build(descriptor: &MessageDescriptor, spec: &FilterSpec) -> Result<FilterNode> {
    build_node(descriptor, spec).map_err(|e| match e {
        FilterError::InvalidPath { .. }
        | FilterError::InvalidLiteral { .. }
        | FilterError::UnsupportedField { .. } => invalid(spec, &e.to_string()),
        other => other,
    })
}

fn build_node(descriptor: &MessageDescriptor, spec: &FilterSpec) -> Result<FilterNode> {
    let node = match spec.op {
        Op::True => {
            if spec.name.is_some() || spec.value.is_some() || !spec.sub_filters.is_empty() {
                return Err(invalid(spec, "TRUE 不能包含 name、value 或 sub_filters"));
            }
            FilterNode::True
        }
        Op::Has => {
            let path = resolve(descriptor, spec, RepeatedRule::Allow)?;
            FilterNode::Has(path)
        }
        Op::Equal => {
            let path = resolve(descriptor, spec, RepeatedRule::Forbid)?;
            let kind = comparable_kind(&path, spec.op)?;
            let value = parse_literal(required_value(spec)?, &kind)?;
            FilterNode::Equal(path, value)
        }
        Op::In => {
            let path = resolve(descriptor, spec, RepeatedRule::Forbid)?;
            let kind = comparable_kind(&path, spec.op)?;
            let values = parse_literal_set(required_value(spec)?, &kind)?;
            FilterNode::In(path, values)
        }
        Op::AnyIn => {
            let path = resolve(descriptor, spec, RepeatedRule::Require)?;
            let kind = comparable_kind(&path, spec.op)?;
            let values = parse_literal_set(required_value(spec)?, &kind)?;
            FilterNode::AnyIn(path, values)
        }
        Op::Lt => {
            let path = resolve(descriptor, spec, RepeatedRule::Forbid)?;
            let value = required_value(spec)?;
            FilterNode::LessThan(IntegerComparator::new(path, value, spec.op)?)
        }
        Op::Gt => {
            let path = resolve(descriptor, spec, RepeatedRule::Forbid)?;
            let value = required_value(spec)?;
            FilterNode::GreaterThan(IntegerComparator::new(path, value, spec.op)?)
        }
        Op::And => FilterNode::And(build_children(descriptor, spec)?),
        Op::Or => FilterNode::Or(build_children(descriptor, spec)?),
        // NOT 等价于对同一组子条件的 AND 取反
        Op::Not => {
            let children = build_children(descriptor, spec)?;
            FilterNode::Not(Box::new(FilterNode::And(children)))
        }
        Op::Partial => {
            let path = resolve(descriptor, spec, RepeatedRule::Forbid)?;
            let Kind::Message(sub_descriptor) = path.last().kind() else {
                return Err(FilterError::UnsupportedField {
                    field: path.name().to_string(),
                    kind: path.last().kind().to_string(),
                    op: spec.op,
                });
            };
            let children = build_children(&sub_descriptor, spec)?;
            FilterNode::Partial(path, children)
        }
        Op::Regexp | Op::Invalid => {
            warn!("不支持的操作符: {}, FilterSpec: {}", spec.op, spec);
            return Err(FilterError::UnsupportedOperator {
                op: spec.op,
                spec: spec.to_string(),
            });
        }
    };

    debug!(op = %spec.op, name = ?spec.name, "过滤器节点已编译");
    Ok(node)
}

fn build_children(descriptor: &MessageDescriptor, spec: &FilterSpec) -> Result<Vec<FilterNode>> {
    if spec.sub_filters.is_empty() {
        return Err(invalid(spec, &format!("{} 至少需要一个 sub_filters", spec.op)));
    }
    spec.sub_filters
        .iter()
        .map(|sub| build(descriptor, sub))
        .collect()
}

fn resolve(
    descriptor: &MessageDescriptor,
    spec: &FilterSpec,
    rule: RepeatedRule,
) -> Result<FieldPath> {
    let name = spec
        .name
        .as_deref()
        .ok_or_else(|| invalid(spec, &format!("{} 需要 name", spec.op)))?;
    FieldPath::resolve(descriptor, name, rule)
}

fn required_value(spec: &FilterSpec) -> Result<&str> {
    spec.value
        .as_deref()
        .ok_or_else(|| invalid(spec, &format!("{} 需要 value", spec.op)))
}

/// EQUAL / IN / ANY_IN 支持的字段类型：整数、布尔、枚举、字符串
fn comparable_kind(path: &FieldPath, op: Op) -> Result<Kind> {
    let kind = path.last().kind();
    match kind {
        Kind::Int32
        | Kind::Int64
        | Kind::UInt32
        | Kind::UInt64
        | Kind::Bool
        | Kind::String
        | Kind::Enum(_) => Ok(kind),
        Kind::Float | Kind::Double | Kind::Message(_) => Err(FilterError::UnsupportedField {
            field: path.name().to_string(),
            kind: kind.to_string(),
            op,
        }),
    }
}

fn invalid(spec: &FilterSpec, reason: &str) -> FilterError {
    FilterError::InvalidSpec {
        reason: reason.to_string(),
        spec: spec.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{DescriptorPool, EnumDef, FieldDef, FieldType, MessageDef, SchemaDef};
    use crate::value::Value;
    use std::collections::HashSet;

    fn root() -> MessageDescriptor {
        let schema = SchemaDef {
            messages: vec![
                MessageDef::new(
                    "Root",
                    vec![
                        FieldDef::new("id", 1, FieldType::Int32),
                        FieldDef::new("score", 2, FieldType::Double),
                        FieldDef::new("tags", 3, FieldType::String).repeated(),
                        FieldDef::message("child", 4, "Child"),
                        FieldDef::message("children", 5, "Child").repeated(),
                        FieldDef::enumeration("color", 6, "Color"),
                        FieldDef::new("name", 7, FieldType::String),
                    ],
                ),
                MessageDef::new("Child", vec![FieldDef::new("ok", 1, FieldType::Bool)]),
            ],
            enums: vec![EnumDef::new("Color", &[("RED", 0), ("BLUE", 1)])],
        };
        DescriptorPool::from_schema(&schema)
            .unwrap()
            .get_message_by_name("Root")
            .unwrap()
    }

    #[test]
    fn test_compile_equal() {
        let node = compile(&root(), &FilterSpec::equal("color", "BLUE")).unwrap();
        match node {
            FilterNode::Equal(path, value) => {
                assert_eq!(path.name(), "color");
                assert_eq!(value, Value::Enum(1));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_compile_in_set() {
        let spec = FilterSpec::condition(Op::In, "name", "a,b,a");
        let node = compile(&root(), &spec).unwrap();
        let FilterNode::In(_, values) = node else {
            panic!("expected IN node");
        };
        assert_eq!(
            values,
            HashSet::from([Value::String("a".to_string()), Value::String("b".to_string())])
        );
    }

    #[test]
    fn test_not_wraps_and() {
        let spec = FilterSpec::not(vec![FilterSpec::has("id"), FilterSpec::has("tags")]);
        let node = compile(&root(), &spec).unwrap();
        let FilterNode::Not(inner) = node else {
            panic!("expected NOT node");
        };
        assert!(matches!(*inner, FilterNode::And(ref children) if children.len() == 2));
    }

    #[test]
    fn test_true_rejects_fields() {
        assert_eq!(compile(&root(), &FilterSpec::new(Op::True)).unwrap(), FilterNode::True);

        let spec = FilterSpec {
            name: Some("id".to_string()),
            ..FilterSpec::new(Op::True)
        };
        assert!(matches!(
            compile(&root(), &spec),
            Err(FilterError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_missing_name_or_value() {
        let spec = FilterSpec {
            value: Some("1".to_string()),
            ..FilterSpec::new(Op::Equal)
        };
        let err = compile(&root(), &spec).unwrap_err();
        assert!(err.to_string().contains("EQUAL 需要 name"));

        let spec = FilterSpec {
            name: Some("id".to_string()),
            ..FilterSpec::new(Op::Lt)
        };
        assert!(matches!(
            compile(&root(), &spec),
            Err(FilterError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_logical_requires_children() {
        for op in [Op::And, Op::Or, Op::Not] {
            let result = compile(&root(), &FilterSpec::new(op));
            assert!(matches!(result, Err(FilterError::InvalidSpec { .. })), "{}", op);
        }
        let result = compile(&root(), &FilterSpec::partial("child", vec![]));
        assert!(matches!(result, Err(FilterError::InvalidSpec { .. })));
    }

    #[test]
    fn test_repeated_rules() {
        assert!(compile(&root(), &FilterSpec::equal("tags", "a")).is_err());
        assert!(compile(&root(), &FilterSpec::condition(Op::AnyIn, "name", "a")).is_err());
        assert!(compile(&root(), &FilterSpec::condition(Op::AnyIn, "tags", "a")).is_ok());
        assert!(compile(&root(), &FilterSpec::has("tags")).is_ok());
        let spec = FilterSpec::partial("children", vec![FilterSpec::has("ok")]);
        assert!(compile(&root(), &spec).is_err());
    }

    fn reason(result: Result<FilterNode>) -> String {
        match result {
            Err(FilterError::InvalidSpec { reason, .. }) => reason,
            other => panic!("expected InvalidSpec, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_kinds() {
        let result = compile(&root(), &FilterSpec::equal("score", "1"));
        assert!(reason(result).contains("double"));

        let result = compile(&root(), &FilterSpec::condition(Op::In, "child", "x"));
        assert!(reason(result).contains("message Child"));

        let result = compile(&root(), &FilterSpec::condition(Op::Lt, "name", "1"));
        assert!(reason(result).contains("LT"));

        let spec = FilterSpec::partial("id", vec![FilterSpec::new(Op::True)]);
        assert!(reason(compile(&root(), &spec)).contains("int32"));
    }

    #[test]
    fn test_unsupported_operators() {
        let regexp = FilterSpec::condition(Op::Regexp, "name", ".*");
        match compile(&root(), &FilterSpec::and(vec![FilterSpec::has("name"), regexp.clone()])) {
            Err(FilterError::UnsupportedOperator { op, spec }) => {
                assert_eq!(op, Op::Regexp);
                assert_eq!(spec, regexp.to_string());
            }
            other => panic!("expected UnsupportedOperator, got {:?}", other),
        }
        assert!(matches!(
            compile(&root(), &FilterSpec::default()),
            Err(FilterError::UnsupportedOperator { op: Op::Invalid, .. })
        ));
    }

    #[test]
    fn test_partial_builds_against_sub_message() {
        let spec = FilterSpec::partial("child", vec![FilterSpec::equal("ok", "true")]);
        assert!(compile(&root(), &spec).is_ok());

        // "id" 不在 Child 中
        let spec = FilterSpec::partial("child", vec![FilterSpec::has("id")]);
        assert!(reason(compile(&root(), &spec)).contains("Child"));
    }

    #[test]
    fn test_nested_error_reports_offending_spec() {
        let spec = FilterSpec::and(vec![
            FilterSpec::has("id"),
            FilterSpec::or(vec![FilterSpec::equal("id", "x")]),
        ]);
        match compile(&root(), &spec) {
            Err(FilterError::InvalidSpec { spec, .. }) => {
                assert_eq!(spec, FilterSpec::equal("id", "x").to_string());
            }
            other => panic!("expected InvalidSpec, got {:?}", other),
        }
    }
}

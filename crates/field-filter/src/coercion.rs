//! 字面量类型转换
//!
//! 将配置中的字符串字面量转换为与字段类型一致的 [`Value`]。

use crate::error::{FilterError, Result};
use crate::reflect::{EnumDescriptor, Kind};
use crate::value::Value;
use std::collections::HashSet;
use std::str::FromStr;

/// 按字段类型解析单个字面量
///
/// - 整数：十进制，可带负号。无符号类型先按无符号解析，失败后按同宽度有符号整数解析并
///   重新解释位模式，因此 uint32 的 "4294967295" 和 "-1" 等价
/// - 布尔：只接受大小写不敏感的 "true" / "false"
/// - 字符串：原样使用
/// - 枚举：先按名称查找，再按编号查找
pub fn parse_literal(text: &str, kind: &Kind) -> Result<Value> {
    match kind {
        Kind::Int32 => parse_number(text, "int32").map(Value::Int32),
        Kind::Int64 => parse_number(text, "int64").map(Value::Int64),
        Kind::UInt32 => parse_number::<u32>(text, "uint32")
            .or_else(|_| parse_number::<i32>(text, "uint32").map(|v| v as u32))
            .map(Value::UInt32),
        Kind::UInt64 => parse_number::<u64>(text, "uint64")
            .or_else(|_| parse_number::<i64>(text, "uint64").map(|v| v as u64))
            .map(Value::UInt64),
        Kind::Bool => parse_bool(text).map(Value::Bool),
        Kind::String => Ok(Value::String(text.to_string())),
        Kind::Enum(descriptor) => parse_enum(text, descriptor).map(Value::Enum),
        Kind::Float | Kind::Double | Kind::Message(_) => Err(FilterError::InvalidLiteral {
            kind: kind.to_string(),
            input: text.to_string(),
        }),
    }
}

/// 解析逗号分隔的字面量列表并去重
///
/// 不做 trim 和转义，空字符串得到一个空字符串元素。
pub fn parse_literal_set(text: &str, kind: &Kind) -> Result<HashSet<Value>> {
    text.split(',')
        .map(|token| parse_literal(token, kind))
        .collect()
}

fn parse_number<T: FromStr>(text: &str, kind: &str) -> Result<T> {
    text.parse().map_err(|_| FilterError::InvalidLiteral {
        kind: kind.to_string(),
        input: text.to_string(),
    })
}

fn parse_bool(text: &str) -> Result<bool> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(FilterError::InvalidLiteral {
            kind: "bool".to_string(),
            input: text.to_string(),
        })
    }
}

fn parse_enum(text: &str, descriptor: &EnumDescriptor) -> Result<i32> {
    descriptor
        .get_value_by_name(text)
        .or_else(|| {
            text.parse::<i32>()
                .ok()
                .and_then(|number| descriptor.get_value(number))
        })
        .map(|value| value.number())
        .ok_or_else(|| FilterError::InvalidLiteral {
            kind: format!("enum {}", descriptor.name()),
            input: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{DescriptorPool, EnumDef, FieldDef, MessageDef, SchemaDef};

    fn enum_kind() -> Kind {
        let schema = SchemaDef {
            messages: vec![MessageDef::new(
                "M",
                vec![FieldDef::enumeration("e", 1, "TestEnum")],
            )],
            enums: vec![EnumDef::new(
                "TestEnum",
                &[("TEST_ENUM_1", 1), ("TEST_ENUM_2", 2), ("TEST_ENUM_7", 7)],
            )],
        };
        let pool = DescriptorPool::from_schema(&schema).unwrap();
        pool.get_message_by_name("M")
            .unwrap()
            .get_field_by_name("e")
            .unwrap()
            .kind()
    }

    #[test]
    fn test_signed_integers() {
        assert_eq!(parse_literal("-12", &Kind::Int32).unwrap(), Value::Int32(-12));
        assert_eq!(
            parse_literal("9223372036854775807", &Kind::Int64).unwrap(),
            Value::Int64(i64::MAX)
        );
        assert!(parse_literal("2147483648", &Kind::Int32).is_err());
        assert!(parse_literal("1.5", &Kind::Int64).is_err());
        assert!(parse_literal("a", &Kind::Int32).is_err());
    }

    #[test]
    fn test_unsigned_reinterpretation() {
        assert_eq!(
            parse_literal("4294967295", &Kind::UInt32).unwrap(),
            Value::UInt32(u32::MAX)
        );
        assert_eq!(
            parse_literal("-1", &Kind::UInt32).unwrap(),
            Value::UInt32(u32::MAX)
        );
        assert_eq!(
            parse_literal("-1", &Kind::UInt64).unwrap(),
            Value::UInt64(u64::MAX)
        );
        assert!(parse_literal("4294967296", &Kind::UInt32).is_err());
    }

    #[test]
    fn test_strict_bool() {
        assert_eq!(parse_literal("TRUE", &Kind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(parse_literal("False", &Kind::Bool).unwrap(), Value::Bool(false));
        for input in ["1", "0", "yes", "t", ""] {
            assert!(parse_literal(input, &Kind::Bool).is_err(), "{}", input);
        }
    }

    #[test]
    fn test_string_is_verbatim() {
        assert_eq!(
            parse_literal(" a\\,b ", &Kind::String).unwrap(),
            Value::String(" a\\,b ".to_string())
        );
    }

    #[test]
    fn test_enum_by_name_or_number() {
        let kind = enum_kind();
        assert_eq!(parse_literal("TEST_ENUM_2", &kind).unwrap(), Value::Enum(2));
        assert_eq!(parse_literal("7", &kind).unwrap(), Value::Enum(7));
        assert!(parse_literal("3", &kind).is_err());
        assert!(parse_literal("TEST_ENUM_3", &kind).is_err());
    }

    #[test]
    fn test_float_not_supported() {
        let err = parse_literal("1.0", &Kind::Float).unwrap_err();
        assert!(matches!(err, FilterError::InvalidLiteral { .. }));
    }

    #[test]
    fn test_set_dedup() {
        let set = parse_literal_set("1,2,1", &Kind::Int32).unwrap();
        assert_eq!(set, HashSet::from([Value::Int32(1), Value::Int32(2)]));
    }

    #[test]
    fn test_set_empty_tokens() {
        let set = parse_literal_set("", &Kind::String).unwrap();
        assert_eq!(set, HashSet::from([Value::String(String::new())]));

        let set = parse_literal_set(",a", &Kind::String).unwrap();
        assert_eq!(
            set,
            HashSet::from([Value::String(String::new()), Value::String("a".to_string())])
        );

        assert!(parse_literal_set("1,", &Kind::Int32).is_err());
    }

    #[test]
    fn test_set_fails_on_any_bad_token() {
        assert!(parse_literal_set("1,a,1", &Kind::Int64).is_err());
        assert!(parse_literal_set("true, false", &Kind::Bool).is_err());
    }
}

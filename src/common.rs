//! Common value types shared by reads and writes.
//!
//! This module provides the immutable name/value collections every request is
//! built from: attributes, conditions and attribute updates, plus the
//! expression rendering used to put them on the wire.

/// Immutable named attribute values.
pub mod attributes;

/// Comparison predicates for filters and conditional writes.
pub mod condition;

/// Partial updates of stored rows.
pub mod update;

/// Scalar attribute values.
pub mod value;

use aws_sdk_dynamodb::types;
use std::collections;

/// Placeholder-safe form of an attribute name, distinct for distinct names.
///
/// Names made of ASCII letters and digits are kept as they are. In any other
/// name every byte outside that set, `_` included, becomes `_` plus two hex
/// digits, so `a_b`, `a-b` and `a.b` never share a placeholder.
pub(crate) fn sanitize(name: &str) -> String {
    if name.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
        return name.to_string();
    }
    let mut sanitized = String::with_capacity(name.len() * 3);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() {
            sanitized.push(char::from(byte));
        } else {
            sanitized.push_str(&format!("_{byte:02x}"));
        }
    }
    sanitized
}

/// `#name` placeholder standing for attribute `name` in expressions.
pub(crate) fn name_placeholder(name: &str) -> String {
    format!("#{}", sanitize(name))
}

fn get_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_names.is_empty() {
            names
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_names);
        }
        if !self.expression_attribute_values.is_empty() {
            values
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_values);
        }
        self.expression
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::plain("stars", "stars")]
    #[case::dashed("first-name", "first_2dname")]
    #[case::dotted("a.b", "a_2eb")]
    #[case::underscored("a_b", "a_5fb")]
    #[case::non_ascii("名前", "_e5_90_8d_e5_89_8d")]
    fn test_sanitize(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(sanitize(name), expected);
        assert_eq!(name_placeholder(name), format!("#{expected}"));
    }

    #[test]
    fn test_placeholders_of_distinct_names_differ() {
        let names = ["a_b", "a-b", "a.b", "a_2db", "ab", "名前", "住所", "_", "__"];
        let placeholders: collections::HashSet<String> =
            names.iter().map(|name| name_placeholder(name)).collect();
        assert_eq!(placeholders.len(), names.len());
    }

    #[test]
    fn test_merge_into_skips_empty_maps() {
        let operation = ExpressionInput {
            expression: "#a".to_string(),
            expression_attribute_names: collections::HashMap::from([(
                "#a".to_string(),
                "a".to_string(),
            )]),
            ..Default::default()
        };
        let mut names = None;
        let mut values = None;
        let expression = operation.merge_into(&mut names, &mut values);
        assert_eq!(expression, "#a");
        assert_eq!(names.map(|names| names.len()), Some(1));
        assert!(values.is_none());
    }
}

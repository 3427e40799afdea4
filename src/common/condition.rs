use crate::common::{self, attributes::Attributes, value::Value};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use std::{cmp, collections, fmt, hash};

/// Comparison predicate applied to one attribute.
///
/// ```rust
/// use dynamodb_frame::common::{condition::Condition, value::Value};
///
/// let eq = Condition::Equals(Value::from("active"));
/// let gt = Condition::GreaterThan(Value::from(100));
/// let null = Condition::Null;
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Condition {
    /// Checks if an attribute begins with a specified prefix (string types only).
    BeginsWith(String),
    /// Checks if an attribute value is between two values (inclusive).
    Between(Value, Value),
    /// Checks if an attribute contains a specified value.
    Contains(Value),
    /// Checks if an attribute value equals a specified value.
    Equals(Value),
    /// Checks if an attribute value is greater than a specified value.
    GreaterThan(Value),
    /// Checks if an attribute value is greater than or equal to a specified value.
    GreaterThanOrEqual(Value),
    /// Checks if an attribute value is in a list of specified values.
    In(Vec<Value>),
    /// Checks if an attribute value is less than a specified value.
    LessThan(Value),
    /// Checks if an attribute value is less than or equal to a specified value.
    LessThanOrEqual(Value),
    /// Checks if an attribute does not contain a specified value.
    NotContains(Value),
    /// Checks if an attribute value does not equal a specified value.
    NotEqual(Value),
    /// Checks if an attribute exists (is not null).
    NotNull,
    /// Checks if an attribute does not exist (is null).
    Null,
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::S(actual), Value::S(expected)) => actual.contains(expected.as_str()),
        (Value::B(actual), Value::B(expected)) => {
            expected.is_empty()
                || actual
                    .windows(expected.len())
                    .any(|window| window == expected.as_slice())
        }
        _ => false,
    }
}

impl Condition {
    /// Evaluate the predicate against the current value of an attribute.
    ///
    /// Comparisons against an absent attribute are false, as they are on the
    /// service; only `Null` and `NotContains` hold for a missing attribute.
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        let Some(actual) = actual else {
            return matches!(self, Self::Null | Self::NotContains(_));
        };
        let ordering = |expected: &Value| actual.compare(expected);
        match self {
            Self::BeginsWith(prefix) => actual
                .as_str()
                .is_some_and(|actual| actual.starts_with(prefix.as_str())),
            Self::Between(low, high) => {
                matches!(
                    ordering(low),
                    Some(cmp::Ordering::Greater | cmp::Ordering::Equal)
                ) && matches!(
                    ordering(high),
                    Some(cmp::Ordering::Less | cmp::Ordering::Equal)
                )
            }
            Self::Contains(expected) => contains(actual, expected),
            Self::Equals(expected) => ordering(expected) == Some(cmp::Ordering::Equal),
            Self::GreaterThan(expected) => ordering(expected) == Some(cmp::Ordering::Greater),
            Self::GreaterThanOrEqual(expected) => matches!(
                ordering(expected),
                Some(cmp::Ordering::Greater | cmp::Ordering::Equal)
            ),
            Self::In(values) => values
                .iter()
                .any(|expected| ordering(expected) == Some(cmp::Ordering::Equal)),
            Self::LessThan(expected) => ordering(expected) == Some(cmp::Ordering::Less),
            Self::LessThanOrEqual(expected) => matches!(
                ordering(expected),
                Some(cmp::Ordering::Less | cmp::Ordering::Equal)
            ),
            Self::NotContains(expected) => !contains(actual, expected),
            Self::NotEqual(expected) => ordering(expected) != Some(cmp::Ordering::Equal),
            Self::NotNull => true,
            Self::Null => false,
        }
    }

    fn get_expression(
        &self,
        key: &str,
        key_placeholder: &str,
        index: &mut usize,
    ) -> (String, collections::HashMap<String, types::AttributeValue>) {
        let mut expression_attribute_values = collections::HashMap::new();
        let mut bind = |suffix: &str, value: &Value, index: &mut usize| {
            let value_placeholder = format!(":{}_{}{}", key, suffix, index);
            *index += 1;
            expression_attribute_values.insert(value_placeholder.clone(), value.clone().into());
            value_placeholder
        };
        let expression = match self {
            Self::BeginsWith(prefix) => {
                let value_placeholder = bind("begins_with", &Value::S(prefix.clone()), index);
                format!("begins_with({}, {})", key_placeholder, value_placeholder)
            }
            Self::Between(value1, value2) => {
                let value_placeholder_1 = bind("between", value1, index);
                let value_placeholder_2 = bind("between", value2, index);
                format!(
                    "{} BETWEEN {} AND {}",
                    key_placeholder, value_placeholder_1, value_placeholder_2
                )
            }
            Self::Contains(value) => {
                let value_placeholder = bind("contains", value, index);
                format!("contains({}, {})", key_placeholder, value_placeholder)
            }
            Self::Equals(value) => {
                let value_placeholder = bind("eq", value, index);
                format!("{} = {}", key_placeholder, value_placeholder)
            }
            Self::GreaterThan(value) => {
                let value_placeholder = bind("gt", value, index);
                format!("{} > {}", key_placeholder, value_placeholder)
            }
            Self::GreaterThanOrEqual(value) => {
                let value_placeholder = bind("gte", value, index);
                format!("{} >= {}", key_placeholder, value_placeholder)
            }
            Self::In(values) => {
                let placeholders: Vec<_> = values
                    .iter()
                    .map(|value| bind("in", value, &mut *index))
                    .collect();
                format!("{} IN ({})", key_placeholder, placeholders.join(", "))
            }
            Self::LessThan(value) => {
                let value_placeholder = bind("lt", value, index);
                format!("{} < {}", key_placeholder, value_placeholder)
            }
            Self::LessThanOrEqual(value) => {
                let value_placeholder = bind("lte", value, index);
                format!("{} <= {}", key_placeholder, value_placeholder)
            }
            Self::NotContains(value) => {
                let value_placeholder = bind("not_contains", value, index);
                format!("NOT contains({}, {})", key_placeholder, value_placeholder)
            }
            Self::NotEqual(value) => {
                let value_placeholder = bind("ne", value, index);
                format!("{} <> {}", key_placeholder, value_placeholder)
            }
            Self::NotNull => format!("attribute_exists({})", key_placeholder),
            Self::Null => format!("attribute_not_exists({})", key_placeholder),
        };
        (expression, expression_attribute_values)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginsWith(prefix) => write!(f, "BEGINS_WITH \"{prefix}\""),
            Self::Between(low, high) => write!(f, "BETWEEN {low} AND {high}"),
            Self::Contains(value) => write!(f, "CONTAINS {value}"),
            Self::Equals(value) => write!(f, "EQ {value}"),
            Self::GreaterThan(value) => write!(f, "GT {value}"),
            Self::GreaterThanOrEqual(value) => write!(f, "GE {value}"),
            Self::In(values) => {
                let values: Vec<_> = values.iter().map(Value::to_string).collect();
                write!(f, "IN ({})", values.join(", "))
            }
            Self::LessThan(value) => write!(f, "LT {value}"),
            Self::LessThanOrEqual(value) => write!(f, "LE {value}"),
            Self::NotContains(value) => write!(f, "NOT_CONTAINS {value}"),
            Self::NotEqual(value) => write!(f, "NE {value}"),
            Self::NotNull => f.write_str("NOT_NULL"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

/// Immutable, insertion-ordered set of named conditions.
///
/// At most one condition per attribute name: `with` on a name already present
/// replaces its condition.
///
/// ```rust
/// use dynamodb_frame::common::{condition::{Condition, Conditions}, value::Value};
///
/// let conditions = Conditions::new()
///     .with_equal("id", "k1")
///     .with("stars", Condition::GreaterThan(Value::from(3)));
/// assert_eq!(conditions.len(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Conditions(IndexMap<String, Condition>);

impl Conditions {
    /// No conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality conditions on every pair of `attributes`.
    pub fn equal_to(attributes: &Attributes) -> Self {
        attributes
            .iter()
            .map(|(name, value)| (name, Condition::Equals(value.clone())))
            .collect()
    }

    /// A copy with `condition` on `name`, replacing any previous one.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, condition: Condition) -> Self {
        let mut pairs = self.0.clone();
        pairs.insert(name.into(), condition);
        Self(pairs)
    }

    /// A copy requiring `name` to equal `value`.
    #[must_use]
    pub fn with_equal(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, Condition::Equals(value.into()))
    }

    /// A copy with all conditions of `other` layered on top of these.
    #[must_use]
    pub fn with_all(&self, other: &Self) -> Self {
        let mut pairs = self.0.clone();
        pairs.extend(
            other
                .iter()
                .map(|(name, condition)| (name.to_string(), condition.clone())),
        );
        Self(pairs)
    }

    /// A copy retaining exactly the given names.
    #[must_use]
    pub fn only<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: collections::HashSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        self.partition(|name| names.contains(name)).0
    }

    /// Split into the conditions whose names satisfy `predicate` and the rest.
    pub(crate) fn partition(&self, predicate: impl Fn(&str) -> bool) -> (Self, Self) {
        let (matching, rest): (Vec<_>, Vec<_>) = self
            .0
            .iter()
            .map(|(name, condition)| (name.clone(), condition.clone()))
            .partition(|(name, _)| predicate(name));
        (
            Self(matching.into_iter().collect()),
            Self(rest.into_iter().collect()),
        )
    }

    /// The condition on `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.0.get(name)
    }

    /// Whether `name` is constrained.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Conditions in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Condition> {
        self.0.values()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.0.iter().map(|(name, condition)| (name.as_str(), condition))
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every condition holds on `row`.
    pub fn matches(&self, row: &Attributes) -> bool {
        self.iter()
            .all(|(name, condition)| condition.matches(row.get(name)))
    }

    /// Render as one AND-joined expression, numbering value placeholders from `index`.
    pub(crate) fn get_expression_operation(&self, index: &mut usize) -> common::ExpressionInput {
        let mut expressions = Vec::with_capacity(self.len());
        let mut expression_attribute_names = collections::HashMap::with_capacity(self.len());
        let mut expression_attribute_values = collections::HashMap::new();
        for (name, condition) in self.iter() {
            let key = common::sanitize(name);
            let placeholder = common::name_placeholder(name);
            let (expression, condition_expression_attribute_values) =
                condition.get_expression(&key, &placeholder, index);
            expressions.push(expression);
            expression_attribute_names.insert(placeholder, name.to_string());
            expression_attribute_values.extend(condition_expression_attribute_values);
        }
        let expression = expressions.join(" AND ");
        common::ExpressionInput {
            expression,
            expression_attribute_names,
            expression_attribute_values,
        }
    }
}

impl hash::Hash for Conditions {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        let mut pairs: Vec<_> = self.0.iter().collect();
        pairs.sort_by(|(left, _), (right, _)| left.cmp(right));
        pairs.hash(state);
    }
}

impl<K: Into<String>> FromIterator<(K, Condition)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, Condition)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, condition)| (name.into(), condition))
                .collect(),
        )
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Condition); N]> for Conditions {
    fn from(pairs: [(K, Condition); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<_> = self
            .iter()
            .map(|(name, condition)| format!("{name} {condition}"))
            .collect();
        f.write_str(&pairs.join(" AND "))
    }
}

use crate::error::{Error, Result};

use aws_sdk_dynamodb::{primitives::Blob, types};
use std::{cmp, fmt};

/// Scalar attribute value.
///
/// Rows are untyped name/value bags on the wire; only the three scalar kinds a
/// key or a condition operand may take are modelled. An absent attribute is
/// `None` wherever an `Option<&Value>` is returned.
///
/// ```rust
/// use dynamodb_frame::common::value::Value;
///
/// let name = Value::from("Jeff");
/// let age = Value::from(42);
/// assert_eq!(name.as_str(), Some("Jeff"));
/// assert_eq!(age.as_number(), Some("42"));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    /// String.
    S(String),
    /// Number, kept in its decimal text form.
    N(String),
    /// Binary.
    B(Vec<u8>),
}

impl Value {
    /// Build a number value from anything printable as a decimal.
    pub fn number(number: impl fmt::Display) -> Self {
        Self::N(number.to_string())
    }

    /// The string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(value) => Some(value),
            _ => None,
        }
    }

    /// The decimal text, if this is a number value.
    pub fn as_number(&self) -> Option<&str> {
        match self {
            Self::N(value) => Some(value),
            _ => None,
        }
    }

    /// The bytes, if this is a binary value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::B(value) => Some(value),
            _ => None,
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Strings and binaries compare bytewise, numbers numerically. Values of
    /// different kinds are not comparable.
    pub fn compare(&self, other: &Self) -> Option<cmp::Ordering> {
        match (self, other) {
            (Self::S(left), Self::S(right)) => Some(left.as_bytes().cmp(right.as_bytes())),
            (Self::N(left), Self::N(right)) => {
                let left = left.parse::<f64>().ok()?;
                let right = right.parse::<f64>().ok()?;
                left.partial_cmp(&right)
            }
            (Self::B(left), Self::B(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }

    pub(crate) fn from_attribute_value(name: &str, value: types::AttributeValue) -> Result<Self> {
        match value {
            types::AttributeValue::S(value) => Ok(Self::S(value)),
            types::AttributeValue::N(value) => Ok(Self::N(value)),
            types::AttributeValue::B(value) => Ok(Self::B(value.into_inner())),
            _ => Err(Error::UnsupportedValue(name.to_string())),
        }
    }
}

impl From<Value> for types::AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::S(value) => Self::S(value),
            Value::N(value) => Self::N(value),
            Value::B(value) => Self::B(Blob::new(value)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::B(value)
    }
}

macro_rules! impl_from_number {
    ($($number:ty),*) => {
        $(
            impl From<$number> for Value {
                fn from(value: $number) -> Self {
                    Self::number(value)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(value) => write!(f, "\"{value}\""),
            Self::N(value) => f.write_str(value),
            Self::B(value) => {
                f.write_str("0x")?;
                value.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::strings(Value::from("a"), Value::from("b"), Some(cmp::Ordering::Less))]
    #[case::numbers_numerically(Value::from(10), Value::from(9), Some(cmp::Ordering::Greater))]
    #[case::numbers_in_different_notation(
        Value::N("1.0".to_string()),
        Value::from(1),
        Some(cmp::Ordering::Equal)
    )]
    #[case::binaries(Value::from(vec![1, 2]), Value::from(vec![1, 3]), Some(cmp::Ordering::Less))]
    #[case::mixed_kinds(Value::from("1"), Value::from(1), None)]
    fn test_compare(
        #[case] left: Value,
        #[case] right: Value,
        #[case] expected: Option<cmp::Ordering>,
    ) {
        assert_eq!(left.compare(&right), expected);
    }

    #[rstest]
    #[case::string(types::AttributeValue::S("a".to_string()), Value::from("a"))]
    #[case::number(types::AttributeValue::N("42".to_string()), Value::from(42))]
    #[case::binary(types::AttributeValue::B(Blob::new(vec![7])), Value::from(vec![7]))]
    fn test_from_attribute_value(#[case] input: types::AttributeValue, #[case] expected: Value) {
        let actual = Value::from_attribute_value("a", input).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_from_attribute_value_rejects_booleans() {
        let actual = Value::from_attribute_value("a", types::AttributeValue::Bool(true));
        assert!(matches!(actual, Err(Error::UnsupportedValue(name)) if name == "a"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(vec![0, 255]).to_string(), "0x00ff");
    }
}

use crate::common::value::Value;
use crate::error::Result;

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_dynamo::{from_item, to_item};
use std::{collections, fmt, hash};

/// Immutable, insertion-ordered set of named attribute values.
///
/// Every "mutator" returns a new instance; there is no way to change an
/// existing one. Equality and hashing ignore insertion order, display keeps it.
///
/// ```rust
/// use dynamodb_frame::common::attributes::Attributes;
///
/// let attributes = Attributes::new().with("id", "1").with("name", "Jeff");
/// let keys = attributes.only(["id"]);
/// assert_eq!(keys.len(), 1);
/// assert_eq!(attributes.len(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attributes(IndexMap<String, Value>);

impl Attributes {
    /// Empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy with `name` set to `value`, replacing any previous value.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut pairs = self.0.clone();
        pairs.insert(name.into(), value.into());
        Self(pairs)
    }

    /// A copy with all pairs of `other` layered on top of these.
    #[must_use]
    pub fn with_all(&self, other: &Self) -> Self {
        let mut pairs = self.0.clone();
        pairs.extend(other.iter().map(|(name, value)| (name.to_string(), value.clone())));
        Self(pairs)
    }

    /// A copy without `name`.
    #[must_use]
    pub(crate) fn without(&self, name: &str) -> Self {
        let mut pairs = self.0.clone();
        pairs.shift_remove(name);
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
        let pairs = self
            .0
            .iter()
            .filter(|(name, _)| names.contains(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self(pairs)
    }

    /// The value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether `name` is set.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert a serializable row into attributes.
    ///
    /// ```rust
    /// use dynamodb_frame::common::attributes::Attributes;
    /// use serde_json::json;
    ///
    /// let attributes = Attributes::from_serialize(json!({"id": "1", "age": 3})).unwrap();
    /// assert_eq!(attributes.len(), 2);
    /// ```
    pub fn from_serialize<T: Serialize>(row: T) -> Result<Self> {
        let item: collections::HashMap<String, types::AttributeValue> = to_item(row)?;
        Self::from_item(item)
    }

    /// Convert these attributes into a typed row.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let row = from_item(self.clone().into_item())?;
        Ok(row)
    }

    /// Build from a wire item, ordering names alphabetically.
    pub(crate) fn from_item(
        item: collections::HashMap<String, types::AttributeValue>,
    ) -> Result<Self> {
        let mut pairs = Vec::with_capacity(item.len());
        for (name, value) in item {
            let value = Value::from_attribute_value(&name, value)?;
            pairs.push((name, value));
        }
        pairs.sort_by(|(left, _), (right, _)| left.cmp(right));
        Ok(Self(pairs.into_iter().collect()))
    }

    pub(crate) fn into_item(self) -> collections::HashMap<String, types::AttributeValue> {
        self.0
            .into_iter()
            .map(|(name, value)| (name, value.into()))
            .collect()
    }
}

impl hash::Hash for Attributes {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        let mut pairs: Vec<_> = self.0.iter().collect();
        pairs.sort_by(|(left, _), (right, _)| left.cmp(right));
        pairs.hash(state);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Attributes {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde::Deserialize;
    use std::hash::{Hash, Hasher};

    fn hash_of(attributes: &Attributes) -> u64 {
        let mut hasher = collections::hash_map::DefaultHasher::new();
        attributes.hash(&mut hasher);
        hasher.finish()
    }

    #[rstest]
    #[case::fresh_name(Attributes::new(), "a", Value::from("x"))]
    #[case::overwritten_name(Attributes::from([("a", "y")]), "a", Value::from("x"))]
    #[case::number(Attributes::from([("b", "y")]), "a", Value::from(5))]
    fn test_with_then_get(#[case] attributes: Attributes, #[case] name: &str, #[case] value: Value) {
        let actual = attributes.with(name, value.clone());
        assert_eq!(actual.get(name), Some(&value));
        assert_eq!(actual.only([name]).len(), 1);
    }

    #[test]
    fn test_only_keeps_exactly_given_names() {
        let actual = Attributes::new().with("a", "x").with("b", "y").only(["a"]);
        assert_eq!(actual.len(), 1);
        assert_eq!(actual.get("a"), Some(&Value::from("x")));
        assert_eq!(actual.get("b"), None);
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let original = Attributes::new().with("a", "x");
        let _ = original.with("a", "y").with("b", "z");
        assert_eq!(original, Attributes::from([("a", "x")]));
    }

    #[test]
    fn test_with_same_name_keeps_one_pair() {
        let actual = Attributes::new().with("a", "x").with("a", "y").with("a", "z");
        assert_eq!(actual.len(), 1);
        assert_eq!(actual.get("a"), Some(&Value::from("z")));
    }

    #[test]
    fn test_equality_and_hash_ignore_order() {
        let left = Attributes::new().with("a", "x").with("b", 1);
        let right = Attributes::new().with("b", 1).with("a", "x");
        assert_eq!(left, right);
        assert_eq!(hash_of(&left), hash_of(&right));
    }

    #[test]
    fn test_display_keeps_insertion_order() {
        let actual = Attributes::new().with("b", 1).with("a", "x");
        assert_eq!(actual.to_string(), "{b=1, a=\"x\"}");
    }

    #[test]
    fn test_with_all_overrides() {
        let base = Attributes::from([("a", "x"), ("b", "y")]);
        let actual = base.with_all(&Attributes::from([("b", "z")]));
        assert_eq!(actual, Attributes::from([("a", "x"), ("b", "z")]));
    }

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Book {
        isbn: String,
        pages: u32,
    }

    #[test]
    fn test_typed_rows() {
        let book = Book {
            isbn: "978-0".to_string(),
            pages: 120,
        };
        let attributes = Attributes::from_serialize(&book).unwrap();
        assert_eq!(attributes, Attributes::new().with("isbn", "978-0").with("pages", 120));
        let actual: Book = attributes.deserialize().unwrap();
        assert_eq!(actual, book);
    }
}

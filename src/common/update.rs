use crate::common::{self, attributes::Attributes, value::Value};
use crate::error::{Error, Result};

use indexmap::IndexMap;
use std::collections;

/// Action applied to one attribute by a partial update.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AttributeUpdate {
    /// Set the attribute to the value, replacing any previous one.
    Put(Value),
    /// Add the number to the attribute, starting from zero when it is absent.
    Add(Value),
    /// Remove the attribute.
    Delete,
}

/// Immutable, insertion-ordered set of attribute updates.
///
/// ```rust
/// use dynamodb_frame::common::update::AttributeUpdates;
///
/// let updates = AttributeUpdates::new()
///     .with_put("title", "Dune")
///     .with_add("reads", 1)
///     .with_delete("draft");
/// assert_eq!(updates.len(), 3);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeUpdates(IndexMap<String, AttributeUpdate>);

impl AttributeUpdates {
    /// No updates.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy with `update` on `name`, replacing any previous one.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, update: AttributeUpdate) -> Self {
        let mut updates = self.0.clone();
        updates.insert(name.into(), update);
        Self(updates)
    }

    /// A copy setting `name` to `value`.
    #[must_use]
    pub fn with_put(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, AttributeUpdate::Put(value.into()))
    }

    /// A copy adding `value` to the number in `name`.
    #[must_use]
    pub fn with_add(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, AttributeUpdate::Add(value.into()))
    }

    /// A copy removing `name`.
    #[must_use]
    pub fn with_delete(&self, name: impl Into<String>) -> Self {
        self.with(name, AttributeUpdate::Delete)
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeUpdate)> {
        self.0.iter().map(|(name, update)| (name.as_str(), update))
    }

    /// Number of updates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no updates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply to a stored row, as the service does for an update request.
    pub fn apply(&self, row: &Attributes) -> Result<Attributes> {
        let mut row = row.clone();
        for (name, update) in self.iter() {
            row = match update {
                AttributeUpdate::Put(value) => row.with(name, value.clone()),
                AttributeUpdate::Add(value) => {
                    let sum = match row.get(name) {
                        Some(current) => add(name, current, value)?,
                        None => add(name, &Value::from(0), value)?,
                    };
                    row.with(name, sum)
                }
                AttributeUpdate::Delete => row.without(name),
            };
        }
        Ok(row)
    }

    /// Render as one update expression: `SET ... ADD ... REMOVE ...`.
    pub(crate) fn get_update_expression(&self, index: &mut usize) -> common::ExpressionInput {
        let mut set = Vec::new();
        let mut add = Vec::new();
        let mut remove = Vec::new();
        for (name, update) in self.iter() {
            let placeholder = common::name_placeholder(name);
            let mut expression_attribute_values = collections::HashMap::new();
            let expression = match update {
                AttributeUpdate::Put(value) => {
                    let value_placeholder = format!(":set{index}");
                    *index += 1;
                    let expression = format!("{placeholder} = {value_placeholder}");
                    expression_attribute_values.insert(value_placeholder, value.clone().into());
                    expression
                }
                AttributeUpdate::Add(value) => {
                    let value_placeholder = format!(":add{index}");
                    *index += 1;
                    let expression = format!("{placeholder} {value_placeholder}");
                    expression_attribute_values.insert(value_placeholder, value.clone().into());
                    expression
                }
                AttributeUpdate::Delete => placeholder.clone(),
            };
            let operation = common::ExpressionInput {
                expression,
                expression_attribute_names: collections::HashMap::from([(
                    placeholder,
                    name.to_string(),
                )]),
                expression_attribute_values,
            };
            match update {
                AttributeUpdate::Put(_) => set.push(operation),
                AttributeUpdate::Add(_) => add.push(operation),
                AttributeUpdate::Delete => remove.push(operation),
            }
        }
        let clauses: Vec<_> = [("SET ", set), ("ADD ", add), ("REMOVE ", remove)]
            .into_iter()
            .filter(|(_, operations)| !operations.is_empty())
            .map(|(keyword, operations)| {
                let mut operation = common::ExpressionInput::merge(", ", operations);
                operation.expression = format!("{keyword}{}", operation.expression);
                operation
            })
            .collect();
        common::ExpressionInput::merge(" ", clauses)
    }
}

fn add(name: &str, current: &Value, delta: &Value) -> Result<Value> {
    let (Some(current), Some(delta)) = (current.as_number(), delta.as_number()) else {
        return Err(Error::Validation(format!(
            "ADD on {name} needs number operands"
        )));
    };
    if let (Ok(current), Ok(delta)) = (current.parse::<i128>(), delta.parse::<i128>()) {
        return Ok(Value::number(current + delta));
    }
    match (current.parse::<f64>(), delta.parse::<f64>()) {
        (Ok(current), Ok(delta)) => Ok(Value::number(current + delta)),
        _ => Err(Error::Validation(format!("ADD on {name} got a malformed number"))),
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeUpdate)> for AttributeUpdates {
    fn from_iter<I: IntoIterator<Item = (K, AttributeUpdate)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, update)| (name.into(), update))
                .collect(),
        )
    }
}

use crate::backend::{Credentials, QueryRequest};
use crate::common::{attributes::Attributes, condition::Conditions};
use crate::error::Result;
use crate::read::{
    common::{PagedDosage, count_pages},
    valve::{Dosage, Valve},
};

use std::sync::Arc;

/// Page size used when none is configured.
pub const DEFAULT_LIMIT: i32 = 100;

/// Valve fetching rows with paged queries on one partition.
///
/// Conditions on key attributes become key conditions, every other condition
/// becomes a filter. The frame must therefore hold an equality condition on
/// the partition key.
///
/// Every `with_*` method returns a new valve and leaves `self` untouched.
///
/// ```rust
/// use dynamodb_frame::read::query::QueryValve;
///
/// let valve = QueryValve::default()
///     .with_limit(10)
///     .with_scan_index_forward(false)
///     .with_attribute_to_get("title");
/// assert_eq!(valve.limit(), 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct QueryValve {
    attributes: Vec<String>,
    consistent_read: bool,
    exclusive_start_key: Option<Attributes>,
    index: Option<(String, Vec<String>)>,
    limit: i32,
    scan_index_forward: bool,
}

impl Default for QueryValve {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            consistent_read: false,
            exclusive_start_key: None,
            index: None,
            limit: DEFAULT_LIMIT,
            scan_index_forward: true,
        }
    }
}

impl QueryValve {
    /// Rows evaluated per page.
    pub fn limit(&self) -> i32 {
        self.limit
    }

    /// Evaluate at most `limit` rows per page.
    pub fn with_limit(&self, limit: i32) -> Self {
        Self {
            limit,
            ..self.clone()
        }
    }

    /// Walk the range key ascending (`true`) or descending.
    pub fn with_scan_index_forward(&self, forward: bool) -> Self {
        Self {
            scan_index_forward: forward,
            ..self.clone()
        }
    }

    /// Use strongly consistent reads.
    pub fn with_consistent_read(&self, consistent: bool) -> Self {
        Self {
            consistent_read: consistent,
            ..self.clone()
        }
    }

    /// Query a secondary index keyed by `keys`, partition key first.
    pub fn with_index<I, S>(&self, name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index: Some((name.into(), keys.into_iter().map(Into::into).collect())),
            ..self.clone()
        }
    }

    /// Also load `name` with every row.
    pub fn with_attribute_to_get(&self, name: impl Into<String>) -> Self {
        self.with_attributes_to_get([name])
    }

    /// Also load `names` with every row.
    pub fn with_attributes_to_get<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attributes = self.attributes.clone();
        for name in names {
            let name = name.into();
            if !attributes.contains(&name) {
                attributes.push(name);
            }
        }
        Self {
            attributes,
            ..self.clone()
        }
    }

    /// Start after `key`, typically a [`Dosage::cursor`] saved earlier.
    pub fn with_exclusive_start_key(&self, key: Attributes) -> Self {
        Self {
            exclusive_start_key: Some(key),
            ..self.clone()
        }
    }

    fn request(&self, table_name: &str, conditions: &Conditions, keys: &[String]) -> QueryRequest {
        let (index_name, index_keys, key_names) = match &self.index {
            Some((name, index_keys)) => {
                (Some(name.clone()), index_keys.clone(), index_keys.as_slice())
            }
            None => (None, Vec::new(), keys),
        };
        let (key_conditions, filter) =
            conditions.partition(|name| key_names.iter().any(|key| key == name));
        // partition key condition first, whatever order the frame was filtered in
        let key_conditions = key_names
            .iter()
            .filter_map(|name| {
                key_conditions
                    .get(name)
                    .map(|condition| (name.clone(), condition.clone()))
            })
            .collect();
        let mut attributes: Vec<String> = keys.to_vec();
        for name in key_names.iter().chain(&self.attributes) {
            if !attributes.contains(name) {
                attributes.push(name.clone());
            }
        }
        QueryRequest {
            attributes,
            consistent_read: self.consistent_read,
            exclusive_start_key: self.exclusive_start_key.clone(),
            filter,
            index_keys,
            index_name,
            key_conditions,
            limit: Some(self.limit),
            scan_index_forward: self.scan_index_forward,
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }
}

impl Valve for QueryValve {
    fn fetch(
        &self,
        credentials: &Arc<dyn Credentials>,
        table_name: &str,
        conditions: &Conditions,
        keys: &[String],
    ) -> Result<Box<dyn Dosage>> {
        let request = self.request(table_name, conditions, keys);
        Ok(Box::new(PagedDosage::fetch(credentials, request)?))
    }

    fn count(
        &self,
        credentials: &Arc<dyn Credentials>,
        table_name: &str,
        conditions: &Conditions,
        keys: &[String],
    ) -> Result<usize> {
        count_pages(credentials, self.request(table_name, conditions, keys))
    }
}

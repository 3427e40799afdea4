use crate::backend::{Credentials, ScanRequest};
use crate::common::{attributes::Attributes, condition::Conditions};
use crate::error::Result;
use crate::read::{
    common::{PagedDosage, count_pages},
    query::DEFAULT_LIMIT,
    valve::{Dosage, Valve},
};

use std::sync::Arc;

/// Valve fetching rows with paged full table scans.
///
/// Every condition of the frame becomes a filter, so it works with any
/// conditions at the price of reading the whole table.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanValve {
    attributes: Vec<String>,
    exclusive_start_key: Option<Attributes>,
    limit: i32,
}

impl Default for ScanValve {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            exclusive_start_key: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ScanValve {
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

    fn request(&self, table_name: &str, conditions: &Conditions, keys: &[String]) -> ScanRequest {
        let mut attributes = keys.to_vec();
        attributes.extend(
            self.attributes
                .iter()
                .filter(|name| !keys.contains(name))
                .cloned(),
        );
        ScanRequest {
            attributes,
            exclusive_start_key: self.exclusive_start_key.clone(),
            filter: conditions.clone(),
            limit: Some(self.limit),
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }
}

impl Valve for ScanValve {
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

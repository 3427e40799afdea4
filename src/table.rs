use crate::backend::{Credentials, DeleteRequest, PutRequest};
use crate::common::attributes::Attributes;
use crate::error::Result;
use crate::frame::Frame;
use crate::item::Item;
use crate::region::Region;

use std::sync::Arc;

/// A named table of a [`Region`].
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    region: Arc<dyn Region>,
}

impl Table {
    /// Table `name` of `region`; the table is not looked up.
    pub fn new(region: Arc<dyn Region>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }

    /// The full name of the table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The region the table lives in.
    pub fn region(&self) -> &Arc<dyn Region> {
        &self.region
    }

    pub(crate) fn credentials(&self) -> Arc<dyn Credentials> {
        self.region.credentials()
    }

    /// Names of the primary key attributes, partition key first.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.credentials().connect()?.key_schema(&self.name)
    }

    /// Create or replace a row, returning the item that points at it.
    pub fn put(&self, attributes: &Attributes) -> Result<Item> {
        let keys = self.keys()?;
        self.credentials().connect()?.put_item(PutRequest {
            item: attributes.clone(),
            table_name: self.name.clone(),
            ..Default::default()
        })?;
        #[cfg(feature = "tracing")]
        tracing::debug!(table = %self.name, %attributes, "item saved");
        Ok(Item::new(self.frame(), attributes.only(&keys), keys))
    }

    /// Delete the row with primary key `keys`; deleting an absent row succeeds.
    pub fn delete(&self, keys: &Attributes) -> Result<()> {
        self.credentials().connect()?.delete_item(DeleteRequest {
            keys: keys.clone(),
            table_name: self.name.clone(),
            ..Default::default()
        })
    }

    /// Every row of the table.
    pub fn frame(&self) -> Frame {
        Frame::new(self.clone())
    }
}

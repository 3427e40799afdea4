use crate::common::condition::{Condition, Conditions};
use crate::error::Result;
use crate::item::Item;
use crate::read::{iterator::AwsIterator, scan::ScanValve, valve::Valve};
use crate::table::Table;

use std::sync::Arc;

/// Filtered view of a table.
///
/// A frame is a value: [`filter`](Frame::filter) and [`through`](Frame::through)
/// return new frames and leave the original untouched. Rows are fetched
/// through the frame's [`Valve`], a [`ScanValve`] unless another one is set,
/// only when the frame is iterated or sized.
///
/// ```rust
/// use dynamodb_frame::backend::memory::MemoryData;
/// use dynamodb_frame::common::{attributes::Attributes, condition::Condition};
/// use dynamodb_frame::read::query::QueryValve;
/// use dynamodb_frame::region::{Region, SimpleRegion};
///
/// let data = MemoryData::new();
/// data.create_table("talks", ["room", "start"]).unwrap();
/// let table = SimpleRegion::new(data).table("talks");
/// table
///     .put(&Attributes::new().with("room", "A").with("start", 900))
///     .unwrap();
/// let frame = table
///     .frame()
///     .filter("room", Condition::Equals("A".into()))
///     .through(QueryValve::default());
/// assert_eq!(frame.size().unwrap(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Frame {
    conditions: Conditions,
    table: Table,
    valve: Arc<dyn Valve>,
}

impl Frame {
    pub(crate) fn new(table: Table) -> Self {
        Self {
            conditions: Conditions::new(),
            table,
            valve: Arc::new(ScanValve::default()),
        }
    }

    /// The table this frame looks at.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The conditions rows must satisfy.
    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// The valve rows are fetched through.
    pub fn valve(&self) -> &Arc<dyn Valve> {
        &self.valve
    }

    /// Add a condition on attribute `name`, replacing any previous one on it.
    pub fn filter(&self, name: impl Into<String>, condition: Condition) -> Self {
        Self {
            conditions: self.conditions.with(name, condition),
            ..self.clone()
        }
    }

    /// Add every condition of `conditions`, those replacing conditions on the same names.
    pub fn filter_all(&self, conditions: &Conditions) -> Self {
        Self {
            conditions: self.conditions.with_all(conditions),
            ..self.clone()
        }
    }

    /// Fetch rows through `valve` instead.
    pub fn through(&self, valve: impl Valve + 'static) -> Self {
        Self {
            valve: Arc::new(valve),
            ..self.clone()
        }
    }

    /// Iterate the rows; nothing is fetched until the first row is asked for.
    pub fn iter(&self) -> AwsIterator {
        AwsIterator::new(self.clone())
    }

    /// Count the matching rows, walking every page.
    pub fn size(&self) -> Result<usize> {
        let keys = self.table.keys()?;
        self.valve.count(
            &self.table.credentials(),
            self.table.name(),
            &self.conditions,
            &keys,
        )
    }
}

impl IntoIterator for &Frame {
    type Item = Result<Item>;
    type IntoIter = AwsIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

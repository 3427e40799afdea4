use crate::backend::{GetRequest, PutRequest, UpdateRequest};
use crate::common::{
    attributes::Attributes, condition::Conditions, update::AttributeUpdates, value::Value,
};
use crate::error::{Error, Result};
use crate::frame::Frame;

/// One row of a table, identified by its primary key.
///
/// An item only holds the attributes that came with it, the primary key at
/// least. Anything else is read from the table on demand with a strongly
/// consistent read, and every write is guarded by the primary key so that it
/// fails instead of resurrecting a row removed in the meantime.
#[derive(Clone, Debug)]
pub struct Item {
    attributes: Attributes,
    frame: Frame,
    keys: Vec<String>,
}

impl Item {
    pub(crate) fn new(frame: Frame, attributes: Attributes, keys: Vec<String>) -> Self {
        Self {
            attributes,
            frame,
            keys,
        }
    }

    /// The frame this item was found through.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The primary key of the row.
    pub fn keys(&self) -> Attributes {
        self.attributes.only(&self.keys)
    }

    /// Whether the row has attribute `name`.
    ///
    /// Fails with [`Error::ItemNotFound`] when the row is gone.
    pub fn has(&self, name: &str) -> Result<bool> {
        if self.attributes.contains_key(name) {
            return Ok(true);
        }
        Ok(self.fetch(name)?.contains_key(name))
    }

    /// The value of attribute `name`.
    ///
    /// Fails with [`Error::ItemNotFound`] when the row is gone and with
    /// [`Error::NoSuchAttribute`] when the row lacks the attribute.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.attributes.get(name) {
            return Ok(value.clone());
        }
        self.fetch(name)?
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NoSuchAttribute {
                table: self.table_name().to_string(),
                keys: self.keys(),
                name: name.to_string(),
            })
    }

    /// Replace the row with `attributes` plus the primary key of this item.
    ///
    /// Key attributes in `attributes` are ignored. Fails with
    /// [`Error::ConditionalCheckFailed`] when the row is gone.
    pub fn put(&self, attributes: &Attributes) -> Result<()> {
        let keys = self.keys();
        let backend = self.frame.table().credentials().connect()?;
        backend.put_item(PutRequest {
            expected: Conditions::equal_to(&keys),
            item: attributes.with_all(&keys),
            table_name: self.table_name().to_string(),
        })
    }

    /// Set attribute `name`, leaving the other attributes of the row as they are.
    pub fn put_value(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.update(&AttributeUpdates::new().with_put(name, value))
    }

    /// Apply `updates` to the row.
    ///
    /// Fails with [`Error::ConditionalCheckFailed`] when the row is gone.
    pub fn update(&self, updates: &AttributeUpdates) -> Result<()> {
        let keys = self.keys();
        let backend = self.frame.table().credentials().connect()?;
        backend.update_item(UpdateRequest {
            expected: Conditions::equal_to(&keys),
            keys,
            table_name: self.table_name().to_string(),
            updates: updates.clone(),
        })
    }

    fn table_name(&self) -> &str {
        self.frame.table().name()
    }

    fn fetch(&self, name: &str) -> Result<Attributes> {
        let keys = self.keys();
        let mut attributes = self.keys.clone();
        if !attributes.iter().any(|key| key == name) {
            attributes.push(name.to_string());
        }
        let backend = self.frame.table().credentials().connect()?;
        let row = backend.get_item(GetRequest {
            consistent_read: true,
            attributes,
            keys: keys.clone(),
            table_name: self.table_name().to_string(),
        })?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            table = self.table_name(),
            %keys,
            attribute = name,
            found = row.is_some(),
            "loaded attribute"
        );
        row.ok_or_else(|| Error::ItemNotFound {
            table: self.table_name().to_string(),
            keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, memory::MemoryData};
    use crate::common::condition::Condition;
    use crate::region::{Region, SimpleRegion};
    use crate::table::Table;

    use rstest::{fixture, rstest};

    const TABLE: &str = "users";

    struct Fixture {
        data: MemoryData,
        table: Table,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let data = MemoryData::new();
        data.create_table(TABLE, ["id"]).unwrap();
        let table = SimpleRegion::new(data.clone()).table(TABLE);
        Fixture { data, table }
    }

    fn row(data: &MemoryData, id: &str) -> Option<Attributes> {
        data.get_item(GetRequest {
            keys: Attributes::from([("id", id)]),
            table_name: TABLE.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    fn test_get_loads_missing_attributes(fixture: Fixture) {
        let item = fixture
            .table
            .put(&Attributes::new().with("id", "u1").with("name", "Ann").with("age", 41))
            .unwrap();
        assert_eq!(item.keys(), Attributes::from([("id", "u1")]));
        assert_eq!(item.get("id").unwrap(), Value::from("u1"));
        assert_eq!(item.get("name").unwrap(), Value::from("Ann"));
        assert!(item.has("age").unwrap());
        assert!(!item.has("email").unwrap());
        assert!(matches!(
            item.get("email"),
            Err(Error::NoSuchAttribute { name, .. }) if name == "email"
        ));
    }

    #[rstest]
    fn test_reads_see_latest_write(fixture: Fixture) {
        let item = fixture
            .table
            .put(&Attributes::new().with("id", "u1").with("name", "Ann"))
            .unwrap();
        item.put_value("name", "Anne").unwrap();
        assert_eq!(item.get("name").unwrap(), Value::from("Anne"));
    }

    #[rstest]
    fn test_put_replaces_row_and_keeps_key(fixture: Fixture) {
        let item = fixture
            .table
            .put(&Attributes::new().with("id", "u1").with("name", "Ann").with("age", 41))
            .unwrap();
        item.put(&Attributes::new().with("id", "u2").with("email", "ann@example.com"))
            .unwrap();
        assert_eq!(
            row(&fixture.data, "u1"),
            Some(
                Attributes::new()
                    .with("id", "u1")
                    .with("email", "ann@example.com")
            )
        );
        assert_eq!(row(&fixture.data, "u2"), None);
    }

    #[rstest]
    fn test_update_changes_some_attributes(fixture: Fixture) {
        let item = fixture
            .table
            .put(&Attributes::new().with("id", "u1").with("name", "Ann").with("age", 41))
            .unwrap();
        item.update(&AttributeUpdates::new().with_add("age", 1).with_delete("name"))
            .unwrap();
        assert_eq!(
            row(&fixture.data, "u1"),
            Some(Attributes::new().with("id", "u1").with("age", 42))
        );
    }

    #[rstest]
    fn test_empty_update_is_rejected(fixture: Fixture) {
        let item = fixture
            .table
            .put(&Attributes::new().with("id", "u1").with("name", "Ann"))
            .unwrap();
        assert!(matches!(
            item.update(&AttributeUpdates::new()),
            Err(Error::Validation(_))
        ));
        assert_eq!(
            row(&fixture.data, "u1"),
            Some(Attributes::new().with("id", "u1").with("name", "Ann"))
        );
    }

    #[rstest]
    fn test_writes_fail_once_row_is_gone(fixture: Fixture) {
        fixture
            .table
            .put(&Attributes::new().with("id", "u1").with("name", "Ann"))
            .unwrap();
        let frame = fixture
            .table
            .frame()
            .filter("id", Condition::Equals("u1".into()));
        let first = frame.iter().next().unwrap().unwrap();
        let second = frame.iter().next().unwrap().unwrap();
        fixture.table.delete(&first.keys()).unwrap();
        assert!(matches!(
            second.put(&Attributes::new().with("name", "Bob")),
            Err(Error::ConditionalCheckFailed { table }) if table == TABLE
        ));
        assert!(matches!(
            second.put_value("name", "Bob"),
            Err(Error::ConditionalCheckFailed { .. })
        ));
        assert!(matches!(
            second.get("name"),
            Err(Error::ItemNotFound { .. })
        ));
        assert!(matches!(second.has("name"), Err(Error::ItemNotFound { .. })));
        assert_eq!(row(&fixture.data, "u1"), None);
    }
}

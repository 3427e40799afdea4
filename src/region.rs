use crate::backend::Credentials;
use crate::table::Table;

use std::{fmt, sync::Arc};

/// Entry point: a set of tables reachable with one set of credentials.
pub trait Region: fmt::Debug + Send + Sync {
    /// The credentials every table of the region connects with.
    fn credentials(&self) -> Arc<dyn Credentials>;

    /// Table `name`; no round trip is made.
    fn table(&self, name: &str) -> Table;
}

/// Region whose table names are used as given.
///
/// ```rust
/// use dynamodb_frame::backend::memory::MemoryData;
/// use dynamodb_frame::region::{Region, SimpleRegion};
///
/// let region = SimpleRegion::new(MemoryData::new());
/// assert_eq!(region.table("users").name(), "users");
/// ```
#[derive(Clone, Debug)]
pub struct SimpleRegion {
    credentials: Arc<dyn Credentials>,
}

impl SimpleRegion {
    /// Region connecting with `credentials`.
    pub fn new(credentials: impl Credentials + 'static) -> Self {
        Self::from_credentials(Arc::new(credentials))
    }

    /// Region connecting with shared `credentials`.
    pub fn from_credentials(credentials: Arc<dyn Credentials>) -> Self {
        Self { credentials }
    }
}

impl Region for SimpleRegion {
    fn credentials(&self) -> Arc<dyn Credentials> {
        Arc::clone(&self.credentials)
    }

    fn table(&self, name: &str) -> Table {
        Table::new(Arc::new(self.clone()), name)
    }
}

/// Region prefixing every table name, typically with an environment name.
///
/// ```rust
/// use dynamodb_frame::backend::memory::MemoryData;
/// use dynamodb_frame::region::{PrefixedRegion, Region, SimpleRegion};
///
/// let region = PrefixedRegion::new(SimpleRegion::new(MemoryData::new()), "staging-");
/// assert_eq!(region.table("users").name(), "staging-users");
/// ```
#[derive(Clone, Debug)]
pub struct PrefixedRegion<R> {
    origin: R,
    prefix: String,
}

impl<R: Region> PrefixedRegion<R> {
    /// Region looking up `prefix` + name in `origin`.
    pub fn new(origin: R, prefix: impl Into<String>) -> Self {
        Self {
            origin,
            prefix: prefix.into(),
        }
    }
}

impl<R: Region> Region for PrefixedRegion<R> {
    fn credentials(&self) -> Arc<dyn Credentials> {
        self.origin.credentials()
    }

    fn table(&self, name: &str) -> Table {
        self.origin.table(&format!("{}{name}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryData;
    use crate::common::attributes::Attributes;

    #[test]
    fn test_prefixed_tables_share_origin_credentials() {
        let data = MemoryData::new();
        data.create_table("test-users", ["id"]).unwrap();
        let region = PrefixedRegion::new(SimpleRegion::new(data.clone()), "test-");
        let table = region.table("users");
        assert_eq!(table.name(), "test-users");
        table.put(&Attributes::new().with("id", 7)).unwrap();
        assert_eq!(
            SimpleRegion::new(data).table("test-users").frame().size().unwrap(),
            1
        );
    }

    #[test]
    fn test_nested_prefixes() {
        let region = PrefixedRegion::new(
            PrefixedRegion::new(SimpleRegion::new(MemoryData::new()), "app-"),
            "eu-",
        );
        assert_eq!(region.table("users").name(), "app-eu-users");
    }
}

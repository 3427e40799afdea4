//! Backend handles and the requests they serve.
//!
//! A [`Backend`] is one authenticated handle to the store. It is obtained from
//! [`Credentials::connect`] for a single round trip and dropped as soon as that
//! round trip returns, on success and on failure alike. Every method blocks the
//! calling thread until the store answers; nothing is retried.

/// Amazon DynamoDB handles.
pub mod aws;

/// In-process tables for fixtures and tests.
pub mod memory;

use crate::common::{
    attributes::Attributes, condition::Conditions, update::AttributeUpdates,
};
use crate::error::Result;

use std::fmt;

/// Strongly or eventually consistent read of one row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetRequest {
    /// Whether to use a strongly consistent read.
    pub consistent_read: bool,
    /// The attributes to return; all of them when empty.
    pub attributes: Vec<String>,
    /// The primary key of the row.
    pub keys: Attributes,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Full-row write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutRequest {
    /// Conditions the stored row must satisfy; unconditional when empty.
    pub expected: Conditions,
    /// The row, key attributes included.
    pub item: Attributes,
    /// The name of the table to write to.
    pub table_name: String,
}

/// Row removal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteRequest {
    /// Conditions the stored row must satisfy; unconditional when empty.
    pub expected: Conditions,
    /// The primary key of the row.
    pub keys: Attributes,
    /// The name of the table to delete from.
    pub table_name: String,
}

/// Partial update of one row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateRequest {
    /// Conditions the stored row must satisfy; unconditional when empty.
    pub expected: Conditions,
    /// The primary key of the row.
    pub keys: Attributes,
    /// The name of the table to write to.
    pub table_name: String,
    /// The changes to make.
    pub updates: AttributeUpdates,
}

/// One bounded page of a query on a partition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRequest {
    /// The attributes to return; all of them when empty.
    pub attributes: Vec<String>,
    /// Whether to use a strongly consistent read.
    pub consistent_read: bool,
    /// Only count matching rows instead of returning them.
    pub count: bool,
    /// The continuation key of the previous page.
    pub exclusive_start_key: Option<Attributes>,
    /// Conditions applied after the key conditions.
    pub filter: Conditions,
    /// The secondary index to query instead of the table.
    pub index_name: Option<String>,
    /// Key attributes of `index_name`, partition key first.
    pub index_keys: Vec<String>,
    /// Conditions on the partition key and, optionally, the range key.
    pub key_conditions: Conditions,
    /// The maximum number of rows to evaluate.
    pub limit: Option<i32>,
    /// Ascending (`true`) or descending range key order.
    pub scan_index_forward: bool,
    /// The name of the table to read from.
    pub table_name: String,
}

/// One bounded page of a full table scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanRequest {
    /// The attributes to return; all of them when empty.
    pub attributes: Vec<String>,
    /// Only count matching rows instead of returning them.
    pub count: bool,
    /// The continuation key of the previous page.
    pub exclusive_start_key: Option<Attributes>,
    /// Conditions applied to every scanned row.
    pub filter: Conditions,
    /// The maximum number of rows to evaluate.
    pub limit: Option<i32>,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Rows returned by one query or scan round trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Number of rows matching the request in this page.
    pub count: usize,
    /// The rows, empty for counting requests.
    pub items: Vec<Attributes>,
    /// Where the next page starts, when the store has more rows.
    pub last_evaluated_key: Option<Attributes>,
}

/// Authenticated handle to the store.
pub trait Backend {
    /// Read one row, `None` when it does not exist.
    fn get_item(&self, request: GetRequest) -> Result<Option<Attributes>>;

    /// Create or replace one row.
    fn put_item(&self, request: PutRequest) -> Result<()>;

    /// Remove one row; removing an absent row without conditions succeeds.
    fn delete_item(&self, request: DeleteRequest) -> Result<()>;

    /// Change some attributes of one row, creating it when absent.
    ///
    /// An empty set of updates is rejected with a validation error.
    fn update_item(&self, request: UpdateRequest) -> Result<()>;

    /// Fetch one page of a query.
    fn query(&self, request: QueryRequest) -> Result<Page>;

    /// Fetch one page of a scan.
    fn scan(&self, request: ScanRequest) -> Result<Page>;

    /// Names of the primary key attributes, partition key first.
    fn key_schema(&self, table_name: &str) -> Result<Vec<String>>;
}

/// Source of authenticated backend handles.
///
/// Must be safe to call repeatedly and from several threads; each call may
/// hand out a fresh handle.
pub trait Credentials: fmt::Debug + Send + Sync {
    /// A new handle, owned by the caller for one round trip.
    fn connect(&self) -> Result<Box<dyn Backend>>;
}

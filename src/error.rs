use crate::common::attributes::Attributes;

use std::error;

/// Errors raised by frames, valves, iterators and items.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend rejected a write whose expected clause did not match.
    ///
    /// Raised when the row was deleted or its key attributes changed between
    /// the read that produced an item and the write that tried to overwrite it.
    #[error("conditional check failed on table {table}")]
    ConditionalCheckFailed {
        /// The table the write was issued against.
        table: String,
    },
    /// Iteration was asked for one more item than the frame holds.
    #[error("no more items in table {table}")]
    NoSuchElement {
        /// The table being iterated.
        table: String,
    },
    /// The row exists but the attribute is not set on it.
    #[error("attribute {name} not found in item {keys} of table {table}")]
    NoSuchAttribute {
        /// The table of the item.
        table: String,
        /// The primary key of the item.
        keys: Attributes,
        /// The missing attribute.
        name: String,
    },
    /// The row identified by the key is gone from the table.
    #[error("item {keys} not found in table {table}")]
    ItemNotFound {
        /// The table of the item.
        table: String,
        /// The primary key of the item.
        keys: Attributes,
    },
    /// The table does not exist.
    #[error("table {0} not found")]
    TableNotFound(String),
    /// A programming error: an operation was called out of order.
    #[error("misuse: {0}")]
    Misuse(&'static str),
    /// A value that is neither a string, a number nor a binary.
    #[error("unsupported attribute value for {0}")]
    UnsupportedValue(String),
    /// The request was malformed.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A typed row could not be converted to or from attributes.
    #[error(transparent)]
    Serialization(#[from] serde_dynamo::Error),
    /// The backend or the transport failed.
    #[error("backend failure: {0}")]
    Backend(#[source] Box<dyn error::Error + Send + Sync>),
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

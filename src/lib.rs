#![deny(missing_docs)]

//! # DynamoDB Frame
//!
//! Lazily paginated, filtered views over Amazon DynamoDB tables, with items that
//! refuse to overwrite rows removed behind their back.
//!
//! ## Overview
//!
//! This library layers a small object model on top of DynamoDB that:
//! - Composes immutable [`Attributes`](common::attributes::Attributes) and
//!   [`Conditions`](common::condition::Conditions) into requests
//! - Iterates a [`Frame`](frame::Frame) one page at a time, fetching the next
//!   page only when the current one runs out
//! - Lets the iterator remove the row it just returned without losing its place
//! - Guards every item write with the item's primary key, so a write to a row
//!   deleted meanwhile fails with [`Error::ConditionalCheckFailed`]
//!
//! Every call blocks the calling thread until DynamoDB answers.
//!
//! ## Quick Example
//!
//! ```rust
//! use dynamodb_frame::backend::memory::MemoryData;
//! use dynamodb_frame::common::{attributes::Attributes, condition::Condition};
//! use dynamodb_frame::read::query::QueryValve;
//! use dynamodb_frame::region::{Region, SimpleRegion};
//!
//! # fn main() -> dynamodb_frame::Result<()> {
//! let data = MemoryData::new();
//! data.create_table("messages", ["owner", "stamp"])?;
//! let table = SimpleRegion::new(data).table("messages");
//! for stamp in 0..5 {
//!     table.put(
//!         &Attributes::new()
//!             .with("owner", "ann")
//!             .with("stamp", stamp)
//!             .with("text", format!("note {stamp}")),
//!     )?;
//! }
//!
//! // pages of two rows, fetched one after the other as iteration proceeds
//! let frame = table
//!     .frame()
//!     .filter("owner", Condition::Equals("ann".into()))
//!     .through(QueryValve::default().with_limit(2));
//! let iterator = frame.iter();
//! while iterator.has_next()? {
//!     let item = iterator.next_item()?;
//!     if item.get("text")?.as_str() == Some("note 3") {
//!         iterator.remove()?;
//!     }
//! }
//! assert_eq!(frame.size()?, 4);
//! # Ok(())
//! # }
//! ```
//!
//! Against DynamoDB itself, connect through
//! [`AwsCredentials`](backend::aws::AwsCredentials) instead:
//!
//! ```no_run
//! use dynamodb_frame::backend::aws::{AwsCredentials, Settings};
//! use dynamodb_frame::region::{Region, SimpleRegion};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = AwsCredentials::new(&Settings::from_env()?)?;
//! let table = SimpleRegion::new(credentials).table("messages");
//! println!("{} rows", table.frame().size()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Attributes, conditions, updates and scalar values
//! - [`mod@read`] - Valves, dosages and the frame iterator
//! - [`mod@backend`] - DynamoDB and in-process backends
//! - [`mod@region`], [`mod@table`], [`mod@frame`], [`mod@item`] - The object model

/// Backend handles: DynamoDB and in-process tables.
pub mod backend;

/// Common value types for attributes, conditions and updates.
pub mod common;

/// Errors raised by every operation.
pub mod error;

/// Filtered views of tables.
pub mod frame;

/// Rows with lazily loaded attributes and guarded writes.
pub mod item;

/// Paged reads: valves, dosages and the frame iterator.
pub mod read;

/// Entry points to sets of tables.
pub mod region;

/// Named tables.
pub mod table;

pub use error::{Error, Result};

//! Paged reads of table rows.
//!
//! This module provides the pieces a [`Frame`](crate::frame::Frame) is iterated with:
//! - Valves, the strategies fetching pages (queries or scans)
//! - Dosages, the fetched pages linked to the ones after them
//! - The lazy, removable iterator walking them

/// Shared paging logic of queries and scans.
mod common;

/// Lazy iteration over the rows of a frame.
pub mod iterator;

/// Valve fetching rows with paged queries.
pub mod query;

/// Valve fetching rows with paged scans.
pub mod scan;

/// Valve and dosage abstractions.
pub mod valve;

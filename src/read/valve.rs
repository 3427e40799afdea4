use crate::backend::Credentials;
use crate::common::{attributes::Attributes, condition::Conditions};
use crate::error::{Error, Result};

use std::{fmt, sync::Arc};

/// Strategy fetching pages of rows out of a table.
///
/// A valve holds no paging state; everything needed to continue lives in the
/// [`Dosage`] chain it starts. Implement this trait to plug a new fetch
/// strategy into [`Frame::through`](crate::frame::Frame::through).
pub trait Valve: fmt::Debug + Send + Sync {
    /// Fetch the first page of rows matching `conditions`.
    ///
    /// `keys` are the primary key attribute names of the table; every row of
    /// the page carries at least those.
    fn fetch(
        &self,
        credentials: &Arc<dyn Credentials>,
        table_name: &str,
        conditions: &Conditions,
        keys: &[String],
    ) -> Result<Box<dyn Dosage>>;

    /// Count the rows matching `conditions`, walking every page.
    fn count(
        &self,
        credentials: &Arc<dyn Credentials>,
        table_name: &str,
        conditions: &Conditions,
        keys: &[String],
    ) -> Result<usize>;
}

/// One fetched page of rows plus the means to fetch the following one.
pub trait Dosage: fmt::Debug + Send {
    /// The rows of this page, in the order the store returned them.
    fn items(&self) -> &[Attributes];

    /// Whether the store has a further page.
    fn has_next(&self) -> bool;

    /// Fetch the following page with one blocking round trip.
    ///
    /// Calling this when [`has_next`](Dosage::has_next) is `false` is a
    /// programming error reported as [`Error::Misuse`].
    fn next(&self) -> Result<Box<dyn Dosage>>;

    /// Where the following page starts, if there is one.
    ///
    /// The cursor can be persisted and handed to
    /// [`QueryValve::with_exclusive_start_key`](crate::read::query::QueryValve::with_exclusive_start_key)
    /// to resume later.
    fn cursor(&self) -> Option<&Attributes> {
        None
    }
}

/// Page with no rows and nothing after it.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyDosage;

impl Dosage for EmptyDosage {
    fn items(&self) -> &[Attributes] {
        &[]
    }

    fn has_next(&self) -> bool {
        false
    }

    fn next(&self) -> Result<Box<dyn Dosage>> {
        Err(Error::Misuse("there is no page after an empty dosage"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dosage_is_terminal() {
        let dosage = EmptyDosage;
        assert!(dosage.items().is_empty());
        assert!(!dosage.has_next());
        assert!(dosage.cursor().is_none());
        assert!(matches!(dosage.next(), Err(Error::Misuse(_))));
    }
}

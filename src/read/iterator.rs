use crate::backend::DeleteRequest;
use crate::common::{attributes::Attributes, condition::Conditions};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::item::Item;
use crate::read::valve::Dosage;

use parking_lot::Mutex;

/// Page whose rows were shrunk by removals, still linked to the rest of the chain.
#[derive(Debug)]
struct Excised {
    items: Vec<Attributes>,
    origin: Box<dyn Dosage>,
}

impl Dosage for Excised {
    fn items(&self) -> &[Attributes] {
        &self.items
    }

    fn has_next(&self) -> bool {
        self.origin.has_next()
    }

    fn next(&self) -> Result<Box<dyn Dosage>> {
        self.origin.next()
    }

    fn cursor(&self) -> Option<&Attributes> {
        self.origin.cursor()
    }
}

#[derive(Debug, Default)]
struct State {
    /// The row returned by the last `next_item`, until it is removed.
    current: Option<Attributes>,
    dosage: Option<Box<dyn Dosage>>,
    keys: Vec<String>,
    /// Index of the last returned row within `dosage`; `None` before its first row.
    position: Option<usize>,
}

/// Lazy iterator over the rows of a frame.
///
/// Nothing is fetched until the first call to [`has_next`](AwsIterator::has_next)
/// or [`next_item`](AwsIterator::next_item); pages are then fetched one at a
/// time as the previous one runs out. Empty intermediate pages are skipped.
///
/// Every operation holds an internal lock for its whole duration, including
/// the round trip it may perform, so the iterator can be shared between
/// threads; each row is handed out once.
#[derive(Debug)]
pub struct AwsIterator {
    frame: Frame,
    state: Mutex<State>,
}

impl AwsIterator {
    pub(crate) fn new(frame: Frame) -> Self {
        Self {
            frame,
            state: Mutex::new(State::default()),
        }
    }

    /// Whether another row is available, fetching pages as needed.
    pub fn has_next(&self) -> Result<bool> {
        let mut state = self.state.lock();
        self.advance(&mut state)
    }

    /// The following row.
    ///
    /// Fails with [`Error::NoSuchElement`] once every row has been returned.
    pub fn next_item(&self) -> Result<Item> {
        let mut state = self.state.lock();
        if !self.advance(&mut state)? {
            return Err(Error::NoSuchElement {
                table: self.frame.table().name().to_string(),
            });
        }
        let position = state.position.map_or(0, |position| position + 1);
        let row = state
            .dosage
            .as_ref()
            .and_then(|dosage| dosage.items().get(position))
            .cloned()
            .ok_or_else(|| Error::NoSuchElement {
                table: self.frame.table().name().to_string(),
            })?;
        state.position = Some(position);
        state.current = Some(row.clone());
        Ok(Item::new(self.frame.clone(), row, state.keys.clone()))
    }

    /// Delete the row returned by the last [`next_item`](AwsIterator::next_item).
    ///
    /// The delete is guarded by the row's primary key; a row that is already
    /// gone counts as removed. Calling this before any `next_item`, or twice
    /// for the same row, fails with [`Error::Misuse`].
    pub fn remove(&self) -> Result<()> {
        let mut state = self.state.lock();
        let keys = match &state.current {
            Some(row) => row.only(&state.keys),
            None => return Err(Error::Misuse("remove() without a preceding next()")),
        };
        let table = self.frame.table();
        let backend = table.credentials().connect()?;
        let request = DeleteRequest {
            expected: Conditions::equal_to(&keys),
            keys,
            table_name: table.name().to_string(),
        };
        match backend.delete_item(request) {
            Ok(()) => {}
            Err(Error::ConditionalCheckFailed { .. }) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(table = table.name(), "row already removed");
            }
            Err(err) => return Err(err),
        }
        state.current = None;
        // the row is still part of the current page unless a page turn happened since
        if let Some(position) = state.position {
            if let Some(dosage) = state.dosage.take() {
                let mut items = dosage.items().to_vec();
                if position < items.len() {
                    items.remove(position);
                }
                state.dosage = Some(Box::new(Excised {
                    items,
                    origin: dosage,
                }));
                state.position = position.checked_sub(1);
            }
        }
        Ok(())
    }

    fn advance(&self, state: &mut State) -> Result<bool> {
        if state.dosage.is_none() {
            let table = self.frame.table();
            let keys = table.keys()?;
            let dosage = self.frame.valve().fetch(
                &table.credentials(),
                table.name(),
                self.frame.conditions(),
                &keys,
            )?;
            state.keys = keys;
            state.dosage = Some(dosage);
            state.position = None;
        }
        while let Some(dosage) = state.dosage.as_ref() {
            let following = state.position.map_or(0, |position| position + 1);
            if following < dosage.items().len() {
                return Ok(true);
            }
            if !dosage.has_next() {
                return Ok(false);
            }
            let next = dosage.next()?;
            state.dosage = Some(next);
            state.position = None;
        }
        Ok(false)
    }
}

impl Iterator for AwsIterator {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_item() {
            Ok(item) => Some(Ok(item)),
            Err(Error::NoSuchElement { .. }) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

use crate::backend::{Backend, Credentials, Page, QueryRequest, ScanRequest};
use crate::common::attributes::Attributes;
use crate::error::{Error, Result};
use crate::read::valve::Dosage;

use std::{fmt, sync::Arc};

/// A query or scan request that can be resumed from a continuation key.
pub(crate) trait PageRequest: Clone + fmt::Debug + Send + 'static {
    fn table_name(&self) -> &str;

    fn send(&self, backend: &dyn Backend) -> Result<Page>;

    fn starting_after(&self, key: Attributes) -> Self;

    fn counting(&self) -> Self;
}

impl PageRequest for QueryRequest {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn send(&self, backend: &dyn Backend) -> Result<Page> {
        backend.query(self.clone())
    }

    fn starting_after(&self, key: Attributes) -> Self {
        Self {
            exclusive_start_key: Some(key),
            ..self.clone()
        }
    }

    fn counting(&self) -> Self {
        Self {
            count: true,
            ..self.clone()
        }
    }
}

impl PageRequest for ScanRequest {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn send(&self, backend: &dyn Backend) -> Result<Page> {
        backend.scan(self.clone())
    }

    fn starting_after(&self, key: Attributes) -> Self {
        Self {
            exclusive_start_key: Some(key),
            ..self.clone()
        }
    }

    fn counting(&self) -> Self {
        Self {
            count: true,
            ..self.clone()
        }
    }
}

/// One round trip on a handle owned by this call only.
fn fetch_page<R: PageRequest>(credentials: &Arc<dyn Credentials>, request: &R) -> Result<Page> {
    let backend = credentials.connect()?;
    let page = request.send(backend.as_ref())?;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        table = request.table_name(),
        items = page.items.len(),
        more = page.last_evaluated_key.is_some(),
        "fetched page"
    );
    Ok(page)
}

/// Page produced by a query or scan valve, linked to the request that continues it.
#[derive(Debug)]
pub(crate) struct PagedDosage<R> {
    credentials: Arc<dyn Credentials>,
    page: Page,
    request: R,
}

impl<R: PageRequest> PagedDosage<R> {
    pub(crate) fn fetch(credentials: &Arc<dyn Credentials>, request: R) -> Result<Self> {
        let page = fetch_page(credentials, &request)?;
        Ok(Self {
            credentials: Arc::clone(credentials),
            page,
            request,
        })
    }
}

impl<R: PageRequest> Dosage for PagedDosage<R> {
    fn items(&self) -> &[Attributes] {
        &self.page.items
    }

    fn has_next(&self) -> bool {
        self.page.last_evaluated_key.is_some()
    }

    fn next(&self) -> Result<Box<dyn Dosage>> {
        let key = self
            .page
            .last_evaluated_key
            .clone()
            .ok_or(Error::Misuse("next() called on the last page"))?;
        let dosage = Self::fetch(&self.credentials, self.request.starting_after(key))?;
        Ok(Box::new(dosage))
    }

    fn cursor(&self) -> Option<&Attributes> {
        self.page.last_evaluated_key.as_ref()
    }
}

/// Count matching rows across every page of `request`.
pub(crate) fn count_pages<R: PageRequest>(
    credentials: &Arc<dyn Credentials>,
    request: R,
) -> Result<usize> {
    let mut request = request.counting();
    let mut total = 0;
    loop {
        let page = fetch_page(credentials, &request)?;
        total += page.count;
        match page.last_evaluated_key {
            Some(key) => request = request.starting_after(key),
            None => return Ok(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{PutRequest, memory::MemoryData};

    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> Arc<dyn Credentials> {
        let data = MemoryData::new();
        data.create_table("t", ["id"]).unwrap();
        for id in 0..5 {
            data.put_item(PutRequest {
                item: Attributes::new().with("id", id),
                table_name: "t".to_string(),
                ..Default::default()
            })
            .unwrap();
        }
        Arc::new(data)
    }

    fn scan(limit: i32) -> ScanRequest {
        ScanRequest {
            limit: Some(limit),
            table_name: "t".to_string(),
            ..Default::default()
        }
    }

    #[rstest]
    fn test_dosage_chain(credentials: Arc<dyn Credentials>) {
        let first = PagedDosage::fetch(&credentials, scan(2)).unwrap();
        assert_eq!(first.items().len(), 2);
        assert!(first.has_next());
        assert_eq!(first.cursor(), Some(&Attributes::from([("id", 1)])));
        let second = first.next().unwrap();
        assert_eq!(second.items(), &[
            Attributes::from([("id", 2)]),
            Attributes::from([("id", 3)]),
        ]);
        let third = second.next().unwrap();
        assert_eq!(third.items().len(), 1);
        assert!(!third.has_next());
        assert!(matches!(third.next(), Err(Error::Misuse(_))));
    }

    #[rstest]
    #[case::one_page(100)]
    #[case::many_pages(2)]
    #[case::page_per_row(1)]
    fn test_count_pages(credentials: Arc<dyn Credentials>, #[case] limit: i32) {
        assert_eq!(count_pages(&credentials, scan(limit)).unwrap(), 5);
    }
}

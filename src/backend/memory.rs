//! In-process storage for DynamoDB-shaped tables.
//!
//! Rows of a table are kept ordered by their primary key, partition key first
//! then range key, following the service's comparison rules: strings and
//! binaries bytewise, numbers numerically. Queries and scans walk that order,
//! evaluate at most `limit` rows, apply the filter to the evaluated rows and
//! hand back a continuation key whenever rows remain, exactly like the
//! service does. Conditions on writes are evaluated against the stored row,
//! or against an empty row when there is none.

use crate::backend::{
    Backend, Credentials, DeleteRequest, GetRequest, Page, PutRequest, QueryRequest, ScanRequest,
    UpdateRequest,
};
use crate::common::{
    attributes::Attributes,
    condition::{Condition, Conditions},
    value::Value,
};
use crate::error::{Error, Result};

use parking_lot::RwLock;
use std::{cmp, collections, sync::Arc};

#[derive(Debug)]
struct MemoryTable {
    keys: Vec<String>,
    rows: Vec<Attributes>,
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> cmp::Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::S(_) => 0,
            Value::N(_) => 1,
            Value::B(_) => 2,
        }
    }
    match (left, right) {
        (Some(left), Some(right)) => left
            .compare(right)
            .unwrap_or_else(|| rank(left).cmp(&rank(right))),
        (None, Some(_)) => cmp::Ordering::Less,
        (Some(_), None) => cmp::Ordering::Greater,
        (None, None) => cmp::Ordering::Equal,
    }
}

fn compare_rows(names: &[String], left: &Attributes, right: &Attributes) -> cmp::Ordering {
    names
        .iter()
        .map(|name| compare_values(left.get(name), right.get(name)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(cmp::Ordering::Equal)
}

fn project(row: &Attributes, attributes: &[String]) -> Attributes {
    if attributes.is_empty() {
        row.clone()
    } else {
        row.only(attributes)
    }
}

impl MemoryTable {
    fn key_of(&self, row: &Attributes) -> Result<Attributes> {
        if let Some(missing) = self.keys.iter().find(|name| !row.contains_key(name)) {
            return Err(Error::Validation(format!(
                "missing required key attribute: {missing}"
            )));
        }
        Ok(row.only(&self.keys))
    }

    fn position(&self, keys: &Attributes) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| compare_rows(&self.keys, row, keys).is_eq())
    }

    fn current(&self, keys: &Attributes) -> Option<&Attributes> {
        self.position(keys).map(|index| &self.rows[index])
    }

    fn check(&self, table_name: &str, keys: &Attributes, expected: &Conditions) -> Result<()> {
        let empty = Attributes::new();
        let current = self.current(keys).unwrap_or(&empty);
        if expected.matches(current) {
            Ok(())
        } else {
            Err(Error::ConditionalCheckFailed {
                table: table_name.to_string(),
            })
        }
    }

    fn store(&mut self, row: Attributes) -> Result<()> {
        let keys = self.key_of(&row)?;
        match self.position(&keys) {
            Some(index) => self.rows[index] = row,
            None => {
                let names = self.keys.clone();
                let index = self
                    .rows
                    .partition_point(|existing| compare_rows(&names, existing, &row).is_lt());
                self.rows.insert(index, row);
            }
        }
        Ok(())
    }
}

/// Walks `candidates` in order from just after `start`, evaluating at most `limit` rows.
struct Walk<'a> {
    attributes: &'a [String],
    count: bool,
    filter: &'a Conditions,
    limit: Option<i32>,
    order: Vec<String>,
    start: Option<&'a Attributes>,
}

impl Walk<'_> {
    fn page(self, candidates: Vec<&Attributes>, forward: bool) -> Result<Page> {
        let limit = match self.limit {
            Some(limit) if limit < 1 => {
                return Err(Error::Validation(format!(
                    "limit must be at least 1, got {limit}"
                )));
            }
            Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
            None => usize::MAX,
        };
        let remaining: Vec<&Attributes> = match self.start {
            Some(start) => candidates
                .into_iter()
                .filter(|row| {
                    let ordering = compare_rows(&self.order, row, start);
                    if forward {
                        ordering.is_gt()
                    } else {
                        ordering.is_lt()
                    }
                })
                .collect(),
            None => candidates,
        };
        let evaluated = &remaining[..limit.min(remaining.len())];
        let last_evaluated_key = if evaluated.len() < remaining.len() {
            evaluated.last().map(|row| row.only(&self.order))
        } else {
            None
        };
        let matching: Vec<_> = evaluated
            .iter()
            .filter(|row| self.filter.matches(row))
            .collect();
        let items = if self.count {
            Vec::new()
        } else {
            matching
                .iter()
                .map(|row| project(row, self.attributes))
                .collect()
        };
        Ok(Page {
            count: matching.len(),
            items,
            last_evaluated_key,
        })
    }
}

/// In-process tables behind one shared lock.
///
/// Cloning is cheap and every clone, as well as every handle obtained through
/// [`Credentials::connect`], sees the same tables.
///
/// ```rust
/// use dynamodb_frame::backend::{Backend, GetRequest, PutRequest, memory::MemoryData};
/// use dynamodb_frame::common::attributes::Attributes;
///
/// let data = MemoryData::new();
/// data.create_table("books", ["isbn"]).unwrap();
/// data.put_item(PutRequest {
///     item: Attributes::new().with("isbn", "978-0").with("title", "Dune"),
///     table_name: "books".to_string(),
///     ..Default::default()
/// })
/// .unwrap();
/// let row = data
///     .get_item(GetRequest {
///         keys: Attributes::from([("isbn", "978-0")]),
///         table_name: "books".to_string(),
///         ..Default::default()
///     })
///     .unwrap();
/// assert!(row.is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryData {
    tables: Arc<RwLock<collections::HashMap<String, MemoryTable>>>,
}

impl MemoryData {
    /// No tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table keyed by `keys`, partition key first.
    pub fn create_table<I, S>(&self, table_name: &str, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() || keys.len() > 2 {
            return Err(Error::Validation(format!(
                "table {table_name} needs a partition key and at most one range key"
            )));
        }
        let mut tables = self.tables.write();
        if tables.contains_key(table_name) {
            return Err(Error::Validation(format!(
                "table {table_name} already exists"
            )));
        }
        tables.insert(
            table_name.to_string(),
            MemoryTable {
                keys,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Drop a table and all its rows.
    pub fn delete_table(&self, table_name: &str) -> Result<()> {
        self.tables
            .write()
            .remove(table_name)
            .map(|_| ())
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    /// Names of the existing tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn read<R>(&self, table_name: &str, f: impl FnOnce(&MemoryTable) -> Result<R>) -> Result<R> {
        let tables = self.tables.read();
        let table = tables
            .get(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;
        f(table)
    }

    fn write<R>(
        &self,
        table_name: &str,
        f: impl FnOnce(&mut MemoryTable) -> Result<R>,
    ) -> Result<R> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;
        f(table)
    }
}

impl Credentials for MemoryData {
    fn connect(&self) -> Result<Box<dyn Backend>> {
        Ok(Box::new(self.clone()))
    }
}

impl Backend for MemoryData {
    fn get_item(&self, request: GetRequest) -> Result<Option<Attributes>> {
        self.read(&request.table_name, |table| {
            let keys = table.key_of(&request.keys)?;
            Ok(table
                .current(&keys)
                .map(|row| project(row, &request.attributes)))
        })
    }

    fn put_item(&self, request: PutRequest) -> Result<()> {
        self.write(&request.table_name, |table| {
            let keys = table.key_of(&request.item)?;
            table.check(&request.table_name, &keys, &request.expected)?;
            table.store(request.item)
        })
    }

    fn delete_item(&self, request: DeleteRequest) -> Result<()> {
        self.write(&request.table_name, |table| {
            let keys = table.key_of(&request.keys)?;
            table.check(&request.table_name, &keys, &request.expected)?;
            if let Some(index) = table.position(&keys) {
                table.rows.remove(index);
            }
            Ok(())
        })
    }

    fn update_item(&self, request: UpdateRequest) -> Result<()> {
        self.write(&request.table_name, |table| {
            if request.updates.is_empty() {
                return Err(Error::Validation(
                    "update needs at least one attribute update".to_string(),
                ));
            }
            let keys = table.key_of(&request.keys)?;
            if let Some((name, _)) = request
                .updates
                .iter()
                .find(|(name, _)| keys.contains_key(name))
            {
                return Err(Error::Validation(format!(
                    "cannot update key attribute {name}"
                )));
            }
            table.check(&request.table_name, &keys, &request.expected)?;
            let current = table.current(&keys).cloned().unwrap_or(keys);
            let row = request.updates.apply(&current)?;
            table.store(row)
        })
    }

    fn query(&self, request: QueryRequest) -> Result<Page> {
        self.read(&request.table_name, |table| {
            let order: Vec<String> = match request.index_name {
                Some(_) => request.index_keys.clone(),
                None => table.keys.clone(),
            };
            let partition = order.first().ok_or_else(|| {
                Error::Validation("query needs a key condition on the partition key".to_string())
            })?;
            if !matches!(
                request.key_conditions.get(partition),
                Some(Condition::Equals(_))
            ) {
                return Err(Error::Validation(format!(
                    "query needs an equality condition on partition key {partition}"
                )));
            }
            if let Some(stray) = request
                .key_conditions
                .keys()
                .find(|name| !order.iter().any(|key| key == name))
            {
                return Err(Error::Validation(format!(
                    "{stray} is not a key attribute"
                )));
            }
            // table keys break ties between rows sharing the index keys
            let mut order_keys = order.clone();
            order_keys.extend(
                table
                    .keys
                    .iter()
                    .filter(|key| !order.contains(key))
                    .cloned(),
            );
            let mut candidates: Vec<&Attributes> = table
                .rows
                .iter()
                .filter(|row| request.key_conditions.matches(row))
                .collect();
            candidates.sort_by(|left, right| compare_rows(&order_keys, left, right));
            if !request.scan_index_forward {
                candidates.reverse();
            }
            let walk = Walk {
                attributes: &request.attributes,
                count: request.count,
                filter: &request.filter,
                limit: request.limit,
                order: order_keys,
                start: request.exclusive_start_key.as_ref(),
            };
            walk.page(candidates, request.scan_index_forward)
        })
    }

    fn scan(&self, request: ScanRequest) -> Result<Page> {
        self.read(&request.table_name, |table| {
            let walk = Walk {
                attributes: &request.attributes,
                count: request.count,
                filter: &request.filter,
                limit: request.limit,
                order: table.keys.clone(),
                start: request.exclusive_start_key.as_ref(),
            };
            walk.page(table.rows.iter().collect(), true)
        })
    }

    fn key_schema(&self, table_name: &str) -> Result<Vec<String>> {
        self.read(table_name, |table| Ok(table.keys.clone()))
    }
}

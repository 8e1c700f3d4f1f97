//! In-memory store backend.
//!
//! A mutex-guarded table heap shared across clones, so a factory can hand
//! independent sessions connections over the same data. Tables materialize
//! lazily on first insert; reads of unknown tables are empty, like a freshly
//! exported schema. Each trait call counts as one round trip regardless of
//! how many rows it carries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use minorm_core::{Error, Result, Row, Value};

use crate::{Store, StoreConfig};

#[derive(Debug, Clone)]
struct StoredRow {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl StoredRow {
    fn value_of(&self, column: &str) -> &Value {
        self.columns
            .iter()
            .position(|c| c == column)
            .map_or(&Value::Null, |i| &self.values[i])
    }

    fn set(&mut self, column: &str, value: Value) {
        match self.columns.iter().position(|c| c == column) {
            Some(i) => self.values[i] = value,
            None => {
                self.columns.push(column.to_string());
                self.values.push(value);
            }
        }
    }

    fn to_row(&self) -> Row {
        Row::from_pairs(
            self.columns
                .iter()
                .cloned()
                .zip(self.values.iter().cloned())
                .collect(),
        )
    }
}

#[derive(Debug, Default, Clone)]
struct Heap {
    tables: HashMap<String, Vec<StoredRow>>,
    sequences: HashMap<String, i64>,
}

#[derive(Debug, Default)]
struct Inner {
    heap: Heap,
    snapshot: Option<Heap>,
    round_trips: u64,
}

/// Shared in-memory storage. `Clone` yields another handle over the same
/// heap.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store from connection parameters. Only `mem:` urls are
    /// understood by this backend.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let scheme = config.scheme()?;
        if scheme != "mem" {
            return Err(Error::config(format!(
                "memory store cannot open '{}' urls",
                scheme
            )));
        }
        tracing::debug!(url = config.url(), "opening in-memory store");
        Ok(Self::new())
    }

    /// Rows currently stored in `table`. Test observability helper.
    pub fn table_len(&self, table: &str) -> usize {
        self.lock().heap.tables.get(table).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

impl Store for MemoryStore {
    fn fetch(&mut self, table: &str, key_column: &str, key: &Value) -> Result<Option<Row>> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        tracing::trace!(table, key = ?key, "fetch");
        Ok(inner
            .heap
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|r| r.value_of(key_column) == key))
            .map(StoredRow::to_row))
    }

    fn fetch_by(&mut self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        tracing::trace!(table, column, "fetch_by");
        Ok(inner
            .heap
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.value_of(column) == value)
                    .map(StoredRow::to_row)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn select_keys(
        &mut self,
        table: &str,
        key_column: &str,
        filter_column: &str,
        value: &Value,
    ) -> Result<Vec<Value>> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        Ok(inner
            .heap
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.value_of(filter_column) == value)
                    .map(|r| r.value_of(key_column).clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn insert_rows(&mut self, table: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Result<u64> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        let count = rows.len() as u64;
        tracing::trace!(table, rows = count, "insert_rows");
        let stored = inner.heap.tables.entry(table.to_string()).or_default();
        for values in rows {
            if values.len() != columns.len() {
                return Err(Error::statement(format!(
                    "insert into '{}' carries {} values for {} columns",
                    table,
                    values.len(),
                    columns.len()
                )));
            }
            stored.push(StoredRow {
                columns: columns.iter().map(ToString::to_string).collect(),
                values,
            });
        }
        Ok(count)
    }

    fn update_row(
        &mut self,
        table: &str,
        key_column: &str,
        key: &Value,
        columns: &[&str],
        values: &[Value],
    ) -> Result<u64> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        tracing::trace!(table, key = ?key, "update_row");
        let mut affected = 0;
        if let Some(rows) = inner.heap.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| r.value_of(key_column) == key) {
                for (column, value) in columns.iter().zip(values) {
                    row.set(column, value.clone());
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    fn delete_rows(&mut self, table: &str, key_column: &str, keys: &[Value]) -> Result<u64> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        tracing::trace!(table, keys = keys.len(), "delete_rows");
        let Some(rows) = inner.heap.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !keys.contains(r.value_of(key_column)));
        Ok((before - rows.len()) as u64)
    }

    fn next_sequence(&mut self, name: &str, span: u64) -> Result<i64> {
        if span == 0 {
            return Err(Error::statement("sequence span must be at least 1"));
        }
        let mut inner = self.lock();
        inner.round_trips += 1;
        let current = inner.heap.sequences.entry(name.to_string()).or_insert(0);
        let first = *current + 1;
        *current += span as i64;
        tracing::trace!(name, span, first, "next_sequence");
        Ok(first)
    }

    fn begin(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        if inner.snapshot.is_some() {
            return Err(Error::transaction("transaction already active"));
        }
        inner.snapshot = Some(inner.heap.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        if inner.snapshot.take().is_none() {
            return Err(Error::transaction("no active transaction to commit"));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.round_trips += 1;
        match inner.snapshot.take() {
            Some(heap) => {
                inner.heap = heap;
                Ok(())
            }
            None => Err(Error::transaction("no active transaction to roll back")),
        }
    }

    fn round_trips(&self) -> u64 {
        self.lock().round_trips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: i64) -> Value {
        Value::BigInt(v)
    }

    #[test]
    fn insert_then_fetch_round_trip() {
        let mut store = MemoryStore::new();
        store
            .insert_rows(
                "docs.document",
                &["id", "number"],
                vec![vec![big(1), Value::Text("1/2016".into())]],
            )
            .unwrap();
        let row = store.fetch("docs.document", "id", &big(1)).unwrap().unwrap();
        assert_eq!(row.get_named::<String>("number").unwrap(), "1/2016");
        assert!(store.fetch("docs.document", "id", &big(2)).unwrap().is_none());
    }

    #[test]
    fn unknown_table_reads_empty() {
        let mut store = MemoryStore::new();
        assert!(store.fetch("nope", "id", &big(1)).unwrap().is_none());
        assert!(store.fetch_by("nope", "id", &big(1)).unwrap().is_empty());
        assert_eq!(store.delete_rows("nope", "id", &[big(1)]).unwrap(), 0);
    }

    #[test]
    fn update_reports_affected_rows() {
        let mut store = MemoryStore::new();
        store
            .insert_rows("t", &["id", "label"], vec![vec![big(1), "a".into()]])
            .unwrap();
        let affected = store
            .update_row("t", "id", &big(1), &["label"], &["b".into()])
            .unwrap();
        assert_eq!(affected, 1);
        let missed = store
            .update_row("t", "id", &big(9), &["label"], &["c".into()])
            .unwrap();
        assert_eq!(missed, 0);
        let row = store.fetch("t", "id", &big(1)).unwrap().unwrap();
        assert_eq!(row.get_named::<String>("label").unwrap(), "b");
    }

    #[test]
    fn update_can_introduce_a_column() {
        let mut store = MemoryStore::new();
        store
            .insert_rows("t", &["id"], vec![vec![big(1)]])
            .unwrap();
        store
            .update_row("t", "id", &big(1), &["basket_id"], &[big(7)])
            .unwrap();
        let rows = store.fetch_by("t", "basket_id", &big(7)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn sequences_reserve_spans() {
        let mut store = MemoryStore::new();
        assert_eq!(store.next_sequence("doc_hilo", 10).unwrap(), 1);
        assert_eq!(store.next_sequence("doc_hilo", 10).unwrap(), 11);
        assert_eq!(store.next_sequence("other", 1).unwrap(), 1);
        assert!(store.next_sequence("other", 0).is_err());
    }

    #[test]
    fn rollback_restores_heap_and_sequences() {
        let mut store = MemoryStore::new();
        store
            .insert_rows("t", &["id"], vec![vec![big(1)]])
            .unwrap();
        store.begin().unwrap();
        store
            .insert_rows("t", &["id"], vec![vec![big(2)]])
            .unwrap();
        store.next_sequence("s", 5).unwrap();
        store.rollback().unwrap();
        assert_eq!(store.table_len("t"), 1);
        assert_eq!(store.next_sequence("s", 1).unwrap(), 1);
    }

    #[test]
    fn commit_keeps_changes() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        store
            .insert_rows("t", &["id"], vec![vec![big(1)]])
            .unwrap();
        store.commit().unwrap();
        assert_eq!(store.table_len("t"), 1);
        assert!(store.commit().is_err());
    }

    #[test]
    fn round_trips_count_calls_not_rows() {
        let mut store = MemoryStore::new();
        let before = store.round_trips();
        store
            .insert_rows(
                "t",
                &["id"],
                (0..100).map(|i| vec![big(i)]).collect(),
            )
            .unwrap();
        assert_eq!(store.round_trips(), before + 1);
    }

    #[test]
    fn clones_share_the_heap() {
        let mut a = MemoryStore::new();
        let mut b = a.clone();
        a.insert_rows("t", &["id"], vec![vec![big(1)]]).unwrap();
        assert!(b.fetch("t", "id", &big(1)).unwrap().is_some());
    }

    #[test]
    fn connect_rejects_foreign_schemes() {
        assert!(MemoryStore::connect(&StoreConfig::new("mem://local")).is_ok());
        assert!(MemoryStore::connect(&StoreConfig::new("postgres://x")).is_err());
    }
}

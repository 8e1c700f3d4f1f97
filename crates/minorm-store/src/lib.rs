//! Storage backend abstraction for the minorm session kernel.
//!
//! The session speaks to storage through the [`Store`] trait: row-level
//! fetches, multi-row inserts, keyed updates and deletes, sequence
//! reservation and transaction boundaries. Every trait call costs exactly one
//! round trip, which is what the batch writer amortizes and the
//! `round_trips()` counter makes observable.

pub mod config;
pub mod memory;

pub use config::StoreConfig;
pub use memory::MemoryStore;

use minorm_core::{Result, Row, Value};

/// A synchronous storage connection.
///
/// All I/O in the kernel funnels through these methods, on explicit load and
/// flush calls only. Implementations are single-connection objects; sharing
/// happens by cloning a backend over common state, never by sharing one
/// handle across sessions.
pub trait Store: Send {
    /// Fetch at most one row by key column. Unknown tables read as empty.
    fn fetch(&mut self, table: &str, key_column: &str, key: &Value) -> Result<Option<Row>>;

    /// Fetch every row whose `column` equals `value`.
    fn fetch_by(&mut self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>>;

    /// Project the key column of every row whose `filter_column` equals
    /// `value`. Used for cascade deletes without materializing children.
    fn select_keys(
        &mut self,
        table: &str,
        key_column: &str,
        filter_column: &str,
        value: &Value,
    ) -> Result<Vec<Value>>;

    /// Insert a batch of rows sharing one column set, in one round trip.
    /// Returns the number of rows inserted.
    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<u64>;

    /// Update the row matching `key`, setting `columns` to `values`.
    /// Returns the number of rows affected; zero means the row is gone.
    fn update_row(
        &mut self,
        table: &str,
        key_column: &str,
        key: &Value,
        columns: &[&str],
        values: &[Value],
    ) -> Result<u64>;

    /// Delete every row whose key is in `keys`, in one round trip.
    /// Returns the number of rows deleted.
    fn delete_rows(&mut self, table: &str, key_column: &str, keys: &[Value]) -> Result<u64>;

    /// Reserve `span` consecutive values from the named sequence and return
    /// the first. Sequences materialize on first use and start at 1.
    fn next_sequence(&mut self, name: &str, span: u64) -> Result<i64>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    /// Total round trips this store has served. Monotonic; diffed by callers
    /// to measure the cost of a window of work.
    fn round_trips(&self) -> u64;
}

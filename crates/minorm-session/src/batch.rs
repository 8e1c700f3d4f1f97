//! Batched statement execution.
//!
//! Consecutive statements of identical shape (same table, same column set)
//! coalesce into one round trip, up to the configured batch size; a shape
//! change or a full batch forces a send. Updates run one row at a time so
//! their affected counts stay checkable.

use minorm_core::{Error, Result, Value};
use minorm_store::Store;

use crate::flush::{FlushPlan, FlushReport, PendingOp};

/// Executes a [`FlushPlan`] against a store, grouping same-shape statements.
#[derive(Debug, Clone, Copy)]
pub struct BatchWriter {
    batch_size: usize,
}

impl BatchWriter {
    /// Zero is rejected up front; a batch must hold at least one statement.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize { requested: 0 });
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize { requested: 0 });
        }
        self.batch_size = batch_size;
        Ok(())
    }

    /// Run the plan in order: inserts, updates, deletes. The first failing
    /// statement aborts the rest; rows already sent stay sent, rollback
    /// belongs to the enclosing transaction.
    pub fn execute<S: Store>(&self, store: &mut S, plan: FlushPlan) -> Result<FlushReport> {
        let mut report = FlushReport::default();
        self.run_inserts(store, plan.inserts, &mut report)?;
        self.run_updates(store, plan.updates, &mut report)?;
        self.run_deletes(store, plan.deletes, &mut report)?;
        Ok(report)
    }

    fn run_inserts(
        &self,
        store: &mut impl Store,
        ops: Vec<PendingOp>,
        report: &mut FlushReport,
    ) -> Result<()> {
        let mut shape: Option<(String, Vec<&'static str>)> = None;
        let mut rows: Vec<Vec<Value>> = Vec::new();

        for op in ops {
            let PendingOp::Insert {
                table,
                columns,
                values,
            } = op
            else {
                continue;
            };
            let same_shape = shape
                .as_ref()
                .is_some_and(|(t, c)| *t == table && *c == columns);
            if !same_shape {
                self.send_batch(store, shape.take(), &mut rows, report)?;
                shape = Some((table, columns));
            } else if rows.len() == self.batch_size {
                let current = shape.clone();
                self.send_batch(store, current, &mut rows, report)?;
            }
            rows.push(values);
        }
        self.send_batch(store, shape, &mut rows, report)
    }

    fn send_batch(
        &self,
        store: &mut impl Store,
        shape: Option<(String, Vec<&'static str>)>,
        rows: &mut Vec<Vec<Value>>,
        report: &mut FlushReport,
    ) -> Result<()> {
        let Some((table, columns)) = shape else {
            return Ok(());
        };
        if rows.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(rows);
        tracing::debug!(table = %table, rows = batch.len(), "sending insert batch");
        report.inserted += store.insert_rows(&table, &columns, batch)?;
        Ok(())
    }

    fn run_updates(
        &self,
        store: &mut impl Store,
        ops: Vec<PendingOp>,
        report: &mut FlushReport,
    ) -> Result<()> {
        for op in ops {
            let PendingOp::Update {
                table,
                key_column,
                key,
                columns,
                values,
            } = op
            else {
                continue;
            };
            let affected = store.update_row(&table, key_column, &key, &columns, &values)?;
            if affected != 1 {
                return Err(Error::StaleState {
                    table,
                    expected: 1,
                    actual: affected,
                });
            }
            report.updated += affected;
        }
        Ok(())
    }

    fn run_deletes(
        &self,
        store: &mut impl Store,
        ops: Vec<PendingOp>,
        report: &mut FlushReport,
    ) -> Result<()> {
        let mut shape: Option<(String, &'static str)> = None;
        let mut keys: Vec<Value> = Vec::new();

        for op in ops {
            let PendingOp::Delete {
                table,
                key_column,
                key,
            } = op
            else {
                continue;
            };
            let same_shape = shape
                .as_ref()
                .is_some_and(|(t, k)| *t == table && *k == key_column);
            if !same_shape {
                Self::send_deletes(store, shape.take(), &mut keys, report)?;
                shape = Some((table, key_column));
            } else if keys.len() == self.batch_size {
                let current = shape.clone();
                Self::send_deletes(store, current, &mut keys, report)?;
            }
            keys.push(key);
        }
        Self::send_deletes(store, shape, &mut keys, report)
    }

    fn send_deletes(
        store: &mut impl Store,
        shape: Option<(String, &'static str)>,
        keys: &mut Vec<Value>,
        report: &mut FlushReport,
    ) -> Result<()> {
        let Some((table, key_column)) = shape else {
            return Ok(());
        };
        if keys.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(keys);
        tracing::debug!(table = %table, keys = batch.len(), "sending delete batch");
        report.deleted += store.delete_rows(&table, key_column, &batch)?;
        Ok(())
    }
}

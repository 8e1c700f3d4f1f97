//! Flush planning: pending operations and dependency ordering.
//!
//! A flush turns the session's tracked state into a [`FlushPlan`]: inserts,
//! then updates, then deletes. Within the insert set parents come before
//! children, within the delete set children before parents, driven by the
//! foreign-key edges declared in the registry.

use std::cmp::Reverse;
use std::collections::HashMap;

use minorm_core::{EntityRegistry, Error, Result, Value};

/// One deferred write, captured with everything needed to execute it.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp {
    Insert {
        table: String,
        columns: Vec<&'static str>,
        values: Vec<Value>,
    },
    Update {
        table: String,
        key_column: &'static str,
        key: Value,
        columns: Vec<&'static str>,
        values: Vec<Value>,
    },
    Delete {
        table: String,
        key_column: &'static str,
        key: Value,
    },
}

impl PendingOp {
    pub fn table(&self) -> &str {
        match self {
            PendingOp::Insert { table, .. }
            | PendingOp::Update { table, .. }
            | PendingOp::Delete { table, .. } => table,
        }
    }
}

/// The ordered write set for one flush.
#[derive(Debug, Default)]
pub struct FlushPlan {
    pub inserts: Vec<PendingOp>,
    pub updates: Vec<PendingOp>,
    pub deletes: Vec<PendingOp>,
}

impl FlushPlan {
    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row counts reported by a completed flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
}

/// Table dependency ranks, computed once per session from the registry.
///
/// A table's rank is one more than the highest rank among the tables it
/// references, either through its own foreign-key fields or as the child
/// side of a declared relation. Rank 0 tables depend on nothing.
#[derive(Debug)]
pub struct FlushOrderer {
    ranks: HashMap<String, usize>,
}

impl FlushOrderer {
    pub fn from_registry(registry: &EntityRegistry) -> Result<Self> {
        let qualify: HashMap<&'static str, String> = registry
            .descriptors()
            .map(|d| (d.table, d.qualified_table()))
            .collect();
        let mut ranks: HashMap<String, usize> =
            qualify.values().map(|table| (table.clone(), 0)).collect();

        // child qualified table -> parent qualified table
        let mut edges: Vec<(String, String)> = Vec::new();
        for descriptor in registry.descriptors() {
            for parent in descriptor.referenced_tables() {
                if let Some(parent_table) = qualify.get(parent) {
                    edges.push((descriptor.qualified_table(), parent_table.clone()));
                }
            }
            for relation in descriptor.relations {
                let child = registry.describe(relation.child_entity)?;
                edges.push((child.qualified_table(), descriptor.qualified_table()));
            }
        }

        // Fixed-point rank propagation; more passes than tables means the
        // edge set contains a cycle.
        let table_count = ranks.len();
        for pass in 0..=table_count {
            let mut changed = false;
            for (child, parent) in &edges {
                let wanted = ranks[parent] + 1;
                if ranks[child] < wanted {
                    ranks.insert(child.clone(), wanted);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            if pass == table_count {
                return Err(Error::Custom(
                    "foreign-key dependency cycle across mapped tables".to_string(),
                ));
            }
        }

        Ok(Self { ranks })
    }

    fn rank_of(&self, table: &str) -> usize {
        self.ranks.get(table).copied().unwrap_or(0)
    }

    /// Partition and order the raw op list into a plan.
    pub fn order(&self, ops: Vec<PendingOp>) -> FlushPlan {
        let mut plan = FlushPlan::default();
        for op in ops {
            match op {
                PendingOp::Insert { .. } => plan.inserts.push(op),
                PendingOp::Update { .. } => plan.updates.push(op),
                PendingOp::Delete { .. } => plan.deletes.push(op),
            }
        }
        plan.inserts
            .sort_by_key(|op| self.rank_of(op.table()));
        plan.deletes
            .sort_by_key(|op| Reverse(self.rank_of(op.table())));
        plan
    }
}

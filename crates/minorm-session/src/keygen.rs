//! Primary-key allocation per descriptor strategy.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use minorm_core::{EntityDescriptor, Error, KeyStrategy, Result, Value};
use minorm_store::Store;

/// One reserved hi-lo block, consumed densely without I/O.
#[derive(Debug, Default)]
struct Block {
    next: i64,
    remaining: u64,
}

/// Session-scoped key source.
///
/// Hi-lo blocks live here, so two sessions never hand out the same id (each
/// reserves its own block from the shared sequence) while saves inside one
/// session cost one round trip per block instead of one per row.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    blocks: HashMap<&'static str, Block>,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next key for `descriptor`, reading `content` only for the
    /// content-derived strategy.
    pub fn next_key<S: Store>(
        &mut self,
        store: &mut S,
        descriptor: &'static EntityDescriptor,
        content: &[(&'static str, Value)],
    ) -> Result<Value> {
        match descriptor.key_strategy {
            KeyStrategy::Native => {
                // Storage-assigned ids, reserved one at a time ahead of the
                // insert so the row image is complete at flush.
                let id = store.next_sequence(&format!("{}_ids", descriptor.qualified_table()), 1)?;
                Ok(Value::BigInt(id))
            }
            KeyStrategy::Sequence { name } => Ok(Value::BigInt(store.next_sequence(name, 1)?)),
            KeyStrategy::HiLo { block_size } => {
                if block_size == 0 {
                    return Err(Error::KeyGeneration {
                        entity: descriptor.entity,
                        message: "hi-lo block size must be at least 1".to_string(),
                    });
                }
                let block = self.blocks.entry(descriptor.entity).or_default();
                if block.remaining == 0 {
                    let first = store.next_sequence(
                        &format!("{}_hilo", descriptor.qualified_table()),
                        block_size,
                    )?;
                    tracing::debug!(
                        entity = descriptor.entity,
                        first,
                        block_size,
                        "reserved hi-lo block"
                    );
                    block.next = first;
                    block.remaining = block_size;
                }
                let id = block.next;
                block.next += 1;
                block.remaining -= 1;
                Ok(Value::BigInt(id))
            }
            KeyStrategy::Assigned => Err(Error::KeyGeneration {
                entity: descriptor.entity,
                message: "client-assigned key was not set before save".to_string(),
            }),
            KeyStrategy::ContentDerived => content_key(descriptor, content),
        }
    }
}

/// Stable 64-bit hash of the non-key column image, masked positive.
fn content_key(
    descriptor: &'static EntityDescriptor,
    content: &[(&'static str, Value)],
) -> Result<Value> {
    let payload: Vec<&(&'static str, Value)> = content
        .iter()
        .filter(|(column, _)| *column != descriptor.key_column)
        .collect();
    let bytes = serde_json::to_vec(&payload)?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Ok(Value::BigInt((hasher.finish() & i64::MAX as u64) as i64))
}

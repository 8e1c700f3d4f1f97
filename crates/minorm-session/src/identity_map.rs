//! Per-session identity map.
//!
//! Guarantees at most one tracked instance per (entity type, primary key)
//! pair. Keys hash the primary-key [`Value`] with a variant tag prefix so
//! `Int(1)` and `Text("1")` never collide.

use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use minorm_core::{Error, Result, Value};

use crate::TrackedEntity;

/// Identity-map key: entity type plus hashed primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    type_id: TypeId,
    key_hash: u64,
}

impl ObjectKey {
    pub fn new(type_id: TypeId, key: &Value) -> Self {
        Self {
            type_id,
            key_hash: hash_key(key),
        }
    }

    pub fn for_entity<E: 'static>(key: &Value) -> Self {
        Self::new(TypeId::of::<E>(), key)
    }
}

/// Hash a primary-key value, tagged by variant.
fn hash_key(key: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    match key {
        Value::Null => 0u8.hash(&mut hasher),
        Value::Bool(b) => {
            1u8.hash(&mut hasher);
            b.hash(&mut hasher);
        }
        Value::Int(i) => {
            2u8.hash(&mut hasher);
            i.hash(&mut hasher);
        }
        Value::BigInt(i) => {
            3u8.hash(&mut hasher);
            i.hash(&mut hasher);
        }
        Value::Double(d) => {
            4u8.hash(&mut hasher);
            d.to_bits().hash(&mut hasher);
        }
        Value::Text(s) => {
            5u8.hash(&mut hasher);
            s.hash(&mut hasher);
        }
        Value::Bytes(b) => {
            6u8.hash(&mut hasher);
            b.hash(&mut hasher);
        }
        Value::Json(j) => {
            7u8.hash(&mut hasher);
            j.to_string().hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// The single live in-memory instance per row, scoped to one session.
#[derive(Default)]
pub struct IdentityMap {
    entries: HashMap<ObjectKey, TrackedEntity>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tracked entity. Fails when the key is already tracked; the
    /// map is left untouched and the session stays usable.
    pub fn attach(&mut self, key: ObjectKey, entry: TrackedEntity) -> Result<()> {
        match self.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => Err(Error::DuplicateIdentity {
                entity: entry.descriptor().entity,
                key: entry.key().clone(),
            }),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, key: &ObjectKey) -> Option<&TrackedEntity> {
        self.entries.get(key)
    }

    pub fn lookup_mut(&mut self, key: &ObjectKey) -> Option<&mut TrackedEntity> {
        self.entries.get_mut(key)
    }

    /// Remove one entry; mutations to a detached instance are never flushed.
    pub fn detach(&mut self, key: &ObjectKey) -> Option<TrackedEntity> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Detach everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectKey, &TrackedEntity)> {
        self.entries.iter()
    }
}

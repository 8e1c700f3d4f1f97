//! Unit-of-work session for minorm.
//!
//! A [`Session`] is one unit of work over a [`Store`]: it tracks loaded, new
//! and removed entities in a per-session identity map, defers every write
//! until [`Session::flush`], and sends the flush plan through a batch writer.
//! Sessions are single-threaded by construction (every operation takes
//! `&mut self`); concurrent callers open independent sessions over clones of
//! the same store.
//!
//! Tracked instances are shared as `Arc<RwLock<E>>` handles, type-erased in
//! the identity map and recovered through per-type fn pointers at flush, so
//! one map serves every mapped type without generics.

pub mod batch;
pub mod flush;
pub mod identity_map;
pub mod keygen;

pub use batch::BatchWriter;
pub use flush::{FlushOrderer, FlushPlan, FlushReport, PendingOp};
pub use identity_map::{IdentityMap, ObjectKey};
pub use keygen::KeyAllocator;

use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use minorm_core::{
    ChildEntity, Entity, EntityDescriptor, EntityRegistry, Error, RelationInfo, Result, Row,
    Value,
};
use minorm_store::Store;

const LOCK_POISONED: &str = "entity lock poisoned";

/// Shared handle to a tracked entity instance.
pub type EntityRef<E> = Arc<RwLock<E>>;

/// Where an instance stands relative to this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// No key assigned yet; unknown to any session
    Transient,
    /// Tracked by this session, written at flush
    Persistent,
    /// Tracked for deletion at flush
    Removed,
    /// Has a key but is not tracked here
    Detached,
}

/// A column snapshot of one entity instance.
#[derive(Debug, Clone)]
pub struct EntityImage {
    pub descriptor: &'static EntityDescriptor,
    pub columns: Vec<&'static str>,
    pub values: Vec<Value>,
    pub key: Value,
}

impl EntityImage {
    pub fn of<E: Entity>(entity: &E) -> Self {
        let (columns, values) = entity.to_row().into_iter().unzip();
        Self {
            descriptor: E::descriptor(),
            columns,
            values,
            key: entity.key(),
        }
    }

    fn value_of(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| &self.values[i])
    }

    /// All columns except the key, for full-row updates.
    fn non_key(&self) -> (Vec<&'static str>, Vec<Value>) {
        let key_column = self.descriptor.key_column;
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (column, value) in self.columns.iter().zip(&self.values) {
            if *column != key_column {
                columns.push(*column);
                values.push(value.clone());
            }
        }
        (columns, values)
    }

    /// Columns whose values differ from `baseline`, key excluded.
    fn changed_since(&self, baseline: &EntityImage) -> (Vec<&'static str>, Vec<Value>) {
        let key_column = self.descriptor.key_column;
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (column, value) in self.columns.iter().zip(&self.values) {
            if *column == key_column {
                continue;
            }
            if baseline.value_of(column) != Some(value) {
                columns.push(*column);
                values.push(value.clone());
            }
        }
        (columns, values)
    }
}

type ImageFn = fn(&(dyn Any + Send + Sync)) -> Option<EntityImage>;
type VisitFn = fn(
    &(dyn Any + Send + Sync),
    &mut dyn FnMut(&'static RelationInfo, &mut dyn ChildEntity),
);

fn image_of<E: Entity>(shared: &(dyn Any + Send + Sync)) -> Option<EntityImage> {
    let handle = shared.downcast_ref::<EntityRef<E>>()?;
    let guard = handle.read().expect(LOCK_POISONED);
    Some(EntityImage::of(&*guard))
}

fn visit_children_of<E: Entity>(
    shared: &(dyn Any + Send + Sync),
    visit: &mut dyn FnMut(&'static RelationInfo, &mut dyn ChildEntity),
) {
    if let Some(handle) = shared.downcast_ref::<EntityRef<E>>() {
        handle.write().expect(LOCK_POISONED).visit_children(visit);
    }
}

/// One tracked instance: the shared handle, its state, and the baselines
/// dirty detection and orphan detection compare against.
pub struct TrackedEntity {
    shared: Box<dyn Any + Send + Sync>,
    descriptor: &'static EntityDescriptor,
    state: EntityState,
    key: Value,
    baseline: Option<EntityImage>,
    baseline_children: Vec<(&'static str, Vec<Value>)>,
    force_update: bool,
    image_fn: ImageFn,
    visit_fn: VisitFn,
}

impl TrackedEntity {
    pub fn new<E: Entity>(handle: EntityRef<E>, state: EntityState, key: Value) -> Self {
        Self {
            shared: Box::new(handle),
            descriptor: E::descriptor(),
            state,
            key,
            baseline: None,
            baseline_children: Vec::new(),
            force_update: false,
            image_fn: image_of::<E>,
            visit_fn: visit_children_of::<E>,
        }
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Typed clone of the shared handle, `None` on a type mismatch.
    pub fn handle<E: Entity>(&self) -> Option<EntityRef<E>> {
        self.shared.downcast_ref::<EntityRef<E>>().cloned()
    }

    fn image(&self) -> Result<EntityImage> {
        (self.image_fn)(self.shared.as_ref()).ok_or_else(|| {
            Error::Custom(format!(
                "tracked instance for {} is of a different type",
                self.descriptor.entity
            ))
        })
    }

    fn visit_children(
        &self,
        visit: &mut dyn FnMut(&'static RelationInfo, &mut dyn ChildEntity),
    ) {
        (self.visit_fn)(self.shared.as_ref(), visit);
    }

    fn baseline_child_keys(&self, field: &str) -> &[Value] {
        self.baseline_children
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(&[], |(_, keys)| keys.as_slice())
    }
}

/// Session tunables.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Statements of one shape grouped per round trip.
    pub batch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { batch_size: 1 }
    }
}

/// Counters exposed for tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatistics {
    /// Entities currently tracked, removals included until flush.
    pub entity_count: usize,
}

/// An identity-mapped unit of work over one store connection.
pub struct Session<S: Store> {
    store: S,
    registry: Arc<EntityRegistry>,
    entities: IdentityMap,
    pending_new: Vec<ObjectKey>,
    pending_delete: Vec<ObjectKey>,
    keys: KeyAllocator,
    writer: BatchWriter,
    orderer: FlushOrderer,
}

impl<S: Store> Session<S> {
    pub fn open(store: S, registry: Arc<EntityRegistry>) -> Result<Self> {
        Self::open_with(store, registry, SessionConfig::default())
    }

    pub fn open_with(
        store: S,
        registry: Arc<EntityRegistry>,
        config: SessionConfig,
    ) -> Result<Self> {
        let writer = BatchWriter::new(config.batch_size)?;
        let orderer = FlushOrderer::from_registry(&registry)?;
        Ok(Self {
            store,
            registry,
            entities: IdentityMap::new(),
            pending_new: Vec::new(),
            pending_delete: Vec::new(),
            keys: KeyAllocator::new(),
            writer,
            orderer,
        })
    }

    /// Assign a key per the descriptor's strategy, mark the instance
    /// Persistent and queue its insert. New children of cascading relations
    /// get keys here too, so hi-lo ids stay dense across a parent and its
    /// collection.
    pub fn save<E: Entity + Clone>(&mut self, entity: &mut E) -> Result<Value> {
        let descriptor = self.registry.describe_entity::<E>()?;
        if entity.is_new() {
            let row = entity.to_row();
            let key = self.keys.next_key(&mut self.store, descriptor, &row)?;
            entity.set_key(key);
        }
        let key = entity.key();
        let okey = ObjectKey::for_entity::<E>(&key);
        if self.entities.contains(&okey) {
            return Err(Error::DuplicateIdentity {
                entity: descriptor.entity,
                key,
            });
        }

        {
            let Session {
                store,
                registry,
                keys,
                ..
            } = self;
            let mut walk_err: Option<Error> = None;
            entity.visit_children(&mut |relation, child| {
                if walk_err.is_some() || !relation.cascade.includes_save() || !child.is_new() {
                    return;
                }
                match registry
                    .describe(relation.child_entity)
                    .and_then(|d| keys.next_key(store, d, &child.row()))
                {
                    Ok(child_key) => child.set_key(child_key),
                    Err(err) => walk_err = Some(err),
                }
            });
            if let Some(err) = walk_err {
                return Err(err);
            }
        }

        let handle: EntityRef<E> = Arc::new(RwLock::new(entity.clone()));
        let entry = TrackedEntity::new::<E>(handle, EntityState::Persistent, key.clone());
        self.entities.attach(okey, entry)?;
        self.pending_new.push(okey);
        tracing::debug!(entity = descriptor.entity, key = ?key, "queued insert");
        Ok(key)
    }

    /// Save a transient instance, update a detached one.
    pub fn save_or_update<E: Entity + Clone>(&mut self, entity: &mut E) -> Result<()> {
        if entity.is_new() {
            self.save(entity).map(|_| ())
        } else {
            self.update(entity)
        }
    }

    /// Load by key, going to the store only when the key is not already
    /// tracked. Tracked instances come back as the identical handle. Mapped
    /// child collections load eagerly in the same call.
    pub fn get<E: Entity>(&mut self, key: &Value) -> Result<Option<EntityRef<E>>> {
        let descriptor = self.registry.describe_entity::<E>()?;
        if key.is_null() {
            return Ok(None);
        }
        let okey = ObjectKey::for_entity::<E>(key);
        if let Some(entry) = self.entities.lookup(&okey) {
            if entry.state == EntityState::Removed {
                return Ok(None);
            }
            return self.tracked_handle::<E>(&okey, descriptor).map(Some);
        }

        let table = descriptor.qualified_table();
        let Some(row) = self.store.fetch(&table, descriptor.key_column, key)? else {
            return Ok(None);
        };
        let loaded = self.load_instance::<E>(descriptor, &row, key)?;
        tracing::debug!(entity = descriptor.entity, key = ?key, "loaded");
        let handle = self.attach_loaded(okey, loaded, key.clone())?;
        Ok(Some(handle))
    }

    /// Attach a detached instance for an unconditional update at flush. The
    /// row is written even when it no longer exists; zero affected rows then
    /// surfaces as a stale-state error.
    pub fn update<E: Entity + Clone>(&mut self, entity: &E) -> Result<()> {
        let descriptor = self.registry.describe_entity::<E>()?;
        let key = entity.key();
        if key.is_null() {
            return Err(Error::Custom(format!(
                "cannot update transient {} instance; save it instead",
                descriptor.entity
            )));
        }
        let okey = ObjectKey::for_entity::<E>(&key);
        if self.entities.contains(&okey) {
            return Err(Error::NonUniqueIdentity {
                entity: descriptor.entity,
                key,
            });
        }
        let mut copy = entity.clone();
        let mut membership: Vec<(&'static str, Vec<Value>)> = Vec::new();
        copy.visit_children(&mut |relation, child| {
            record_membership(&mut membership, relation.field, child.key());
        });
        let handle: EntityRef<E> = Arc::new(RwLock::new(copy));
        let mut entry = TrackedEntity::new::<E>(handle, EntityState::Persistent, key.clone());
        entry.force_update = true;
        entry.baseline_children = membership;
        self.entities.attach(okey, entry)?;
        tracing::debug!(entity = descriptor.entity, key = ?key, "queued update");
        Ok(())
    }

    /// Copy a detached instance's values onto the tracked one, returning the
    /// tracked handle; the argument is left untouched. An untracked key is
    /// loaded first when its row exists, and becomes a fresh insert when it
    /// does not.
    pub fn merge<E: Entity + Clone>(&mut self, entity: &E) -> Result<EntityRef<E>> {
        let descriptor = self.registry.describe_entity::<E>()?;
        let key = entity.key();
        if key.is_null() {
            let mut copy = entity.clone();
            let key = self.save(&mut copy)?;
            let okey = ObjectKey::for_entity::<E>(&key);
            return self.tracked_handle::<E>(&okey, descriptor);
        }
        let okey = ObjectKey::for_entity::<E>(&key);
        if self.entities.contains(&okey) {
            let handle = self.tracked_handle::<E>(&okey, descriptor)?;
            *handle.write().expect(LOCK_POISONED) = entity.clone();
            return Ok(handle);
        }
        match self
            .store
            .fetch(&descriptor.qualified_table(), descriptor.key_column, &key)?
        {
            Some(row) => {
                // children load exactly as on get, so the baseline child
                // sets reflect what is already stored
                let loaded = self.load_instance::<E>(descriptor, &row, &key)?;
                let handle = self.attach_loaded(okey, loaded, key.clone())?;
                *handle.write().expect(LOCK_POISONED) = entity.clone();
                tracing::debug!(entity = descriptor.entity, key = ?key, "merged onto loaded row");
                Ok(handle)
            }
            None => {
                // The key denotes no stored row: the instance comes back as
                // a new insert keeping its assigned key.
                let handle: EntityRef<E> = Arc::new(RwLock::new(entity.clone()));
                let entry =
                    TrackedEntity::new::<E>(handle.clone(), EntityState::Persistent, key.clone());
                self.entities.attach(okey, entry)?;
                self.pending_new.push(okey);
                tracing::debug!(entity = descriptor.entity, key = ?key, "merged as insert");
                Ok(handle)
            }
        }
    }

    /// Mark Removed and queue the delete. Cascading relations delete their
    /// children at flush, orphan rows included.
    pub fn delete<E: Entity + Clone>(&mut self, entity: &E) -> Result<()> {
        let descriptor = self.registry.describe_entity::<E>()?;
        let key = entity.key();
        if key.is_null() {
            return Err(Error::Custom(format!(
                "cannot delete transient {} instance",
                descriptor.entity
            )));
        }
        let okey = ObjectKey::for_entity::<E>(&key);
        if self.pending_new.contains(&okey) {
            // never flushed: forget the insert instead of writing a delete
            self.pending_new.retain(|k| *k != okey);
            self.entities.detach(&okey);
            return Ok(());
        }
        if let Some(entry) = self.entities.lookup_mut(&okey) {
            if entry.state == EntityState::Removed {
                return Ok(());
            }
            entry.state = EntityState::Removed;
        } else {
            let mut copy = entity.clone();
            let mut membership: Vec<(&'static str, Vec<Value>)> = Vec::new();
            copy.visit_children(&mut |relation, child| {
                record_membership(&mut membership, relation.field, child.key());
            });
            let handle = Arc::new(RwLock::new(copy));
            let mut entry = TrackedEntity::new::<E>(handle, EntityState::Removed, key.clone());
            entry.baseline_children = membership;
            self.entities.attach(okey, entry)?;
        }
        self.pending_delete.push(okey);
        tracing::debug!(entity = descriptor.entity, key = ?key, "queued delete");
        Ok(())
    }

    /// Detach one instance; later mutations to it are never flushed.
    pub fn evict<E: Entity>(&mut self, entity: &E) {
        let key = entity.key();
        if key.is_null() {
            return;
        }
        let okey = ObjectKey::for_entity::<E>(&key);
        self.entities.detach(&okey);
        self.pending_new.retain(|k| *k != okey);
        self.pending_delete.retain(|k| *k != okey);
    }

    /// Is this instance's key tracked here as Persistent?
    pub fn contains<E: Entity>(&self, entity: &E) -> bool {
        let key = entity.key();
        if key.is_null() {
            return false;
        }
        self.entities
            .lookup(&ObjectKey::for_entity::<E>(&key))
            .is_some_and(|entry| entry.state == EntityState::Persistent)
    }

    pub fn state_of<E: Entity>(&self, entity: &E) -> EntityState {
        let key = entity.key();
        if key.is_null() {
            return EntityState::Transient;
        }
        self.entities
            .lookup(&ObjectKey::for_entity::<E>(&key))
            .map_or(EntityState::Detached, TrackedEntity::state)
    }

    /// Detach everything and drop all pending operations.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_new.clear();
        self.pending_delete.clear();
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics {
            entity_count: self.entities.len(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.writer.batch_size()
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        self.writer.set_batch_size(batch_size)
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.store.begin()
    }

    /// Commit the enclosing transaction. Does not flush; pending changes not
    /// flushed before commit are simply still pending.
    pub fn commit(&mut self) -> Result<()> {
        self.store.commit()
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.store.rollback()
    }

    /// Round trips served by the underlying store so far.
    pub fn round_trips(&self) -> u64 {
        self.store.round_trips()
    }

    /// Release the underlying store connection.
    pub fn close(self) -> S {
        self.store
    }

    /// Compute the ordered write set and send it through the batch writer.
    ///
    /// Inserts run first (parents before children), then updates for forced
    /// and dirty entries, then deletes (children before parents). The first
    /// failing statement aborts the rest; whatever already reached the store
    /// stays there until the enclosing transaction decides.
    pub fn flush(&mut self) -> Result<FlushReport> {
        let mut ops: Vec<PendingOp> = Vec::new();
        let mut refresh: Vec<(ObjectKey, EntityImage, Vec<(&'static str, Vec<Value>)>)> =
            Vec::new();
        let mut dropped: Vec<ObjectKey> = Vec::new();

        {
            let Session {
                store,
                registry,
                entities,
                pending_new,
                pending_delete,
                keys,
                ..
            } = self;

            let pending_inserts: HashSet<ObjectKey> = pending_new.iter().copied().collect();
            for (okey, entry) in entities.iter() {
                if entry.state != EntityState::Persistent {
                    continue;
                }
                let image = entry.image()?;
                let table = entry.descriptor.qualified_table();
                if pending_inserts.contains(okey) {
                    ops.push(PendingOp::Insert {
                        table: table.clone(),
                        columns: image.columns.clone(),
                        values: image.values.clone(),
                    });
                } else if entry.force_update {
                    let (columns, values) = image.non_key();
                    ops.push(PendingOp::Update {
                        table: table.clone(),
                        key_column: entry.descriptor.key_column,
                        key: entry.key.clone(),
                        columns,
                        values,
                    });
                } else if let Some(baseline) = &entry.baseline {
                    let (columns, values) = image.changed_since(baseline);
                    if !columns.is_empty() {
                        ops.push(PendingOp::Update {
                            table: table.clone(),
                            key_column: entry.descriptor.key_column,
                            key: entry.key.clone(),
                            columns,
                            values,
                        });
                    }
                }

                let parent_key = entry.key.clone();
                let mut membership: Vec<(&'static str, Vec<Value>)> = Vec::new();
                let mut walk_err: Option<Error> = None;
                entry.visit_children(&mut |relation, child| {
                    if walk_err.is_some() {
                        return;
                    }
                    if relation.cascade.includes_save() && child.is_new() {
                        match registry
                            .describe(relation.child_entity)
                            .and_then(|d| keys.next_key(store, d, &child.row()))
                        {
                            Ok(child_key) => child.set_key(child_key),
                            Err(err) => {
                                walk_err = Some(err);
                                return;
                            }
                        }
                    }
                    let child_key = child.key();
                    if relation.cascade.includes_save()
                        && !entry.baseline_child_keys(relation.field).contains(&child_key)
                    {
                        let mut pairs = child.row();
                        if !relation.inverse {
                            // non-inverse: the parent is the write authority
                            // and injects the foreign key into the child row
                            set_column(&mut pairs, relation.fk_column, parent_key.clone());
                        }
                        let child_descriptor = child.descriptor();
                        let (columns, values) = pairs.into_iter().unzip();
                        ops.push(PendingOp::Insert {
                            table: child_descriptor.qualified_table(),
                            columns,
                            values,
                        });
                    }
                    record_membership(&mut membership, relation.field, child_key);
                });
                if let Some(err) = walk_err {
                    return Err(err);
                }

                for relation in entry.descriptor.relations {
                    if !relation.cascade.deletes_orphans() {
                        continue;
                    }
                    let current = membership
                        .iter()
                        .find(|(f, _)| *f == relation.field)
                        .map_or(&[][..], |(_, k)| k.as_slice());
                    let child_descriptor = registry.describe(relation.child_entity)?;
                    for orphan in entry.baseline_child_keys(relation.field) {
                        // a null baseline key was a new child at attach time,
                        // never a stored row
                        if orphan.is_null() {
                            continue;
                        }
                        if !current.contains(orphan) {
                            ops.push(PendingOp::Delete {
                                table: child_descriptor.qualified_table(),
                                key_column: child_descriptor.key_column,
                                key: orphan.clone(),
                            });
                        }
                    }
                }

                refresh.push((*okey, image, membership));
            }

            for okey in pending_delete.iter() {
                let Some(entry) = entities.lookup(okey) else {
                    continue;
                };
                for relation in entry.descriptor.relations {
                    if !relation.cascade.includes_delete() {
                        continue;
                    }
                    let child_descriptor = registry.describe(relation.child_entity)?;
                    let mut child_keys = store.select_keys(
                        &child_descriptor.qualified_table(),
                        child_descriptor.key_column,
                        relation.fk_column,
                        &entry.key,
                    )?;
                    for known in entry.baseline_child_keys(relation.field) {
                        if !child_keys.contains(known) {
                            child_keys.push(known.clone());
                        }
                    }
                    for child_key in child_keys {
                        if child_key.is_null() {
                            continue;
                        }
                        ops.push(PendingOp::Delete {
                            table: child_descriptor.qualified_table(),
                            key_column: child_descriptor.key_column,
                            key: child_key,
                        });
                    }
                }
                ops.push(PendingOp::Delete {
                    table: entry.descriptor.qualified_table(),
                    key_column: entry.descriptor.key_column,
                    key: entry.key.clone(),
                });
                dropped.push(*okey);
            }
        }

        let plan = self.orderer.order(ops);
        tracing::debug!(
            inserts = plan.inserts.len(),
            updates = plan.updates.len(),
            deletes = plan.deletes.len(),
            "flushing session"
        );
        let report = self.writer.execute(&mut self.store, plan)?;

        for (okey, image, membership) in refresh {
            if let Some(entry) = self.entities.lookup_mut(&okey) {
                entry.baseline = Some(image);
                entry.baseline_children = membership;
                entry.force_update = false;
            }
        }
        for okey in dropped {
            self.entities.detach(&okey);
        }
        self.pending_new.clear();
        self.pending_delete.clear();
        Ok(report)
    }

    /// Rebuild an instance from its stored row, child collections included.
    fn load_instance<E: Entity>(
        &mut self,
        descriptor: &'static EntityDescriptor,
        row: &Row,
        key: &Value,
    ) -> Result<E> {
        let mut loaded = E::from_row(row)?;
        for relation in descriptor.relations {
            let child_descriptor = self.registry.describe(relation.child_entity)?;
            let rows =
                self.store
                    .fetch_by(&child_descriptor.qualified_table(), relation.fk_column, key)?;
            loaded.load_children(relation, &rows)?;
        }
        Ok(loaded)
    }

    fn attach_loaded<E: Entity>(
        &mut self,
        okey: ObjectKey,
        mut loaded: E,
        key: Value,
    ) -> Result<EntityRef<E>> {
        let baseline = EntityImage::of(&loaded);
        let mut membership: Vec<(&'static str, Vec<Value>)> = Vec::new();
        loaded.visit_children(&mut |relation, child| {
            record_membership(&mut membership, relation.field, child.key());
        });
        let handle: EntityRef<E> = Arc::new(RwLock::new(loaded));
        let mut entry = TrackedEntity::new::<E>(handle.clone(), EntityState::Persistent, key);
        entry.baseline = Some(baseline);
        entry.baseline_children = membership;
        self.entities.attach(okey, entry)?;
        Ok(handle)
    }

    fn tracked_handle<E: Entity>(
        &self,
        okey: &ObjectKey,
        descriptor: &'static EntityDescriptor,
    ) -> Result<EntityRef<E>> {
        self.entities
            .lookup(okey)
            .and_then(TrackedEntity::handle::<E>)
            .ok_or_else(|| {
                Error::Custom(format!(
                    "tracked instance for {} is of a different type",
                    descriptor.entity
                ))
            })
    }
}

fn record_membership(
    membership: &mut Vec<(&'static str, Vec<Value>)>,
    field: &'static str,
    key: Value,
) {
    match membership.iter_mut().find(|(f, _)| *f == field) {
        Some((_, keys)) => keys.push(key),
        None => membership.push((field, vec![key])),
    }
}

fn set_column(pairs: &mut Vec<(&'static str, Value)>, column: &'static str, value: Value) {
    match pairs.iter_mut().find(|(c, _)| *c == column) {
        Some((_, slot)) => *slot = value,
        None => pairs.push((column, value)),
    }
}

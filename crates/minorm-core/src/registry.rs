//! The entity registry: declarative type-to-table mapping, built once.

use std::collections::HashMap;

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::field::FieldInfo;
use crate::relation::RelationInfo;

/// How primary keys are produced for an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The storage side assigns the key; reserved one at a time.
    Native,
    /// One round trip per key against a named sequence.
    Sequence { name: &'static str },
    /// A block of ids is reserved in one round trip and handed out densely.
    HiLo { block_size: u64 },
    /// The caller assigns the key before save.
    Assigned,
    /// A stable hash of the column image; no round trip.
    ContentDerived,
}

/// Static persistence metadata for one entity type.
///
/// Built with const builders into a `static`, immutable thereafter.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    /// Entity type name, the registry lookup key
    pub entity: &'static str,
    /// Unqualified table name
    pub table: &'static str,
    /// Optional schema prefix
    pub schema: Option<&'static str>,
    /// The single key column
    pub key_column: &'static str,
    pub key_strategy: KeyStrategy,
    /// Mapped columns in declaration order, key column first
    pub fields: &'static [FieldInfo],
    /// Owned child collections
    pub relations: &'static [RelationInfo],
}

impl EntityDescriptor {
    pub const fn new(entity: &'static str, table: &'static str) -> Self {
        Self {
            entity,
            table,
            schema: None,
            key_column: "id",
            key_strategy: KeyStrategy::Native,
            fields: &[],
            relations: &[],
        }
    }

    pub const fn schema(mut self, schema: &'static str) -> Self {
        self.schema = Some(schema);
        self
    }

    pub const fn key_column(mut self, column: &'static str) -> Self {
        self.key_column = column;
        self
    }

    pub const fn key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    pub const fn fields(mut self, fields: &'static [FieldInfo]) -> Self {
        self.fields = fields;
        self
    }

    pub const fn relations(mut self, relations: &'static [RelationInfo]) -> Self {
        self.relations = relations;
        self
    }

    /// Schema-qualified table name, as statements address it.
    pub fn qualified_table(&self) -> String {
        match self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.to_string(),
        }
    }

    /// Parent tables this type's rows reference through foreign-key fields.
    pub fn referenced_tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(FieldInfo::referenced_table)
    }
}

/// Immutable lookup from entity type name to its descriptor.
///
/// Registration happens once through [`RegistryBuilder`]; there is no runtime
/// mutation.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    by_name: HashMap<&'static str, &'static EntityDescriptor>,
}

impl EntityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up the descriptor for a type name.
    pub fn describe(&self, type_name: &str) -> Result<&'static EntityDescriptor> {
        self.by_name
            .get(type_name)
            .copied()
            .ok_or_else(|| Error::UnmappedType {
                type_name: type_name.to_string(),
            })
    }

    /// Look up the descriptor for a mapped type, verifying it was registered.
    pub fn describe_entity<E: Entity>(&self) -> Result<&'static EntityDescriptor> {
        self.describe(E::descriptor().entity)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static EntityDescriptor> + '_ {
        self.by_name.values().copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Consumed once at startup to produce an [`EntityRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    by_name: HashMap<&'static str, &'static EntityDescriptor>,
}

impl RegistryBuilder {
    /// Register a mapped type. Re-registering the same name keeps the last
    /// descriptor, like redefining a mapping.
    pub fn register<E: Entity>(mut self) -> Self {
        let descriptor = E::descriptor();
        self.by_name.insert(descriptor.entity, descriptor);
        self
    }

    pub fn build(self) -> EntityRegistry {
        EntityRegistry {
            by_name: self.by_name,
        }
    }
}

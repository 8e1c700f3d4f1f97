//! The `Entity` trait: what a mapped type must provide.

use crate::error::Result;
use crate::registry::EntityDescriptor;
use crate::relation::RelationInfo;
use crate::row::Row;
use crate::value::Value;

/// A persistable entity type.
///
/// Implementations are hand-written alongside a `static` [`EntityDescriptor`]
/// declaring the mapping. The kernel identifies a row by a single key column;
/// composite keys are out of scope.
pub trait Entity: Sized + Send + Sync + 'static {
    /// The static mapping for this type.
    fn descriptor() -> &'static EntityDescriptor;

    /// Current column image as (column, value) pairs, key column included,
    /// in the descriptor's field order.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Rebuild an instance from a stored row. Extra columns in the row are
    /// ignored; child collections start empty and are filled by
    /// [`Entity::load_children`].
    fn from_row(row: &Row) -> Result<Self>;

    /// Current primary key, `Value::Null` while unassigned.
    fn key(&self) -> Value;

    /// Store a generated primary key back on the instance.
    fn set_key(&mut self, key: Value);

    /// A transient instance has no key yet.
    fn is_new(&self) -> bool {
        self.key().is_null()
    }

    /// Walk owned child collections, yielding each child once per relation.
    /// Types without relations keep the default no-op.
    fn visit_children(
        &mut self,
        _visit: &mut dyn FnMut(&'static RelationInfo, &mut dyn ChildEntity),
    ) {
    }

    /// Populate one child collection from its stored rows.
    fn load_children(&mut self, _relation: &'static RelationInfo, _rows: &[Row]) -> Result<()> {
        Ok(())
    }
}

/// Object-safe view of a child instance during a cascade walk.
///
/// Blanket-implemented for every [`Entity`]; parents yield `&mut dyn
/// ChildEntity` so the session can assign keys and build insert images
/// without knowing the child type.
pub trait ChildEntity {
    fn descriptor(&self) -> &'static EntityDescriptor;
    fn row(&self) -> Vec<(&'static str, Value)>;
    fn key(&self) -> Value;
    fn set_key(&mut self, key: Value);
    fn is_new(&self) -> bool;
}

impl<E: Entity> ChildEntity for E {
    fn descriptor(&self) -> &'static EntityDescriptor {
        E::descriptor()
    }

    fn row(&self) -> Vec<(&'static str, Value)> {
        self.to_row()
    }

    fn key(&self) -> Value {
        Entity::key(self)
    }

    fn set_key(&mut self, key: Value) {
        Entity::set_key(self, key);
    }

    fn is_new(&self) -> bool {
        Entity::is_new(self)
    }
}

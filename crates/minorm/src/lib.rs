//! minorm: a minimal ORM session kernel.
//!
//! An identity-mapped unit-of-work session over a pluggable relational
//! store, with deferred writes, merge/update conflict rules, cascade delete
//! and orphan removal, inverse collections, pluggable key generation and
//! batched inserts.
//!
//! ```
//! use minorm::{
//!     Entity, EntityDescriptor, EntityRegistry, FieldInfo, KeyStrategy, MemoryStore, Row,
//!     SessionFactory, SqlType, Value,
//! };
//!
//! static DOCUMENT: EntityDescriptor = EntityDescriptor::new("Document", "document")
//!     .key_strategy(KeyStrategy::HiLo { block_size: 32 })
//!     .fields(&[
//!         FieldInfo::new("id", SqlType::BigInt).primary_key(),
//!         FieldInfo::new("number", SqlType::Text),
//!     ]);
//!
//! #[derive(Clone)]
//! struct Document {
//!     id: Option<i64>,
//!     number: String,
//! }
//!
//! impl Entity for Document {
//!     fn descriptor() -> &'static EntityDescriptor {
//!         &DOCUMENT
//!     }
//!     fn to_row(&self) -> Vec<(&'static str, Value)> {
//!         vec![("id", self.id.into()), ("number", self.number.clone().into())]
//!     }
//!     fn from_row(row: &Row) -> minorm::Result<Self> {
//!         Ok(Self {
//!             id: row.get_named("id")?,
//!             number: row.get_named("number")?,
//!         })
//!     }
//!     fn key(&self) -> Value {
//!         self.id.into()
//!     }
//!     fn set_key(&mut self, key: Value) {
//!         self.id = key.as_i64();
//!     }
//! }
//!
//! # fn main() -> minorm::Result<()> {
//! let registry = EntityRegistry::builder().register::<Document>().build();
//! let factory = SessionFactory::new(MemoryStore::new(), registry);
//!
//! let mut session = factory.open_session()?;
//! let mut doc = Document { id: None, number: "1/2016".to_string() };
//! let key = session.save(&mut doc)?;
//! session.flush()?;
//!
//! let mut other = factory.open_session()?;
//! let loaded = other.get::<Document>(&key)?.expect("stored row");
//! assert_eq!(loaded.read().unwrap().number, "1/2016");
//! # Ok(())
//! # }
//! ```

pub mod factory;

pub use factory::SessionFactory;
pub use minorm_core::{
    Cascade, ChildEntity, ColumnInfo, ConfigError, Entity, EntityDescriptor, EntityRegistry,
    Error, FieldInfo, FromValue, KeyStrategy, RegistryBuilder, RelationInfo, Result, Row,
    SqlType, StoreError, StoreErrorKind, TypeError, Value,
};
pub use minorm_session::{
    BatchWriter, EntityRef, EntityState, FlushReport, IdentityMap, ObjectKey, Session,
    SessionConfig, SessionStatistics,
};
pub use minorm_store::{MemoryStore, Store, StoreConfig};

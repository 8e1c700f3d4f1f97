//! Core types and traits for the minorm session kernel.
//!
//! This crate provides the foundational abstractions the session builds on:
//!
//! - `Entity` trait for hand-mapped struct persistence
//! - `EntityDescriptor` / `EntityRegistry` for declarative mapping metadata
//! - `Value` and `Row` for dynamically-typed column data
//! - `RelationInfo` / `Cascade` for owned child collections
//! - the `Error` enum shared by every crate in the workspace

pub mod entity;
pub mod error;
pub mod field;
pub mod registry;
pub mod relation;
pub mod row;
pub mod value;

pub use entity::{ChildEntity, Entity};
pub use error::{ConfigError, Error, Result, StoreError, StoreErrorKind, TypeError};
pub use field::{FieldInfo, SqlType};
pub use registry::{EntityDescriptor, EntityRegistry, KeyStrategy, RegistryBuilder};
pub use relation::{Cascade, RelationInfo};
pub use row::{ColumnInfo, FromValue, Row};
pub use value::Value;

//! Field metadata declared once per entity type.

/// SQL column types the kernel's mappings describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Text,
    Blob,
}

impl SqlType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

/// Static description of one mapped column.
///
/// Declared as `static` data via the const builders, never mutated at
/// runtime.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub column: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Reference to a parent column as `"table.column"`, when this field is a
    /// foreign key.
    pub foreign_key: Option<&'static str>,
}

impl FieldInfo {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            column: name,
            sql_type,
            nullable: false,
            primary_key: false,
            foreign_key: None,
        }
    }

    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn foreign_key(mut self, reference: &'static str) -> Self {
        self.foreign_key = Some(reference);
        self
    }

    /// The referenced parent table, when this field is a foreign key.
    pub fn referenced_table(&self) -> Option<&'static str> {
        self.foreign_key.and_then(|fk| fk.split('.').next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_builders_compose() {
        const F: FieldInfo = FieldInfo::new("library_id", SqlType::BigInt)
            .nullable()
            .foreign_key("library.id");
        assert_eq!(F.column, "library_id");
        assert!(F.nullable);
        assert_eq!(F.referenced_table(), Some("library"));
    }

    #[test]
    fn plain_field_has_no_reference() {
        const F: FieldInfo = FieldInfo::new("number", SqlType::Text);
        assert_eq!(F.referenced_table(), None);
        assert!(!F.primary_key);
    }
}

//! Shared fixtures: the mapped entity types the integration suites exercise.
#![allow(dead_code)]

use minorm::{
    Cascade, Entity, EntityDescriptor, EntityRegistry, FieldInfo, KeyStrategy, MemoryStore,
    RelationInfo, Result, Row, SessionFactory, SqlType, Value,
};

pub static DOCUMENT: EntityDescriptor = EntityDescriptor::new("Document", "document")
    .schema("docs")
    .key_strategy(KeyStrategy::HiLo { block_size: 32 })
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("number", SqlType::Text),
    ]);

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Option<i64>,
    pub number: String,
}

impl Document {
    pub fn numbered(number: &str) -> Self {
        Self {
            id: None,
            number: number.to_string(),
        }
    }
}

impl Entity for Document {
    fn descriptor() -> &'static EntityDescriptor {
        &DOCUMENT
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("number", self.number.clone().into())]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            number: row.get_named("number")?,
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }
}

pub static CONTRACTOR: EntityDescriptor = EntityDescriptor::new("Contractor", "contractor")
    .key_strategy(KeyStrategy::Native)
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("name", SqlType::Text),
    ]);

#[derive(Debug, Clone)]
pub struct Contractor {
    pub id: Option<i64>,
    pub name: String,
}

impl Entity for Contractor {
    fn descriptor() -> &'static EntityDescriptor {
        &CONTRACTOR
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("name", self.name.clone().into())]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            name: row.get_named("name")?,
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }
}

pub static ANALYTIC: EntityDescriptor = EntityDescriptor::new("Analytic", "analytic")
    .schema("analytics")
    .key_strategy(KeyStrategy::ContentDerived)
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("dim", SqlType::Text),
        FieldInfo::new("val", SqlType::Text),
    ]);

#[derive(Debug, Clone)]
pub struct Analytic {
    pub id: Option<i64>,
    pub dim: String,
    pub val: String,
}

impl Entity for Analytic {
    fn descriptor() -> &'static EntityDescriptor {
        &ANALYTIC
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("dim", self.dim.clone().into()),
            ("val", self.val.clone().into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            dim: row.get_named("dim")?,
            val: row.get_named("val")?,
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }
}

// Basket owns its apples through a non-inverse collection: the basket is the
// write authority and injects basket_id into each apple row. Apples have no
// back-reference of their own.

static BASKET_RELATIONS: [RelationInfo; 1] = [RelationInfo::new("apples", "Apple", "basket_id")
    .cascade(Cascade::AllDeleteOrphan)];

pub static BASKET: EntityDescriptor = EntityDescriptor::new("Basket", "basket")
    .schema("baskets")
    .key_strategy(KeyStrategy::HiLo { block_size: 10 })
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("label", SqlType::Text),
    ])
    .relations(&BASKET_RELATIONS);

pub static APPLE: EntityDescriptor = EntityDescriptor::new("Apple", "apple")
    .schema("baskets")
    .key_strategy(KeyStrategy::HiLo { block_size: 10 })
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("variety", SqlType::Text),
    ]);

#[derive(Debug, Clone)]
pub struct Apple {
    pub id: Option<i64>,
    pub variety: String,
}

impl Apple {
    pub fn of(variety: &str) -> Self {
        Self {
            id: None,
            variety: variety.to_string(),
        }
    }
}

impl Entity for Apple {
    fn descriptor() -> &'static EntityDescriptor {
        &APPLE
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("variety", self.variety.clone().into())]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            variety: row.get_named("variety")?,
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }
}

#[derive(Debug, Clone)]
pub struct Basket {
    pub id: Option<i64>,
    pub label: String,
    pub apples: Vec<Apple>,
}

impl Basket {
    pub fn labeled(label: &str) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            apples: Vec::new(),
        }
    }
}

impl Entity for Basket {
    fn descriptor() -> &'static EntityDescriptor {
        &BASKET
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("label", self.label.clone().into())]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            label: row.get_named("label")?,
            apples: Vec::new(),
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }

    fn visit_children(
        &mut self,
        visit: &mut dyn FnMut(&'static RelationInfo, &mut dyn minorm::ChildEntity),
    ) {
        for apple in &mut self.apples {
            visit(&BASKET_RELATIONS[0], apple);
        }
    }

    fn load_children(&mut self, relation: &'static RelationInfo, rows: &[Row]) -> Result<()> {
        if relation.field == "apples" {
            self.apples = rows.iter().map(Apple::from_row).collect::<Result<_>>()?;
        }
        Ok(())
    }
}

// Library maps its books as an inverse collection: membership persists only
// through each book's own library_id column.

static LIBRARY_RELATIONS: [RelationInfo; 1] = [RelationInfo::new("books", "Book", "library_id")
    .cascade(Cascade::AllDeleteOrphan)
    .inverse()];

pub static LIBRARY: EntityDescriptor = EntityDescriptor::new("Library", "library")
    .key_strategy(KeyStrategy::HiLo { block_size: 100 })
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("name", SqlType::Text),
    ])
    .relations(&LIBRARY_RELATIONS);

pub static BOOK: EntityDescriptor = EntityDescriptor::new("Book", "book")
    .key_strategy(KeyStrategy::HiLo { block_size: 100 })
    .fields(&[
        FieldInfo::new("id", SqlType::BigInt).primary_key(),
        FieldInfo::new("title", SqlType::Text),
        FieldInfo::new("library_id", SqlType::BigInt)
            .nullable()
            .foreign_key("library.id"),
    ]);

#[derive(Debug, Clone)]
pub struct Book {
    pub id: Option<i64>,
    pub title: String,
    pub library_id: Option<i64>,
}

impl Book {
    pub fn titled(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            library_id: None,
        }
    }
}

impl Entity for Book {
    fn descriptor() -> &'static EntityDescriptor {
        &BOOK
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("title", self.title.clone().into()),
            ("library_id", self.library_id.into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            title: row.get_named("title")?,
            library_id: row.get_named("library_id")?,
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }
}

#[derive(Debug, Clone)]
pub struct Library {
    pub id: Option<i64>,
    pub name: String,
    pub books: Vec<Book>,
}

impl Library {
    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            books: Vec::new(),
        }
    }
}

impl Entity for Library {
    fn descriptor() -> &'static EntityDescriptor {
        &LIBRARY
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("name", self.name.clone().into())]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            name: row.get_named("name")?,
            books: Vec::new(),
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn set_key(&mut self, key: Value) {
        self.id = key.as_i64();
    }

    fn visit_children(
        &mut self,
        visit: &mut dyn FnMut(&'static RelationInfo, &mut dyn minorm::ChildEntity),
    ) {
        for book in &mut self.books {
            visit(&LIBRARY_RELATIONS[0], book);
        }
    }

    fn load_children(&mut self, relation: &'static RelationInfo, rows: &[Row]) -> Result<()> {
        if relation.field == "books" {
            self.books = rows.iter().map(Book::from_row).collect::<Result<_>>()?;
        }
        Ok(())
    }
}

pub fn registry() -> EntityRegistry {
    EntityRegistry::builder()
        .register::<Document>()
        .register::<Contractor>()
        .register::<Analytic>()
        .register::<Basket>()
        .register::<Apple>()
        .register::<Library>()
        .register::<Book>()
        .build()
}

pub fn factory() -> SessionFactory<MemoryStore> {
    SessionFactory::new(MemoryStore::new(), registry())
}

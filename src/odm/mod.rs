//! Object-data mapper over RDF
//!
//! Typed records are described by [`RecordType`]s, registered in a
//! [`TypeRegistry`], turned into triples by the [`Serializer`] and read
//! back by the [`Resolver`]. [`ObjectMapper`] binds a registry to a
//! [`TripleStore`](crate::rdf::TripleStore) and hands out the per-type
//! [`Objects`] facade.
//!
//! ## Example
//!
//! ```rust
//! use cellini::odm::{FieldDef, FieldValue, ObjectMapper, RecordType, TypeRegistry, ValueShape};
//! use cellini::rdf::RdfStore;
//!
//! let simple = RecordType::builder("Simple")
//!     .field(FieldDef::new("number", ValueShape::Integer))
//!     .build()
//!     .unwrap();
//! let mut registry = TypeRegistry::new();
//! registry.register(&simple).unwrap();
//!
//! let mut mapper = ObjectMapper::new(&registry, RdfStore::new());
//! let record = simple.construct([("number", FieldValue::from(1i64))]).unwrap();
//!
//! let mut objects = mapper.objects(&simple).unwrap();
//! objects.save(&record, true).unwrap();
//! assert!(objects.exists(&record).unwrap());
//! assert_eq!(objects.get(record.identifier()).unwrap(), record);
//! ```

mod error;
mod identity;
pub mod literal;
mod mapper;
mod query;
mod registry;
mod resolver;
mod schema;
mod serializer;
mod value;

pub use error::{OdmError, OdmResult};
pub use identity::{member_predicate, CollectionUri, InstanceUri};
pub use mapper::ObjectMapper;
pub use query::{Objects, QueryIter, QuerySet};
pub use registry::{
    NodeOwner, TypeRegistry, COLLECTION_SCHEME, COLLECTION_TITLE, DEFAULT_URI_PREFIX,
};
pub use resolver::{PredicatePolicy, Resolver, DEFAULT_MAX_DEPTH};
pub use schema::{
    FieldDef, FieldDefault, RecordType, RecordTypeBuilder, SchemaError, SchemaResult, ValueShape,
    DEFAULT_NAMESPACE, IDENTIFIER_FIELD,
};
pub use serializer::{Serializer, Triples};
pub use value::{FieldValue, LiteralValue, Record};

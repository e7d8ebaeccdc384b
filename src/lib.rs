//! Cellini
//!
//! An object-data mapper that stores typed records as RDF triples and
//! reads them back.
//!
//! # Layout
//!
//! - [`rdf`]: RDF terms over `oxrdf`, the fixed vocabulary, the
//!   [`TripleStore`] contract and the in-memory [`RdfStore`]
//! - [`sparql`]: parsing and evaluation of the ASK / DESCRIBE / SELECT
//!   queries the mapper issues
//! - [`odm`]: record types, the type registry, serializer, resolver and
//!   the per-type query facade
//! - [`config`]: YAML-loaded [`OdmConfig`]
//!
//! ## Example Usage
//!
//! ```rust
//! use cellini::{FieldDef, FieldValue, ObjectMapper, RdfStore, RecordType, TypeRegistry, ValueShape};
//!
//! let person = RecordType::builder("Person")
//!     .field(FieldDef::new("name", ValueShape::String))
//!     .field(FieldDef::new("friends", ValueShape::list(ValueShape::Record("Person".into()))).nullable())
//!     .build()
//!     .unwrap();
//! let mut registry = TypeRegistry::new();
//! registry.register(&person).unwrap();
//!
//! let bob = person.construct([("name", FieldValue::from("Bob"))]).unwrap();
//! let alice = person
//!     .construct([
//!         ("name", FieldValue::from("Alice")),
//!         ("friends", FieldValue::from(vec![bob.clone()])),
//!     ])
//!     .unwrap();
//!
//! let mut mapper = ObjectMapper::new(&registry, RdfStore::new());
//! let mut people = mapper.objects(&person).unwrap();
//! people.save(&alice, true).unwrap();
//!
//! let found = people.filter([("name", "Bob")]).unwrap().records().unwrap();
//! assert_eq!(found, vec![bob]);
//! assert_eq!(people.get(alice.identifier()).unwrap(), alice);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod odm;
pub mod rdf;
pub mod sparql;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, OdmConfig};

pub use odm::{
    FieldDef, FieldValue, LiteralValue, ObjectMapper, Objects, OdmError, OdmResult,
    PredicatePolicy, QuerySet, Record, RecordType, Resolver, SchemaError, Serializer,
    TypeRegistry, ValueShape,
};

pub use rdf::{
    ChangeSet, Literal, NamedNode, RdfObject, RdfPredicate, RdfStore, RdfStoreError,
    RdfStoreResult, RdfSubject, RdfTerm, Triple, TriplePattern, TripleStore,
};

pub use sparql::{QuerySolution, SparqlError, SparqlResult, SparqlResults};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

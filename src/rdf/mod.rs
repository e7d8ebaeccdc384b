//! RDF (Resource Description Framework) support
//!
//! This module provides the RDF layer the object mapper writes to and reads
//! from:
//! - RDF terms and triples (subject-predicate-object), wrapping `oxrdf`
//! - the fixed vocabulary the mapper emits (rdf, xsd, dcterms)
//! - the [`TripleStore`] contract and an indexed in-memory [`RdfStore`]
//!
//! # Example
//!
//! ```rust
//! use cellini::rdf::{RdfStore, Triple, NamedNode, Literal, RdfPredicate, TripleStore};
//!
//! let mut store = RdfStore::new();
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! let triple = Triple::new(subject.clone(), predicate, object);
//! assert!(store.add(triple.clone()).unwrap());
//! assert!(!store.add(triple).unwrap());
//!
//! let described = store.describe(&subject).unwrap();
//! assert_eq!(described.len(), 1);
//! ```

mod store;
mod types;
pub mod vocab;

pub use store::{ChangeSet, RdfStore, RdfStoreError, RdfStoreResult, TripleStore};
pub use types::{
    BlankNode, Literal, NamedNode, RdfError, RdfObject, RdfPredicate, RdfResult, RdfSubject,
    RdfTerm, Triple, TriplePattern,
};

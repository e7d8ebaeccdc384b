//! SPARQL query support
//!
//! The object mapper talks to its store in SPARQL text. This module parses
//! queries with `spargebra` and evaluates the subset the mapper issues:
//!
//! - `ASK { ... }` over basic graph patterns
//! - `DESCRIBE <iri>` (all triples with the IRI as subject)
//! - `SELECT [DISTINCT] ?v WHERE { ... FILTER EXISTS { ... } }`
//!
//! # Example
//!
//! ```rust
//! use cellini::rdf::{RdfStore, Triple, NamedNode, Literal, RdfPredicate, TripleStore};
//! use cellini::sparql::SparqlResults;
//!
//! let mut store = RdfStore::new();
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let name = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! store.add(Triple::new(alice, name, Literal::new_simple_literal("Alice"))).unwrap();
//!
//! let results = store
//!     .query(r#"ASK { ?person <http://xmlns.com/foaf/0.1/name> "Alice" }"#)
//!     .unwrap();
//! assert!(matches!(results, SparqlResults::Boolean(true)));
//! ```

mod executor;
mod parser;
mod results;

pub use executor::{ExecutionError, SparqlExecutor, TripleSource};
pub use parser::{ParseError as SparqlParseError, SparqlParser};
pub use results::{QuerySolution, SparqlResults};

use thiserror::Error;

/// SPARQL errors
#[derive(Error, Debug)]
pub enum SparqlError {
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] SparqlParseError),

    /// Execution error
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

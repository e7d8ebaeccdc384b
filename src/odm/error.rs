//! Object mapper errors

use super::schema::SchemaError;
use crate::rdf::{RdfError, RdfStoreError};
use crate::sparql::SparqlError;
use thiserror::Error;

/// Errors raised while mapping records to and from triples
#[derive(Error, Debug)]
pub enum OdmError {
    /// A value or literal cannot be encoded or decoded
    #[error("Unsupported type {type_name} for value {value}")]
    UnsupportedType { type_name: String, value: String },

    /// A literal carries a known datatype but an unparsable lexical form
    #[error("Could not parse \"{value}\" as {datatype}")]
    InvalidLiteral { value: String, datatype: String },

    /// A URI or title does not map to a registered type
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A URI matches more than one registered type
    #[error("Ambiguous URI {uri}: matches {}", candidates.join(", "))]
    AmbiguousUri { uri: String, candidates: Vec<String> },

    /// A different record type is already registered under this title
    #[error("Title already registered by another type: {0}")]
    DuplicateTitle(String),

    /// The store holds no triples describing this URI
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A URI or collection does not have the expected shape
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A predicate maps to no field (strict policy only)
    #[error("Predicate {predicate} maps to no field of {type_title}")]
    UnmappedPredicate { predicate: String, type_title: String },

    /// A query constraint names a field the type does not declare
    #[error("Unknown field {field} on {type_title}")]
    UnknownField { field: String, type_title: String },

    /// Reference chain deeper than the configured limit
    #[error("Resolution depth limit {limit} exceeded at {uri}")]
    DepthLimitExceeded { limit: usize, uri: String },

    /// A reference points back into its own resolution path
    #[error("Cyclic reference to {0}")]
    CyclicReference(String),

    /// A generated URI is not a valid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Record construction failed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] RdfStoreError),

    /// Query failure
    #[error("SPARQL error: {0}")]
    Sparql(#[from] SparqlError),
}

impl From<RdfError> for OdmError {
    fn from(err: RdfError) -> Self {
        OdmError::InvalidIri(err.to_string())
    }
}

pub type OdmResult<T> = Result<T, OdmError>;

//! Fixed RDF vocabulary used by the mapper
//!
//! These IRIs must match bit-exactly for interoperability with other stores
//! and tools reading the same graph.

use super::NamedNode;

/// RDF syntax namespace
pub mod rdf {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// rdf:type
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// rdf:Bag
    pub const BAG: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Bag";
    /// Prefix of the container membership properties rdf:_1, rdf:_2, ...
    pub const MEMBER_PREFIX: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#_";
}

/// Dublin Core terms
pub mod dcterms {
    /// dcterms:identifier
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
}

/// XML Schema datatypes
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const NON_POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// Named node for one of the vocabulary constants above
pub fn node(iri: &'static str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

/// Build the container membership property IRI for a 1-based index
pub fn member(index: usize) -> String {
    format!("{}{}", rdf::MEMBER_PREFIX, index)
}

/// Parse the 1-based index out of a container membership property IRI
pub fn member_index(iri: &str) -> Option<usize> {
    iri.strip_prefix(rdf::MEMBER_PREFIX)
        .and_then(|digits| digits.parse::<usize>().ok())
        .filter(|index| *index > 0)
}

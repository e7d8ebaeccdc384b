//! Identity scheme
//!
//! Instance URIs are `prefix + title + ":" + identifier` and are the only
//! identity a record has in the store. Collection URIs are
//! `cellini-type:Bag:` followed by a fresh UUID and are never reused.

use super::error::{OdmError, OdmResult};
use super::registry::{COLLECTION_SCHEME, COLLECTION_TITLE};
use crate::rdf::{vocab, NamedNode, RdfPredicate};
use std::fmt;
use uuid::Uuid;

/// Canonical URI of a record instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceUri {
    iri: String,
    title: String,
    identifier: Uuid,
}

impl InstanceUri {
    pub fn new(prefix: &str, title: &str, identifier: Uuid) -> Self {
        Self {
            iri: format!("{}{}:{}", prefix, title, identifier),
            title: title.to_string(),
            identifier,
        }
    }

    /// Parse an instance URI under a prefix.
    ///
    /// The remainder after the prefix must be exactly `title:uuid` with a
    /// non-empty title.
    pub fn parse(uri: &str, prefix: &str) -> OdmResult<Self> {
        let mismatch = || OdmError::StructuralMismatch(format!("not an instance URI: {}", uri));

        let rest = uri.strip_prefix(prefix).ok_or_else(mismatch)?;
        let (title, identifier) = rest.split_once(':').ok_or_else(mismatch)?;
        if title.is_empty() || identifier.contains(':') {
            return Err(mismatch());
        }
        let identifier = Uuid::parse_str(identifier).map_err(|_| mismatch())?;
        Ok(Self {
            iri: uri.to_string(),
            title: title.to_string(),
            identifier,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.iri
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    pub fn to_named_node(&self) -> OdmResult<NamedNode> {
        Ok(NamedNode::new(self.iri.as_str())?)
    }
}

impl fmt::Display for InstanceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iri)
    }
}

/// URI of an ordered collection node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionUri {
    iri: String,
    id: Uuid,
}

impl CollectionUri {
    /// Allocate a fresh collection URI
    pub fn generate() -> Self {
        let id = Uuid::new_v4();
        Self {
            iri: format!("{}{}:{}", COLLECTION_SCHEME, COLLECTION_TITLE, id),
            id,
        }
    }

    pub fn parse(uri: &str) -> OdmResult<Self> {
        let id = uri
            .strip_prefix(COLLECTION_SCHEME)
            .and_then(|rest| rest.strip_prefix(COLLECTION_TITLE))
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| OdmError::StructuralMismatch(format!("not a collection URI: {}", uri)))?;
        Ok(Self {
            iri: uri.to_string(),
            id,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.iri
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn to_named_node(&self) -> OdmResult<NamedNode> {
        Ok(NamedNode::new(self.iri.as_str())?)
    }
}

impl fmt::Display for CollectionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iri)
    }
}

/// Membership predicate `rdf:_n` for a 1-based index
pub fn member_predicate(index: usize) -> RdfPredicate {
    RdfPredicate::from(NamedNode::new_unchecked(vocab::member(index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0b6c7f0e-3c1f-4d8e-9d1b-6d8f0f1f2a3b";

    #[test]
    fn test_instance_uri_shape() {
        let id = Uuid::parse_str(ID).unwrap();
        let uri = InstanceUri::new("cellini:", "Simple", id);
        assert_eq!(uri.as_str(), format!("cellini:Simple:{}", ID));

        let parsed = InstanceUri::parse(uri.as_str(), "cellini:").unwrap();
        assert_eq!(parsed, uri);
        assert_eq!(parsed.title(), "Simple");
        assert_eq!(parsed.identifier(), id);
        assert!(uri.to_named_node().is_ok());
    }

    #[test]
    fn test_instance_uri_rejects_other_shapes() {
        for bad in [
            format!("other:Simple:{}", ID),
            format!("cellini::{}", ID),
            "cellini:Simple".to_string(),
            "cellini:Simple:not-a-uuid".to_string(),
            format!("cellini:Simple:{}:extra", ID),
        ] {
            assert!(
                matches!(
                    InstanceUri::parse(&bad, "cellini:"),
                    Err(OdmError::StructuralMismatch(_))
                ),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_same_identifier_different_titles() {
        let id = Uuid::new_v4();
        assert_ne!(
            InstanceUri::new("cellini:", "A", id),
            InstanceUri::new("cellini:", "B", id)
        );
    }

    #[test]
    fn test_collection_uris_are_fresh() {
        let a = CollectionUri::generate();
        let b = CollectionUri::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("cellini-type:Bag:"));
        assert_eq!(CollectionUri::parse(a.as_str()).unwrap(), a);
        assert!(CollectionUri::parse("cellini-type:Bag:x").is_err());
    }

    #[test]
    fn test_member_predicate() {
        assert_eq!(
            member_predicate(3).as_str(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#_3"
        );
    }
}

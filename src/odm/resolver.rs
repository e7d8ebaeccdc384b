//! Triple → record resolution
//!
//! Resolution runs in two phases per node. Phase 1 describes the URI and
//! builds a field map where objects that point at other registered nodes
//! are kept as pending references. Phase 2 resolves every pending reference
//! (records recursively, collections via [`Resolver::resolve_collection`])
//! and only then constructs the record, so shape validation happens once.
//!
//! Recursion is bounded by a depth limit and a cycle guard over the URIs
//! on the current resolution path.

use super::error::{OdmError, OdmResult};
use super::identity::{CollectionUri, InstanceUri};
use super::literal;
use super::registry::{NodeOwner, TypeRegistry};
use super::schema::RecordType;
use super::value::{FieldValue, Record};
use crate::config::OdmConfig;
use crate::rdf::vocab::{self, rdf};
use crate::rdf::{NamedNode, RdfObject, Triple, TripleStore};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default limit on nested reference depth
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// What to do with a predicate that maps to no field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicatePolicy {
    /// Skip it with a warning
    #[default]
    Lenient,
    /// Fail with `UnmappedPredicate`
    Strict,
}

/// Object of a described triple after phase 1
enum Slot {
    Value(FieldValue),
    Reference(String),
}

/// Resolves URIs in a store into records
pub struct Resolver<'r, S: TripleStore + ?Sized> {
    registry: &'r TypeRegistry,
    store: &'r S,
    policy: PredicatePolicy,
    max_depth: usize,
}

impl<'r, S: TripleStore + ?Sized> Resolver<'r, S> {
    pub fn new(registry: &'r TypeRegistry, store: &'r S) -> Self {
        Self {
            registry,
            store,
            policy: PredicatePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Resolver using the policy and depth limit of a configuration
    pub fn from_config(registry: &'r TypeRegistry, store: &'r S, config: &OdmConfig) -> Self {
        Self::new(registry, store)
            .with_policy(config.predicate_policy)
            .with_max_depth(config.max_depth)
    }

    pub fn with_policy(mut self, policy: PredicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve a record instance URI
    pub fn resolve(&self, uri: &str) -> OdmResult<Record> {
        let mut trail = Vec::new();
        self.guarded(uri, &mut trail, |resolver, trail| {
            resolver.resolve_record(uri, trail)
        })
    }

    /// Resolve a collection URI into its ordered elements
    pub fn resolve_collection(&self, uri: &str) -> OdmResult<Vec<FieldValue>> {
        let mut trail = Vec::new();
        self.guarded(uri, &mut trail, |resolver, trail| {
            resolver.resolve_bag(uri, trail)
        })
    }

    /// Resolve any registered URI: a record or a collection
    pub fn resolve_node(&self, uri: &str) -> OdmResult<FieldValue> {
        self.resolve_reference(uri, &mut Vec::new())
    }

    fn resolve_reference(&self, uri: &str, trail: &mut Vec<String>) -> OdmResult<FieldValue> {
        self.guarded(uri, trail, |resolver, trail| {
            match resolver.registry.owner_of_uri(uri)? {
                NodeOwner::Record(_) => Ok(FieldValue::Record(Box::new(
                    resolver.resolve_record(uri, trail)?,
                ))),
                NodeOwner::Collection => Ok(FieldValue::List(resolver.resolve_bag(uri, trail)?)),
            }
        })
    }

    /// Run `f` with `uri` pushed on the resolution path
    fn guarded<T>(
        &self,
        uri: &str,
        trail: &mut Vec<String>,
        f: impl FnOnce(&Self, &mut Vec<String>) -> OdmResult<T>,
    ) -> OdmResult<T> {
        if trail.iter().any(|visited| visited == uri) {
            return Err(OdmError::CyclicReference(uri.to_string()));
        }
        if trail.len() >= self.max_depth {
            return Err(OdmError::DepthLimitExceeded {
                limit: self.max_depth,
                uri: uri.to_string(),
            });
        }
        trail.push(uri.to_string());
        let result = f(self, trail);
        trail.pop();
        result
    }

    fn resolve_record(&self, uri: &str, trail: &mut Vec<String>) -> OdmResult<Record> {
        let record_type = match self.registry.owner_of_uri(uri)? {
            NodeOwner::Record(record_type) => record_type,
            NodeOwner::Collection => {
                return Err(OdmError::StructuralMismatch(format!(
                    "expected record URI, got collection {}",
                    uri
                )))
            }
        };
        InstanceUri::parse(uri, self.registry.uri_prefix())?;

        let triples = self.describe(uri)?;
        debug!("Resolving {} from {} triples", uri, triples.len());

        let mut slots: IndexMap<String, Slot> = IndexMap::new();
        for triple in triples {
            let predicate = triple.predicate.as_str();
            if predicate == rdf::TYPE {
                continue;
            }
            let Some(field) = record_type.field_for_predicate(predicate) else {
                self.unmapped(predicate, &record_type, uri)?;
                continue;
            };
            if slots.contains_key(field.name()) {
                return Err(OdmError::StructuralMismatch(format!(
                    "multiple values for field {} on {}",
                    field.name(),
                    uri
                )));
            }
            slots.insert(field.name().to_string(), self.classify(&triple.object)?);
        }

        let mut values = Vec::with_capacity(slots.len());
        for (name, slot) in slots {
            let value = match slot {
                Slot::Value(value) => value,
                Slot::Reference(target) => self.resolve_reference(&target, trail)?,
            };
            values.push((name, value));
        }
        Ok(record_type.construct(values)?)
    }

    fn resolve_bag(&self, uri: &str, trail: &mut Vec<String>) -> OdmResult<Vec<FieldValue>> {
        CollectionUri::parse(uri)?;
        let triples = self.describe(uri)?;

        let mut bag_type = None;
        let mut elements = Vec::with_capacity(triples.len());
        for triple in triples {
            let predicate = triple.predicate.as_str();
            if predicate == rdf::TYPE {
                bag_type = Some(triple.object);
                continue;
            }
            let index = vocab::member_index(predicate).ok_or_else(|| {
                OdmError::StructuralMismatch(format!(
                    "unexpected predicate {} in collection {}",
                    predicate, uri
                ))
            })?;
            elements.push((index, triple.object));
        }

        match bag_type {
            Some(RdfObject::NamedNode(node)) if node.as_str() == rdf::BAG => {}
            Some(other) => {
                return Err(OdmError::StructuralMismatch(format!(
                    "expected collection type, got {}",
                    other
                )))
            }
            None => {
                return Err(OdmError::StructuralMismatch(format!(
                    "expected collection type, got none for {}",
                    uri
                )))
            }
        }

        elements.sort_by_key(|(index, _)| *index);
        if elements.iter().enumerate().any(|(i, (index, _))| *index != i + 1) {
            return Err(OdmError::StructuralMismatch(format!(
                "collection {} indices are not contiguous from 1",
                uri
            )));
        }

        let mut items = Vec::with_capacity(elements.len());
        for (_, object) in elements {
            let item = match self.classify(&object)? {
                Slot::Value(value) => value,
                Slot::Reference(target) => self.resolve_reference(&target, trail)?,
            };
            items.push(item);
        }
        Ok(items)
    }

    fn describe(&self, uri: &str) -> OdmResult<Vec<Triple>> {
        let node = NamedNode::new(uri)?;
        let triples = self.store.describe(&node)?;
        if triples.is_empty() {
            return Err(OdmError::UnknownNode(uri.to_string()));
        }
        Ok(triples)
    }

    /// Literal → decoded value; registered URI → pending reference
    fn classify(&self, object: &RdfObject) -> OdmResult<Slot> {
        match object {
            RdfObject::Literal(lit) => Ok(Slot::Value(FieldValue::Literal(literal::decode(lit)?))),
            RdfObject::NamedNode(node) => match self.registry.owner_of_uri(node.as_str()) {
                Ok(_) => Ok(Slot::Reference(node.as_str().to_string())),
                Err(OdmError::UnknownType(_)) => Err(OdmError::UnsupportedType {
                    type_name: "unregistered URI".to_string(),
                    value: node.as_str().to_string(),
                }),
                Err(err) => Err(err),
            },
            RdfObject::BlankNode(node) => Err(OdmError::UnsupportedType {
                type_name: "blank node".to_string(),
                value: node.to_string(),
            }),
        }
    }

    fn unmapped(&self, predicate: &str, record_type: &Arc<RecordType>, uri: &str) -> OdmResult<()> {
        match self.policy {
            PredicatePolicy::Lenient => {
                warn!("Skipping unmapped predicate {} on {}", predicate, uri);
                Ok(())
            }
            PredicatePolicy::Strict => Err(OdmError::UnmappedPredicate {
                predicate: predicate.to_string(),
                type_title: record_type.title(),
            }),
        }
    }
}

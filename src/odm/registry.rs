//! Type registry
//!
//! Catalog of the record types a mapper knows about. Each type is known by
//! its title; the registry's URI prefix qualifies titles into instance URI
//! prefixes, which is how a URI found in the store is traced back to the
//! type that owns it. The collection marker (`cellini-type:Bag`) is always
//! present so collection URIs resolve alongside record URIs.

use super::error::{OdmError, OdmResult};
use super::identity::InstanceUri;
use super::schema::RecordType;
use super::value::Record;
use crate::config::OdmConfig;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Default prefix for instance URIs
pub const DEFAULT_URI_PREFIX: &str = "cellini:";

/// Scheme of collection URIs, distinct from any record prefix
pub const COLLECTION_SCHEME: &str = "cellini-type:";

/// Title of the collection marker type
pub const COLLECTION_TITLE: &str = "Bag";

/// What a URI in the store refers to
#[derive(Debug, Clone)]
pub enum NodeOwner {
    /// Instance of a registered record type
    Record(Arc<RecordType>),
    /// Ordered collection node
    Collection,
}

/// Registry of record types
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    uri_prefix: String,
    types: IndexMap<String, Arc<RecordType>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry with the default URI prefix
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_URI_PREFIX)
    }

    /// Create an empty registry with a custom URI prefix
    pub fn with_prefix(uri_prefix: impl Into<String>) -> Self {
        Self {
            uri_prefix: uri_prefix.into(),
            types: IndexMap::new(),
        }
    }

    /// Create an empty registry from configuration
    pub fn from_config(config: &OdmConfig) -> Self {
        Self::with_prefix(config.uri_prefix.clone())
    }

    /// Register a record type.
    ///
    /// Registering the same type again is a no-op; registering a different
    /// type under a title already in use fails with `DuplicateTitle`.
    pub fn register(&mut self, record_type: &Arc<RecordType>) -> OdmResult<()> {
        let title = record_type.title();
        if let Some(existing) = self.types.get(&title) {
            if Arc::ptr_eq(existing, record_type) {
                debug!("Record type already registered: {}", title);
                return Ok(());
            }
            return Err(OdmError::DuplicateTitle(title));
        }
        info!("Registered record type: {}", self.qualify(&title));
        self.types.insert(title, Arc::clone(record_type));
        Ok(())
    }

    /// Qualified title: URI prefix + type title
    pub fn title_of(&self, record_type: &RecordType) -> String {
        self.qualify(&record_type.title())
    }

    /// Look up a registered type by its (unqualified) title
    pub fn type_for_title(&self, title: &str) -> OdmResult<Arc<RecordType>> {
        self.types
            .get(title)
            .cloned()
            .ok_or_else(|| OdmError::UnknownType(title.to_string()))
    }

    /// Whether this exact type is registered
    pub fn contains(&self, record_type: &RecordType) -> bool {
        self.types
            .get(&record_type.title())
            .is_some_and(|registered| std::ptr::eq(registered.as_ref(), record_type))
    }

    /// Find the type owning a URI by prefix match over all registered types
    pub fn owner_of_uri(&self, uri: &str) -> OdmResult<NodeOwner> {
        let collection_prefix = format!("{}{}:", COLLECTION_SCHEME, COLLECTION_TITLE);
        let mut candidates: Vec<(String, NodeOwner)> = Vec::new();
        if uri.starts_with(&collection_prefix) {
            candidates.push((collection_prefix, NodeOwner::Collection));
        }
        for (title, record_type) in &self.types {
            let prefix = format!("{}:", self.qualify(title));
            if uri.starts_with(&prefix) {
                candidates.push((prefix, NodeOwner::Record(Arc::clone(record_type))));
            }
        }

        match candidates.len() {
            0 => Err(OdmError::UnknownType(uri.to_string())),
            1 => Ok(candidates.remove(0).1),
            _ => Err(OdmError::AmbiguousUri {
                uri: uri.to_string(),
                candidates: candidates.into_iter().map(|(prefix, _)| prefix).collect(),
            }),
        }
    }

    /// Whether a URI belongs to exactly one registered type or collection
    pub fn is_resolvable(&self, uri: &str) -> bool {
        self.owner_of_uri(uri).is_ok()
    }

    /// Canonical URI of a record instance
    pub fn instance_uri(&self, record: &Record) -> InstanceUri {
        InstanceUri::new(&self.uri_prefix, &record.title(), record.identifier())
    }

    pub fn uri_prefix(&self) -> &str {
        &self.uri_prefix
    }

    /// Change the URI prefix. URIs already persisted under the old prefix
    /// stop resolving.
    pub fn set_uri_prefix(&mut self, uri_prefix: impl Into<String>) {
        self.uri_prefix = uri_prefix.into();
    }

    /// Registered types in registration order
    pub fn types(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn qualify(&self, title: &str) -> String {
        format!("{}{}", self.uri_prefix, title)
    }
}

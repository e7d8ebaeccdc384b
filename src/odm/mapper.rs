//! Object mapper context
//!
//! [`ObjectMapper`] binds a registry, a store and resolution settings
//! together and hands out the per-type query facade.

use super::error::{OdmError, OdmResult};
use super::query::Objects;
use super::registry::TypeRegistry;
use super::resolver::{PredicatePolicy, Resolver, DEFAULT_MAX_DEPTH};
use super::schema::RecordType;
use super::serializer::Serializer;
use super::value::Record;
use crate::config::OdmConfig;
use crate::rdf::TripleStore;
use std::sync::Arc;

/// Mapper over one registry and one store
pub struct ObjectMapper<'r, S: TripleStore> {
    registry: &'r TypeRegistry,
    store: S,
    policy: PredicatePolicy,
    max_depth: usize,
}

impl<'r, S: TripleStore> ObjectMapper<'r, S> {
    /// Create a mapper with default resolution settings
    pub fn new(registry: &'r TypeRegistry, store: S) -> Self {
        Self {
            registry,
            store,
            policy: PredicatePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a mapper using the predicate policy and depth limit of a
    /// configuration
    pub fn with_config(registry: &'r TypeRegistry, store: S, config: &OdmConfig) -> Self {
        Self {
            registry,
            store,
            policy: config.predicate_policy,
            max_depth: config.max_depth,
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn serializer(&self) -> Serializer<'r> {
        Serializer::new(self.registry)
    }

    pub fn resolver(&self) -> Resolver<'_, S> {
        Resolver::new(self.registry, &self.store)
            .with_policy(self.policy)
            .with_max_depth(self.max_depth)
    }

    /// Query facade for one registered record type
    pub fn objects(&mut self, record_type: &Arc<RecordType>) -> OdmResult<Objects<'_, 'r, S>> {
        if !self.registry.contains(record_type) {
            return Err(OdmError::UnknownType(record_type.title()));
        }
        Ok(Objects::new(self, Arc::clone(record_type)))
    }

    /// Resolve any registered instance URI
    pub fn resolve(&self, uri: &str) -> OdmResult<Record> {
        self.resolver().resolve(uri)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odm::schema::{FieldDef, ValueShape};
    use crate::odm::value::FieldValue;
    use crate::rdf::RdfStore;

    #[test]
    fn test_objects_requires_registration() {
        let registered = RecordType::builder("Registered").build().unwrap();
        let stranger = RecordType::builder("Stranger").build().unwrap();
        let mut registry = TypeRegistry::new();
        registry.register(&registered).unwrap();

        let mut mapper = ObjectMapper::new(&registry, RdfStore::new());
        assert!(mapper.objects(&registered).is_ok());
        assert!(matches!(
            mapper.objects(&stranger),
            Err(OdmError::UnknownType(_))
        ));
    }

    #[test]
    fn test_config_controls_resolution() {
        let t = RecordType::builder("Simple")
            .field(FieldDef::new("number", ValueShape::Integer))
            .build()
            .unwrap();
        let mut registry = TypeRegistry::new();
        registry.register(&t).unwrap();

        let config = OdmConfig {
            predicate_policy: PredicatePolicy::Strict,
            ..OdmConfig::default()
        };
        let mut mapper = ObjectMapper::with_config(&registry, RdfStore::new(), &config);
        let record = t.construct([("number", FieldValue::from(1i64))]).unwrap();
        mapper.objects(&t).unwrap().save(&record, true).unwrap();

        let uri = registry.instance_uri(&record);
        assert_eq!(mapper.resolve(uri.as_str()).unwrap(), record);
        assert_eq!(mapper.into_store().len(), 3);
    }
}

//! Query facade
//!
//! [`Objects`] is the per-type entry point for persistence: existence
//! checks, create / delete / save, identifier lookup and keyword-equality
//! filters. Filters produce a [`QuerySet`], a restartable description of a
//! `SELECT` whose iterator resolves one record per step.

use super::error::{OdmError, OdmResult};
use super::identity::InstanceUri;
use super::literal;
use super::mapper::ObjectMapper;
use super::resolver::Resolver;
use super::schema::RecordType;
use super::value::{FieldValue, LiteralValue, Record};
use crate::rdf::vocab::dcterms;
use crate::rdf::{ChangeSet, RdfStoreError, TripleStore};
use crate::sparql::SparqlResults;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Persistence operations for one record type
pub struct Objects<'m, 'r, S: TripleStore> {
    mapper: &'m mut ObjectMapper<'r, S>,
    record_type: Arc<RecordType>,
}

impl<'m, 'r, S: TripleStore> Objects<'m, 'r, S> {
    pub(crate) fn new(mapper: &'m mut ObjectMapper<'r, S>, record_type: Arc<RecordType>) -> Self {
        Self {
            mapper,
            record_type,
        }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Whether any subject carries the record's identifier
    pub fn exists(&self, record: &Record) -> OdmResult<bool> {
        let identifier = literal::encode_literal(&LiteralValue::Uuid(record.identifier()));
        let sparql = format!("ASK {{ ?s <{}> {} }}", dcterms::IDENTIFIER, identifier);
        match self.mapper.store().query(&sparql)? {
            SparqlResults::Boolean(found) => Ok(found),
            other => Err(RdfStoreError::UnexpectedResult {
                expected: "boolean",
                actual: other.kind(),
            }
            .into()),
        }
    }

    /// Serialize the record and add every triple
    pub fn create(&mut self, record: &Record, recursive: bool) -> OdmResult<()> {
        self.check_type(record)?;
        let triples = self.mapper.serializer().to_triples(record, recursive)?;
        debug!("Creating {} with {} triples", record.title(), triples.len());
        let store = self.mapper.store_mut();
        for triple in triples {
            store.add(triple)?;
        }
        Ok(())
    }

    /// Remove every triple whose subject is the record's URI.
    ///
    /// Shallow: referenced records and collections are left in place.
    pub fn delete(&mut self, record: &Record) -> OdmResult<()> {
        self.check_type(record)?;
        let node = self.mapper.registry().instance_uri(record).to_named_node()?;
        let triples = self.mapper.store().describe(&node)?;
        debug!("Deleting {} ({} triples)", node, triples.len());
        let store = self.mapper.store_mut();
        for triple in &triples {
            store.remove(triple)?;
        }
        Ok(())
    }

    /// Replace the record's triples: delete then create, applied as one
    /// change set.
    ///
    /// Every subject the serialization writes is cleared first, so a
    /// recursive save also replaces the nested records it re-emits.
    pub fn save(&mut self, record: &Record, recursive: bool) -> OdmResult<()> {
        self.check_type(record)?;
        let additions = self.mapper.serializer().to_triples(record, recursive)?;
        let node = self.mapper.registry().instance_uri(record).to_named_node()?;

        let mut subjects = IndexSet::new();
        subjects.insert(node.clone());
        subjects.extend(
            additions
                .iter()
                .filter_map(|triple| triple.subject.as_named_node())
                .cloned(),
        );
        let mut removals = Vec::new();
        for subject in &subjects {
            removals.extend(self.mapper.store().describe(subject)?);
        }
        debug!(
            "Saving {}: replacing {} triples of {} subjects with {}",
            node,
            removals.len(),
            subjects.len(),
            additions.len()
        );
        self.mapper.store_mut().apply(ChangeSet {
            removals,
            additions,
        })?;
        Ok(())
    }

    /// Records of this type (or a subtype) whose fields equal every
    /// constraint value
    pub fn filter<I, K, V>(&self, constraints: I) -> OdmResult<QuerySet<'_, 'r, S>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut clauses = Vec::new();
        for (name, value) in constraints {
            let name = name.as_ref();
            let field = self
                .record_type
                .field(name)
                .ok_or_else(|| OdmError::UnknownField {
                    field: name.to_string(),
                    type_title: self.record_type.title(),
                })?;
            let object = match value.into() {
                FieldValue::Record(record) => {
                    format!("<{}>", self.mapper.registry().instance_uri(&record))
                }
                value => literal::encode(&value, Some(field.shape()))?
                    .ok_or_else(|| OdmError::UnsupportedType {
                        type_name: "null".to_string(),
                        value: format!("constraint on {}", name),
                    })?
                    .to_string(),
            };
            clauses.push(format!("?s <{}> {}", self.record_type.predicate_of(field), object));
        }

        let rdf_type = self.record_type.rdf_type();
        let sparql = if clauses.is_empty() {
            format!("SELECT DISTINCT ?s WHERE {{ ?s a <{}> . }}", rdf_type)
        } else {
            format!(
                "SELECT DISTINCT ?s WHERE {{ ?s a <{}> . FILTER EXISTS {{ {} }} }}",
                rdf_type,
                clauses.join(" . ")
            )
        };
        Ok(QuerySet {
            mapper: &*self.mapper,
            sparql,
        })
    }

    /// Every record of this type (or a subtype)
    pub fn all(&self) -> OdmResult<QuerySet<'_, 'r, S>> {
        self.filter(std::iter::empty::<(&str, FieldValue)>())
    }

    /// Resolve the record with this identifier
    pub fn get(&self, identifier: Uuid) -> OdmResult<Record> {
        let uri = InstanceUri::new(
            self.mapper.registry().uri_prefix(),
            &self.record_type.title(),
            identifier,
        );
        self.mapper.resolve(uri.as_str())
    }

    /// Resolve any registered instance URI
    pub fn resolve(&self, uri: &str) -> OdmResult<Record> {
        self.mapper.resolve(uri)
    }

    fn check_type(&self, record: &Record) -> OdmResult<()> {
        if record.record_type().is_a(&self.record_type.title()) {
            Ok(())
        } else {
            Err(OdmError::UnsupportedType {
                type_name: record.title(),
                value: format!("record passed to {} objects", self.record_type.title()),
            })
        }
    }
}

/// Filtered selection of records
pub struct QuerySet<'q, 'r, S: TripleStore> {
    mapper: &'q ObjectMapper<'r, S>,
    sparql: String,
}

impl<'q, 'r, S: TripleStore> QuerySet<'q, 'r, S> {
    /// The SELECT this set runs
    pub fn sparql(&self) -> &str {
        &self.sparql
    }

    /// Run the query and return the matching instance URIs, sorted
    pub fn subjects(&self) -> OdmResult<Vec<String>> {
        let (variables, solutions) = match self.mapper.store().query(&self.sparql)? {
            SparqlResults::Bindings {
                variables,
                solutions,
            } => (variables, solutions),
            other => {
                return Err(RdfStoreError::UnexpectedResult {
                    expected: "bindings",
                    actual: other.kind(),
                }
                .into())
            }
        };
        debug!("Query over {:?} matched {} subjects", variables, solutions.len());
        let mut subjects: Vec<String> = solutions
            .iter()
            .filter_map(|solution| solution.get("s"))
            .filter_map(|term| term.as_named_node())
            .map(|node| node.as_str().to_string())
            .collect();
        subjects.sort();
        Ok(subjects)
    }

    /// Run the query; the iterator resolves one record per step.
    ///
    /// Each call re-runs the query.
    pub fn iter(&self) -> OdmResult<QueryIter<'q, S>> {
        Ok(QueryIter {
            resolver: self.mapper.resolver(),
            subjects: self.subjects()?.into_iter(),
        })
    }

    pub fn count(&self) -> OdmResult<usize> {
        Ok(self.subjects()?.len())
    }

    /// Resolve every match, stopping at the first error
    pub fn records(&self) -> OdmResult<Vec<Record>> {
        self.iter()?.collect()
    }
}

/// Lazily resolving iterator over a [`QuerySet`]'s matches
pub struct QueryIter<'q, S: TripleStore> {
    resolver: Resolver<'q, S>,
    subjects: std::vec::IntoIter<String>,
}

impl<'q, S: TripleStore> Iterator for QueryIter<'q, S> {
    type Item = OdmResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.subjects.next().map(|uri| self.resolver.resolve(&uri))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.subjects.size_hint()
    }
}

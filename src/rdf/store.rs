//! RDF triple store contract and in-memory implementation
//!
//! [`TripleStore`] is everything the object mapper needs from a store: add and
//! remove facts, answer SPARQL-like queries and describe a resource.
//! [`RdfStore`] is an in-memory implementation with subject and predicate
//! indices, answering queries through the [`crate::sparql`] evaluator.

use super::types::{NamedNode, RdfPredicate, RdfSubject, Triple, TriplePattern};
use crate::sparql::{SparqlError, SparqlExecutor, SparqlResults, TripleSource};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// RDF store errors
#[derive(Error, Debug)]
pub enum RdfStoreError {
    /// Query could not be parsed or evaluated
    #[error("Query failed: {0}")]
    Query(#[from] SparqlError),

    /// The query form did not produce the expected kind of result
    #[error("Unexpected query result: expected {expected}, got {actual}")]
    UnexpectedResult {
        expected: &'static str,
        actual: &'static str,
    },

    /// Backend specific failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type RdfStoreResult<T> = Result<T, RdfStoreError>;

/// A batch of removals followed by additions, applied as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Triples to remove (applied first)
    pub removals: Vec<Triple>,
    /// Triples to add (applied after removals)
    pub additions: Vec<Triple>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a triple for removal
    pub fn remove(&mut self, triple: Triple) -> &mut Self {
        self.removals.push(triple);
        self
    }

    /// Queue a triple for addition
    pub fn add(&mut self, triple: Triple) -> &mut Self {
        self.additions.push(triple);
        self
    }

    /// Check whether the change set does nothing
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Contract between the object mapper and a triple store.
///
/// Stores hold a set of triples: adding a triple that is already present is
/// a no-op and reports `false`.
pub trait TripleStore {
    /// Add a triple, returning whether it was newly inserted
    fn add(&mut self, triple: Triple) -> RdfStoreResult<bool>;

    /// Remove a triple, returning whether it was present
    fn remove(&mut self, triple: &Triple) -> RdfStoreResult<bool>;

    /// Evaluate a SPARQL-like query (`ASK`, `DESCRIBE`, `SELECT`)
    fn query(&self, sparql: &str) -> RdfStoreResult<SparqlResults>;

    /// Fetch every triple whose subject is `node`
    fn describe(&self, node: &NamedNode) -> RdfStoreResult<Vec<Triple>> {
        match self.query(&format!("DESCRIBE {}", node))? {
            SparqlResults::Graph(triples) => Ok(triples),
            other => Err(RdfStoreError::UnexpectedResult {
                expected: "graph",
                actual: other.kind(),
            }),
        }
    }

    /// Apply a change set.
    ///
    /// The default implementation is sequential: a failure part way leaves
    /// the earlier changes applied. Stores with transactions should override
    /// this to apply the whole set atomically.
    fn apply(&mut self, changes: ChangeSet) -> RdfStoreResult<()> {
        for triple in &changes.removals {
            self.remove(triple)?;
        }
        for triple in changes.additions {
            self.add(triple)?;
        }
        Ok(())
    }
}

/// In-memory RDF triple store with subject and predicate indices
#[derive(Clone, Default)]
pub struct RdfStore {
    /// All triples (primary storage)
    triples: HashSet<Triple>,

    /// Subject index: Subject -> triples with that subject
    spo_index: FxHashMap<RdfSubject, FxHashSet<Triple>>,

    /// Predicate index: Predicate -> triples with that predicate
    pos_index: FxHashMap<RdfPredicate, FxHashSet<Triple>>,
}

impl RdfStore {
    /// Create a new empty RDF store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple into the store
    pub fn insert(&mut self, triple: Triple) -> bool {
        if !self.triples.insert(triple.clone()) {
            return false;
        }
        self.spo_index
            .entry(triple.subject.clone())
            .or_default()
            .insert(triple.clone());
        self.pos_index
            .entry(triple.predicate.clone())
            .or_default()
            .insert(triple);
        true
    }

    /// Remove a triple from the store
    pub fn delete(&mut self, triple: &Triple) -> bool {
        if !self.triples.remove(triple) {
            return false;
        }
        if let Some(triples) = self.spo_index.get_mut(&triple.subject) {
            triples.remove(triple);
            if triples.is_empty() {
                self.spo_index.remove(&triple.subject);
            }
        }
        if let Some(triples) = self.pos_index.get_mut(&triple.predicate) {
            triples.remove(triple);
            if triples.is_empty() {
                self.pos_index.remove(&triple.predicate);
            }
        }
        true
    }

    /// Check if a triple exists in the store
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Get the total number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Get triples with a specific subject
    pub fn triples_with_subject(&self, subject: &RdfSubject) -> Vec<Triple> {
        self.spo_index
            .get(subject)
            .map(|triples| triples.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl TripleSource for RdfStore {
    fn match_pattern(&self, pattern: &TriplePattern) -> Vec<Triple> {
        let candidates: Box<dyn Iterator<Item = &Triple>> =
            match (&pattern.subject, &pattern.predicate) {
                (Some(subject), _) => match self.spo_index.get(subject) {
                    Some(triples) => Box::new(triples.iter()),
                    None => return Vec::new(),
                },
                (None, Some(predicate)) => match self.pos_index.get(predicate) {
                    Some(triples) => Box::new(triples.iter()),
                    None => return Vec::new(),
                },
                (None, None) => Box::new(self.triples.iter()),
            };

        candidates
            .filter(|triple| pattern.matches(triple))
            .cloned()
            .collect()
    }
}

impl TripleStore for RdfStore {
    fn add(&mut self, triple: Triple) -> RdfStoreResult<bool> {
        Ok(self.insert(triple))
    }

    fn remove(&mut self, triple: &Triple) -> RdfStoreResult<bool> {
        Ok(self.delete(triple))
    }

    fn query(&self, sparql: &str) -> RdfStoreResult<SparqlResults> {
        debug!("Evaluating query: {}", sparql);
        Ok(SparqlExecutor::new(self).execute(sparql)?)
    }

    fn describe(&self, node: &NamedNode) -> RdfStoreResult<Vec<Triple>> {
        Ok(self.triples_with_subject(&RdfSubject::NamedNode(node.clone())))
    }

    /// In-memory mutations cannot fail, so the change set is applied as a
    /// whole or not at all.
    fn apply(&mut self, changes: ChangeSet) -> RdfStoreResult<()> {
        debug!(
            "Applying change set: {} removals, {} additions",
            changes.removals.len(),
            changes.additions.len()
        );
        for triple in &changes.removals {
            self.delete(triple);
        }
        for triple in changes.additions {
            self.insert(triple);
        }
        Ok(())
    }
}

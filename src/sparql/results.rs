//! SPARQL query results

use crate::rdf::{RdfTerm, Triple};
use std::collections::HashMap;

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    pub bindings: HashMap<String, RdfTerm>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.bindings.get(variable)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: RdfTerm) {
        self.bindings.insert(variable.into(), term);
    }

    /// Keep only the listed variables
    pub fn project(&mut self, variables: &[String]) {
        self.bindings.retain(|name, _| variables.contains(name));
    }

    /// Canonical, order-independent key used for DISTINCT
    pub(crate) fn key(&self) -> Vec<(String, RdfTerm)> {
        let mut key: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, term)| (name.clone(), term.clone()))
            .collect();
        key.sort_by(|a, b| a.0.cmp(&b.0));
        key
    }
}

/// SPARQL query results
#[derive(Debug, Clone)]
pub enum SparqlResults {
    /// Bindings from SELECT query
    Bindings {
        /// Variables
        variables: Vec<String>,
        /// Solutions
        solutions: Vec<QuerySolution>,
    },

    /// Boolean result from ASK query
    Boolean(bool),

    /// Graph from DESCRIBE query
    Graph(Vec<Triple>),
}

impl SparqlResults {
    /// Create empty bindings result
    pub fn empty() -> Self {
        SparqlResults::Bindings {
            variables: Vec::new(),
            solutions: Vec::new(),
        }
    }

    /// Short name of the result kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SparqlResults::Bindings { .. } => "bindings",
            SparqlResults::Boolean(_) => "boolean",
            SparqlResults::Graph(_) => "graph",
        }
    }
}

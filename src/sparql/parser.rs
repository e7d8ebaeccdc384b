//! SPARQL parser using spargebra library

use spargebra::Query;
use thiserror::Error;

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Syntax error
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

/// SPARQL parser
pub struct SparqlParser;

impl SparqlParser {
    /// Parse a SPARQL query string into its algebra
    pub fn parse(query: &str) -> Result<Query, ParseError> {
        let parsed = query
            .parse::<Query>()
            .map_err(|e| ParseError::Syntax(e.to_string()))?;
        match parsed {
            Query::Construct { .. } => Err(ParseError::Unsupported("CONSTRUCT".to_string())),
            other => Ok(other),
        }
    }
}

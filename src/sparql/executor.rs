//! SPARQL query executor
//!
//! Evaluates the `spargebra` algebra against any [`TripleSource`]. Supported:
//! basic graph patterns, joins, `FILTER` with `EXISTS` / boolean connectives /
//! term equality, `BIND`-style extension, projection, `DISTINCT` and slicing.
//! Anything else is reported as [`ExecutionError::Unsupported`].

use super::parser::SparqlParser;
use super::results::{QuerySolution, SparqlResults};
use super::SparqlResult;
use crate::rdf::{Literal, NamedNode, RdfPredicate, RdfTerm, Triple, TriplePattern};
use spargebra::algebra::{Expression, GraphPattern};
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern as AlgebraTriplePattern};
use spargebra::Query;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Algebra node the evaluator does not implement
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Anything that can answer single triple-pattern lookups
pub trait TripleSource {
    /// Return every triple matching the pattern
    fn match_pattern(&self, pattern: &TriplePattern) -> Vec<Triple>;
}

/// SPARQL query executor
pub struct SparqlExecutor<'a, S: TripleSource + ?Sized> {
    source: &'a S,
}

/// One position of a triple pattern after substituting current bindings
enum Slot<T> {
    /// Constant (or already bound variable)
    Fixed(T),
    /// Unbound variable to bind from the match
    Var(String),
    /// Can never match (e.g. a literal in subject position)
    Never,
}

impl<'a, S: TripleSource + ?Sized> SparqlExecutor<'a, S> {
    /// Create a new executor over a triple source
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Parse and execute a query
    pub fn execute(&self, query: &str) -> SparqlResult<SparqlResults> {
        let parsed = SparqlParser::parse(query)?;
        match parsed {
            Query::Select { pattern, .. } => self.execute_select(&pattern),
            Query::Ask { pattern, .. } => {
                let solutions = self.eval(&pattern, &QuerySolution::new())?;
                Ok(SparqlResults::Boolean(!solutions.is_empty()))
            }
            Query::Describe { pattern, .. } => self.execute_describe(&pattern),
            Query::Construct { .. } => {
                Err(ExecutionError::Unsupported("CONSTRUCT".to_string()).into())
            }
        }
    }

    fn execute_select(&self, pattern: &GraphPattern) -> SparqlResult<SparqlResults> {
        let solutions = self.eval(pattern, &QuerySolution::new())?;
        let variables = match projected_variables(pattern) {
            Some(variables) => variables,
            None => {
                let mut names: Vec<String> = solutions
                    .iter()
                    .flat_map(|s| s.bindings.keys().cloned())
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .collect();
                names.sort();
                names
            }
        };
        debug!("SELECT produced {} solutions", solutions.len());
        Ok(SparqlResults::Bindings {
            variables,
            solutions,
        })
    }

    fn execute_describe(&self, pattern: &GraphPattern) -> SparqlResult<SparqlResults> {
        let mut seen = HashSet::new();
        let mut triples = Vec::new();
        for solution in self.eval(pattern, &QuerySolution::new())? {
            let mut nodes: Vec<&RdfTerm> = solution.bindings.values().collect();
            nodes.sort_by_key(|term| term.to_string());
            for term in nodes {
                let Some(subject) = term.to_subject() else {
                    continue;
                };
                if !seen.insert(subject.clone()) {
                    continue;
                }
                let pattern = TriplePattern::new(Some(subject), None, None);
                triples.extend(self.source.match_pattern(&pattern));
            }
        }
        Ok(SparqlResults::Graph(triples))
    }

    /// Evaluate a graph pattern, extending `seed`
    fn eval(&self, pattern: &GraphPattern, seed: &QuerySolution) -> SparqlResult<Vec<QuerySolution>> {
        match pattern {
            GraphPattern::Bgp { patterns } => {
                let mut solutions = vec![seed.clone()];
                for triple_pattern in patterns {
                    let mut next = Vec::new();
                    for solution in &solutions {
                        next.extend(self.match_triple_pattern(triple_pattern, solution));
                    }
                    if next.is_empty() {
                        return Ok(next);
                    }
                    solutions = next;
                }
                Ok(solutions)
            }
            GraphPattern::Join { left, right } => {
                let mut solutions = Vec::new();
                for solution in self.eval(left, seed)? {
                    solutions.extend(self.eval(right, &solution)?);
                }
                Ok(solutions)
            }
            GraphPattern::Filter { expr, inner } => {
                let mut solutions = Vec::new();
                for solution in self.eval(inner, seed)? {
                    if self.test(expr, &solution)? {
                        solutions.push(solution);
                    }
                }
                Ok(solutions)
            }
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let mut solutions = self.eval(inner, seed)?;
                for solution in &mut solutions {
                    if let Some(term) = self.eval_term(expression, solution) {
                        solution.bind(variable.as_str(), term);
                    }
                }
                Ok(solutions)
            }
            GraphPattern::Project { inner, variables } => {
                let names: Vec<String> = variables.iter().map(|v| v.as_str().to_string()).collect();
                let mut solutions = self.eval(inner, seed)?;
                for solution in &mut solutions {
                    solution.project(&names);
                }
                Ok(solutions)
            }
            GraphPattern::Distinct { inner } | GraphPattern::Reduced { inner } => {
                let mut seen = HashSet::new();
                Ok(self
                    .eval(inner, seed)?
                    .into_iter()
                    .filter(|solution| seen.insert(solution.key()))
                    .collect())
            }
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                let solutions = self.eval(inner, seed)?.into_iter().skip(*start);
                Ok(match length {
                    Some(length) => solutions.take(*length).collect(),
                    None => solutions.collect(),
                })
            }
            #[allow(unreachable_patterns)]
            other => Err(ExecutionError::Unsupported(format!("graph pattern {:?}", other)).into()),
        }
    }

    /// Match one triple pattern under the bindings of `solution`
    fn match_triple_pattern(
        &self,
        pattern: &AlgebraTriplePattern,
        solution: &QuerySolution,
    ) -> Vec<QuerySolution> {
        let subject = match term_slot(&pattern.subject, solution) {
            Slot::Fixed(term) => match term.to_subject() {
                Some(subject) => Slot::Fixed(subject),
                None => Slot::Never,
            },
            Slot::Var(name) => Slot::Var(name),
            Slot::Never => Slot::Never,
        };
        let predicate = match &pattern.predicate {
            NamedNodePattern::NamedNode(node) => {
                Slot::Fixed(RdfPredicate::from(NamedNode::from(node.clone())))
            }
            NamedNodePattern::Variable(variable) => match solution.get(variable.as_str()) {
                Some(RdfTerm::NamedNode(node)) => Slot::Fixed(RdfPredicate::from(node.clone())),
                Some(_) => Slot::Never,
                None => Slot::Var(variable.as_str().to_string()),
            },
        };
        let object = match term_slot(&pattern.object, solution) {
            Slot::Fixed(term) => Slot::Fixed(term.to_object()),
            Slot::Var(name) => Slot::Var(name),
            Slot::Never => Slot::Never,
        };

        let lookup = TriplePattern::new(
            fixed(&subject).cloned(),
            fixed(&predicate).cloned(),
            fixed(&object).cloned(),
        );
        if matches!(subject, Slot::Never)
            || matches!(predicate, Slot::Never)
            || matches!(object, Slot::Never)
        {
            return Vec::new();
        }

        let mut solutions = Vec::new();
        for triple in self.source.match_pattern(&lookup) {
            let mut extended = solution.clone();
            let consistent = bind_slot(&mut extended, &subject, RdfTerm::from(triple.subject))
                && bind_slot(&mut extended, &predicate, RdfTerm::from(triple.predicate))
                && bind_slot(&mut extended, &object, RdfTerm::from(triple.object));
            if consistent {
                solutions.push(extended);
            }
        }
        solutions
    }

    /// Effective boolean value of a filter expression
    fn test(&self, expr: &Expression, solution: &QuerySolution) -> SparqlResult<bool> {
        match expr {
            Expression::Exists(pattern) => Ok(!self.eval(pattern, solution)?.is_empty()),
            Expression::Not(inner) => Ok(!self.test(inner, solution)?),
            Expression::And(left, right) => {
                Ok(self.test(left, solution)? && self.test(right, solution)?)
            }
            Expression::Or(left, right) => {
                Ok(self.test(left, solution)? || self.test(right, solution)?)
            }
            Expression::Bound(variable) => Ok(solution.get(variable.as_str()).is_some()),
            Expression::Equal(left, right) | Expression::SameTerm(left, right) => Ok(
                match (self.eval_term(left, solution), self.eval_term(right, solution)) {
                    (Some(left), Some(right)) => left == right,
                    _ => false,
                },
            ),
            Expression::Literal(_) | Expression::Variable(_) => {
                Ok(match self.eval_term(expr, solution) {
                    Some(RdfTerm::Literal(literal)) => {
                        !matches!(literal.value(), "" | "false" | "0")
                    }
                    Some(_) => true,
                    None => false,
                })
            }
            other => Err(ExecutionError::Unsupported(format!("expression {:?}", other)).into()),
        }
    }

    fn eval_term(&self, expr: &Expression, solution: &QuerySolution) -> Option<RdfTerm> {
        match expr {
            Expression::NamedNode(node) => Some(RdfTerm::NamedNode(node.clone().into())),
            Expression::Literal(literal) => Some(RdfTerm::Literal(literal.clone().into())),
            Expression::Variable(variable) => solution.get(variable.as_str()).cloned(),
            _ => None,
        }
    }
}

/// Variables of the outermost projection, looking through modifiers
fn projected_variables(pattern: &GraphPattern) -> Option<Vec<String>> {
    match pattern {
        GraphPattern::Project { variables, .. } => {
            Some(variables.iter().map(|v| v.as_str().to_string()).collect())
        }
        GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. } => projected_variables(inner),
        _ => None,
    }
}

fn term_slot(pattern: &TermPattern, solution: &QuerySolution) -> Slot<RdfTerm> {
    match pattern {
        TermPattern::NamedNode(node) => Slot::Fixed(RdfTerm::NamedNode(node.clone().into())),
        TermPattern::Literal(literal) => Slot::Fixed(RdfTerm::Literal(Literal::from(literal.clone()))),
        // Blank nodes in patterns behave as non-projectable variables
        TermPattern::BlankNode(node) => variable_slot(&format!("_:{}", node.as_str()), solution),
        TermPattern::Variable(variable) => variable_slot(variable.as_str(), solution),
        #[allow(unreachable_patterns)]
        _ => Slot::Never,
    }
}

fn variable_slot(name: &str, solution: &QuerySolution) -> Slot<RdfTerm> {
    match solution.get(name) {
        Some(term) => Slot::Fixed(term.clone()),
        None => Slot::Var(name.to_string()),
    }
}

fn fixed<T>(slot: &Slot<T>) -> Option<&T> {
    match slot {
        Slot::Fixed(value) => Some(value),
        _ => None,
    }
}

/// Bind a matched term to a variable slot; fails if the variable was bound
/// to a different term earlier in the same triple (e.g. `?x ?p ?x`).
fn bind_slot<T>(solution: &mut QuerySolution, slot: &Slot<T>, term: RdfTerm) -> bool {
    match slot {
        Slot::Var(name) => match solution.get(name) {
            Some(existing) => existing == &term,
            None => {
                solution.bind(name.clone(), term);
                true
            }
        },
        _ => true,
    }
}

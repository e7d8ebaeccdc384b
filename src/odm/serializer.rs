//! Record → triple serialization
//!
//! [`Serializer::serialize`] returns a lazy [`Triples`] iterator driven by an
//! explicit work stack, so arbitrarily deep records do not grow the call
//! stack. Output order is depth-first: a pointer triple to a nested record
//! or collection is followed by that node's own triples (when recursive).

use super::error::{OdmError, OdmResult};
use super::identity::{member_predicate, CollectionUri};
use super::literal;
use super::registry::TypeRegistry;
use super::value::{FieldValue, Record};
use crate::rdf::vocab::{self, rdf};
use crate::rdf::{NamedNode, RdfObject, RdfPredicate, Triple};
use tracing::debug;

/// Serializes records against a registry
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Serializer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Lazily serialize a record.
    ///
    /// With `recursive` unset, nested records and collections are pointed
    /// to but not expanded. Calling again restarts from scratch; collection
    /// nodes get fresh URIs on every pass.
    pub fn serialize<'a>(&self, record: &'a Record, recursive: bool) -> Triples<'a, 'r> {
        let mut triples = Triples {
            registry: self.registry,
            recursive,
            stack: Vec::new(),
            pending_error: None,
            failed: false,
        };
        if self.registry.contains(record.record_type()) {
            match triples.record_frame(record) {
                Ok(frame) => triples.stack.push(frame),
                Err(err) => triples.pending_error = Some(err),
            }
        } else {
            triples.pending_error = Some(OdmError::UnknownType(record.title()));
        }
        triples
    }

    /// Serialize a record into a vector, stopping at the first error
    pub fn to_triples(&self, record: &Record, recursive: bool) -> OdmResult<Vec<Triple>> {
        self.serialize(record, recursive).collect()
    }
}

enum Frame<'a> {
    Record {
        record: &'a Record,
        subject: NamedNode,
        rdf_types: Vec<NamedNode>,
        type_index: usize,
        field_index: usize,
    },
    Bag {
        subject: NamedNode,
        items: &'a [FieldValue],
        typed: bool,
        index: usize,
    },
}

enum Step<'a> {
    Emit(Triple, Option<Frame<'a>>),
    Pop,
}

/// Lazy triple stream for one record
pub struct Triples<'a, 'r> {
    registry: &'r TypeRegistry,
    recursive: bool,
    stack: Vec<Frame<'a>>,
    pending_error: Option<OdmError>,
    failed: bool,
}

impl<'a, 'r> Triples<'a, 'r> {
    fn record_frame(&self, record: &'a Record) -> OdmResult<Frame<'a>> {
        let uri = self.registry.instance_uri(record);
        debug!("Serializing {} (recursive: {})", uri, self.recursive);
        let rdf_types = record
            .record_type()
            .lineage()
            .iter()
            .map(|t| NamedNode::new(t.rdf_type()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Frame::Record {
            record,
            subject: uri.to_named_node()?,
            rdf_types,
            type_index: 0,
            field_index: 0,
        })
    }

    /// Triple pointing from `subject` to `value`, plus the frame expanding it
    fn pointer(
        &self,
        subject: &NamedNode,
        predicate: RdfPredicate,
        value: &'a FieldValue,
    ) -> OdmResult<(Triple, Option<Frame<'a>>)> {
        match value {
            FieldValue::List(items) => {
                let bag = CollectionUri::generate().to_named_node()?;
                let child = self.recursive.then(|| Frame::Bag {
                    subject: bag.clone(),
                    items,
                    typed: false,
                    index: 0,
                });
                Ok((Triple::new(subject.clone(), predicate, bag), child))
            }
            FieldValue::Record(record) => {
                if !self.registry.contains(record.record_type()) {
                    return Err(OdmError::UnsupportedType {
                        type_name: record.title(),
                        value: value.to_string(),
                    });
                }
                let target = self.registry.instance_uri(record).to_named_node()?;
                let child = if self.recursive {
                    Some(self.record_frame(record)?)
                } else {
                    None
                };
                Ok((Triple::new(subject.clone(), predicate, target), child))
            }
            FieldValue::Literal(lit) => Ok((
                Triple::new(subject.clone(), predicate, literal::encode_literal(lit)),
                None,
            )),
            // Fields skip Null, so this is a Null inside a list
            FieldValue::Null => Err(OdmError::UnsupportedType {
                type_name: "null".to_string(),
                value: format!("list element of {}", subject),
            }),
        }
    }

    fn step(&self, frame: &mut Frame<'a>) -> OdmResult<Step<'a>> {
        match frame {
            Frame::Record {
                record,
                subject,
                rdf_types,
                type_index,
                field_index,
            } => {
                if let Some(rdf_type) = rdf_types.get(*type_index) {
                    *type_index += 1;
                    let triple = Triple::new(
                        subject.clone(),
                        RdfPredicate::from(vocab::node(rdf::TYPE)),
                        rdf_type.clone(),
                    );
                    return Ok(Step::Emit(triple, None));
                }

                let record: &'a Record = *record;
                let record_type = record.record_type();
                while let Some(field) = record_type.fields().get(*field_index) {
                    *field_index += 1;
                    let value = match record.get(field.name()) {
                        Some(FieldValue::Null) | None => continue,
                        Some(value) => value,
                    };
                    let predicate = RdfPredicate::new(record_type.predicate_of(field))?;
                    let (triple, child) = self.pointer(subject, predicate, value)?;
                    return Ok(Step::Emit(triple, child));
                }
                Ok(Step::Pop)
            }
            Frame::Bag {
                subject,
                items,
                typed,
                index,
            } => {
                if !*typed {
                    *typed = true;
                    let triple = Triple::new(
                        subject.clone(),
                        RdfPredicate::from(vocab::node(rdf::TYPE)),
                        RdfObject::NamedNode(vocab::node(rdf::BAG)),
                    );
                    return Ok(Step::Emit(triple, None));
                }
                let items: &'a [FieldValue] = *items;
                match items.get(*index) {
                    Some(item) => {
                        *index += 1;
                        let (triple, child) = self.pointer(subject, member_predicate(*index), item)?;
                        Ok(Step::Emit(triple, child))
                    }
                    None => Ok(Step::Pop),
                }
            }
        }
    }
}

impl<'a, 'r> Iterator for Triples<'a, 'r> {
    type Item = OdmResult<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            self.failed = true;
            return Some(Err(err));
        }
        if self.failed {
            return None;
        }

        loop {
            let mut frame = self.stack.pop()?;
            match self.step(&mut frame) {
                Ok(Step::Emit(triple, child)) => {
                    self.stack.push(frame);
                    if let Some(child) = child {
                        self.stack.push(child);
                    }
                    return Some(Ok(triple));
                }
                Ok(Step::Pop) => continue,
                Err(err) => {
                    self.failed = true;
                    self.stack.clear();
                    return Some(Err(err));
                }
            }
        }
    }
}

//! Record type definitions
//!
//! A [`RecordType`] is a named, ordered set of [`FieldDef`]s. Every record
//! type starts with the mandatory `identifier` field (a UUID mapped to
//! `dcterms:identifier`). Types may extend one parent type and inherit its
//! fields, which gives records a lineage of RDF classes.
//!
//! ```rust
//! use cellini::odm::{FieldDef, FieldValue, RecordType, ValueShape};
//!
//! let simple = RecordType::builder("Simple")
//!     .field(FieldDef::new("number", ValueShape::Integer))
//!     .field(FieldDef::new("phrase", ValueShape::String))
//!     .build()
//!     .unwrap();
//!
//! let record = simple
//!     .construct([("number", FieldValue::from(1i64)), ("phrase", FieldValue::from("test"))])
//!     .unwrap();
//! assert_eq!(record.get("number").and_then(FieldValue::as_i64), Some(1));
//! assert_eq!(simple.rdf_type(), "https://cellini.io/ns/Simple");
//! ```

use super::value::{FieldValue, LiteralValue, Record};
use crate::rdf::vocab;
use indexmap::IndexMap;
use oxiri::Iri;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Name of the mandatory identity field
pub const IDENTIFIER_FIELD: &str = "identifier";

/// Namespace used for RDF classes and field predicates unless overridden
pub const DEFAULT_NAMESPACE: &str = "https://cellini.io/ns/";

/// Schema errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A required field has no value and no default
    #[error("Missing field {field} on {type_name}")]
    MissingField { type_name: String, field: String },

    /// A value was supplied for an undeclared field
    #[error("Unknown field {field} on {type_name}")]
    UnknownField { type_name: String, field: String },

    /// A value does not conform to the field's shape
    #[error("Field {field} on {type_name} expects {expected}, got {actual}")]
    ShapeMismatch {
        type_name: String,
        field: String,
        expected: String,
        actual: String,
    },

    /// A field is declared twice
    #[error("Duplicate field {field} on {type_name}")]
    DuplicateField { type_name: String, field: String },

    /// Titles are embedded in colon-delimited URIs
    #[error("Invalid title {0}: titles may not contain ':'")]
    InvalidTitle(String),

    /// A class or predicate IRI derived from the type is invalid
    #[error("Invalid IRI {iri}: {reason}")]
    InvalidIri { iri: String, reason: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Declared shape of a field value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueShape {
    String,
    Uuid,
    Url,
    Boolean,
    Integer,
    NonNegativeInteger,
    Float,
    Date,
    DateTime,
    /// Reference to a record of the titled type (or one of its subtypes)
    Record(String),
    /// Ordered collection of values of one shape
    List(Box<ValueShape>),
    /// Any one of the member shapes.
    ///
    /// UUIDs are written as plain strings, so text that parses as a UUID
    /// conforms to a `Uuid` member ahead of every other member.
    Union(Vec<ValueShape>),
}

impl ValueShape {
    /// Shorthand for `List`
    pub fn list(inner: ValueShape) -> Self {
        ValueShape::List(Box::new(inner))
    }

    /// Shorthand for a reference to a record type
    pub fn record(record_type: &RecordType) -> Self {
        ValueShape::Record(record_type.title())
    }

    /// Conform a value to this shape.
    ///
    /// With `lax` unset only exact matches succeed; with `lax` set the
    /// coercions string→uuid, string→url and integer→float are also
    /// applied. Union members are tried in declaration order, once UUID text
    /// has had its chance at a `Uuid` member.
    pub fn conform(&self, value: &FieldValue, lax: bool) -> Option<FieldValue> {
        use LiteralValue as L;

        match (self, value) {
            (_, FieldValue::Null) => None,
            (ValueShape::Union(members), _) => {
                let uuid = members
                    .iter()
                    .any(|member| matches!(member, ValueShape::Uuid))
                    .then(|| ValueShape::Uuid.conform(value, true))
                    .flatten();
                uuid.or_else(|| members.iter().find_map(|member| member.conform(value, lax)))
            }
            (ValueShape::List(inner), FieldValue::List(items)) => items
                .iter()
                .map(|item| inner.conform(item, lax))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
            (ValueShape::Record(title), FieldValue::Record(record)) => {
                record.record_type().is_a(title).then(|| value.clone())
            }
            (shape, FieldValue::Literal(lit)) => {
                let conformed = match (shape, lit) {
                    (ValueShape::String, L::String(_))
                    | (ValueShape::Uuid, L::Uuid(_))
                    | (ValueShape::Boolean, L::Boolean(_))
                    | (ValueShape::Integer, L::Integer(_))
                    | (ValueShape::Float, L::Float(_))
                    | (ValueShape::Date, L::Date(_))
                    | (ValueShape::DateTime, L::DateTime(_)) => Some(lit.clone()),
                    (ValueShape::NonNegativeInteger, L::Integer(i)) if *i >= 0 => Some(lit.clone()),
                    (ValueShape::Url, L::Url(url)) if Iri::parse(url.as_str()).is_ok() => {
                        Some(lit.clone())
                    }
                    (ValueShape::Uuid, L::String(s)) if lax => Uuid::parse_str(s).ok().map(L::Uuid),
                    (ValueShape::Url, L::String(s)) if lax && Iri::parse(s.as_str()).is_ok() => {
                        Some(L::Url(s.clone()))
                    }
                    (ValueShape::Float, L::Integer(i)) if lax => Some(L::Float(*i as f64)),
                    _ => None,
                };
                conformed.map(FieldValue::Literal)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::String => write!(f, "string"),
            ValueShape::Uuid => write!(f, "uuid"),
            ValueShape::Url => write!(f, "url"),
            ValueShape::Boolean => write!(f, "boolean"),
            ValueShape::Integer => write!(f, "integer"),
            ValueShape::NonNegativeInteger => write!(f, "non-negative integer"),
            ValueShape::Float => write!(f, "float"),
            ValueShape::Date => write!(f, "date"),
            ValueShape::DateTime => write!(f, "datetime"),
            ValueShape::Record(title) => write!(f, "{}", title),
            ValueShape::List(inner) => write!(f, "list<{}>", inner),
            ValueShape::Union(members) => {
                let names: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "{}", names.join(" | "))
            }
        }
    }
}

/// Default applied when a field is not supplied
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// Fixed value
    Value(FieldValue),
    /// Value produced on every construction (e.g. a fresh UUID or timestamp)
    Factory(fn() -> FieldValue),
}

impl FieldDefault {
    fn produce(&self) -> FieldValue {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Factory(factory) => factory(),
        }
    }
}

/// Field declaration
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    shape: ValueShape,
    predicate: Option<String>,
    default: Option<FieldDefault>,
    nullable: bool,
}

impl FieldDef {
    /// Declare a required field
    pub fn new(name: impl Into<String>, shape: ValueShape) -> Self {
        Self {
            name: name.into(),
            shape,
            predicate: None,
            default: None,
            nullable: false,
        }
    }

    /// Map the field to an explicit predicate IRI instead of `namespace + name`
    pub fn predicate(mut self, iri: impl Into<String>) -> Self {
        self.predicate = Some(iri.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    pub fn default_factory(mut self, factory: fn() -> FieldValue) -> Self {
        self.default = Some(FieldDefault::Factory(factory));
        self
    }

    /// Allow `Null`; a missing nullable field without default becomes `Null`
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &ValueShape {
        &self.shape
    }

    pub fn explicit_predicate(&self) -> Option<&str> {
        self.predicate.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Conform a value to this field: strict match first, then lax coercion
    pub fn conform(&self, type_name: &str, value: FieldValue) -> SchemaResult<FieldValue> {
        if matches!(value, FieldValue::Null) && self.nullable {
            return Ok(value);
        }
        self.shape
            .conform(&value, false)
            .or_else(|| self.shape.conform(&value, true))
            .ok_or_else(|| SchemaError::ShapeMismatch {
                type_name: type_name.to_string(),
                field: self.name.clone(),
                expected: self.shape.to_string(),
                actual: format!("{} {}", value.type_name(), value),
            })
    }

    fn missing_value(&self, type_name: &str) -> SchemaResult<FieldValue> {
        match (&self.default, &self.shape) {
            (Some(default), _) => Ok(default.produce()),
            (None, _) if self.nullable => Ok(FieldValue::Null),
            (None, ValueShape::List(_)) => Ok(FieldValue::List(Vec::new())),
            (None, _) => Err(SchemaError::MissingField {
                type_name: type_name.to_string(),
                field: self.name.clone(),
            }),
        }
    }
}

fn new_identifier() -> FieldValue {
    FieldValue::Literal(LiteralValue::Uuid(Uuid::new_v4()))
}

/// Record type: a named, ordered set of fields
#[derive(Debug)]
pub struct RecordType {
    name: String,
    title_prefix: String,
    namespace: String,
    parent: Option<Arc<RecordType>>,
    fields: Vec<FieldDef>,
    version: Option<String>,
}

impl RecordType {
    /// Start declaring a record type
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Title prefix + name; unique within a registry
    pub fn title(&self) -> String {
        format!("{}{}", self.title_prefix, self.name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn parent(&self) -> Option<&Arc<RecordType>> {
        self.parent.as_ref()
    }

    /// Fields in declared order, inherited fields first
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// RDF class IRI: namespace + title
    pub fn rdf_type(&self) -> String {
        format!("{}{}", self.namespace, self.title())
    }

    /// This type followed by its ancestors, most-derived first
    pub fn lineage(&self) -> Vec<&RecordType> {
        let mut lineage = vec![self];
        let mut current = self.parent.as_deref();
        while let Some(parent) = current {
            lineage.push(parent);
            current = parent.parent.as_deref();
        }
        lineage
    }

    /// Whether this type is, or descends from, the titled type
    pub fn is_a(&self, title: &str) -> bool {
        self.lineage().iter().any(|t| t.title() == title)
    }

    /// Predicate IRI a field is stored under
    pub fn predicate_of(&self, field: &FieldDef) -> String {
        match &field.predicate {
            Some(iri) => iri.clone(),
            None => format!("{}{}", self.namespace, field.name),
        }
    }

    /// Field stored under a predicate IRI
    pub fn field_for_predicate(&self, predicate: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|field| self.predicate_of(field) == predicate)
    }

    /// Build a record: apply defaults, conform values, reject unknown keys.
    pub fn construct<I, K>(self: &Arc<Self>, values: I) -> SchemaResult<Record>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let title = self.title();
        let mut supplied: IndexMap<String, FieldValue> =
            values.into_iter().map(|(k, v)| (k.into(), v)).collect();

        if let Some(unknown) = supplied.keys().find(|key| self.field(key).is_none()) {
            return Err(SchemaError::UnknownField {
                type_name: title,
                field: unknown.clone(),
            });
        }

        let mut conformed = IndexMap::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match supplied.shift_remove(&field.name) {
                Some(value) => value,
                None => field.missing_value(&title)?,
            };
            conformed.insert(field.name.clone(), field.conform(&title, value)?);
        }

        let identifier = conformed
            .get(IDENTIFIER_FIELD)
            .and_then(FieldValue::as_uuid)
            .ok_or_else(|| SchemaError::MissingField {
                type_name: title.clone(),
                field: IDENTIFIER_FIELD.to_string(),
            })?;

        Ok(Record::from_parts(Arc::clone(self), identifier, conformed))
    }
}

/// Builder for [`RecordType`]
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    title_prefix: Option<String>,
    namespace: Option<String>,
    parent: Option<Arc<RecordType>>,
    fields: Vec<FieldDef>,
    version: Option<String>,
}

impl RecordTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title_prefix: None,
            namespace: None,
            parent: None,
            fields: Vec::new(),
            version: None,
        }
    }

    /// Prefix prepended to the name to form the title
    pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }

    /// Namespace for the RDF class and derived predicates
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Inherit fields, namespace and title prefix from a parent type
    pub fn extends(mut self, parent: &Arc<RecordType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn build(self) -> SchemaResult<Arc<RecordType>> {
        let parent = self.parent.as_deref();
        let title_prefix = self
            .title_prefix
            .or_else(|| parent.map(|p| p.title_prefix.clone()))
            .unwrap_or_default();
        let namespace = self
            .namespace
            .or_else(|| parent.map(|p| p.namespace.clone()))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let title = format!("{}{}", title_prefix, self.name);
        if title.contains(':') {
            return Err(SchemaError::InvalidTitle(title));
        }

        let mut fields = match parent {
            Some(parent) => parent.fields.clone(),
            None => vec![FieldDef::new(IDENTIFIER_FIELD, ValueShape::Uuid)
                .predicate(vocab::dcterms::IDENTIFIER)
                .default_factory(new_identifier)],
        };
        let inherited = fields.len();
        for field in self.fields {
            match fields.iter().position(|f| f.name == field.name) {
                Some(i) if i >= inherited || field.name == IDENTIFIER_FIELD => {
                    return Err(SchemaError::DuplicateField {
                        type_name: title,
                        field: field.name,
                    });
                }
                // Redeclaring an inherited field overrides it in place
                Some(i) => fields[i] = field,
                None => fields.push(field),
            }
        }

        let record_type = RecordType {
            name: self.name,
            title_prefix,
            namespace,
            parent: self.parent,
            fields,
            version: self.version,
        };

        check_iri(&record_type.rdf_type())?;
        for field in &record_type.fields {
            check_iri(&record_type.predicate_of(field))?;
        }
        Ok(Arc::new(record_type))
    }
}

fn check_iri(iri: &str) -> SchemaResult<()> {
    Iri::parse(iri).map(|_| ()).map_err(|e| SchemaError::InvalidIri {
        iri: iri.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> Arc<RecordType> {
        RecordType::builder("Simple")
            .field(FieldDef::new("number", ValueShape::Integer))
            .field(FieldDef::new("phrase", ValueShape::String))
            .build()
            .unwrap()
    }

    #[test]
    fn test_identifier_is_first_field() {
        let t = simple();
        let names: Vec<&str> = t.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["identifier", "number", "phrase"]);
        assert_eq!(
            t.predicate_of(&t.fields()[0]),
            "http://purl.org/dc/terms/identifier"
        );
        assert_eq!(t.predicate_of(&t.fields()[1]), "https://cellini.io/ns/number");
    }

    #[test]
    fn test_custom_namespace_and_prefix() {
        let t = RecordType::builder("Annotation")
            .namespace("http://www.w3.org/ns/oa#")
            .title_prefix("Oa")
            .field(FieldDef::new("a_field", ValueShape::String).nullable())
            .build()
            .unwrap();
        assert_eq!(t.title(), "OaAnnotation");
        assert_eq!(t.rdf_type(), "http://www.w3.org/ns/oa#OaAnnotation");
        assert_eq!(
            t.field_for_predicate("http://www.w3.org/ns/oa#a_field").map(|f| f.name()),
            Some("a_field")
        );
    }

    #[test]
    fn test_title_may_not_contain_colon() {
        let result = RecordType::builder("Bad:Name").build();
        assert!(matches!(result, Err(SchemaError::InvalidTitle(_))));
    }

    #[test]
    fn test_extends_inherits_fields_and_lineage() {
        let base = simple();
        let complex = RecordType::builder("Complex")
            .extends(&base)
            .field(FieldDef::new("many", ValueShape::list(ValueShape::String)))
            .build()
            .unwrap();

        let names: Vec<&str> = complex.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["identifier", "number", "phrase", "many"]);
        let lineage: Vec<String> = complex.lineage().iter().map(|t| t.rdf_type()).collect();
        assert_eq!(
            lineage,
            vec!["https://cellini.io/ns/Complex", "https://cellini.io/ns/Simple"]
        );
        assert!(complex.is_a("Simple"));
        assert!(!base.is_a("Complex"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordType::builder("Twice")
            .field(FieldDef::new("a", ValueShape::String))
            .field(FieldDef::new("a", ValueShape::Integer))
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn test_construct_applies_defaults() {
        let t = RecordType::builder("Defaults")
            .field(FieldDef::new("flag", ValueShape::Boolean).default_value(true))
            .field(FieldDef::new("note", ValueShape::String).nullable())
            .field(FieldDef::new("tags", ValueShape::list(ValueShape::String)))
            .build()
            .unwrap();

        let a = t.construct(Vec::<(String, FieldValue)>::new()).unwrap();
        let b = t.construct(Vec::<(String, FieldValue)>::new()).unwrap();
        assert_ne!(a.identifier(), b.identifier());
        assert_eq!(a.get("flag").and_then(FieldValue::as_bool), Some(true));
        assert_eq!(a.get("note"), Some(&FieldValue::Null));
        assert_eq!(a.get("tags"), Some(&FieldValue::List(vec![])));
    }

    #[test]
    fn test_construct_errors() {
        let t = simple();
        let missing = t.construct([("number", FieldValue::from(1i64))]);
        assert!(matches!(missing, Err(SchemaError::MissingField { .. })));

        let unknown = t.construct([
            ("number", FieldValue::from(1i64)),
            ("phrase", FieldValue::from("x")),
            ("extra", FieldValue::from("y")),
        ]);
        assert!(matches!(unknown, Err(SchemaError::UnknownField { .. })));

        let mismatch = t.construct([
            ("number", FieldValue::from("one")),
            ("phrase", FieldValue::from("x")),
        ]);
        assert!(matches!(mismatch, Err(SchemaError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_lax_coercions() {
        let id = Uuid::new_v4();
        let t = RecordType::builder("Coerced")
            .field(FieldDef::new("ratio", ValueShape::Float))
            .field(FieldDef::new("home", ValueShape::Url))
            .build()
            .unwrap();
        let record = t
            .construct([
                ("identifier", FieldValue::from(id.to_string())),
                ("ratio", FieldValue::from(2i64)),
                ("home", FieldValue::from("http://example.com/")),
            ])
            .unwrap();
        assert_eq!(record.identifier(), id);
        assert_eq!(record.get("ratio").and_then(FieldValue::as_f64), Some(2.0));
        assert_eq!(
            record.get("home"),
            Some(&FieldValue::url("http://example.com/"))
        );
    }

    #[test]
    fn test_union_prefers_strict_member() {
        let shape = ValueShape::Union(vec![ValueShape::String, ValueShape::Url]);
        let text = FieldValue::from("http://example.com/");
        // a string matches the String member exactly, so it is not coerced
        assert_eq!(shape.conform(&text, false), Some(text.clone()));

        let shape = ValueShape::Union(vec![ValueShape::Integer, ValueShape::Float]);
        let float = FieldValue::from(1.5);
        assert_eq!(shape.conform(&float, false), Some(float));
    }

    #[test]
    fn test_union_reads_uuid_text_as_uuid() {
        let id = Uuid::new_v4();
        let shape = ValueShape::Union(vec![ValueShape::String, ValueShape::Uuid]);
        assert_eq!(
            shape.conform(&FieldValue::from(id.to_string()), false),
            Some(FieldValue::from(id))
        );
        assert_eq!(shape.conform(&FieldValue::from(id), false), Some(FieldValue::from(id)));
        let word = FieldValue::from("not a uuid");
        assert_eq!(shape.conform(&word, false), Some(word.clone()));

        let plain = ValueShape::Union(vec![ValueShape::String, ValueShape::Integer]);
        let text = FieldValue::from(id.to_string());
        assert_eq!(plain.conform(&text, false), Some(text.clone()));
    }

    #[test]
    fn test_non_negative_integer() {
        let shape = ValueShape::NonNegativeInteger;
        assert!(shape.conform(&FieldValue::from(0i64), false).is_some());
        assert!(shape.conform(&FieldValue::from(-1i64), true).is_none());
    }

    #[test]
    fn test_record_set_conforms() {
        let t = simple();
        let mut record = t
            .construct([("number", FieldValue::from(1i64)), ("phrase", FieldValue::from("x"))])
            .unwrap();
        record.set("number", 2i64).unwrap();
        assert_eq!(record.get("number").and_then(FieldValue::as_i64), Some(2));
        assert!(record.set("number", "two").is_err());

        let id = Uuid::new_v4();
        record.set("identifier", id).unwrap();
        assert_eq!(record.identifier(), id);
    }
}

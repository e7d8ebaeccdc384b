//! Record values
//!
//! A [`Record`] holds one [`FieldValue`] per declared field of its
//! [`RecordType`]. Field values form a closed variant: serialization and
//! resolution switch exhaustively on it.

use super::schema::{RecordType, SchemaError, SchemaResult};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Primitive value carried by a typed literal
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Uuid(Uuid),
    /// Absolute IRI, checked when conformed to a URL field
    Url(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl LiteralValue {
    /// Name of the primitive kind, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::String(_) => "string",
            LiteralValue::Uuid(_) => "uuid",
            LiteralValue::Url(_) => "url",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Integer(_) => "integer",
            LiteralValue::Float(_) => "float",
            LiteralValue::Date(_) => "date",
            LiteralValue::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) | LiteralValue::Url(s) => write!(f, "{}", s),
            LiteralValue::Uuid(u) => write!(f, "{}", u),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Integer(i) => write!(f, "{}", i),
            LiteralValue::Float(x) => write!(f, "{}", x),
            LiteralValue::Date(d) => write!(f, "{}", d),
            LiteralValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Value of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent value; produces no triple
    Null,
    Literal(LiteralValue),
    /// Reference to another record
    Record(Box<Record>),
    /// Ordered collection
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Build a URL value
    pub fn url(url: impl Into<String>) -> Self {
        FieldValue::Literal(LiteralValue::Url(url.into()))
    }

    /// Name of the value kind, used in error messages
    pub fn type_name(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Literal(lit) => lit.type_name().to_string(),
            FieldValue::Record(record) => record.title(),
            FieldValue::List(_) => "list".to_string(),
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            FieldValue::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Literal(LiteralValue::String(s)) | FieldValue::Literal(LiteralValue::Url(s)) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Literal(LiteralValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Literal(LiteralValue::Float(x)) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Literal(LiteralValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Literal(LiteralValue::Uuid(u)) => Some(*u),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Literal(LiteralValue::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Literal(lit) => write!(f, "{}", lit),
            FieldValue::Record(record) => write!(f, "{}({})", record.title(), record.identifier()),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! literal_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for LiteralValue {
                fn from(value: $ty) -> Self {
                    LiteralValue::$variant(value.into())
                }
            }

            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Literal(LiteralValue::from(value))
                }
            }
        )*
    };
}

literal_from! {
    String => String,
    &str => String,
    Uuid => Uuid,
    bool => Boolean,
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    f64 => Float,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
}

impl From<LiteralValue> for FieldValue {
    fn from(value: LiteralValue) -> Self {
        FieldValue::Literal(value)
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::Record(Box::new(record))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Instance of a [`RecordType`]
///
/// Records are built by [`RecordType::construct`], which guarantees that
/// every declared field has a conforming value and that `identifier` holds
/// a UUID.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    identifier: Uuid,
    values: IndexMap<String, FieldValue>,
}

impl Record {
    pub(crate) fn from_parts(
        record_type: Arc<RecordType>,
        identifier: Uuid,
        values: IndexMap<String, FieldValue>,
    ) -> Self {
        Self {
            record_type,
            identifier,
            values,
        }
    }

    /// The record's type
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Title of the record's type
    pub fn title(&self) -> String {
        self.record_type.title()
    }

    /// Identity of the record within its type
    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Iterate fields in declared order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Replace a field value, conforming it to the field's shape
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> SchemaResult<()> {
        let def = self
            .record_type
            .field(field)
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: self.record_type.title(),
                field: field.to_string(),
            })?;
        let value = def.conform(&self.record_type.title(), value.into())?;
        if let FieldValue::Literal(LiteralValue::Uuid(identifier)) = &value {
            if def.name() == super::schema::IDENTIFIER_FIELD {
                self.identifier = *identifier;
            }
        }
        self.values.insert(field.to_string(), value);
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.title() == other.record_type.title() && self.values == other.values
    }
}

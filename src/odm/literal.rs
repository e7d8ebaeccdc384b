//! Literal codec
//!
//! Converts primitive values to typed RDF literals and back. Decoding
//! dispatches on the literal's datatype IRI, never on the declared field
//! shape.

use super::error::{OdmError, OdmResult};
use super::schema::ValueShape;
use super::value::{FieldValue, LiteralValue};
use crate::rdf::vocab::{self, xsd};
use crate::rdf::Literal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Encode a field value as a literal.
///
/// `Null` encodes to nothing. When a shape is given the value is conformed
/// to it first, so a string declared as a URL encodes as `xsd:anyURI`.
pub fn encode(value: &FieldValue, shape: Option<&ValueShape>) -> OdmResult<Option<Literal>> {
    if let FieldValue::Null = value {
        return Ok(None);
    }

    let conformed;
    let value = match shape {
        Some(shape) => {
            conformed = shape
                .conform(value, false)
                .or_else(|| shape.conform(value, true))
                .ok_or_else(|| unsupported(&shape.to_string(), value))?;
            &conformed
        }
        None => value,
    };

    match value {
        FieldValue::Literal(lit) => Ok(Some(encode_literal(lit))),
        other => Err(unsupported(&other.type_name(), other)),
    }
}

/// Encode a primitive value
pub fn encode_literal(value: &LiteralValue) -> Literal {
    match value {
        LiteralValue::String(s) => Literal::new_simple_literal(s.as_str()),
        LiteralValue::Uuid(u) => Literal::new_simple_literal(u.to_string()),
        LiteralValue::Url(url) => typed(url.as_str(), xsd::ANY_URI),
        LiteralValue::Boolean(b) => typed(if *b { "true" } else { "false" }, xsd::BOOLEAN),
        LiteralValue::Integer(i) => typed(i.to_string(), xsd::INTEGER),
        LiteralValue::Float(x) => typed(format_float(*x), xsd::FLOAT),
        LiteralValue::Date(d) => typed(d.format("%Y-%m-%d").to_string(), xsd::DATE),
        LiteralValue::DateTime(dt) => {
            typed(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true), xsd::DATE_TIME)
        }
    }
}

/// Decode a literal by its datatype
pub fn decode(literal: &Literal) -> OdmResult<LiteralValue> {
    let value = literal.value();
    match literal.datatype_str() {
        xsd::STRING => Ok(LiteralValue::String(value.to_string())),
        xsd::ANY_URI => Ok(LiteralValue::Url(value.to_string())),
        xsd::BOOLEAN => match value {
            "true" => Ok(LiteralValue::Boolean(true)),
            "false" => Ok(LiteralValue::Boolean(false)),
            _ => Err(invalid(value, "boolean")),
        },
        xsd::INTEGER | xsd::NON_POSITIVE_INTEGER => value
            .parse::<i64>()
            .map(LiteralValue::Integer)
            .map_err(|_| invalid(value, "integer")),
        xsd::FLOAT => parse_float(value)
            .map(LiteralValue::Float)
            .ok_or_else(|| invalid(value, "float")),
        xsd::DATE_TIME => parse_datetime(value)
            .map(LiteralValue::DateTime)
            .ok_or_else(|| invalid(value, "dateTime")),
        xsd::DATE => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(LiteralValue::Date)
            .map_err(|_| invalid(value, "date")),
        datatype => Err(OdmError::UnsupportedType {
            type_name: datatype.to_string(),
            value: value.to_string(),
        }),
    }
}

fn typed(value: impl Into<String>, datatype: &'static str) -> Literal {
    Literal::new_typed_literal(value, vocab::node(datatype))
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x == f64::INFINITY {
        "INF".to_string()
    } else if x == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        x.to_string()
    }
}

fn parse_float(value: &str) -> Option<f64> {
    match value {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// RFC 3339 first; timestamps without an offset are read as UTC
fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn unsupported(type_name: &str, value: &FieldValue) -> OdmError {
    OdmError::UnsupportedType {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}

fn invalid(value: &str, datatype: &str) -> OdmError {
    OdmError::InvalidLiteral {
        value: value.to_string(),
        datatype: datatype.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::NamedNode;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn lit(value: LiteralValue) -> Literal {
        encode(&FieldValue::Literal(value), None).unwrap().unwrap()
    }

    #[test]
    fn test_null_encodes_to_nothing() {
        assert!(encode(&FieldValue::Null, None).unwrap().is_none());
        assert!(encode(&FieldValue::Null, Some(&ValueShape::String)).unwrap().is_none());
    }

    #[test]
    fn test_datatype_tags() {
        assert_eq!(lit(LiteralValue::String("a".into())).datatype_str(), xsd::STRING);
        assert_eq!(lit(LiteralValue::Uuid(Uuid::nil())).datatype_str(), xsd::STRING);
        assert_eq!(lit(LiteralValue::Url("http://a.b/".into())).datatype_str(), xsd::ANY_URI);
        assert_eq!(lit(LiteralValue::Boolean(true)).value(), "true");
        assert_eq!(lit(LiteralValue::Integer(-3)).datatype_str(), xsd::INTEGER);
        assert_eq!(lit(LiteralValue::Float(1.5)).datatype_str(), xsd::FLOAT);
        assert_eq!(
            lit(LiteralValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())).value(),
            "2024-02-29"
        );
    }

    #[test]
    fn test_declared_shape_conforms_before_encoding() {
        let url = encode(&FieldValue::from("http://example.com/"), Some(&ValueShape::Url))
            .unwrap()
            .unwrap();
        assert_eq!(url.datatype_str(), xsd::ANY_URI);

        let rejected = encode(&FieldValue::from("nope"), Some(&ValueShape::Integer));
        assert!(matches!(rejected, Err(OdmError::UnsupportedType { .. })));
    }

    #[test]
    fn test_roundtrip_primitives() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap()
            + chrono::Duration::microseconds(123_456);
        let values = vec![
            LiteralValue::String("héllo \"world\"".into()),
            LiteralValue::Url("https://cellini.io/ns/".into()),
            LiteralValue::Boolean(false),
            LiteralValue::Integer(i64::MIN),
            LiteralValue::Float(0.1),
            LiteralValue::Float(f64::NEG_INFINITY),
            LiteralValue::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
            LiteralValue::DateTime(dt),
        ];
        for value in values {
            assert_eq!(decode(&encode_literal(&value)).unwrap(), value);
        }
    }

    #[test]
    fn test_float_special_values() {
        assert_eq!(encode_literal(&LiteralValue::Float(f64::INFINITY)).value(), "INF");
        assert_eq!(encode_literal(&LiteralValue::Float(f64::NAN)).value(), "NaN");
        match decode(&encode_literal(&LiteralValue::Float(f64::NAN))).unwrap() {
            LiteralValue::Float(x) => assert!(x.is_nan()),
            other => panic!("Expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_rejects_other_strings() {
        let literal = Literal::new_typed_literal("yes", NamedNode::new(xsd::BOOLEAN).unwrap());
        match decode(&literal) {
            Err(OdmError::InvalidLiteral { value, .. }) => assert_eq!(value, "yes"),
            other => panic!("Expected InvalidLiteral, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_integer_decodes() {
        let literal = Literal::new_typed_literal(
            "-7",
            NamedNode::new(xsd::NON_POSITIVE_INTEGER).unwrap(),
        );
        assert_eq!(decode(&literal).unwrap(), LiteralValue::Integer(-7));
    }

    #[test]
    fn test_naive_datetime_read_as_utc() {
        let literal = Literal::new_typed_literal(
            "2024-05-01T12:30:15.5",
            NamedNode::new(xsd::DATE_TIME).unwrap(),
        );
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap()
            + chrono::Duration::milliseconds(500);
        assert_eq!(decode(&literal).unwrap(), LiteralValue::DateTime(expected));
    }

    #[test]
    fn test_unknown_datatype() {
        let literal = Literal::new_typed_literal(
            "AAEC",
            NamedNode::new("http://www.w3.org/2001/XMLSchema#base64Binary").unwrap(),
        );
        assert!(matches!(decode(&literal), Err(OdmError::UnsupportedType { .. })));
    }

    #[test]
    fn test_records_and_lists_are_not_literals() {
        let list = FieldValue::from(vec![1i64]);
        assert!(matches!(encode(&list, None), Err(OdmError::UnsupportedType { .. })));
    }
}

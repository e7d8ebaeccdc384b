use cellini::odm::{
    FieldDef, FieldValue, LiteralValue, ObjectMapper, OdmError, RecordType, Resolver,
    Serializer, TypeRegistry, ValueShape,
};
use cellini::rdf::vocab::rdf;
use cellini::rdf::{Literal, NamedNode, RdfObject, RdfStore, Triple, TripleStore};
use chrono::NaiveDate;
use std::sync::Arc;

fn register(types: &[&Arc<RecordType>]) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for record_type in types {
        registry.register(record_type).unwrap();
    }
    registry
}

fn round_trip(registry: &TypeRegistry, record: &cellini::Record) -> cellini::Record {
    let mut mapper = ObjectMapper::new(registry, RdfStore::new());
    let record_type = Arc::clone(record.record_type());
    let mut objects = mapper.objects(&record_type).unwrap();
    objects.save(record, true).unwrap();
    objects.get(record.identifier()).unwrap()
}

#[test]
fn test_list_preserves_order() {
    let tagged = RecordType::builder("Tagged")
        .field(FieldDef::new("tags", ValueShape::list(ValueShape::String)))
        .build()
        .unwrap();
    let registry = register(&[&tagged]);
    let tags: Vec<&str> = vec!["zeta", "alpha", "mu", "beta", "omega", "alpha"];
    let record = tagged
        .construct([("tags", FieldValue::from(tags.clone()))])
        .unwrap();

    let resolved = round_trip(&registry, &record);
    let items: Vec<&str> = resolved
        .get("tags")
        .and_then(|v| v.as_list())
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(items, tags);
}

#[test]
fn test_nested_lists() {
    let grid = RecordType::builder("Grid")
        .field(FieldDef::new(
            "rows",
            ValueShape::list(ValueShape::list(ValueShape::Integer)),
        ))
        .build()
        .unwrap();
    let registry = register(&[&grid]);
    let rows = vec![vec![1i64, 2, 3], vec![4], vec![5, 6]];
    let record = grid
        .construct([("rows", FieldValue::from(rows))])
        .unwrap();

    // 3 own triples, outer bag (1 type + 3 members), inner bags (3 types + 6 members)
    let triples = Serializer::new(&registry).to_triples(&record, true).unwrap();
    assert_eq!(triples.len(), 3 + 4 + 9);
    assert_eq!(
        triples
            .iter()
            .filter(|t| t.object.as_named_node().map(|n| n.as_str()) == Some(rdf::BAG))
            .count(),
        4
    );

    assert_eq!(round_trip(&registry, &record), record);
}

#[test]
fn test_list_of_records() {
    let track = RecordType::builder("Track")
        .field(FieldDef::new("title", ValueShape::String))
        .build()
        .unwrap();
    let album = RecordType::builder("Album")
        .field(FieldDef::new("tracks", ValueShape::list(ValueShape::record(&track))))
        .build()
        .unwrap();
    let registry = register(&[&track, &album]);
    let tracks: Vec<cellini::Record> = ["One", "Two", "Three"]
        .iter()
        .map(|title| track.construct([("title", FieldValue::from(*title))]).unwrap())
        .collect();
    let record = album
        .construct([("tracks", FieldValue::from(tracks.clone()))])
        .unwrap();

    let resolved = round_trip(&registry, &record);
    let resolved_tracks = resolved.get("tracks").and_then(|v| v.as_list()).unwrap();
    assert_eq!(resolved_tracks.len(), 3);
    for (original, resolved) in tracks.iter().zip(resolved_tracks) {
        assert_eq!(resolved.as_record(), Some(original));
    }
}

#[test]
fn test_empty_list_round_trips() {
    let tagged = RecordType::builder("Tagged")
        .field(FieldDef::new("tags", ValueShape::list(ValueShape::String)).nullable())
        .build()
        .unwrap();
    let registry = register(&[&tagged]);
    let record = tagged
        .construct([("tags", FieldValue::List(Vec::new()))])
        .unwrap();

    // type, identifier, pointer to the bag and the bag's own type
    let triples = Serializer::new(&registry).to_triples(&record, true).unwrap();
    assert_eq!(triples.len(), 4);
    let resolved = round_trip(&registry, &record);
    assert_eq!(resolved.get("tags"), Some(&FieldValue::List(Vec::new())));
    assert_eq!(resolved, record);

    let absent = tagged.construct([("tags", FieldValue::Null)]).unwrap();
    let triples = Serializer::new(&registry).to_triples(&absent, true).unwrap();
    assert_eq!(triples.len(), 2);
    assert_eq!(round_trip(&registry, &absent), absent);
}

#[test]
fn test_union_fields_keep_concrete_shape() {
    let cat = RecordType::builder("Cat")
        .field(FieldDef::new("name", ValueShape::String))
        .build()
        .unwrap();
    let owner = RecordType::builder("Owner")
        .field(FieldDef::new(
            "pet",
            ValueShape::Union(vec![
                ValueShape::record(&cat),
                ValueShape::Url,
                ValueShape::String,
            ]),
        ))
        .build()
        .unwrap();
    let registry = register(&[&cat, &owner]);

    let felix = cat.construct([("name", FieldValue::from("Felix"))]).unwrap();
    for pet in [
        FieldValue::from(felix),
        FieldValue::url("https://example.org/pets/rex"),
        FieldValue::from("a goldfish"),
    ] {
        let record = owner.construct([("pet", pet.clone())]).unwrap();
        let resolved = round_trip(&registry, &record);
        assert_eq!(resolved.get("pet"), Some(&pet));
    }

    assert!(owner
        .construct([("pet", FieldValue::from(3i64))])
        .is_err());
}

#[test]
fn test_union_keeps_uuid_over_string() {
    let ticket = RecordType::builder("Ticket")
        .field(FieldDef::new(
            "reference",
            ValueShape::Union(vec![ValueShape::String, ValueShape::Uuid]),
        ))
        .build()
        .unwrap();
    let registry = register(&[&ticket]);

    for reference in [
        FieldValue::from(uuid::Uuid::new_v4()),
        FieldValue::from("desk 4"),
    ] {
        let record = ticket.construct([("reference", reference.clone())]).unwrap();
        let resolved = round_trip(&registry, &record);
        assert_eq!(resolved.get("reference"), Some(&reference));
        assert_eq!(resolved, record);
    }
}

#[test]
fn test_lax_coercions() {
    let link = RecordType::builder("Link")
        .field(FieldDef::new("target", ValueShape::Url))
        .field(FieldDef::new("weight", ValueShape::Float))
        .build()
        .unwrap();
    let registry = register(&[&link]);
    let record = link
        .construct([
            ("target", FieldValue::from("https://example.org/")),
            ("weight", FieldValue::from(2i64)),
        ])
        .unwrap();
    assert_eq!(
        record.get("target"),
        Some(&FieldValue::url("https://example.org/"))
    );
    assert_eq!(record.get("weight").and_then(|v| v.as_f64()), Some(2.0));
    assert_eq!(round_trip(&registry, &record), record);
}

#[test]
fn test_scalar_round_trip() {
    let sample = RecordType::builder("Sample")
        .field(FieldDef::new("flag", ValueShape::Boolean))
        .field(FieldDef::new("count", ValueShape::NonNegativeInteger))
        .field(FieldDef::new("ratio", ValueShape::Float))
        .field(FieldDef::new("peak", ValueShape::Float))
        .field(FieldDef::new("day", ValueShape::Date))
        .field(FieldDef::new("token", ValueShape::Uuid))
        .build()
        .unwrap();
    let registry = register(&[&sample]);
    let record = sample
        .construct([
            ("flag", FieldValue::from(false)),
            ("count", FieldValue::from(12i64)),
            ("ratio", FieldValue::from(0.25f64)),
            ("peak", FieldValue::from(f64::INFINITY)),
            ("day", FieldValue::from(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())),
            ("token", FieldValue::from(uuid::Uuid::new_v4())),
        ])
        .unwrap();

    assert_eq!(round_trip(&registry, &record), record);
    let negative = sample.field("count").unwrap().conform("Sample", FieldValue::from(-1i64));
    assert!(negative.is_err());
}

#[test]
fn test_defaults_apply() {
    let counter = RecordType::builder("Counter")
        .field(FieldDef::new("value", ValueShape::Integer).default_value(10i64))
        .build()
        .unwrap();
    let a = counter.construct(Vec::<(String, FieldValue)>::new()).unwrap();
    let b = counter.construct(Vec::<(String, FieldValue)>::new()).unwrap();
    assert_eq!(a.get("value").and_then(|v| v.as_i64()), Some(10));
    assert_ne!(a.identifier(), b.identifier());
}

#[test]
fn test_invalid_boolean_literal() {
    let flagged = RecordType::builder("Flagged")
        .field(FieldDef::new("flag", ValueShape::Boolean))
        .build()
        .unwrap();
    let registry = register(&[&flagged]);
    let record = flagged.construct([("flag", FieldValue::from(true))]).unwrap();

    let mut store = RdfStore::new();
    for triple in Serializer::new(&registry).to_triples(&record, true).unwrap() {
        let is_flag = matches!(&triple.object, RdfObject::Literal(lit) if lit.value() == "true");
        let triple = if is_flag {
            Triple::new(
                triple.subject.clone(),
                triple.predicate.clone(),
                Literal::new_typed_literal(
                    "yes",
                    NamedNode::new("http://www.w3.org/2001/XMLSchema#boolean").unwrap(),
                ),
            )
        } else {
            triple
        };
        store.add(triple).unwrap();
    }

    let uri = registry.instance_uri(&record);
    match Resolver::new(&registry, &store).resolve(uri.as_str()) {
        Err(OdmError::InvalidLiteral { value, .. }) => assert_eq!(value, "yes"),
        other => panic!("Expected InvalidLiteral, got {:?}", other),
    }
}

#[test]
fn test_literal_values_display() {
    assert_eq!(LiteralValue::Integer(3).to_string(), "3");
    assert_eq!(FieldValue::from("x").type_name(), "string");
}

use anyhow::Result;
use cellini::odm::{FieldDef, FieldValue, ObjectMapper, RecordType, TypeRegistry, ValueShape};
use cellini::rdf::RdfStore;
use cellini::OdmConfig;
use chrono::Utc;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Cellini ODM v{}", cellini::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading config from {}", path);
            OdmConfig::from_file(&path)?
        }
        None => OdmConfig::default(),
    };

    let (article, author) = demo_types()?;
    let mut registry = TypeRegistry::from_config(&config);
    registry.register(&author)?;
    registry.register(&article)?;
    println!("✓ Registered {} record types under {}", registry.len(), registry.uri_prefix());

    let mut mapper = ObjectMapper::with_config(&registry, RdfStore::new(), &config);
    demo_round_trip(&mut mapper, &article, &author)?;
    demo_queries(&mut mapper, &article, &author)?;

    Ok(())
}

fn demo_types() -> Result<(Arc<RecordType>, Arc<RecordType>)> {
    let author = RecordType::builder("Author")
        .field(FieldDef::new("name", ValueShape::String))
        .field(FieldDef::new("homepage", ValueShape::Url).nullable())
        .build()?;

    let article = RecordType::builder("Article")
        .field(FieldDef::new("headline", ValueShape::String))
        .field(FieldDef::new("authors", ValueShape::list(ValueShape::record(&author))))
        .field(FieldDef::new("keywords", ValueShape::list(ValueShape::String)).nullable())
        .field(
            FieldDef::new("published", ValueShape::DateTime)
                .default_factory(|| FieldValue::from(Utc::now())),
        )
        .build()?;

    Ok((article, author))
}

fn demo_round_trip(
    mapper: &mut ObjectMapper<'_, RdfStore>,
    article: &Arc<RecordType>,
    author: &Arc<RecordType>,
) -> Result<()> {
    println!("=== Demo 1: Round Trip ===");

    let ada = author.construct([
        ("name", FieldValue::from("Ada")),
        ("homepage", FieldValue::url("https://example.org/ada")),
    ])?;
    let grace = author.construct([("name", FieldValue::from("Grace"))])?;
    let post = article.construct([
        ("headline", FieldValue::from("Triples all the way down")),
        ("authors", FieldValue::from(vec![ada.clone(), grace.clone()])),
        ("keywords", FieldValue::from(vec!["rdf", "odm"])),
    ])?;

    let triples = mapper.serializer().to_triples(&post, true)?;
    println!("✓ Serialized article into {} triples", triples.len());
    for triple in triples.iter().take(4) {
        println!("  {}", triple);
    }

    mapper.objects(article)?.save(&post, true)?;
    println!("✓ Saved article ({} triples in store)", mapper.store().len());

    let resolved = mapper.objects(article)?.get(post.identifier())?;
    println!(
        "✓ Resolved {} with {} authors (equal: {})",
        resolved.title(),
        resolved.get("authors").and_then(|v| v.as_list()).map_or(0, |l| l.len()),
        resolved == post
    );
    println!();
    Ok(())
}

fn demo_queries(
    mapper: &mut ObjectMapper<'_, RdfStore>,
    article: &Arc<RecordType>,
    author: &Arc<RecordType>,
) -> Result<()> {
    println!("=== Demo 2: Queries ===");

    let mut authors = mapper.objects(author)?;
    let linus = author.construct([("name", FieldValue::from("Linus"))])?;
    authors.create(&linus, true)?;
    println!("✓ Created author Linus (exists: {})", authors.exists(&linus)?);

    let all = authors.all()?;
    println!("✓ {} authors stored", all.count()?);
    for record in all.iter()? {
        let record = record?;
        println!(
            "  {}",
            record.get("name").and_then(|v| v.as_str()).unwrap_or("?")
        );
    }

    let named = authors.filter([("name", "Grace")])?;
    println!("  Query: {}", named.sparql());
    println!("✓ Filter name = Grace matched {}", named.count()?);

    authors.delete(&linus)?;
    println!("✓ Deleted Linus (exists: {})", authors.exists(&linus)?);

    let articles = mapper.objects(article)?;
    println!("✓ {} articles stored", articles.all()?.count()?);
    Ok(())
}

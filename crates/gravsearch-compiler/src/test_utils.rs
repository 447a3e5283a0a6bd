//! Test fixtures: a small "books" ontology and statement helpers.

use gravsearch_core::vocab::{knora_api, rdf};
use gravsearch_core::{OntologySnapshot, Schema};

use crate::pattern::{Entity, GravsearchQuery, Literal, Pattern, StatementPattern};

pub const BOOKS: &str = "http://www.knora.org/ontology/0001/books#";
pub const BOOKS_COMPLEX: &str = "http://0.0.0.0:3333/ontology/0001/books/v2#";
pub const BOOKS_SIMPLE: &str = "http://0.0.0.0:3333/ontology/0001/books/simple/v2#";

const BOOKS_JSON: &str = indoc::indoc! {r#"
    {
        "classes": [
            {
                "iri": "http://www.knora.org/ontology/0001/books#Book",
                "subClassOf": ["http://www.knora.org/ontology/knora-base#Resource"],
                "cardinalities": {
                    "http://www.knora.org/ontology/0001/books#hasTitle": "1",
                    "http://www.knora.org/ontology/0001/books#hasPageCount": "0-1",
                    "http://www.knora.org/ontology/0001/books#hasAuthor": "0-n"
                }
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#Novel",
                "subClassOf": ["http://www.knora.org/ontology/0001/books#Book"]
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#Page",
                "subClassOf": ["http://www.knora.org/ontology/knora-base#Resource"],
                "cardinalities": {
                    "http://www.knora.org/ontology/0001/books#hasPageNumber": "1"
                }
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#Person",
                "subClassOf": ["http://www.knora.org/ontology/knora-base#Resource"]
            }
        ],
        "properties": [
            {
                "iri": "http://www.knora.org/ontology/0001/books#hasTitle",
                "subPropertyOf": ["http://www.knora.org/ontology/knora-base#hasValue"],
                "subjectType": "http://www.knora.org/ontology/0001/books#Book",
                "objectType": "http://www.w3.org/2001/XMLSchema#string"
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#hasSubtitle",
                "subPropertyOf": ["http://www.knora.org/ontology/0001/books#hasTitle"]
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#hasPageCount",
                "subPropertyOf": ["http://www.knora.org/ontology/knora-base#hasValue"],
                "subjectType": "http://www.knora.org/ontology/0001/books#Book",
                "objectType": "http://www.knora.org/ontology/knora-base#IntValue"
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#hasPageNumber",
                "subPropertyOf": ["http://www.knora.org/ontology/knora-base#hasValue"],
                "subjectType": "http://www.knora.org/ontology/0001/books#Page",
                "objectType": "http://www.knora.org/ontology/knora-base#IntValue"
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#hasAuthor",
                "subPropertyOf": ["http://www.knora.org/ontology/knora-base#hasLinkTo"],
                "subjectType": "http://www.knora.org/ontology/0001/books#Book",
                "objectType": "http://www.knora.org/ontology/0001/books#Person"
            },
            {
                "iri": "http://www.knora.org/ontology/0001/books#hasAuthorValue",
                "subPropertyOf": ["http://www.knora.org/ontology/knora-base#hasLinkToValue"],
                "subjectType": "http://www.knora.org/ontology/0001/books#Book"
            }
        ]
    }
"#};

/// The books ontology merged over the knowledge-base skeleton.
pub fn books() -> OntologySnapshot {
    OntologySnapshot::from_json(BOOKS_JSON).unwrap()
}

/// A books IRI in the given schema.
pub fn books_iri(schema: Schema, local: &str) -> String {
    let namespace = match schema {
        Schema::Internal => BOOKS,
        Schema::Complex => BOOKS_COMPLEX,
        Schema::Simple => BOOKS_SIMPLE,
    };
    format!("{namespace}{local}")
}

pub fn var(name: &str) -> Entity {
    Entity::var(name)
}

pub fn iri(iri: &str) -> Entity {
    Entity::iri(iri)
}

pub fn book(schema: Schema, local: &str) -> Entity {
    Entity::iri(books_iri(schema, local))
}

pub fn boolean(value: bool) -> Entity {
    Entity::Literal(Literal::boolean(value))
}

pub fn stmt(subject: Entity, predicate: Entity, object: Entity) -> StatementPattern {
    StatementPattern::new(subject, predicate, object)
}

pub fn triple(subject: Entity, predicate: Entity, object: Entity) -> Pattern {
    Pattern::statement(subject, predicate, object)
}

/// `?subject rdf:type <class>`
pub fn is_a(subject: &str, class: Entity) -> Pattern {
    triple(var(subject), iri(rdf::TYPE), class)
}

fn main_resource_marker(schema: Schema) -> StatementPattern {
    let predicate = match schema {
        Schema::Simple => knora_api::simple::IS_MAIN_RESOURCE,
        _ => knora_api::IS_MAIN_RESOURCE,
    };
    stmt(var("book"), iri(predicate), boolean(true))
}

/// Books with their titles, in the simple schema:
///
/// ```text
/// CONSTRUCT { ?book :isMainResource true . ?book :hasTitle ?title . }
/// WHERE { ?book a :Book . ?book :hasTitle ?title . }
/// ```
pub fn titles_query() -> GravsearchQuery {
    let schema = Schema::Simple;
    GravsearchQuery::new(
        schema,
        vec![
            main_resource_marker(schema),
            stmt(var("book"), book(schema, "hasTitle"), var("title")),
        ],
        vec![
            is_a("book", book(schema, "Book")),
            triple(var("book"), book(schema, "hasTitle"), var("title")),
        ],
    )
}

/// Books with their page counts, valid in both API schemas.
pub fn page_count_query(schema: Schema) -> GravsearchQuery {
    GravsearchQuery::new(
        schema,
        vec![
            main_resource_marker(schema),
            stmt(var("book"), book(schema, "hasPageCount"), var("count")),
        ],
        vec![
            is_a("book", book(schema, "Book")),
            triple(var("book"), book(schema, "hasPageCount"), var("count")),
        ],
    )
}

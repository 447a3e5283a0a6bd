use gravsearch_core::vocab::{knora_api, knora_base};
use gravsearch_core::{OntologySnapshot, Schema};

use super::*;
use crate::analyze::type_check::DEFAULT_MAX_INFERENCE_ROUNDS;
use crate::analyze::infer_types;
use crate::emit::sparql::render_patterns;
use crate::pattern::{CompareOp, Expression};
use crate::test_utils::*;

struct Fixture {
    snapshot: OntologySnapshot,
    types: TypeInspectionResult,
}

impl Fixture {
    fn new(query: &GravsearchQuery) -> Self {
        let snapshot = books();
        let types = infer_types(query, &snapshot, DEFAULT_MAX_INFERENCE_ROUNDS).unwrap();
        Self { snapshot, types }
    }

    fn untyped() -> Self {
        Self {
            snapshot: books(),
            types: TypeInspectionResult::default(),
        }
    }

    fn ctx(&self, dialect: TriplestoreDialect) -> TransformCtx<'_> {
        TransformCtx {
            snapshot: &self.snapshot,
            types: &self.types,
            dialect,
        }
    }

    fn transform(&self, query: &GravsearchQuery) -> Result<TransformedQuery> {
        transform(query, &self.types, &self.snapshot, TriplestoreDialect::GraphDb)
    }
}

fn render(patterns: &[Pattern]) -> String {
    render_patterns(patterns).unwrap()
}

fn expand(query: &GravsearchQuery) -> String {
    let fixture = Fixture::new(query);
    let ctx = fixture.ctx(TriplestoreDialect::GraphDb);
    let flat = flatten::flatten(&ctx, &query.where_clause.patterns).unwrap();
    render(&values::expand_values(&ctx, &flat).unwrap())
}

fn where_only(schema: Schema, patterns: Vec<Pattern>) -> GravsearchQuery {
    GravsearchQuery::new(schema, vec![], patterns)
}

fn internal(local: &str) -> Entity {
    book(Schema::Internal, local)
}

// ============================================================================
// Schema flattening
// ============================================================================

#[test]
fn flatten_to_internal_iris() {
    let schema = Schema::Complex;
    let mut query = page_count_query(schema);
    query.where_clause.patterns.push(triple(
        var("count"),
        iri(knora_api::INT_VALUE_AS_INT),
        var("n"),
    ));
    query.where_clause.patterns.push(Pattern::filter(Expression::compare(
        Expression::entity(Variable::new("n")),
        CompareOp::Gt,
        Expression::entity(Literal::integer(100)),
    )));

    let fixture = Fixture::untyped();
    let flat = flatten::flatten(
        &fixture.ctx(TriplestoreDialect::GraphDb),
        &query.where_clause.patterns,
    )
    .unwrap();

    insta::assert_snapshot!(render(&flat), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book <http://www.knora.org/ontology/0001/books#hasPageCount> ?count .
    ?count knora-base:valueHasInteger ?n .
    FILTER(?n > "100"^^xsd:integer)
    "#);
}

#[test]
fn flatten_statement_keeps_variables_and_literals() {
    let flat = flatten::flatten_statement(&stmt(
        var("book"),
        iri(knora_api::simple::IS_MAIN_RESOURCE),
        boolean(true),
    ));
    assert_eq!(flat.subject, var("book"));
    assert_eq!(flat.predicate, iri(knora_base::IS_MAIN_RESOURCE));
    assert_eq!(flat.object, boolean(true));
}

// ============================================================================
// Value expansion
// ============================================================================

#[test]
fn simple_value_gets_node_and_content() {
    insta::assert_snapshot!(expand(&titles_query()), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book <http://www.knora.org/ontology/0001/books#hasTitle> ?title__valueNode .
    ?title__valueNode knora-base:isDeleted "false"^^xsd:boolean .
    OPTIONAL {
        ?title__valueNode__newer knora-base:previousValue ?title__valueNode .
    }
    FILTER(!BOUND(?title__valueNode__newer))
    ?title__valueNode knora-base:valueHasString ?title .
    "#);
}

#[test]
fn complex_value_variable_is_the_node() {
    insta::assert_snapshot!(expand(&page_count_query(Schema::Complex)), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book <http://www.knora.org/ontology/0001/books#hasPageCount> ?count .
    ?count knora-base:isDeleted "false"^^xsd:boolean .
    OPTIONAL {
        ?count__newer knora-base:previousValue ?count .
    }
    FILTER(!BOUND(?count__newer))
    "#);
}

#[test]
fn literal_object_gets_numbered_node() {
    let schema = Schema::Simple;
    let query = where_only(
        schema,
        vec![
            is_a("book", book(schema, "Book")),
            triple(
                var("book"),
                book(schema, "hasPageCount"),
                Entity::Literal(Literal::integer(300)),
            ),
        ],
    );

    insta::assert_snapshot!(expand(&query), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book <http://www.knora.org/ontology/0001/books#hasPageCount> ?book__hasPageCount__valueNode1 .
    ?book__hasPageCount__valueNode1 knora-base:isDeleted "false"^^xsd:boolean .
    OPTIONAL {
        ?book__hasPageCount__valueNode1__newer knora-base:previousValue ?book__hasPageCount__valueNode1 .
    }
    FILTER(!BOUND(?book__hasPageCount__valueNode1__newer))
    ?book__hasPageCount__valueNode1 knora-base:valueHasInteger "300"^^xsd:integer .
    "#);
}

#[test]
fn link_adds_link_value() {
    let schema = Schema::Complex;
    let query = where_only(
        schema,
        vec![
            is_a("book", book(schema, "Book")),
            triple(var("book"), book(schema, "hasAuthor"), var("person")),
        ],
    );

    insta::assert_snapshot!(expand(&query), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book <http://www.knora.org/ontology/0001/books#hasAuthor> ?person .
    ?book <http://www.knora.org/ontology/0001/books#hasAuthorValue> ?book__hasAuthor__person__LinkValue .
    ?book__hasAuthor__person__LinkValue rdf:object ?person .
    ?book__hasAuthor__person__LinkValue knora-base:isDeleted "false"^^xsd:boolean .
    ?person knora-base:isDeleted "false"^^xsd:boolean .
    "#);
}

#[test]
fn deletion_marker_per_union_branch() {
    let schema = Schema::Simple;
    let query = where_only(
        schema,
        vec![Pattern::union(vec![
            vec![is_a("book", book(schema, "Book"))],
            vec![triple(var("book"), book(schema, "hasAuthor"), var("person"))],
        ])],
    );

    insta::assert_snapshot!(expand(&query), @r#"
    {
        ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
        ?book knora-base:isDeleted "false"^^xsd:boolean .
    }
    UNION
    {
        ?book <http://www.knora.org/ontology/0001/books#hasAuthor> ?person .
        ?book <http://www.knora.org/ontology/0001/books#hasAuthorValue> ?book__hasAuthor__person__LinkValue .
        ?book__hasAuthor__person__LinkValue rdf:object ?person .
        ?book__hasAuthor__person__LinkValue knora-base:isDeleted "false"^^xsd:boolean .
        ?book knora-base:isDeleted "false"^^xsd:boolean .
        ?person knora-base:isDeleted "false"^^xsd:boolean .
    }
    "#);
}

#[test]
fn optional_inherits_outer_markers() {
    let schema = Schema::Simple;
    let query = where_only(
        schema,
        vec![
            is_a("book", book(schema, "Book")),
            Pattern::optional(vec![is_a("book", book(schema, "Novel"))]),
        ],
    );

    insta::assert_snapshot!(expand(&query), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    OPTIONAL {
        ?book rdf:type <http://www.knora.org/ontology/0001/books#Novel> .
    }
    "#);
}

#[test]
fn untyped_value_object_is_unsupported() {
    let fixture = Fixture::untyped();
    let patterns = vec![triple(var("book"), internal("hasTitle"), var("title"))];

    let err = values::expand_values(&fixture.ctx(TriplestoreDialect::GraphDb), &patterns)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedPattern);
    assert_eq!(err.stage(), Stage::ValueExpansion);
    assert_eq!(err.reason(), "the value object has no inferred type");
}

#[test]
fn link_to_literal_is_unsupported() {
    let fixture = Fixture::untyped();
    let patterns = vec![triple(
        var("book"),
        internal("hasAuthor"),
        Entity::Literal(Literal::string("Goethe")),
    )];

    let err = values::expand_values(&fixture.ctx(TriplestoreDialect::GraphDb), &patterns)
        .unwrap_err();
    assert_eq!(err.stage(), Stage::ValueExpansion);
    assert_eq!(err.reason(), "a link property cannot point to a literal");
}

fn property_variable_query(schema: Schema, object: &str, property: &str) -> GravsearchQuery {
    where_only(
        schema,
        vec![
            is_a("book", book(schema, "Book")),
            triple(var("book"), var("p"), var(object)),
            Pattern::filter(Expression::compare(
                Expression::entity(Variable::new("p")),
                CompareOp::Eq,
                Expression::entity(book(schema, property)),
            )),
        ],
    )
}

#[test]
fn value_property_variable_expands() {
    let query = property_variable_query(Schema::Complex, "count", "hasPageCount");

    insta::assert_snapshot!(expand(&query), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book ?p ?count .
    ?count knora-base:isDeleted "false"^^xsd:boolean .
    OPTIONAL {
        ?count__newer knora-base:previousValue ?count .
    }
    FILTER(!BOUND(?count__newer))
    FILTER(?p = <http://www.knora.org/ontology/0001/books#hasPageCount>)
    "#);

    let fixture = Fixture::new(&query);
    let patterns = run_stages(
        &fixture.ctx(TriplestoreDialect::GraphDb),
        &query.where_clause.patterns,
    )
    .unwrap();
    let nodes: Vec<String> = permissions::collect_bindings(&patterns)
        .into_iter()
        .map(|b| b.node.name)
        .collect();
    assert_eq!(nodes, ["book", "count"]);
}

#[test]
fn value_property_variable_with_literal_content() {
    let query = property_variable_query(Schema::Simple, "count", "hasPageCount");
    let expanded = expand(&query);

    assert!(expanded.contains("?book ?p ?count__valueNode .\n"));
    assert!(expanded.contains("?count__valueNode knora-base:isDeleted \"false\"^^xsd:boolean .\n"));
    assert!(expanded.contains("?count__valueNode knora-base:valueHasInteger ?count .\n"));
}

#[test]
fn link_property_variable_is_unsupported() {
    let query = property_variable_query(Schema::Complex, "person", "hasAuthor");
    let fixture = Fixture::new(&query);
    let ctx = fixture.ctx(TriplestoreDialect::GraphDb);
    let flat = flatten::flatten(&ctx, &query.where_clause.patterns).unwrap();

    let err = values::expand_values(&ctx, &flat).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedPattern);
    assert_eq!(err.stage(), Stage::ValueExpansion);
    assert_eq!(err.construct(), "?book ?p ?person .");
}

#[test]
fn deletion_marker_shape() {
    let Pattern::Statement(marker) = values::deletion_marker(var("x")) else {
        panic!("expected a statement");
    };
    assert!(values::is_deletion_marker(&marker));

    let deleted = stmt(var("x"), iri(knora_base::IS_DELETED), boolean(true));
    assert!(!values::is_deletion_marker(&deleted));
}

// ============================================================================
// Permission injection
// ============================================================================

#[test]
fn permissions_follow_deletion_markers() {
    let patterns = vec![
        values::deletion_marker(var("a")),
        Pattern::optional(vec![values::deletion_marker(var("b"))]),
        triple(var("a"), internal("hasAuthor"), var("b")),
    ];

    let fixture = Fixture::untyped();
    let injected =
        permissions::inject_permissions(&fixture.ctx(TriplestoreDialect::GraphDb), &patterns)
            .unwrap();
    insta::assert_snapshot!(render(&injected), @r#"
    ?a knora-base:isDeleted "false"^^xsd:boolean .
    ?a knora-base:hasPermissions ?a__permissions .
    OPTIONAL {
        ?b knora-base:isDeleted "false"^^xsd:boolean .
        ?b knora-base:hasPermissions ?b__permissions .
    }
    ?a <http://www.knora.org/ontology/0001/books#hasAuthor> ?b .
    "#);

    let bindings = permissions::collect_bindings(&injected);
    assert_eq!(
        bindings,
        vec![
            PermissionBinding {
                node: Variable::new("a"),
                permissions: Variable::new("a__permissions"),
            },
            PermissionBinding {
                node: Variable::new("b"),
                permissions: Variable::new("b__permissions"),
            },
        ]
    );
}

// ============================================================================
// Inference compensation
// ============================================================================

#[test]
fn reasoning_triplestore_is_untouched() {
    let fixture = Fixture::new(&titles_query());
    let ctx = fixture.ctx(TriplestoreDialect::GraphDb);
    let flat = flatten::flatten(&ctx, &titles_query().where_clause.patterns).unwrap();

    let out = inference::compensate_inference(&ctx, &flat).unwrap();
    assert_eq!(out, flat);
}

#[test]
fn subtypes_become_unions() {
    let fixture = Fixture::new(&titles_query());
    let ctx = fixture.ctx(TriplestoreDialect::Fuseki);
    let mut flat = flatten::flatten(&ctx, &titles_query().where_clause.patterns).unwrap();
    flat.push(Pattern::optional(vec![is_a("author", internal("Person"))]));

    let out = inference::compensate_inference(&ctx, &flat).unwrap();
    insta::assert_snapshot!(render(&out), @r#"
    {
        ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    }
    UNION
    {
        ?book rdf:type <http://www.knora.org/ontology/0001/books#Novel> .
    }
    {
        ?book <http://www.knora.org/ontology/0001/books#hasTitle> ?title .
    }
    UNION
    {
        ?book <http://www.knora.org/ontology/0001/books#hasSubtitle> ?title .
    }
    OPTIONAL {
        ?author rdf:type <http://www.knora.org/ontology/0001/books#Person> .
    }
    "#);
}

// ============================================================================
// Main resource and count derivation
// ============================================================================

#[test]
fn main_resource_from_marker() {
    let mut query = titles_query();
    query.construct.statements.reverse();
    assert_eq!(main_resource(&query).unwrap(), Variable::new("book"));

    let complex = page_count_query(Schema::Complex);
    assert_eq!(main_resource(&complex).unwrap(), Variable::new("book"));
}

#[test]
fn main_resource_falls_back_to_first_subject() {
    let schema = Schema::Simple;
    let query = GravsearchQuery::new(
        schema,
        vec![
            stmt(var("page"), book(schema, "hasTitle"), var("t")),
            stmt(
                var("book"),
                iri(knora_api::simple::IS_MAIN_RESOURCE),
                boolean(false),
            ),
        ],
        vec![],
    );
    assert_eq!(main_resource(&query).unwrap(), Variable::new("page"));
}

#[test]
fn main_resource_errors() {
    let empty = GravsearchQuery::new(Schema::Simple, vec![], vec![]);
    let err = main_resource(&empty).unwrap_err();
    assert_eq!(err.stage(), Stage::CountDerivation);
    assert_eq!(err.construct(), "CONSTRUCT {}");

    let schema = Schema::Simple;
    let data_iri = GravsearchQuery::new(
        schema,
        vec![stmt(
            iri("http://rdfh.ch/0001/faust"),
            book(schema, "hasTitle"),
            var("t"),
        )],
        vec![],
    );
    let err = main_resource(&data_iri).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedPattern);
    assert_eq!(err.reason(), "the main resource must be a variable");
}

#[test]
fn main_resource_must_occur_in_where() {
    let mut query = titles_query();
    query.construct.statements[0].subject = var("other");
    let fixture = Fixture::new(&query);

    let err = fixture.transform(&query).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedPattern);
    assert_eq!(err.stage(), Stage::CountDerivation);
    assert_eq!(err.construct(), "?other");
}

// ============================================================================
// Full transformation
// ============================================================================

#[test]
fn titles_transformation() {
    let query = titles_query();
    let fixture = Fixture::new(&query);
    let transformed = fixture.transform(&query).unwrap();
    let content = &transformed.content;

    assert_eq!(content.main_resource, Variable::new("book"));
    assert_eq!(content.order_by, vec![OrderCriterion::asc(Variable::new("book"))]);
    assert_eq!(content.limit, DEFAULT_PAGE_SIZE);
    assert_eq!(content.offset, 0);
    assert_eq!(transformed.count.main_resource, content.main_resource);
    assert_eq!(transformed.count.where_patterns, content.where_patterns);

    let template: Vec<Pattern> = content.template.iter().cloned().map(Pattern::from).collect();
    insta::assert_snapshot!(render(&template), @r#"
    ?book knora-base:isMainResource "true"^^xsd:boolean .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book knora-base:hasPermissions ?book__permissions .
    ?book <http://www.knora.org/ontology/0001/books#hasTitle> ?title__valueNode .
    ?title__valueNode knora-base:isDeleted "false"^^xsd:boolean .
    ?title__valueNode knora-base:hasPermissions ?title__valueNode__permissions .
    ?title__valueNode knora-base:valueHasString ?title .
    "#);

    insta::assert_snapshot!(render(&content.where_patterns), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book knora-base:hasPermissions ?book__permissions .
    ?book <http://www.knora.org/ontology/0001/books#hasTitle> ?title__valueNode .
    ?title__valueNode knora-base:isDeleted "false"^^xsd:boolean .
    ?title__valueNode knora-base:hasPermissions ?title__valueNode__permissions .
    OPTIONAL {
        ?title__valueNode__newer knora-base:previousValue ?title__valueNode .
    }
    FILTER(!BOUND(?title__valueNode__newer))
    ?title__valueNode knora-base:valueHasString ?title .
    "#);

    let nodes: Vec<&str> = transformed
        .permission_bindings
        .iter()
        .map(|b| b.node.name.as_str())
        .collect();
    assert_eq!(nodes, ["book", "title__valueNode"]);
}

#[test]
fn transformation_is_deterministic() {
    let query = titles_query();
    let fixture = Fixture::new(&query);
    assert_eq!(
        fixture.transform(&query).unwrap(),
        fixture.transform(&query).unwrap()
    );
}

#[test]
fn pages_are_offset_by_page_size() {
    let query = titles_query().with_offset(3);
    let fixture = Fixture::new(&query);

    let transformed = Transformer::new(TriplestoreDialect::GraphDb)
        .with_page_size(10)
        .transform(&query, &fixture.types, &fixture.snapshot)
        .unwrap();
    assert_eq!(transformed.content.limit, 10);
    assert_eq!(transformed.content.offset, 30);
}

#[test]
fn order_by_value_content() {
    let query = page_count_query(Schema::Complex)
        .with_order_by(vec![OrderCriterion::desc(Variable::new("count"))]);
    let fixture = Fixture::new(&query);
    let transformed = fixture.transform(&query).unwrap();
    let content = &transformed.content;

    assert_eq!(
        content.order_by,
        vec![
            OrderCriterion::desc(Variable::new("count__orderContent")),
            OrderCriterion::asc(Variable::new("book")),
        ]
    );
    assert_eq!(
        content.where_patterns.last(),
        Some(&triple(
            var("count"),
            iri(knora_base::VALUE_HAS_INTEGER),
            var("count__orderContent"),
        ))
    );
    assert_eq!(transformed.count.where_patterns, content.where_patterns);
}

#[test]
fn order_by_simple_literal_is_kept() {
    let query = page_count_query(Schema::Simple)
        .with_order_by(vec![OrderCriterion::desc(Variable::new("count"))]);
    let fixture = Fixture::new(&query);
    let transformed = fixture.transform(&query).unwrap();

    assert_eq!(
        transformed.content.order_by,
        vec![
            OrderCriterion::desc(Variable::new("count")),
            OrderCriterion::asc(Variable::new("book")),
        ]
    );
}

#[test]
fn main_resource_in_order_by_is_not_repeated() {
    let query =
        titles_query().with_order_by(vec![OrderCriterion::desc(Variable::new("book"))]);
    let fixture = Fixture::new(&query);
    let transformed = fixture.transform(&query).unwrap();

    assert_eq!(
        transformed.content.order_by,
        vec![OrderCriterion::desc(Variable::new("book"))]
    );
}

#[test]
fn fuseki_pipeline_expands_subtypes() {
    let query = titles_query();
    let fixture = Fixture::new(&query);
    let ctx = fixture.ctx(TriplestoreDialect::Fuseki);

    let patterns = run_stages(&ctx, &query.where_clause.patterns).unwrap();
    assert!(matches!(patterns[0], Pattern::Union(ref u) if u.alternatives.len() == 2));
    assert!(matches!(patterns[3], Pattern::Union(ref u) if u.alternatives.len() == 2));
}

#[test]
fn order_by_optional_value_stays_optional() {
    let schema = Schema::Complex;
    let query = GravsearchQuery::new(
        schema,
        vec![stmt(var("book"), book(schema, "hasPageCount"), var("count"))],
        vec![
            is_a("book", book(schema, "Book")),
            Pattern::optional(vec![triple(
                var("book"),
                book(schema, "hasPageCount"),
                var("count"),
            )]),
        ],
    )
    .with_order_by(vec![OrderCriterion::asc(Variable::new("count"))]);
    let fixture = Fixture::new(&query);
    let transformed = fixture.transform(&query).unwrap();

    insta::assert_snapshot!(render(&transformed.content.where_patterns), @r#"
    ?book rdf:type <http://www.knora.org/ontology/0001/books#Book> .
    ?book knora-base:isDeleted "false"^^xsd:boolean .
    ?book knora-base:hasPermissions ?book__permissions .
    OPTIONAL {
        ?book <http://www.knora.org/ontology/0001/books#hasPageCount> ?count .
        ?count knora-base:isDeleted "false"^^xsd:boolean .
        ?count knora-base:hasPermissions ?count__permissions .
        OPTIONAL {
            ?count__newer knora-base:previousValue ?count .
        }
        FILTER(!BOUND(?count__newer))
        ?count knora-base:valueHasInteger ?count__orderContent .
    }
    "#);
    assert_eq!(transformed.count.where_patterns, transformed.content.where_patterns);
}

// ============================================================================
// Generated names
// ============================================================================

#[test]
fn generated_names() {
    let has_author = format!("{BOOKS}hasAuthor");
    assert_eq!(
        naming::link_value(&var("book"), &has_author, &var("person")).name,
        "book__hasAuthor__person__LinkValue"
    );
    assert_eq!(
        naming::value_node(&var("b"), &iri(&has_author), &boolean(true), 2).name,
        "b__hasAuthor__valueNode2"
    );
    assert_eq!(
        naming::value_node(&var("b"), &var("p"), &boolean(true), 1).name,
        "b__p__valueNode1"
    );
    assert!(naming::is_reserved(&Variable::new("b__p")));
    assert!(!naming::is_reserved(&Variable::new("b_p")));
    assert_eq!(
        naming::newer_version(&var("title__valueNode")).name,
        "title__valueNode__newer"
    );
    assert_eq!(naming::order_content(&Variable::new("d")).name, "d__orderContent");
    assert_eq!(naming::base_name(&boolean(true)), "literal");
}

//! Query transformation.
//!
//! The WHERE clause passes through an ordered list of pure stages, each
//! taking the previous stage's patterns and returning new ones:
//! - `flatten` - API-schema IRIs to internal IRIs
//! - `values` - value-object and link expansion
//! - `permissions` - permission-string bindings
//! - `inference` - explicit subtype unions for non-reasoning triplestores
//!
//! The count query is then derived from the finished WHERE body.

pub mod count;
pub mod flatten;
pub mod inference;
pub mod naming;
pub mod permissions;
pub mod values;

#[cfg(test)]
mod transform_tests;

pub use permissions::PermissionBinding;

use tracing::{debug, debug_span};

use gravsearch_core::vocab::{self, knora_base};
use gravsearch_core::{OntologySnapshot, ValueKind};

use crate::analyze::TypeInspectionResult;
use crate::emit::TriplestoreDialect;
use crate::pattern::{
    Entity, GravsearchQuery, Literal, OrderCriterion, Pattern, StatementPattern, Variable,
};
use crate::{ErrorKind, GravsearchError, Result, Stage};

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Read-only inputs shared by all stages.
#[derive(Debug, Clone, Copy)]
pub struct TransformCtx<'a> {
    pub snapshot: &'a OntologySnapshot,
    pub types: &'a TypeInspectionResult,
    pub dialect: TriplestoreDialect,
}

/// A rewrite stage over a pattern list.
pub type StageFn = fn(&TransformCtx<'_>, &[Pattern]) -> Result<Vec<Pattern>>;

/// WHERE-clause stages, in application order.
pub const WHERE_STAGES: &[(Stage, StageFn)] = &[
    (Stage::SchemaFlattening, flatten::flatten),
    (Stage::ValueExpansion, values::expand_values),
    (Stage::PermissionInjection, permissions::inject_permissions),
    (Stage::InferenceCompensation, inference::compensate_inference),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub template: Vec<StatementPattern>,
    pub where_patterns: Vec<Pattern>,
    pub main_resource: Variable,
    pub order_by: Vec<OrderCriterion>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
    pub main_resource: Variable,
    pub where_patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedQuery {
    pub content: ContentQuery,
    pub count: CountQuery,
    pub permission_bindings: Vec<PermissionBinding>,
}

/// Rewrites checked queries into executable pattern sets.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    dialect: TriplestoreDialect,
    page_size: u32,
}

impl Transformer {
    pub fn new(dialect: TriplestoreDialect) -> Self {
        Self {
            dialect,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn transform(
        &self,
        query: &GravsearchQuery,
        types: &TypeInspectionResult,
        snapshot: &OntologySnapshot,
    ) -> Result<TransformedQuery> {
        let ctx = TransformCtx {
            snapshot,
            types,
            dialect: self.dialect,
        };

        let main_resource = main_resource(query)?;
        let mut where_patterns = run_stages(&ctx, &query.where_clause.patterns)?;

        let mut order_by = order_by_content(&ctx, &query.order_by, &mut where_patterns)?;
        // Pages must not overlap: the main resource breaks ties.
        if !order_by.iter().any(|c| c.variable == main_resource) {
            order_by.push(OrderCriterion::asc(main_resource.clone()));
        }

        let template = {
            let _span = debug_span!("template").entered();
            let flattened: Vec<StatementPattern> = query
                .construct
                .statements
                .iter()
                .map(flatten::flatten_statement)
                .collect();
            permissions::inject_template(values::expand_template(&ctx, &flattened)?)
        };

        let permission_bindings = permissions::collect_bindings(&where_patterns);

        let content = ContentQuery {
            template,
            where_patterns,
            main_resource,
            order_by,
            limit: self.page_size,
            offset: query.offset.saturating_mul(self.page_size),
        };
        let count = {
            let _span = debug_span!("stage", stage = %Stage::CountDerivation).entered();
            count::derive_count(&content)?
        };

        debug!(
            template = content.template.len(),
            patterns = content.where_patterns.len(),
            permissions = permission_bindings.len(),
            "query transformed"
        );

        Ok(TransformedQuery {
            content,
            count,
            permission_bindings,
        })
    }
}

/// Transform with the default page size.
pub fn transform(
    query: &GravsearchQuery,
    types: &TypeInspectionResult,
    snapshot: &OntologySnapshot,
    dialect: TriplestoreDialect,
) -> Result<TransformedQuery> {
    Transformer::new(dialect).transform(query, types, snapshot)
}

/// Run every WHERE stage in order.
pub fn run_stages(ctx: &TransformCtx<'_>, patterns: &[Pattern]) -> Result<Vec<Pattern>> {
    let mut current = patterns.to_vec();
    for (stage, run) in WHERE_STAGES {
        let _span = debug_span!("stage", stage = %stage).entered();
        current = run(ctx, &current)?;
        debug!(patterns = current.len(), "stage finished");
    }
    Ok(current)
}

/// The main resource: subject of the `isMainResource true` marker, else the
/// subject of the first CONSTRUCT statement.
pub fn main_resource(query: &GravsearchQuery) -> Result<Variable> {
    let statements = &query.construct.statements;

    let marked = statements.iter().find(|stmt| {
        stmt.predicate
            .as_iri()
            .is_some_and(|p| vocab::to_internal(&p.iri) == knora_base::IS_MAIN_RESOURCE)
            && stmt.object.as_literal().is_some_and(Literal::is_true)
    });

    let candidate = marked.or_else(|| statements.first());
    match candidate.map(|stmt| &stmt.subject) {
        Some(Entity::Variable(var)) => Ok(var.clone()),
        Some(other) => Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::CountDerivation,
            other,
            "the main resource must be a variable",
        )),
        None => Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::CountDerivation,
            "CONSTRUCT {}",
            "the CONSTRUCT clause is empty",
        )),
    }
}

/// Order value nodes by their literal content.
///
/// The content statement joins every group that binds the node, so a node
/// bound only inside OPTIONAL stays optional.
fn order_by_content(
    ctx: &TransformCtx<'_>,
    criteria: &[OrderCriterion],
    where_patterns: &mut Vec<Pattern>,
) -> Result<Vec<OrderCriterion>> {
    let mut order_by = Vec::with_capacity(criteria.len());

    for criterion in criteria {
        let entity = Entity::Variable(criterion.variable.clone());
        let kind = ctx
            .types
            .get(&entity)
            .and_then(|t| t.as_non_property())
            .filter(|t| t.is_value)
            .and_then(|t| ValueKind::from_type_iri(&t.type_iri))
            .filter(|k| k.has_literal_content());

        let Some(kind) = kind else {
            order_by.push(criterion.clone());
            continue;
        };

        let content = naming::order_content(&criterion.variable);
        let binding = StatementPattern::new(
            entity,
            Entity::iri(kind.content_predicate()),
            Entity::Variable(content.clone()),
        );
        if !add_where_bound(where_patterns, &criterion.variable, &binding) {
            return Err(GravsearchError::new(
                ErrorKind::UnsupportedPattern,
                Stage::ValueExpansion,
                &criterion.variable,
                "the ORDER BY variable is not bound in the WHERE clause",
            ));
        }
        order_by.push(OrderCriterion {
            variable: content,
            ascending: criterion.ascending,
        });
    }

    Ok(order_by)
}

/// Append `stmt` to the outermost groups whose statements bind `var`.
fn add_where_bound(patterns: &mut Vec<Pattern>, var: &Variable, stmt: &StatementPattern) -> bool {
    let binds = patterns.iter().any(|p| {
        p.as_statement().is_some_and(|s| {
            [&s.subject, &s.object]
                .into_iter()
                .any(|e| e.as_variable() == Some(var))
        })
    });
    if binds {
        patterns.push(stmt.clone().into());
        return true;
    }

    let mut added = false;
    for pattern in patterns.iter_mut() {
        match pattern {
            Pattern::Optional(group) => added |= add_where_bound(&mut group.patterns, var, stmt),
            Pattern::Union(union) => {
                for alternative in &mut union.alternatives {
                    added |= add_where_bound(alternative, var, stmt);
                }
            }
            Pattern::Statement(_) | Pattern::Filter(_) | Pattern::Minus(_) => {}
        }
    }
    added
}

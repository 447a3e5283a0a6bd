//! Schema flattening: API-schema IRIs to internal IRIs.

use gravsearch_core::vocab;

use super::TransformCtx;
use crate::Result;
use crate::pattern::{Entity, Expression, IriRef, Pattern, StatementPattern};

pub fn flatten(_ctx: &TransformCtx<'_>, patterns: &[Pattern]) -> Result<Vec<Pattern>> {
    Ok(patterns.iter().map(flatten_pattern).collect())
}

pub fn flatten_pattern(pattern: &Pattern) -> Pattern {
    match pattern {
        Pattern::Statement(stmt) => Pattern::Statement(flatten_statement(stmt)),
        Pattern::Optional(group) => {
            Pattern::optional(group.patterns.iter().map(flatten_pattern).collect())
        }
        Pattern::Union(union) => Pattern::union(
            union
                .alternatives
                .iter()
                .map(|alt| alt.iter().map(flatten_pattern).collect())
                .collect(),
        ),
        Pattern::Filter(filter) => Pattern::filter(flatten_expression(&filter.expr)),
        Pattern::Minus(group) => {
            Pattern::minus(group.patterns.iter().map(flatten_pattern).collect())
        }
    }
}

pub fn flatten_statement(stmt: &StatementPattern) -> StatementPattern {
    StatementPattern::new(
        flatten_entity(&stmt.subject),
        flatten_entity(&stmt.predicate),
        flatten_entity(&stmt.object),
    )
}

fn flatten_entity(entity: &Entity) -> Entity {
    match entity {
        Entity::Iri(iri) => Entity::Iri(IriRef::new(vocab::to_internal(&iri.iri))),
        other => other.clone(),
    }
}

fn flatten_expression(expr: &Expression) -> Expression {
    match expr {
        Expression::Entity(entity) => Expression::Entity(flatten_entity(entity)),
        Expression::Compare { left, op, right } => {
            Expression::compare(flatten_expression(left), *op, flatten_expression(right))
        }
        Expression::And(left, right) => {
            Expression::and(flatten_expression(left), flatten_expression(right))
        }
        Expression::Or(left, right) => {
            Expression::or(flatten_expression(left), flatten_expression(right))
        }
        Expression::Not(inner) => Expression::not(flatten_expression(inner)),
        Expression::Call { function, args } => {
            Expression::call(*function, args.iter().map(flatten_expression).collect())
        }
    }
}

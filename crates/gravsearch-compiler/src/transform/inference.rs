//! Inference-gap compensation.
//!
//! For triplestores without RDFS reasoning, each `rdf:type` statement and
//! each statement over a property with subproperties becomes a UNION over the
//! class or property and its transitive subtypes.

use gravsearch_core::OntologySnapshot;

use super::TransformCtx;
use crate::Result;
use crate::pattern::{Entity, IriRef, Pattern, StatementPattern};

pub fn compensate_inference(ctx: &TransformCtx<'_>, patterns: &[Pattern]) -> Result<Vec<Pattern>> {
    if ctx.dialect.supports_inference() {
        return Ok(patterns.to_vec());
    }
    Ok(expand(ctx.snapshot, patterns))
}

fn expand(snapshot: &OntologySnapshot, patterns: &[Pattern]) -> Vec<Pattern> {
    patterns
        .iter()
        .map(|pattern| match pattern {
            Pattern::Statement(stmt) => expand_statement(snapshot, stmt),
            Pattern::Optional(group) => Pattern::optional(expand(snapshot, &group.patterns)),
            Pattern::Union(union) => Pattern::union(
                union
                    .alternatives
                    .iter()
                    .map(|alt| expand(snapshot, alt))
                    .collect(),
            ),
            Pattern::Minus(group) => Pattern::minus(expand(snapshot, &group.patterns)),
            Pattern::Filter(_) => pattern.clone(),
        })
        .collect()
}

fn expand_statement(snapshot: &OntologySnapshot, stmt: &StatementPattern) -> Pattern {
    if stmt.is_type_statement()
        && let Entity::Iri(class) = &stmt.object
    {
        let subclasses = snapshot.subclasses(&class.iri);
        if subclasses.is_empty() {
            return stmt.clone().into();
        }
        let mut alternatives = vec![vec![stmt.clone().into()]];
        for sub in subclasses {
            alternatives.push(vec![Pattern::statement(
                stmt.subject.clone(),
                stmt.predicate.clone(),
                Entity::Iri(IriRef::new(sub.as_str())),
            )]);
        }
        return Pattern::union(alternatives);
    }

    if let Entity::Iri(property) = &stmt.predicate {
        let subproperties = snapshot.subproperties(&property.iri);
        if subproperties.is_empty() {
            return stmt.clone().into();
        }
        let mut alternatives = vec![vec![stmt.clone().into()]];
        for sub in subproperties {
            alternatives.push(vec![Pattern::statement(
                stmt.subject.clone(),
                Entity::Iri(IriRef::new(sub.as_str())),
                stmt.object.clone(),
            )]);
        }
        return Pattern::union(alternatives);
    }

    stmt.clone().into()
}

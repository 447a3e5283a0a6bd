//! Value-object expansion.
//!
//! `?r <valueProp> ?o` becomes a statement pointing at a value node plus the
//! triples selecting the node's current, undeleted version and, for literal
//! objects, its content:
//!
//! ```text
//! ?r <valueProp> ?o__valueNode .
//! ?o__valueNode knora-base:isDeleted false .
//! OPTIONAL { ?o__valueNode__newer knora-base:previousValue ?o__valueNode . }
//! FILTER(!BOUND(?o__valueNode__newer))
//! ?o__valueNode knora-base:valueHasString ?o .
//! ```
//!
//! Link properties keep the direct link and add the matching link value.
//! Property variables typed as value properties expand like their IRIs; a
//! property variable cannot stand for a link property.
//! Every resource variable gets one deletion marker per group.

use indexmap::IndexSet;

use gravsearch_core::ValueKind;
use gravsearch_core::vocab::{knora_base, rdf};

use super::{TransformCtx, naming};
use crate::analyze::type_check::EntityTypeInfo;
use crate::pattern::{Entity, Expression, Literal, Pattern, StatementPattern, Variable};
use crate::{ErrorKind, GravsearchError, Result, Stage};

pub fn expand_values(ctx: &TransformCtx<'_>, patterns: &[Pattern]) -> Result<Vec<Pattern>> {
    let mut expander = ValueExpander {
        ctx,
        literal_nodes: 0,
    };
    expander.expand_group(patterns, &IndexSet::new())
}

/// Expand a statement list, keeping statements only. Used for the CONSTRUCT
/// template.
pub fn expand_template(
    ctx: &TransformCtx<'_>,
    statements: &[StatementPattern],
) -> Result<Vec<StatementPattern>> {
    let patterns: Vec<Pattern> = statements.iter().cloned().map(Pattern::from).collect();
    let expanded = expand_values(ctx, &patterns)?;
    Ok(expanded
        .into_iter()
        .filter_map(|p| match p {
            Pattern::Statement(stmt) => Some(stmt),
            _ => None,
        })
        .collect())
}

/// `?x knora-base:isDeleted false`
pub fn deletion_marker(node: Entity) -> Pattern {
    Pattern::statement(
        node,
        Entity::iri(knora_base::IS_DELETED),
        Entity::Literal(Literal::boolean(false)),
    )
}

pub fn is_deletion_marker(stmt: &StatementPattern) -> bool {
    stmt.subject.is_variable()
        && stmt
            .predicate
            .as_iri()
            .is_some_and(|p| p.iri == knora_base::IS_DELETED)
        && stmt
            .object
            .as_literal()
            .is_some_and(|l| *l == Literal::boolean(false))
}

struct ValueExpander<'c, 'a> {
    ctx: &'c TransformCtx<'a>,
    literal_nodes: usize,
}

impl ValueExpander<'_, '_> {
    fn expand_group(
        &mut self,
        patterns: &[Pattern],
        inherited: &IndexSet<Variable>,
    ) -> Result<Vec<Pattern>> {
        let mut marked = inherited.clone();
        let mut out = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            match pattern {
                Pattern::Statement(stmt) => {
                    out.extend(self.expand_statement(stmt)?);
                    for entity in [&stmt.subject, &stmt.object] {
                        if let Entity::Variable(var) = entity
                            && self.ctx.types.is_resource(entity)
                            && marked.insert(var.clone())
                        {
                            out.push(deletion_marker(entity.clone()));
                        }
                    }
                }
                Pattern::Optional(group) => {
                    out.push(Pattern::optional(self.expand_group(&group.patterns, &marked)?));
                }
                Pattern::Union(union) => {
                    let alternatives = union
                        .alternatives
                        .iter()
                        .map(|alt| self.expand_group(alt, &marked))
                        .collect::<Result<Vec<_>>>()?;
                    out.push(Pattern::union(alternatives));
                }
                Pattern::Minus(group) => {
                    out.push(Pattern::minus(self.expand_group(&group.patterns, &marked)?));
                }
                Pattern::Filter(_) => out.push(pattern.clone()),
            }
        }

        Ok(out)
    }

    fn expand_statement(&mut self, stmt: &StatementPattern) -> Result<Vec<Pattern>> {
        let predicate = match &stmt.predicate {
            Entity::Iri(iri) if !iri.is_rdf_type() => iri.iri.as_str(),
            Entity::Iri(_) => return Ok(vec![stmt.clone().into()]),
            Entity::Variable(_) => return self.expand_property_variable(stmt),
            Entity::Literal(_) => {
                return Err(self.unsupported(stmt, "a literal cannot be a predicate"));
            }
        };

        let snapshot = self.ctx.snapshot;
        if snapshot.is_link_property(predicate) {
            return self.expand_link(stmt, predicate);
        }
        if snapshot.is_value_property(predicate) {
            return self.expand_value(stmt);
        }
        Ok(vec![stmt.clone().into()])
    }

    /// `?s ?p ?o` where `?p` was typed by inspection.
    fn expand_property_variable(&mut self, stmt: &StatementPattern) -> Result<Vec<Pattern>> {
        let info = self
            .ctx
            .types
            .get(&stmt.predicate)
            .and_then(EntityTypeInfo::as_property);
        match info {
            Some(info) if info.is_link_property => Err(self.unsupported(
                stmt,
                "a property variable cannot stand for a link property",
            )),
            Some(info) if info.is_value_property => self.expand_value(stmt),
            _ => Ok(vec![stmt.clone().into()]),
        }
    }

    fn expand_value(&mut self, stmt: &StatementPattern) -> Result<Vec<Pattern>> {
        let object = &stmt.object;
        let types = self.ctx.types;

        let object_is_node = !matches!(object, Entity::Literal(_)) && types.is_value(object);
        let node = if object_is_node {
            object.clone()
        } else {
            let index = match object {
                Entity::Variable(_) => 0,
                _ => {
                    self.literal_nodes += 1;
                    self.literal_nodes
                }
            };
            Entity::Variable(naming::value_node(
                &stmt.subject,
                &stmt.predicate,
                object,
                index,
            ))
        };
        let newer = naming::newer_version(&node);

        let mut out = vec![
            Pattern::statement(
                stmt.subject.clone(),
                stmt.predicate.clone(),
                node.clone(),
            ),
            deletion_marker(node.clone()),
            Pattern::optional(vec![Pattern::statement(
                Entity::Variable(newer.clone()),
                Entity::iri(knora_base::PREVIOUS_VALUE),
                node.clone(),
            )]),
            Pattern::filter(Expression::not(Expression::bound(newer))),
        ];

        if !object_is_node {
            let type_iri = match object {
                Entity::Literal(literal) => Some(literal.datatype.as_str()),
                _ => types.get(object).map(|t| t.type_iri()),
            };
            let Some(type_iri) = type_iri else {
                return Err(self.unsupported(stmt, "the value object has no inferred type"));
            };
            let Some(kind) = ValueKind::from_type_iri(type_iri) else {
                return Err(self.unsupported(
                    stmt,
                    &format!("<{type_iri}> is not a value type"),
                ));
            };
            if !kind.has_literal_content() {
                return Err(self.unsupported(
                    stmt,
                    "link and list values must be bound to a value node",
                ));
            }
            out.push(Pattern::statement(
                node,
                Entity::iri(kind.content_predicate()),
                object.clone(),
            ));
        }

        Ok(out)
    }

    fn expand_link(&mut self, stmt: &StatementPattern, predicate: &str) -> Result<Vec<Pattern>> {
        let Some(link_value_property) = self.ctx.snapshot.link_value_property(predicate) else {
            return Err(self.unsupported(stmt, "the link property has no link value property"));
        };
        if matches!(stmt.object, Entity::Literal(_)) {
            return Err(self.unsupported(stmt, "a link property cannot point to a literal"));
        }

        let link_value = Entity::Variable(naming::link_value(
            &stmt.subject,
            predicate,
            &stmt.object,
        ));

        Ok(vec![
            stmt.clone().into(),
            Pattern::statement(
                stmt.subject.clone(),
                Entity::iri(link_value_property),
                link_value.clone(),
            ),
            Pattern::statement(
                link_value.clone(),
                Entity::iri(rdf::OBJECT),
                stmt.object.clone(),
            ),
            deletion_marker(link_value),
        ])
    }

    fn unsupported(&self, stmt: &StatementPattern, reason: &str) -> GravsearchError {
        GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::ValueExpansion,
            stmt,
            reason,
        )
    }
}

//! Type inspection.
//!
//! Infers a type for every variable and IRI of the WHERE clause:
//! 1. Seed from `rdf:type` statements and property constraints
//! 2. Propagate across shared variables and FILTER comparisons
//! 3. When stuck, type property variables from their subject's class
//! 4. Repeat until nothing changes or the round limit is reached
//!
//! UNION branches are inferred separately, starting from the types of the
//! enclosing scope, and merged back.

mod rules;
mod scope;
mod types;

pub use types::{
    EntityTypeInfo, NonPropertyTypeInfo, PropertyTypeInfo, TypeInspectionResult, TypeableEntity,
};

use indexmap::IndexMap;
use tracing::{debug, warn};

use gravsearch_core::{OntologySnapshot, Schema, ValueKind};

use crate::pattern::{GravsearchQuery, Pattern, UnionGroup};
use crate::{ErrorKind, GravsearchError, Result, Stage};
use rules::TypeMap;
use scope::{Roles, Scope};

/// Default bound on propagation rounds per scope.
pub const DEFAULT_MAX_INFERENCE_ROUNDS: u32 = 32;

/// Infer entity types for `query` against `snapshot`.
pub fn infer_types(
    query: &GravsearchQuery,
    snapshot: &OntologySnapshot,
    max_rounds: u32,
) -> Result<TypeInspectionResult> {
    let patterns = &query.where_clause.patterns;
    let roles = Roles::collect(patterns);

    if let Some(entity) = roles.first_conflict() {
        return Err(GravsearchError::new(
            ErrorKind::AmbiguousType,
            Stage::TypeInspection,
            entity,
            "used both as a property and as a non-property entity",
        ));
    }

    let mut inference = Inference {
        snapshot,
        schema: query.schema(),
        max_rounds: max_rounds.max(1),
        exhausted: false,
    };
    let types = inference.infer_scope(patterns, IndexMap::new())?;

    if inference.exhausted {
        warn!(
            max_rounds = inference.max_rounds,
            "type inference stopped at round limit"
        );
    }

    let result = build_result(query.schema(), snapshot, &roles, &types)?;
    debug!(
        entities = roles.order.len(),
        typed = result.len(),
        "type inspection finished"
    );
    Ok(result)
}

struct Inference<'s> {
    snapshot: &'s OntologySnapshot,
    schema: Schema,
    max_rounds: u32,
    exhausted: bool,
}

impl<'s> Inference<'s> {
    fn infer_scope(
        &mut self,
        patterns: &[Pattern],
        seed: IndexMap<TypeableEntity, String>,
    ) -> Result<IndexMap<TypeableEntity, String>> {
        let scope = Scope::collect(patterns);
        let mut map = TypeMap::new(self.snapshot, self.schema, seed);

        let mut settled = false;
        for _ in 0..self.max_rounds {
            let mut changed = self.propagate(&mut map, &scope)?;
            for union in &scope.unions {
                changed |= self.merge_union(&mut map, union)?;
            }
            if !changed {
                for stmt in &scope.statements {
                    changed |= rules::apply_subject_class(&mut map, stmt)?;
                }
            }
            if !changed || self.exhausted {
                settled = true;
                break;
            }
        }
        if !settled {
            self.exhausted = true;
        }

        Ok(map.into_types())
    }

    /// Apply the rules of one scope until nothing changes.
    fn propagate(&mut self, map: &mut TypeMap<'s>, scope: &Scope<'_>) -> Result<bool> {
        let mut any = false;
        for _ in 0..self.max_rounds {
            let mut changed = false;
            for stmt in &scope.statements {
                changed |= rules::apply_statement(map, stmt)?;
            }
            for filter in &scope.filters {
                changed |= rules::apply_filter(map, filter)?;
            }
            any |= changed;
            if !changed {
                return Ok(any);
            }
        }
        self.exhausted = true;
        Ok(any)
    }

    /// Infer each branch and fold branch-only types into the enclosing scope.
    ///
    /// Only types a branch adds or changes count. Two branches that type the
    /// same entity differently are an error.
    fn merge_union(&mut self, map: &mut TypeMap<'s>, union: &UnionGroup) -> Result<bool> {
        let mut merged: IndexMap<TypeableEntity, String> = IndexMap::new();
        let seed = map.types().clone();

        for branch in &union.alternatives {
            let branch_types = self.infer_scope(branch, seed.clone())?;
            for (entity, ty) in branch_types {
                if seed.get(&entity) == Some(&ty) {
                    continue;
                }
                let Some(previous) = merged.get(&entity) else {
                    merged.insert(entity, ty);
                    continue;
                };
                if previous == &ty {
                    continue;
                }
                return Err(GravsearchError::new(
                    ErrorKind::AmbiguousType,
                    Stage::TypeInspection,
                    &entity,
                    format!(
                        "typed as <{}> in one UNION branch and as <{}> in another",
                        self.render(previous),
                        self.render(&ty),
                    ),
                ));
            }
        }

        let mut changed = false;
        for (entity, ty) in merged {
            if map.get(&entity).is_none() {
                changed |= map.assign(&entity, &ty)?;
            }
        }
        Ok(changed)
    }

    fn render(&self, type_iri: &str) -> String {
        rules::render(self.schema, type_iri)
    }
}

fn build_result(
    schema: Schema,
    snapshot: &OntologySnapshot,
    roles: &Roles,
    types: &IndexMap<TypeableEntity, String>,
) -> Result<TypeInspectionResult> {
    let mut entities = IndexMap::new();

    for entity in &roles.order {
        let inferred = types.get(entity);

        if roles.predicates.contains(entity) {
            let Some(object_type) = inferred else {
                if let TypeableEntity::Variable(_) = entity {
                    return Err(GravsearchError::new(
                        ErrorKind::UntypedVariable,
                        Stage::TypeInspection,
                        entity,
                        "the property's object type could not be determined",
                    ));
                }
                continue;
            };

            let (is_value_property, is_link_property) = match entity {
                TypeableEntity::Iri(iri) => (
                    snapshot.is_value_property(iri),
                    snapshot.is_link_property(iri),
                ),
                // Value content read through a datatype still needs a value node
                TypeableEntity::Variable(_) => (
                    ValueKind::from_type_iri(object_type).is_some(),
                    snapshot.is_resource_class(object_type),
                ),
            };
            entities.insert(
                entity.clone(),
                EntityTypeInfo::Property(PropertyTypeInfo {
                    object_type_iri: report(schema, snapshot, object_type),
                    is_value_property,
                    is_link_property,
                }),
            );
        } else if let Some(ty) = inferred {
            let type_iri = report(schema, snapshot, ty);
            entities.insert(
                entity.clone(),
                EntityTypeInfo::NonProperty(NonPropertyTypeInfo {
                    is_resource: snapshot.is_resource_class(&type_iri),
                    is_value: snapshot.is_value_class(&type_iri),
                    type_iri,
                }),
            );
        }
    }

    Ok(TypeInspectionResult::new(entities))
}

/// The simple schema has no value nodes: value classes read as datatypes.
fn report(schema: Schema, snapshot: &OntologySnapshot, type_iri: &str) -> String {
    if schema == Schema::Simple
        && snapshot.is_value_class(type_iri)
        && let Some(kind) = ValueKind::from_type_iri(type_iri)
    {
        return kind.simple_datatype().to_owned();
    }
    type_iri.to_owned()
}

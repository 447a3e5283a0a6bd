//! Inference rules and type refinement.
//!
//! Rules only ever add a type or replace it with a more specific one, so
//! repeated application reaches a fixed point.

use indexmap::{IndexMap, IndexSet};

use gravsearch_core::{OntologyError, OntologySnapshot, Schema, ValueKind, vocab};

use super::types::TypeableEntity;
use crate::pattern::{CompareOp, Entity, Expression, Function, StatementPattern};
use crate::{ErrorKind, GravsearchError, Result, Stage};

/// Working set of entity types for one scope. Type IRIs are internal.
#[derive(Debug, Clone)]
pub(super) struct TypeMap<'s> {
    snapshot: &'s OntologySnapshot,
    schema: Schema,
    types: IndexMap<TypeableEntity, String>,
}

impl<'s> TypeMap<'s> {
    pub fn new(
        snapshot: &'s OntologySnapshot,
        schema: Schema,
        seed: IndexMap<TypeableEntity, String>,
    ) -> Self {
        Self {
            snapshot,
            schema,
            types: seed,
        }
    }

    pub fn get(&self, entity: &TypeableEntity) -> Option<&str> {
        self.types.get(entity).map(String::as_str)
    }

    pub fn types(&self) -> &IndexMap<TypeableEntity, String> {
        &self.types
    }

    pub fn into_types(self) -> IndexMap<TypeableEntity, String> {
        self.types
    }

    /// Record `candidate` for `entity`. Returns whether the map changed.
    pub fn assign(&mut self, entity: &TypeableEntity, candidate: &str) -> Result<bool> {
        let Some(current) = self.types.get(entity) else {
            self.types.insert(entity.clone(), candidate.to_owned());
            return Ok(true);
        };

        match refine(self.snapshot, current, candidate) {
            Refinement::Keep => Ok(false),
            Refinement::Replace => {
                self.types.insert(entity.clone(), candidate.to_owned());
                Ok(true)
            }
            Refinement::Conflict => Err(GravsearchError::new(
                ErrorKind::AmbiguousType,
                Stage::TypeInspection,
                entity,
                format!(
                    "inferred as both <{}> and <{}>",
                    render(self.schema, current),
                    render(self.schema, candidate),
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Refinement {
    Keep,
    Replace,
    Conflict,
}

/// Compare an existing type with a new candidate.
///
/// The more specific class wins. A value class and the literal datatype of
/// the same value kind describe the same thing; the value class is kept.
pub(super) fn refine(snapshot: &OntologySnapshot, current: &str, candidate: &str) -> Refinement {
    if snapshot.is_subclass_of(current, candidate) {
        return Refinement::Keep;
    }
    if snapshot.is_subclass_of(candidate, current) {
        return Refinement::Replace;
    }

    if let Some(a) = ValueKind::from_type_iri(current)
        && let Some(b) = ValueKind::from_type_iri(candidate)
        && a == b
    {
        if snapshot.is_value_class(candidate) && !snapshot.is_value_class(current) {
            return Refinement::Replace;
        }
        return Refinement::Keep;
    }

    Refinement::Conflict
}

/// A type IRI in the vocabulary the query was written in.
pub(super) fn render(schema: Schema, type_iri: &str) -> String {
    vocab::to_external(type_iri, schema, vocab::DEFAULT_API_HOST)
}

fn ontology_error(entity: &impl std::fmt::Display, err: OntologyError) -> GravsearchError {
    GravsearchError::new(
        ErrorKind::AmbiguousType,
        Stage::TypeInspection,
        entity,
        err.to_string(),
    )
}

/// Apply every statement rule. Returns whether the map changed.
pub(super) fn apply_statement(map: &mut TypeMap<'_>, stmt: &StatementPattern) -> Result<bool> {
    let mut changed = false;
    let subject = TypeableEntity::from_entity(&stmt.subject);
    let object = TypeableEntity::from_entity(&stmt.object);

    // `?s rdf:type <Class>` types the subject
    if stmt.is_type_statement() {
        if let Some(subject) = &subject
            && let Entity::Iri(class) = &stmt.object
        {
            changed |= map.assign(subject, &vocab::to_internal(&class.iri))?;
        }
        return Ok(changed);
    }

    let Some(predicate) = TypeableEntity::from_entity(&stmt.predicate) else {
        return Ok(false);
    };

    match &predicate {
        TypeableEntity::Iri(property) => {
            let snapshot = map.snapshot;
            if snapshot.property(property).is_none() {
                return Ok(false);
            }

            let object_type = snapshot
                .effective_object_type(property)
                .map_err(|e| ontology_error(&predicate, e))?;
            let subject_type = snapshot
                .effective_subject_type(property)
                .map_err(|e| ontology_error(&predicate, e))?;

            if let Some(object_type) = object_type {
                changed |= map.assign(&predicate, &object_type)?;
                if let Some(object) = &object {
                    changed |= map.assign(object, &object_type)?;
                }
            }
            if let Some(subject_type) = subject_type
                && let Some(subject) = &subject
            {
                changed |= map.assign(subject, &subject_type)?;
            }
        }
        TypeableEntity::Variable(_) => {
            // A property variable and its object share the object type
            if let Some(object_type) = map.get(&predicate).map(str::to_owned) {
                if let Some(object) = &object {
                    changed |= map.assign(object, &object_type)?;
                }
            } else if let Some(object) = &object
                && let Some(object_type) = map.get(object).map(str::to_owned)
            {
                changed |= map.assign(&predicate, &object_type)?;
            } else if let Entity::Literal(literal) = &stmt.object {
                changed |= map.assign(&predicate, &literal.datatype)?;
            }
        }
    }

    Ok(changed)
}

/// Type a property variable from the class of its subject.
///
/// Used once ordinary propagation is stuck: `?s ?p ?o` where `?s` has a class
/// and neither `?p` nor `?o` has a type. The candidates are the properties the
/// class has cardinalities for. The most specific object type wins; unrelated
/// object types are ambiguous.
pub(super) fn apply_subject_class(map: &mut TypeMap<'_>, stmt: &StatementPattern) -> Result<bool> {
    if stmt.is_type_statement() || !stmt.predicate.is_variable() {
        return Ok(false);
    }
    let (Some(subject), Some(predicate)) = (
        TypeableEntity::from_entity(&stmt.subject),
        TypeableEntity::from_entity(&stmt.predicate),
    ) else {
        return Ok(false);
    };
    if map.get(&predicate).is_some() || matches!(stmt.object, Entity::Literal(_)) {
        return Ok(false);
    }
    if TypeableEntity::from_entity(&stmt.object).is_some_and(|o| map.get(&o).is_some()) {
        return Ok(false);
    }
    let Some(class) = map.get(&subject).map(str::to_owned) else {
        return Ok(false);
    };

    let snapshot = map.snapshot;
    let mut candidates = IndexSet::new();
    for property in snapshot.cardinalities(&class).keys() {
        if !snapshot.is_value_property(property) && !snapshot.is_link_property(property) {
            continue;
        }
        let object_type = snapshot
            .effective_object_type(property)
            .map_err(|e| ontology_error(&predicate, e))?;
        candidates.extend(object_type);
    }

    let most_specific = candidates
        .iter()
        .find(|c| candidates.iter().all(|o| snapshot.is_subclass_of(c, o)));
    if let Some(object_type) = most_specific.cloned() {
        return map.assign(&predicate, &object_type);
    }

    let mut unrelated = candidates.iter().flat_map(|a| {
        candidates
            .iter()
            .filter(move |b| !snapshot.is_subclass_of(a, b) && !snapshot.is_subclass_of(b, a))
            .map(move |b| (a, b))
    });
    match unrelated.next() {
        Some((first, second)) => Err(GravsearchError::new(
            ErrorKind::AmbiguousType,
            Stage::TypeInspection,
            &predicate,
            format!(
                "<{}> has properties with unrelated object types <{}> and <{}>",
                render(map.schema, &class),
                render(map.schema, first),
                render(map.schema, second),
            ),
        )),
        None => Ok(false),
    }
}

/// Apply FILTER rules. Returns whether the map changed.
pub(super) fn apply_filter(map: &mut TypeMap<'_>, expr: &Expression) -> Result<bool> {
    match expr {
        Expression::And(left, right) | Expression::Or(left, right) => {
            let l = apply_filter(map, left)?;
            let r = apply_filter(map, right)?;
            Ok(l || r)
        }
        Expression::Not(inner) => apply_filter(map, inner),
        Expression::Compare { left, op, right } => apply_comparison(map, left, *op, right),
        Expression::Call { function, args } => {
            // regex(?x, ...), lang(?x) and langMatches(lang(?x), ...) take text
            match function {
                Function::Regex | Function::Lang => match args.first().and_then(text_argument) {
                    Some(var) => map.assign(&var, vocab::xsd::STRING),
                    None => Ok(false),
                },
                Function::LangMatches => match args.first() {
                    Some(inner) => apply_filter(map, inner),
                    None => Ok(false),
                },
                Function::Str | Function::Bound => Ok(false),
            }
        }
        Expression::Entity(_) => Ok(false),
    }
}

/// The variable a text function reads, looking through `str(...)`.
fn text_argument(expr: &Expression) -> Option<TypeableEntity> {
    match expr {
        Expression::Entity(entity @ Entity::Variable(_)) => TypeableEntity::from_entity(entity),
        Expression::Call {
            function: Function::Str,
            args,
        } => args.first().and_then(text_argument),
        _ => None,
    }
}

fn apply_comparison(
    map: &mut TypeMap<'_>,
    left: &Expression,
    op: CompareOp,
    right: &Expression,
) -> Result<bool> {
    let (Some(left), Some(right)) = (left.as_entity(), right.as_entity()) else {
        return Ok(false);
    };

    match (left, right) {
        (Entity::Variable(_), Entity::Literal(literal))
        | (Entity::Literal(literal), Entity::Variable(_)) => {
            let var = if left.is_variable() { left } else { right };
            let Some(var) = TypeableEntity::from_entity(var) else {
                return Ok(false);
            };
            map.assign(&var, &literal.datatype)
        }
        (Entity::Variable(_), Entity::Variable(_)) if op == CompareOp::Eq => {
            let (Some(l), Some(r)) = (
                TypeableEntity::from_entity(left),
                TypeableEntity::from_entity(right),
            ) else {
                return Ok(false);
            };
            let mut changed = false;
            if let Some(ty) = map.get(&l).map(str::to_owned) {
                changed |= map.assign(&r, &ty)?;
            }
            if let Some(ty) = map.get(&r).map(str::to_owned) {
                changed |= map.assign(&l, &ty)?;
            }
            Ok(changed)
        }
        (Entity::Variable(_), Entity::Iri(iri)) | (Entity::Iri(iri), Entity::Variable(_))
            if op == CompareOp::Eq =>
        {
            // `FILTER(?p = <property>)` fixes a property variable
            let var = if left.is_variable() { left } else { right };
            let Some(var) = TypeableEntity::from_entity(var) else {
                return Ok(false);
            };
            let property = vocab::to_internal(&iri.iri);
            let object_type = map
                .snapshot
                .effective_object_type(&property)
                .map_err(|e| ontology_error(&var, e))?;
            match object_type {
                Some(object_type) => map.assign(&var, &object_type),
                None => Ok(false),
            }
        }
        _ => Ok(false),
    }
}

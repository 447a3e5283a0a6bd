//! Query checking.
//!
//! Statement rules, applied in order to every WHERE statement and, more
//! strictly, to every CONSTRUCT statement:
//! - No variable names reserved for generated variables
//! - Schema consistency of IRIs
//! - No core-vocabulary IRIs in CONSTRUCT (except `rdf:type`)
//! - CONSTRUCT variables must be resources or values (complex schema)
//! - The only CONSTRUCT literal is `true` on the main-resource marker
//! - No computed predicates, and no value accessors in CONSTRUCT
//! - WHERE predicates must be typed properties
//!
//! FILTER regexes are validated separately.

mod forbidden;
mod regex;

pub use forbidden::{FORBIDDEN_PREDICATES, is_forbidden, is_forbidden_in};

use tracing::debug;

use gravsearch_core::Schema;
use gravsearch_core::vocab::{self, knora_base};

use crate::analyze::type_check::{EntityTypeInfo, TypeInspectionResult};
use crate::analyze::visitor::Visitor;
use crate::pattern::{Entity, GravsearchQuery, StatementPattern, Variable};
use crate::transform::naming;
use crate::{ErrorKind, GravsearchError, Result, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Where,
    Construct,
}

/// Check a typed query. Side-effect free.
pub fn check(query: &GravsearchQuery, types: &TypeInspectionResult) -> Result<()> {
    let schema = query.schema();

    let mut where_checker = WhereChecker {
        schema,
        types,
        checked: 0,
        error: None,
    };
    where_checker.visit_patterns(&query.where_clause.patterns);
    if let Some(err) = where_checker.error {
        return Err(err);
    }

    regex::validate_regexes(&query.where_clause.patterns)?;

    for stmt in &query.construct.statements {
        check_statement(stmt, schema, types, CheckMode::Construct)?;
    }

    debug!(
        where_statements = where_checker.checked,
        construct_statements = query.construct.statements.len(),
        "query checked"
    );
    Ok(())
}

struct WhereChecker<'t> {
    schema: Schema,
    types: &'t TypeInspectionResult,
    checked: usize,
    error: Option<GravsearchError>,
}

impl Visitor for WhereChecker<'_> {
    fn visit_statement(&mut self, stmt: &StatementPattern) {
        if self.error.is_some() {
            return;
        }
        self.checked += 1;
        if let Err(err) = check_statement(stmt, self.schema, self.types, CheckMode::Where) {
            self.error = Some(err);
        }
    }

    // Reached for FILTER operands only; statements are checked whole.
    fn visit_entity(&mut self, entity: &Entity) {
        if self.error.is_none()
            && let Entity::Variable(var) = entity
        {
            self.error = check_variable_name(var).err();
        }
    }
}

fn check_variable_name(var: &Variable) -> Result<()> {
    if naming::is_reserved(var) {
        return Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::Checking,
            var,
            format!(
                "variable names containing `{}` are reserved",
                naming::SEPARATOR
            ),
        ));
    }
    Ok(())
}

/// Check one statement.
pub fn check_statement(
    stmt: &StatementPattern,
    schema: Schema,
    types: &TypeInspectionResult,
    mode: CheckMode,
) -> Result<()> {
    let fail = |kind: ErrorKind, reason: String| {
        Err(GravsearchError::new(kind, Stage::Checking, stmt, reason))
    };

    for entity in stmt.entities() {
        if let Entity::Variable(var) = entity {
            check_variable_name(var)?;
        }
    }

    for entity in stmt.entities() {
        if let Entity::Iri(iri) = entity
            && let Some(tag) = iri.schema
            && tag != schema
        {
            return fail(
                ErrorKind::SchemaMismatch,
                format!(
                    "{iri} belongs to the {tag} schema but the query uses the {schema} schema"
                ),
            );
        }
    }

    if mode == CheckMode::Construct {
        for (position, entity) in stmt.entities().into_iter().enumerate() {
            if let Entity::Iri(iri) = entity
                && vocab::is_core_vocabulary(&iri.iri)
                && !(position == 1 && iri.is_rdf_type())
            {
                return fail(
                    ErrorKind::ForbiddenConstruct,
                    format!("{iri} may not be used in the CONSTRUCT clause"),
                );
            }
        }

        if schema == Schema::Complex {
            for entity in [&stmt.subject, &stmt.object] {
                let Entity::Variable(var) = entity else {
                    continue;
                };
                match types.get(entity) {
                    None => {
                        return Err(GravsearchError::new(
                            ErrorKind::UntypedVariable,
                            Stage::Checking,
                            var,
                            "variables in the CONSTRUCT clause must have a known type",
                        ));
                    }
                    Some(EntityTypeInfo::NonProperty(info)) if info.is_resource || info.is_value => {}
                    Some(info) => {
                        return fail(
                            ErrorKind::ForbiddenConstruct,
                            format!(
                                "{var} has type <{}>, expected a resource or a value",
                                info.type_iri()
                            ),
                        );
                    }
                }
            }
        }

        for entity in stmt.entities() {
            let Entity::Literal(literal) = entity else {
                continue;
            };
            let is_main_resource_marker = literal.is_true()
                && std::ptr::eq(entity, &stmt.object)
                && stmt
                    .predicate
                    .as_iri()
                    .is_some_and(|p| vocab::to_internal(&p.iri) == knora_base::IS_MAIN_RESOURCE);
            if !is_main_resource_marker {
                return fail(
                    ErrorKind::ForbiddenConstruct,
                    format!("literal {literal} may not be used in the CONSTRUCT clause"),
                );
            }
        }
    }

    if let Entity::Iri(predicate) = &stmt.predicate {
        if is_forbidden_in(&predicate.iri, mode) {
            return fail(
                ErrorKind::ForbiddenConstruct,
                format!("{predicate} is computed and cannot be queried"),
            );
        }

        if mode == CheckMode::Where
            && !predicate.is_rdf_type()
            && types
                .get(&stmt.predicate)
                .and_then(EntityTypeInfo::as_property)
                .is_none()
        {
            return Err(GravsearchError::new(
                ErrorKind::UntypedVariable,
                Stage::Checking,
                predicate,
                "no type is known for this property",
            ));
        }
    }

    Ok(())
}

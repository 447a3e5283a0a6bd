//! Statement roles and inference scopes.

use indexmap::IndexSet;

use super::types::TypeableEntity;
use crate::analyze::visitor::Visitor;
use crate::pattern::{Expression, Pattern, StatementPattern, UnionGroup};

/// Positions each typeable entity occupies across the whole WHERE clause.
#[derive(Debug, Default)]
pub(super) struct Roles {
    pub predicates: IndexSet<TypeableEntity>,
    pub others: IndexSet<TypeableEntity>,
    /// Every typeable entity in first-seen order.
    pub order: IndexSet<TypeableEntity>,
}

impl Roles {
    pub fn collect(patterns: &[Pattern]) -> Self {
        let mut roles = Roles::default();
        roles.visit_patterns(patterns);
        roles
    }

    pub fn first_conflict(&self) -> Option<&TypeableEntity> {
        self.predicates.iter().find(|e| self.others.contains(*e))
    }

    fn record(&mut self, entity: TypeableEntity, as_predicate: bool) {
        self.order.insert(entity.clone());
        if as_predicate {
            self.predicates.insert(entity);
        } else {
            self.others.insert(entity);
        }
    }
}

impl Visitor for Roles {
    fn visit_statement(&mut self, stmt: &StatementPattern) {
        if let Some(subject) = TypeableEntity::from_entity(&stmt.subject) {
            self.record(subject, false);
        }

        // rdf:type and its class argument are vocabulary, not data
        if stmt.is_type_statement() {
            return;
        }

        if let Some(predicate) = TypeableEntity::from_entity(&stmt.predicate) {
            self.record(predicate, true);
        }
        if let Some(object) = TypeableEntity::from_entity(&stmt.object) {
            self.record(object, false);
        }
    }
}

/// Facts that share one binding scope. OPTIONAL and MINUS contents join the
/// enclosing scope; each UNION branch is its own scope.
#[derive(Debug, Default)]
pub(super) struct Scope<'q> {
    pub statements: Vec<&'q StatementPattern>,
    pub filters: Vec<&'q Expression>,
    pub unions: Vec<&'q UnionGroup>,
}

impl<'q> Scope<'q> {
    pub fn collect(patterns: &'q [Pattern]) -> Self {
        let mut scope = Scope::default();
        scope.add(patterns);
        scope
    }

    fn add(&mut self, patterns: &'q [Pattern]) {
        for pattern in patterns {
            match pattern {
                Pattern::Statement(stmt) => self.statements.push(stmt),
                Pattern::Filter(filter) => self.filters.push(&filter.expr),
                Pattern::Optional(group) => self.add(&group.patterns),
                Pattern::Minus(group) => self.add(&group.patterns),
                Pattern::Union(union) => self.unions.push(union),
            }
        }
    }
}

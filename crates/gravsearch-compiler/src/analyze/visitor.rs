//! Pattern visitor.
//!
//! # Usage
//!
//! Implement `Visitor` for your struct. Override `visit_*` methods to add logic.
//! Call `walk_*` within your override to continue recursion (or omit it to stop).
//!
//! ```ignore
//! impl Visitor for MyPass {
//!     fn visit_statement(&mut self, stmt: &StatementPattern) {
//!         // Pre-order logic
//!         walk_statement(self, stmt);
//!     }
//! }
//! ```

use crate::pattern::{
    Entity, Expression, FilterExpression, MinusGroup, OptionalGroup, Pattern, StatementPattern,
    UnionGroup,
};

pub trait Visitor: Sized {
    fn visit_patterns(&mut self, patterns: &[Pattern]) {
        walk_patterns(self, patterns);
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        walk_pattern(self, pattern);
    }

    fn visit_statement(&mut self, stmt: &StatementPattern) {
        walk_statement(self, stmt);
    }

    fn visit_optional(&mut self, group: &OptionalGroup) {
        walk_optional(self, group);
    }

    fn visit_union(&mut self, union: &UnionGroup) {
        walk_union(self, union);
    }

    fn visit_filter(&mut self, filter: &FilterExpression) {
        walk_filter(self, filter);
    }

    fn visit_minus(&mut self, group: &MinusGroup) {
        walk_minus(self, group);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_entity(&mut self, _entity: &Entity) {
        // Leaf
    }
}

pub fn walk_patterns<V: Visitor>(visitor: &mut V, patterns: &[Pattern]) {
    for pattern in patterns {
        visitor.visit_pattern(pattern);
    }
}

pub fn walk_pattern<V: Visitor>(visitor: &mut V, pattern: &Pattern) {
    match pattern {
        Pattern::Statement(stmt) => visitor.visit_statement(stmt),
        Pattern::Optional(group) => visitor.visit_optional(group),
        Pattern::Union(union) => visitor.visit_union(union),
        Pattern::Filter(filter) => visitor.visit_filter(filter),
        Pattern::Minus(group) => visitor.visit_minus(group),
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, stmt: &StatementPattern) {
    for entity in stmt.entities() {
        visitor.visit_entity(entity);
    }
}

pub fn walk_optional<V: Visitor>(visitor: &mut V, group: &OptionalGroup) {
    visitor.visit_patterns(&group.patterns);
}

pub fn walk_union<V: Visitor>(visitor: &mut V, union: &UnionGroup) {
    for alternative in &union.alternatives {
        visitor.visit_patterns(alternative);
    }
}

pub fn walk_filter<V: Visitor>(visitor: &mut V, filter: &FilterExpression) {
    visitor.visit_expression(&filter.expr);
}

pub fn walk_minus<V: Visitor>(visitor: &mut V, group: &MinusGroup) {
    visitor.visit_patterns(&group.patterns);
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Entity(entity) => visitor.visit_entity(entity),
        Expression::Compare { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        Expression::And(left, right) | Expression::Or(left, right) => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        Expression::Not(inner) => visitor.visit_expression(inner),
        Expression::Call { args, .. } => {
            for arg in args {
                visitor.visit_expression(arg);
            }
        }
    }
}

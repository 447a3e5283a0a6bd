//! Permission-visibility injection.
//!
//! Every node carrying a deletion marker also binds its permission string so
//! the downstream permission filter can evaluate it. The compiler does not
//! evaluate permissions itself.

use indexmap::IndexSet;

use gravsearch_core::vocab::knora_base;

use super::values::is_deletion_marker;
use super::{TransformCtx, naming};
use crate::Result;
use crate::analyze::visitor::Visitor;
use crate::pattern::{Entity, Pattern, StatementPattern, Variable};

/// A node and the variable holding its permission string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionBinding {
    pub node: Variable,
    pub permissions: Variable,
}

pub fn inject_permissions(_ctx: &TransformCtx<'_>, patterns: &[Pattern]) -> Result<Vec<Pattern>> {
    Ok(inject(patterns))
}

/// Add permission statements after the deletion markers of `statements`.
pub fn inject_template(statements: Vec<StatementPattern>) -> Vec<StatementPattern> {
    let mut out = Vec::with_capacity(statements.len());
    for stmt in statements {
        let permission = permission_statement(&stmt);
        out.push(stmt);
        out.extend(permission);
    }
    out
}

fn inject(patterns: &[Pattern]) -> Vec<Pattern> {
    let mut out = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match pattern {
            Pattern::Statement(stmt) => {
                out.push(pattern.clone());
                if let Some(permission) = permission_statement(stmt) {
                    out.push(permission.into());
                }
            }
            Pattern::Optional(group) => out.push(Pattern::optional(inject(&group.patterns))),
            Pattern::Union(union) => out.push(Pattern::union(
                union.alternatives.iter().map(|alt| inject(alt)).collect(),
            )),
            Pattern::Minus(group) => out.push(Pattern::minus(inject(&group.patterns))),
            Pattern::Filter(_) => out.push(pattern.clone()),
        }
    }
    out
}

fn permission_statement(stmt: &StatementPattern) -> Option<StatementPattern> {
    if !is_deletion_marker(stmt) {
        return None;
    }
    let node = stmt.subject.as_variable()?;
    Some(StatementPattern::new(
        stmt.subject.clone(),
        Entity::iri(knora_base::HAS_PERMISSIONS),
        Entity::Variable(naming::permissions(node)),
    ))
}

/// Permission bindings present in `patterns`, in first-seen order.
pub fn collect_bindings(patterns: &[Pattern]) -> Vec<PermissionBinding> {
    let mut collector = BindingCollector::default();
    collector.visit_patterns(patterns);
    collector.bindings.into_iter().collect()
}

#[derive(Default)]
struct BindingCollector {
    bindings: IndexSet<PermissionBinding>,
}

impl Visitor for BindingCollector {
    fn visit_statement(&mut self, stmt: &StatementPattern) {
        if let Some(node) = stmt.subject.as_variable()
            && let Some(permissions) = stmt.object.as_variable()
            && stmt
                .predicate
                .as_iri()
                .is_some_and(|p| p.iri == knora_base::HAS_PERMISSIONS)
        {
            self.bindings.insert(PermissionBinding {
                node: node.clone(),
                permissions: permissions.clone(),
            });
        }
    }
}

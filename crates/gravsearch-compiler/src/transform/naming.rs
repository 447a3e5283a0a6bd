//! Names of generated variables.
//!
//! Generated names are derived from the entities they stand for, joined with
//! `__`, so output is stable across runs. User variables may not contain the
//! separator.

use gravsearch_core::vocab;

use crate::pattern::{Entity, Variable};

pub const SEPARATOR: &str = "__";

/// Whether a user-written variable would collide with generated names.
pub fn is_reserved(var: &Variable) -> bool {
    var.name.contains(SEPARATOR)
}

/// A variable-safe name for any entity.
pub fn base_name(entity: &Entity) -> String {
    match entity {
        Entity::Variable(v) => v.name.clone(),
        Entity::Iri(iri) => sanitize(vocab::local_name(&iri.iri)),
        Entity::Literal(_) => "literal".to_owned(),
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Value node standing in for a literal object.
pub fn value_node(subject: &Entity, predicate: &Entity, object: &Entity, index: usize) -> Variable {
    match object {
        Entity::Variable(v) => Variable::new(format!("{}__valueNode", v.name)),
        _ => Variable::new(format!(
            "{}__{}__valueNode{index}",
            base_name(subject),
            base_name(predicate),
        )),
    }
}

/// Newer version of a value node, bound only when the node is superseded.
pub fn newer_version(node: &Entity) -> Variable {
    Variable::new(format!("{}__newer", base_name(node)))
}

/// Link value connecting `subject` to `object` through `link_property`.
pub fn link_value(subject: &Entity, link_property: &str, object: &Entity) -> Variable {
    Variable::new(format!(
        "{}__{}__{}__LinkValue",
        base_name(subject),
        sanitize(vocab::local_name(link_property)),
        base_name(object),
    ))
}

/// Permission string of a resource or value node.
pub fn permissions(node: &Variable) -> Variable {
    Variable::new(format!("{}__permissions", node.name))
}

/// Literal content of a value node used for ordering.
pub fn order_content(node: &Variable) -> Variable {
    Variable::new(format!("{}__orderContent", node.name))
}

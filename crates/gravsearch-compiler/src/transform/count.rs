//! Count-query derivation.

use super::{ContentQuery, CountQuery};
use crate::analyze::visitor::Visitor;
use crate::pattern::{Entity, Pattern, StatementPattern, Variable};
use crate::{ErrorKind, GravsearchError, Result, Stage};

/// Reuse the content query's WHERE body under a count projection.
pub fn derive_count(content: &ContentQuery) -> Result<CountQuery> {
    if !binds(&content.where_patterns, &content.main_resource) {
        return Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::CountDerivation,
            &content.main_resource,
            "the main resource does not occur in the WHERE clause",
        ));
    }

    Ok(CountQuery {
        main_resource: content.main_resource.clone(),
        where_patterns: content.where_patterns.clone(),
    })
}

fn binds(patterns: &[Pattern], var: &Variable) -> bool {
    let mut finder = VariableFinder { var, found: false };
    finder.visit_patterns(patterns);
    finder.found
}

struct VariableFinder<'v> {
    var: &'v Variable,
    found: bool,
}

impl Visitor for VariableFinder<'_> {
    fn visit_statement(&mut self, stmt: &StatementPattern) {
        self.found |= stmt
            .entities()
            .into_iter()
            .any(|e| matches!(e, Entity::Variable(v) if v == self.var));
    }
}

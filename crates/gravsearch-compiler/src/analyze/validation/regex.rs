//! FILTER regex validation.
//!
//! Rejects patterns the triplestores disagree on:
//! - Empty patterns
//! - Backreferences (`\1`)
//! - Lookahead/lookbehind (`(?=...)`, `(?!...)`, etc.)

use regex_syntax::ast;

use crate::analyze::visitor::{Visitor, walk_expression};
use crate::pattern::{Entity, Expression, Function, Pattern};
use crate::{ErrorKind, GravsearchError, Result, Stage};

pub fn validate_regexes(patterns: &[Pattern]) -> Result<()> {
    let mut validator = RegexValidator { error: None };
    validator.visit_patterns(patterns);
    match validator.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct RegexValidator {
    error: Option<GravsearchError>,
}

impl Visitor for RegexValidator {
    fn visit_expression(&mut self, expr: &Expression) {
        if self.error.is_some() {
            return;
        }

        if let Expression::Call {
            function: Function::Regex,
            args,
        } = expr
            && let Some(Expression::Entity(Entity::Literal(pattern))) = args.get(1)
            && let Err(err) = validate_regex(&pattern.value)
        {
            self.error = Some(err);
            return;
        }
        walk_expression(self, expr);
    }
}

fn validate_regex(pattern: &str) -> Result<()> {
    let reject = |reason: String| {
        Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::Checking,
            format!("regex \"{pattern}\""),
            reason,
        ))
    };

    if pattern.is_empty() {
        return reject("empty regular expression".to_owned());
    }

    // Octal disabled so \1-\9 are backreferences, not octal
    let parsed = ast::parse::ParserBuilder::new()
        .octal(false)
        .build()
        .parse(pattern);

    match parsed {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            ast::ErrorKind::UnsupportedBackreference => {
                reject("backreferences are not supported".to_owned())
            }
            ast::ErrorKind::UnsupportedLookAround => {
                reject("lookahead and lookbehind are not supported".to_owned())
            }
            kind => reject(format!("invalid regular expression: {kind}")),
        },
    }
}

//! SPARQL text rendering.
//!
//! Output is a pure function of the input patterns: a fixed PREFIX header,
//! four-space indentation, one statement per line.

use gravsearch_core::vocab;

use crate::pattern::{Entity, Expression, Literal, Pattern, StatementPattern, Variable};
use crate::transform::{ContentQuery, CountQuery};
use crate::{ErrorKind, GravsearchError, Result, Stage};

const INDENT: &str = "    ";

/// Namespaces abbreviated in emitted queries.
pub const PREFIXES: [(&str, &str); 5] = [
    ("rdf", vocab::RDF),
    ("rdfs", vocab::RDFS),
    ("owl", vocab::OWL),
    ("xsd", vocab::XSD),
    ("knora-base", vocab::KNORA_BASE),
];

/// Render the CONSTRUCT query.
pub fn render_content(query: &ContentQuery) -> Result<String> {
    let mut w = SparqlWriter::default();
    w.prefixes();

    w.open("CONSTRUCT");
    for stmt in &query.template {
        w.statement(stmt)?;
    }
    w.close();

    w.where_body(&query.where_patterns)?;

    if !query.order_by.is_empty() {
        let criteria = query
            .order_by
            .iter()
            .map(|c| {
                let dir = if c.ascending { "ASC" } else { "DESC" };
                Ok(format!("{dir}({})", variable(&c.variable)?))
            })
            .collect::<Result<Vec<_>>>()?;
        w.line(&format!("ORDER BY {}", criteria.join(" ")));
    }
    w.line(&format!("LIMIT {}", query.limit));
    w.line(&format!("OFFSET {}", query.offset));

    Ok(w.finish())
}

/// Render the count query.
pub fn render_count(query: &CountQuery) -> Result<String> {
    let mut w = SparqlWriter::default();
    w.prefixes();
    w.line(&format!(
        "SELECT (COUNT(DISTINCT {}) AS ?count)",
        variable(&query.main_resource)?
    ));
    w.where_body(&query.where_patterns)?;
    Ok(w.finish())
}

/// Render a group body without braces, one pattern per line.
pub fn render_patterns(patterns: &[Pattern]) -> Result<String> {
    let mut w = SparqlWriter::default();
    w.patterns(patterns)?;
    Ok(w.finish())
}

#[derive(Default)]
struct SparqlWriter {
    out: String,
    depth: usize,
}

impl SparqlWriter {
    fn finish(self) -> String {
        self.out
    }

    fn prefixes(&mut self) {
        for (prefix, namespace) in PREFIXES {
            self.line(&format!("PREFIX {prefix}: <{namespace}>"));
        }
        self.out.push('\n');
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, head: &str) {
        if head.is_empty() {
            self.line("{");
        } else {
            self.line(&format!("{head} {{"));
        }
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn where_body(&mut self, patterns: &[Pattern]) -> Result<()> {
        self.open("WHERE");
        self.patterns(patterns)?;
        self.close();
        Ok(())
    }

    fn patterns(&mut self, patterns: &[Pattern]) -> Result<()> {
        for pattern in patterns {
            self.pattern(pattern)?;
        }
        Ok(())
    }

    fn pattern(&mut self, pattern: &Pattern) -> Result<()> {
        match pattern {
            Pattern::Statement(stmt) => self.statement(stmt)?,
            Pattern::Optional(group) => {
                self.open("OPTIONAL");
                self.patterns(&group.patterns)?;
                self.close();
            }
            Pattern::Union(union) => {
                for (i, alternative) in union.alternatives.iter().enumerate() {
                    if i > 0 {
                        self.line("UNION");
                    }
                    self.open("");
                    self.patterns(alternative)?;
                    self.close();
                }
            }
            Pattern::Filter(filter) => {
                self.line(&format!("FILTER({})", expression(&filter.expr)?));
            }
            Pattern::Minus(group) => {
                self.open("MINUS");
                self.patterns(&group.patterns)?;
                self.close();
            }
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &StatementPattern) -> Result<()> {
        let text = format!(
            "{} {} {} .",
            term(&stmt.subject)?,
            term(&stmt.predicate)?,
            term(&stmt.object)?
        );
        self.line(&text);
        Ok(())
    }
}

/// Render one entity as a SPARQL term.
pub fn term(entity: &Entity) -> Result<String> {
    match entity {
        Entity::Variable(v) => variable(v),
        Entity::Iri(iri) => iri_term(&iri.iri, entity),
        Entity::Literal(literal) => literal_term(literal, entity),
    }
}

fn variable(v: &Variable) -> Result<String> {
    let valid = !v.name.is_empty() && v.name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::Emission,
            v,
            "not a valid SPARQL variable name",
        ));
    }
    Ok(format!("?{}", v.name))
}

fn iri_term(iri: &str, construct: &Entity) -> Result<String> {
    if iri.is_empty()
        || iri
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'))
    {
        return Err(GravsearchError::new(
            ErrorKind::UnsupportedPattern,
            Stage::Emission,
            construct,
            "not a valid IRI reference",
        ));
    }

    for (prefix, namespace) in PREFIXES {
        if let Some(local) = iri.strip_prefix(namespace)
            && is_prefixed_local(local)
        {
            return Ok(format!("{prefix}:{local}"));
        }
    }
    Ok(format!("<{iri}>"))
}

fn is_prefixed_local(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphanumeric() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn literal_term(literal: &Literal, construct: &Entity) -> Result<String> {
    let lexical = format!("\"{}\"", crate::pattern::escape_string(&literal.value));
    if literal.datatype == vocab::xsd::STRING {
        return Ok(lexical);
    }
    Ok(format!("{lexical}^^{}", iri_term(&literal.datatype, construct)?))
}

fn expression(expr: &Expression) -> Result<String> {
    Ok(match expr {
        Expression::Entity(entity) => term(entity)?,
        Expression::Compare { left, op, right } => {
            format!("{} {} {}", expression(left)?, op.as_str(), expression(right)?)
        }
        Expression::And(left, right) => {
            format!("({} && {})", expression(left)?, expression(right)?)
        }
        Expression::Or(left, right) => {
            format!("({} || {})", expression(left)?, expression(right)?)
        }
        Expression::Not(inner) => match inner.as_ref() {
            Expression::Compare { .. } => format!("!({})", expression(inner)?),
            _ => format!("!{}", expression(inner)?),
        },
        Expression::Call { function, args } => {
            let args = args.iter().map(expression).collect::<Result<Vec<_>>>()?;
            format!("{}({})", function.name(), args.join(", "))
        }
    })
}

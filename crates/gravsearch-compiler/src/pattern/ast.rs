//! Graph patterns and the two query clauses.

use std::fmt;

use gravsearch_core::Schema;

use super::entity::{Entity, Variable};
use super::expr::Expression;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementPattern {
    pub subject: Entity,
    pub predicate: Entity,
    pub object: Entity,
}

impl StatementPattern {
    pub fn new(subject: Entity, predicate: Entity, object: Entity) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// `?s rdf:type <Class>`
    pub fn is_type_statement(&self) -> bool {
        self.predicate.is_rdf_type()
    }

    pub fn entities(&self) -> [&Entity; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

impl fmt::Display for StatementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionalGroup {
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionGroup {
    pub alternatives: Vec<Vec<Pattern>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterExpression {
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MinusGroup {
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Statement(StatementPattern),
    Optional(OptionalGroup),
    Union(UnionGroup),
    Filter(FilterExpression),
    Minus(MinusGroup),
}

impl Pattern {
    pub fn statement(subject: Entity, predicate: Entity, object: Entity) -> Self {
        Pattern::Statement(StatementPattern::new(subject, predicate, object))
    }

    pub fn optional(patterns: Vec<Pattern>) -> Self {
        Pattern::Optional(OptionalGroup { patterns })
    }

    pub fn union(alternatives: Vec<Vec<Pattern>>) -> Self {
        Pattern::Union(UnionGroup { alternatives })
    }

    pub fn filter(expr: Expression) -> Self {
        Pattern::Filter(FilterExpression { expr })
    }

    pub fn minus(patterns: Vec<Pattern>) -> Self {
        Pattern::Minus(MinusGroup { patterns })
    }

    pub fn as_statement(&self) -> Option<&StatementPattern> {
        match self {
            Pattern::Statement(s) => Some(s),
            _ => None,
        }
    }
}

impl From<StatementPattern> for Pattern {
    fn from(s: StatementPattern) -> Self {
        Pattern::Statement(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Statement(s) => write!(f, "{s}"),
            Pattern::Optional(g) => write!(f, "OPTIONAL {{ {} }}", Patterns(&g.patterns)),
            Pattern::Union(u) => {
                for (i, alt) in u.alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " UNION ")?;
                    }
                    write!(f, "{{ {} }}", Patterns(alt))?;
                }
                Ok(())
            }
            Pattern::Filter(flt) => write!(f, "FILTER({})", flt.expr),
            Pattern::Minus(g) => write!(f, "MINUS {{ {} }}", Patterns(&g.patterns)),
        }
    }
}

struct Patterns<'a>(&'a [Pattern]);

impl fmt::Display for Patterns<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

/// The CONSTRUCT template as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructClause {
    pub statements: Vec<StatementPattern>,
    /// Schema the caller wrote the query in.
    pub schema: Schema,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCriterion {
    pub variable: Variable,
    pub ascending: bool,
}

impl OrderCriterion {
    pub fn asc(variable: Variable) -> Self {
        Self {
            variable,
            ascending: true,
        }
    }

    pub fn desc(variable: Variable) -> Self {
        Self {
            variable,
            ascending: false,
        }
    }
}

/// A parsed Gravsearch query. Never mutated by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GravsearchQuery {
    pub construct: ConstructClause,
    pub where_clause: WhereClause,
    pub order_by: Vec<OrderCriterion>,
    /// Zero-based page number.
    pub offset: u32,
}

impl GravsearchQuery {
    pub fn new(
        schema: Schema,
        construct: Vec<StatementPattern>,
        where_patterns: Vec<Pattern>,
    ) -> Self {
        Self {
            construct: ConstructClause {
                statements: construct,
                schema,
            },
            where_clause: WhereClause {
                patterns: where_patterns,
            },
            order_by: Vec::new(),
            offset: 0,
        }
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderCriterion>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn schema(&self) -> Schema {
        self.construct.schema
    }
}

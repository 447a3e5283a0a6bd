//! Entities: the terms that fill statement positions.

use std::fmt;

use gravsearch_core::Schema;
use gravsearch_core::vocab::{rdf, xsd};

/// A fixed IRI, tagged with the schema it was written in.
///
/// The tag is `None` for schema-neutral IRIs (core vocabularies, data IRIs).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IriRef {
    pub iri: String,
    pub schema: Option<Schema>,
}

impl IriRef {
    pub fn new(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        let schema = Schema::of_iri(&iri);
        Self { iri, schema }
    }

    pub fn with_schema(iri: impl Into<String>, schema: Option<Schema>) -> Self {
        Self {
            iri: iri.into(),
            schema,
        }
    }

    pub fn is_rdf_type(&self) -> bool {
        self.iri == rdf::TYPE
    }
}

/// A named placeholder. Identity is by name within one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: String,
    pub datatype: String,
}

impl Literal {
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: datatype.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::typed(value, xsd::STRING)
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), xsd::INTEGER)
    }

    pub fn decimal(value: impl Into<String>) -> Self {
        Self::typed(value, xsd::DECIMAL)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), xsd::BOOLEAN)
    }

    pub fn is_true(&self) -> bool {
        self.datatype == xsd::BOOLEAN && self.value == "true"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Iri(IriRef),
    Variable(Variable),
    Literal(Literal),
}

impl Entity {
    pub fn iri(iri: impl Into<String>) -> Self {
        Entity::Iri(IriRef::new(iri))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Entity::Variable(Variable::new(name))
    }

    pub fn literal(literal: Literal) -> Self {
        Entity::Literal(literal)
    }

    pub fn as_iri(&self) -> Option<&IriRef> {
        match self {
            Entity::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Entity::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Entity::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Entity::Variable(_))
    }

    pub fn is_rdf_type(&self) -> bool {
        self.as_iri().is_some_and(IriRef::is_rdf_type)
    }
}

impl From<Variable> for Entity {
    fn from(v: Variable) -> Self {
        Entity::Variable(v)
    }
}

impl From<IriRef> for Entity {
    fn from(iri: IriRef) -> Self {
        Entity::Iri(iri)
    }
}

impl From<Literal> for Entity {
    fn from(l: Literal) -> Self {
        Entity::Literal(l)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

impl fmt::Display for IriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_string(&self.value))?;
        if self.datatype != xsd::STRING {
            write!(f, "^^<{}>", self.datatype)?;
        }
        Ok(())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Iri(iri) => fmt::Display::fmt(iri, f),
            Entity::Variable(v) => fmt::Display::fmt(v, f),
            Entity::Literal(l) => fmt::Display::fmt(l, f),
        }
    }
}

/// Escape a lexical value for a double-quoted SPARQL string.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

//! Target triplestores.

use std::fmt;

use serde::Deserialize;

/// The graph-query engine a compiled query is written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriplestoreDialect {
    /// Reasons over `rdfs:subClassOf` and `rdfs:subPropertyOf`.
    #[default]
    GraphDb,
    /// No reasoning; subtypes must be spelled out.
    Fuseki,
}

impl TriplestoreDialect {
    pub fn supports_inference(self) -> bool {
        match self {
            TriplestoreDialect::GraphDb => true,
            TriplestoreDialect::Fuseki => false,
        }
    }
}

impl fmt::Display for TriplestoreDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriplestoreDialect::GraphDb => write!(f, "graphdb"),
            TriplestoreDialect::Fuseki => write!(f, "fuseki"),
        }
    }
}

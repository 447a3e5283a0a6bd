use std::ops::Deref;

use gravsearch_core::OntologySnapshot;

use super::CompileConfig;
use crate::Result;
use crate::analyze::{self, TypeInspectionResult};
use crate::emit::{self, CompiledQuery, TriplestoreDialect};
use crate::pattern::GravsearchQuery;
use crate::transform::{TransformedQuery, Transformer};

/// A query as handed over by the parser.
#[derive(Debug, Clone)]
pub struct QueryParsed {
    query: GravsearchQuery,
    config: CompileConfig,
}

impl QueryParsed {
    pub fn new(query: GravsearchQuery) -> Self {
        Self {
            query,
            config: CompileConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn query(&self) -> &GravsearchQuery {
        &self.query
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn infer_types(self, snapshot: &OntologySnapshot) -> Result<QueryTyped<'_>> {
        let types = analyze::infer_types(&self.query, snapshot, self.config.max_inference_rounds)?;
        Ok(QueryTyped {
            parsed: self,
            snapshot,
            types,
        })
    }
}

pub struct QueryTyped<'s> {
    parsed: QueryParsed,
    snapshot: &'s OntologySnapshot,
    types: TypeInspectionResult,
}

impl<'s> QueryTyped<'s> {
    pub fn types(&self) -> &TypeInspectionResult {
        &self.types
    }

    pub fn snapshot(&self) -> &'s OntologySnapshot {
        self.snapshot
    }

    pub fn check(self) -> Result<QueryChecked<'s>> {
        analyze::check(&self.parsed.query, &self.types)?;
        Ok(QueryChecked { typed: self })
    }
}

impl Deref for QueryTyped<'_> {
    type Target = QueryParsed;

    fn deref(&self) -> &Self::Target {
        &self.parsed
    }
}

/// A typed query that passed every checker rule.
pub struct QueryChecked<'s> {
    typed: QueryTyped<'s>,
}

impl<'s> QueryChecked<'s> {
    pub fn transform(self, dialect: TriplestoreDialect) -> Result<QueryTransformed<'s>> {
        let transformed = Transformer::new(dialect)
            .with_page_size(self.config.page_size)
            .transform(&self.query, &self.types, self.snapshot)?;
        Ok(QueryTransformed {
            checked: self,
            transformed,
        })
    }
}

impl<'s> Deref for QueryChecked<'s> {
    type Target = QueryTyped<'s>;

    fn deref(&self) -> &Self::Target {
        &self.typed
    }
}

pub struct QueryTransformed<'s> {
    checked: QueryChecked<'s>,
    transformed: TransformedQuery,
}

impl<'s> QueryTransformed<'s> {
    pub fn transformed(&self) -> &TransformedQuery {
        &self.transformed
    }

    pub fn into_transformed(self) -> TransformedQuery {
        self.transformed
    }

    pub fn emit(&self) -> Result<CompiledQuery> {
        emit::emit(&self.transformed)
    }
}

impl<'s> Deref for QueryTransformed<'s> {
    type Target = QueryChecked<'s>;

    fn deref(&self) -> &Self::Target {
        &self.checked
    }
}

//! Gravsearch compiler: type inspection, checking, rewriting, and SPARQL emission.
//!
//! This crate provides the compilation pipeline for Gravsearch queries:
//! - `pattern` - the query model handed over by the parser
//! - `analyze` - type inspection and query checking
//! - `transform` - rewrite stages from user patterns to storage patterns
//! - `emit` - SPARQL text rendering
//! - `query` - high-level staged facade

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::fmt;

pub mod analyze;
pub mod emit;
pub mod pattern;
pub mod query;
pub mod transform;

#[cfg(test)]
pub mod test_utils;

pub use analyze::type_check::{EntityTypeInfo, TypeInspectionResult};
pub use emit::{CompiledQuery, TriplestoreDialect};
pub use pattern::{Entity, GravsearchQuery, Pattern, StatementPattern};
pub use query::{CompileConfig, GravsearchCompiler, QueryParsed};
pub use transform::TransformedQuery;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    TypeInspection,
    Checking,
    SchemaFlattening,
    ValueExpansion,
    PermissionInjection,
    InferenceCompensation,
    CountDerivation,
    Emission,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::TypeInspection => "type inspection",
            Stage::Checking => "checking",
            Stage::SchemaFlattening => "schema flattening",
            Stage::ValueExpansion => "value expansion",
            Stage::PermissionInjection => "permission injection",
            Stage::InferenceCompensation => "inference compensation",
            Stage::CountDerivation => "count derivation",
            Stage::Emission => "emission",
        };
        f.write_str(name)
    }
}

/// Error category, independent of stage and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UntypedVariable,
    AmbiguousType,
    SchemaMismatch,
    ForbiddenConstruct,
    UnsupportedPattern,
}

/// Errors that abort a compilation.
///
/// `construct` is the offending entity or pattern, rendered in query syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GravsearchError {
    #[error("{stage}: no type could be inferred for {construct}: {reason}")]
    UntypedVariable {
        stage: Stage,
        construct: String,
        reason: String,
    },

    #[error("{stage}: incompatible types for {construct}: {reason}")]
    AmbiguousType {
        stage: Stage,
        construct: String,
        reason: String,
    },

    #[error("{stage}: schema mismatch in {construct}: {reason}")]
    SchemaMismatch {
        stage: Stage,
        construct: String,
        reason: String,
    },

    #[error("{stage}: {construct} is not allowed: {reason}")]
    ForbiddenConstruct {
        stage: Stage,
        construct: String,
        reason: String,
    },

    #[error("{stage}: unsupported pattern {construct}: {reason}")]
    UnsupportedPattern {
        stage: Stage,
        construct: String,
        reason: String,
    },
}

impl GravsearchError {
    pub fn new(
        kind: ErrorKind,
        stage: Stage,
        construct: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        let construct = construct.to_string();
        let reason = reason.into();
        match kind {
            ErrorKind::UntypedVariable => Self::UntypedVariable {
                stage,
                construct,
                reason,
            },
            ErrorKind::AmbiguousType => Self::AmbiguousType {
                stage,
                construct,
                reason,
            },
            ErrorKind::SchemaMismatch => Self::SchemaMismatch {
                stage,
                construct,
                reason,
            },
            ErrorKind::ForbiddenConstruct => Self::ForbiddenConstruct {
                stage,
                construct,
                reason,
            },
            ErrorKind::UnsupportedPattern => Self::UnsupportedPattern {
                stage,
                construct,
                reason,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UntypedVariable { .. } => ErrorKind::UntypedVariable,
            Self::AmbiguousType { .. } => ErrorKind::AmbiguousType,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::ForbiddenConstruct { .. } => ErrorKind::ForbiddenConstruct,
            Self::UnsupportedPattern { .. } => ErrorKind::UnsupportedPattern,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::UntypedVariable { stage, .. }
            | Self::AmbiguousType { stage, .. }
            | Self::SchemaMismatch { stage, .. }
            | Self::ForbiddenConstruct { stage, .. }
            | Self::UnsupportedPattern { stage, .. } => *stage,
        }
    }

    pub fn construct(&self) -> &str {
        match self {
            Self::UntypedVariable { construct, .. }
            | Self::AmbiguousType { construct, .. }
            | Self::SchemaMismatch { construct, .. }
            | Self::ForbiddenConstruct { construct, .. }
            | Self::UnsupportedPattern { construct, .. } => construct,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::UntypedVariable { reason, .. }
            | Self::AmbiguousType { reason, .. }
            | Self::SchemaMismatch { reason, .. }
            | Self::ForbiddenConstruct { reason, .. }
            | Self::UnsupportedPattern { reason, .. } => reason,
        }
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, GravsearchError>;

//! Query model: entities, patterns, and the CONSTRUCT/WHERE clauses.
//!
//! Produced by the external parser. Every compiler stage reads these values
//! and builds new ones.

mod ast;
mod entity;
mod expr;

pub use ast::{
    ConstructClause, FilterExpression, GravsearchQuery, MinusGroup, OptionalGroup,
    OrderCriterion, Pattern, StatementPattern, UnionGroup, WhereClause,
};
pub use entity::{Entity, IriRef, Literal, Variable, escape_string};
pub use expr::{CompareOp, Expression, Function};

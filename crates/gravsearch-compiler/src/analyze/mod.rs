//! Semantic analysis: type inspection and query checking.

pub mod type_check;
pub mod validation;
pub mod visitor;

pub use type_check::{TypeInspectionResult, infer_types};
pub use validation::{CheckMode, check, check_statement};

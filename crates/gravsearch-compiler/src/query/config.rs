//! Compiler configuration.

use serde::Deserialize;

use crate::analyze::type_check::DEFAULT_MAX_INFERENCE_ROUNDS;
use crate::emit::TriplestoreDialect;
use crate::transform::DEFAULT_PAGE_SIZE;

/// Settings shared by every compilation of one compiler.
///
/// Missing fields take their defaults when read from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileConfig {
    /// Target triplestore.
    pub dialect: TriplestoreDialect,
    /// Bound on type propagation rounds per scope.
    pub max_inference_rounds: u32,
    /// Results per page of the content query.
    pub page_size: u32,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            dialect: TriplestoreDialect::default(),
            max_inference_rounds: DEFAULT_MAX_INFERENCE_ROUNDS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: TriplestoreDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_max_inference_rounds(mut self, rounds: u32) -> Self {
        self.max_inference_rounds = rounds;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

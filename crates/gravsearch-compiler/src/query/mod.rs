//! Compilation pipeline.
//!
//! Stages: parsed → typed → checked → transformed → emitted.
//! Each stage consumes the previous one; the first failure ends the
//! compilation with a `GravsearchError` naming the stage.

mod config;
mod stages;


pub use config::CompileConfig;
pub use stages::{QueryChecked, QueryParsed, QueryTransformed, QueryTyped};

use tracing::{debug, debug_span};

use gravsearch_core::{OntologyProvider, OntologySnapshot};

use crate::Result;
use crate::emit::CompiledQuery;
use crate::pattern::GravsearchQuery;

/// Runs the full pipeline with one configuration.
///
/// Holds no state between compilations and can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct GravsearchCompiler {
    config: CompileConfig,
}

impl GravsearchCompiler {
    pub fn new(config: CompileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn compile(
        &self,
        query: &GravsearchQuery,
        snapshot: &OntologySnapshot,
    ) -> Result<CompiledQuery> {
        let _span = debug_span!(
            "compile",
            schema = %query.schema(),
            dialect = %self.config.dialect,
        )
        .entered();

        let compiled = QueryParsed::new(query.clone())
            .with_config(self.config)
            .infer_types(snapshot)?
            .check()?
            .transform(self.config.dialect)?
            .emit()?;

        debug!("compilation finished");
        Ok(compiled)
    }

    /// Compile against the provider's current snapshot.
    ///
    /// The snapshot is taken once; a replacement during compilation is not
    /// observed.
    pub fn compile_with<P: OntologyProvider>(
        &self,
        provider: &P,
        query: &GravsearchQuery,
    ) -> Result<CompiledQuery> {
        let snapshot = provider.current();
        self.compile(query, &snapshot)
    }
}

//! Query text emission.
//!
//! Renders a transformed query as two SPARQL queries:
//! - the content query, a CONSTRUCT with ordering and pagination
//! - the count query, a `COUNT(DISTINCT ...)` over the same WHERE body

mod dialect;
pub mod sparql;


pub use dialect::TriplestoreDialect;

use tracing::debug;

use crate::Result;
use crate::transform::TransformedQuery;

/// Query text handed to the triplestore client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub content_query_text: String,
    pub count_query_text: String,
}

pub fn emit(query: &TransformedQuery) -> Result<CompiledQuery> {
    let content_query_text = sparql::render_content(&query.content)?;
    let count_query_text = sparql::render_count(&query.count)?;
    debug!(
        content_bytes = content_query_text.len(),
        count_bytes = count_query_text.len(),
        "query emitted"
    );
    Ok(CompiledQuery {
        content_query_text,
        count_query_text,
    })
}

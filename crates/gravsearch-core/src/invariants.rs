//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use indexmap::IndexMap;

/// Entry lookup for IRIs whose presence was verified before closure
/// computation.
pub(crate) fn ensure_entry<'m, T>(map: &'m mut IndexMap<String, T>, iri: &str) -> &'m mut T {
    map.get_mut(iri).unwrap_or_else(|| {
        panic!("OntologySnapshot: `{iri}` not found (super references must be validated first)")
    })
}

//! Computed predicates that user statements may not use.

use gravsearch_core::vocab::knora_api::{self, simple};
use gravsearch_core::vocab::{self, rdfs};

use super::CheckMode;

/// Forbidden in every position.
pub const FORBIDDEN_PREDICATES: &[&str] = &[
    rdfs::LABEL,
    knora_api::VALUE_AS_STRING,
    knora_api::HAS_PERMISSIONS,
    knora_api::USER_HAS_PERMISSION,
    knora_api::CREATION_DATE,
    knora_api::LAST_MODIFICATION_DATE,
    knora_api::DELETE_DATE,
    knora_api::ARK_URL,
    knora_api::VERSION_ARK_URL,
    knora_api::VALUE_CREATION_DATE,
    knora_api::VALUE_HAS_UUID,
    knora_api::DATE_VALUE_HAS_START_YEAR,
    knora_api::DATE_VALUE_HAS_START_MONTH,
    knora_api::DATE_VALUE_HAS_START_DAY,
    knora_api::DATE_VALUE_HAS_START_ERA,
    knora_api::DATE_VALUE_HAS_END_YEAR,
    knora_api::DATE_VALUE_HAS_END_MONTH,
    knora_api::DATE_VALUE_HAS_END_DAY,
    knora_api::DATE_VALUE_HAS_END_ERA,
    knora_api::LINK_VALUE_HAS_SOURCE_IRI,
    knora_api::LINK_VALUE_HAS_TARGET_IRI,
    knora_api::HAS_INCOMING_LINK_VALUE,
    knora_api::HAS_STANDOFF_LINK_TO,
    knora_api::HAS_STANDOFF_LINK_TO_VALUE,
    knora_api::ATTACHED_TO_USER,
    knora_api::ATTACHED_TO_PROJECT,
    simple::CREATION_DATE,
    simple::LAST_MODIFICATION_DATE,
    simple::ARK_URL,
    simple::VERSION_ARK_URL,
    simple::HAS_STANDOFF_LINK_TO,
];

pub fn is_forbidden(iri: &str) -> bool {
    FORBIDDEN_PREDICATES.contains(&iri)
}

/// The per-datatype value accessors (`intValueAsInt`, ...) select value
/// content in WHERE. In CONSTRUCT the content is added by value expansion.
pub fn is_forbidden_in(iri: &str, mode: CheckMode) -> bool {
    match mode {
        CheckMode::Where => is_forbidden(iri),
        CheckMode::Construct => is_forbidden(iri) || vocab::is_value_accessor(iri),
    }
}

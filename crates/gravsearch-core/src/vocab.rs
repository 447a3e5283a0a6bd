//! Namespaces, well-known IRIs, and the mapping between the two API schemas
//! and the internal schema.
//!
//! The mapping is fixed and total: every IRI has an internal form. IRIs that
//! belong to no knowledge-base ontology (core vocabularies, data IRIs) map to
//! themselves.

use std::fmt;

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const KNORA_BASE: &str = "http://www.knora.org/ontology/knora-base#";
pub const KNORA_API_COMPLEX: &str = "http://api.knora.org/ontology/knora-api/v2#";
pub const KNORA_API_SIMPLE: &str = "http://api.knora.org/ontology/knora-api/simple/v2#";

/// Default host for project ontologies in the API schemas.
pub const DEFAULT_API_HOST: &str = "0.0.0.0:3333";

const INTERNAL_ONTOLOGY_PREFIX: &str = "http://www.knora.org/ontology/";
const ONTOLOGY_SEGMENT: &str = "/ontology/";
const COMPLEX_SUFFIX: &str = "/v2";
const SIMPLE_SUFFIX: &str = "/simple/v2";

macro_rules! iris {
    ($ns:literal; $($name:ident = $local:literal),* $(,)?) => {
        $(pub const $name: &str = concat!($ns, $local);)*
    };
}

pub mod rdf {
    iris! { "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        TYPE = "type",
        SUBJECT = "subject",
        PREDICATE = "predicate",
        OBJECT = "object",
    }
}

pub mod rdfs {
    iris! { "http://www.w3.org/2000/01/rdf-schema#";
        LABEL = "label",
        COMMENT = "comment",
        SUB_CLASS_OF = "subClassOf",
        SUB_PROPERTY_OF = "subPropertyOf",
    }
}

pub mod xsd {
    iris! { "http://www.w3.org/2001/XMLSchema#";
        STRING = "string",
        INTEGER = "integer",
        DECIMAL = "decimal",
        BOOLEAN = "boolean",
        ANY_URI = "anyURI",
        DATE_TIME_STAMP = "dateTimeStamp",
    }
}

pub mod knora_base {
    iris! { "http://www.knora.org/ontology/knora-base#";
        RESOURCE = "Resource",
        VALUE = "Value",
        TEXT_VALUE = "TextValue",
        INT_VALUE = "IntValue",
        DECIMAL_VALUE = "DecimalValue",
        BOOLEAN_VALUE = "BooleanValue",
        URI_VALUE = "UriValue",
        DATE_VALUE = "DateValue",
        COLOR_VALUE = "ColorValue",
        GEOM_VALUE = "GeomValue",
        LIST_VALUE = "ListValue",
        INTERVAL_VALUE = "IntervalValue",
        TIME_VALUE = "TimeValue",
        GEONAME_VALUE = "GeonameValue",
        LINK_VALUE = "LinkValue",
        LIST_NODE = "ListNode",

        HAS_VALUE = "hasValue",
        HAS_LINK_TO = "hasLinkTo",
        HAS_LINK_TO_VALUE = "hasLinkToValue",
        IS_MAIN_RESOURCE = "isMainResource",
        IS_DELETED = "isDeleted",
        HAS_PERMISSIONS = "hasPermissions",
        PREVIOUS_VALUE = "previousValue",

        VALUE_HAS_STRING = "valueHasString",
        VALUE_HAS_LANGUAGE = "valueHasLanguage",
        VALUE_HAS_INTEGER = "valueHasInteger",
        VALUE_HAS_DECIMAL = "valueHasDecimal",
        VALUE_HAS_BOOLEAN = "valueHasBoolean",
        VALUE_HAS_URI = "valueHasUri",
        VALUE_HAS_CALENDAR = "valueHasCalendar",
        VALUE_HAS_START_JDN = "valueHasStartJDN",
        VALUE_HAS_END_JDN = "valueHasEndJDN",
        VALUE_HAS_COLOR = "valueHasColor",
        VALUE_HAS_GEOMETRY = "valueHasGeometry",
        VALUE_HAS_LIST_NODE = "valueHasListNode",
        VALUE_HAS_INTERVAL_START = "valueHasIntervalStart",
        VALUE_HAS_INTERVAL_END = "valueHasIntervalEnd",
        VALUE_HAS_TIME_STAMP = "valueHasTimeStamp",
        VALUE_HAS_GEONAME_CODE = "valueHasGeonameCode",
    }
}

pub mod knora_api {
    iris! { "http://api.knora.org/ontology/knora-api/v2#";
        RESOURCE = "Resource",
        IS_MAIN_RESOURCE = "isMainResource",
        HAS_PERMISSIONS = "hasPermissions",
        USER_HAS_PERMISSION = "userHasPermission",
        CREATION_DATE = "creationDate",
        LAST_MODIFICATION_DATE = "lastModificationDate",
        DELETE_DATE = "deleteDate",
        IS_DELETED = "isDeleted",
        ARK_URL = "arkUrl",
        VERSION_ARK_URL = "versionArkUrl",
        ATTACHED_TO_USER = "attachedToUser",
        ATTACHED_TO_PROJECT = "attachedToProject",
        VALUE_CREATION_DATE = "valueCreationDate",
        VALUE_HAS_UUID = "valueHasUUID",
        VALUE_AS_STRING = "valueAsString",
        INT_VALUE_AS_INT = "intValueAsInt",
        DATE_VALUE_HAS_START_YEAR = "dateValueHasStartYear",
        DATE_VALUE_HAS_START_MONTH = "dateValueHasStartMonth",
        DATE_VALUE_HAS_START_DAY = "dateValueHasStartDay",
        DATE_VALUE_HAS_START_ERA = "dateValueHasStartEra",
        DATE_VALUE_HAS_END_YEAR = "dateValueHasEndYear",
        DATE_VALUE_HAS_END_MONTH = "dateValueHasEndMonth",
        DATE_VALUE_HAS_END_DAY = "dateValueHasEndDay",
        DATE_VALUE_HAS_END_ERA = "dateValueHasEndEra",
        LINK_VALUE_HAS_TARGET = "linkValueHasTarget",
        LINK_VALUE_HAS_SOURCE = "linkValueHasSource",
        LINK_VALUE_HAS_TARGET_IRI = "linkValueHasTargetIri",
        LINK_VALUE_HAS_SOURCE_IRI = "linkValueHasSourceIri",
        HAS_INCOMING_LINK_VALUE = "hasIncomingLinkValue",
        HAS_STANDOFF_LINK_TO = "hasStandoffLinkTo",
        HAS_STANDOFF_LINK_TO_VALUE = "hasStandoffLinkToValue",
    }

    pub mod simple {
        iris! { "http://api.knora.org/ontology/knora-api/simple/v2#";
            RESOURCE = "Resource",
            IS_MAIN_RESOURCE = "isMainResource",
            CREATION_DATE = "creationDate",
            LAST_MODIFICATION_DATE = "lastModificationDate",
            ARK_URL = "arkUrl",
            VERSION_ARK_URL = "versionArkUrl",
            HAS_STANDOFF_LINK_TO = "hasStandoffLinkTo",
            DATE = "Date",
            COLOR = "Color",
            GEOM = "Geom",
            INTERVAL = "Interval",
            GEONAME = "Geoname",
            LIST_NODE = "ListNode",
        }
    }
}

/// Complex-schema value accessors whose internal predicate has a different name.
const COMPLEX_RENAMES: &[(&str, &str)] = &[
    ("valueAsString", knora_base::VALUE_HAS_STRING),
    ("textValueHasLanguage", knora_base::VALUE_HAS_LANGUAGE),
    ("intValueAsInt", knora_base::VALUE_HAS_INTEGER),
    ("decimalValueAsDecimal", knora_base::VALUE_HAS_DECIMAL),
    ("booleanValueAsBoolean", knora_base::VALUE_HAS_BOOLEAN),
    ("uriValueAsUri", knora_base::VALUE_HAS_URI),
    ("dateValueHasCalendar", knora_base::VALUE_HAS_CALENDAR),
    ("colorValueAsColor", knora_base::VALUE_HAS_COLOR),
    ("geometryValueAsGeometry", knora_base::VALUE_HAS_GEOMETRY),
    ("listValueAsListNode", knora_base::VALUE_HAS_LIST_NODE),
    ("intervalValueHasStart", knora_base::VALUE_HAS_INTERVAL_START),
    ("intervalValueHasEnd", knora_base::VALUE_HAS_INTERVAL_END),
    ("timeValueAsTimeStamp", knora_base::VALUE_HAS_TIME_STAMP),
    ("geonameValueAsGeonameCode", knora_base::VALUE_HAS_GEONAME_CODE),
    ("linkValueHasTarget", rdf::OBJECT),
    ("linkValueHasSource", rdf::SUBJECT),
];

/// One of the ontology vocabularies an IRI can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// The storage vocabulary used in the triplestore.
    Internal,
    /// The user-facing view where values are plain literals.
    Simple,
    /// The user-facing view where values are explicit nodes.
    Complex,
}

impl Schema {
    /// Classify an IRI by the ontology namespace it belongs to.
    ///
    /// Returns `None` for core vocabularies and for data IRIs.
    pub fn of_iri(iri: &str) -> Option<Schema> {
        let (namespace, _) = split_namespace(iri)?;

        if namespace.starts_with(INTERNAL_ONTOLOGY_PREFIX) {
            return Some(Schema::Internal);
        }

        let path_start = namespace.find(ONTOLOGY_SEGMENT)?;
        if !namespace[..path_start].starts_with("http") {
            return None;
        }

        if namespace.ends_with(SIMPLE_SUFFIX) {
            Some(Schema::Simple)
        } else if namespace.ends_with(COMPLEX_SUFFIX) {
            Some(Schema::Complex)
        } else {
            None
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Internal => write!(f, "internal"),
            Schema::Simple => write!(f, "simple"),
            Schema::Complex => write!(f, "complex"),
        }
    }
}

/// Split `ns#local` at the first `#`.
fn split_namespace(iri: &str) -> Option<(&str, &str)> {
    let idx = iri.find('#')?;
    Some((&iri[..idx], &iri[idx + 1..]))
}

/// The local part of an IRI: after `#`, or after the last `/`.
pub fn local_name(iri: &str) -> &str {
    if let Some((_, local)) = split_namespace(iri) {
        return local;
    }
    iri.rsplit('/').next().unwrap_or(iri)
}

/// Whether the IRI belongs to the RDF, RDFS or OWL vocabularies.
pub fn is_core_vocabulary(iri: &str) -> bool {
    iri.starts_with(RDF) || iri.starts_with(RDFS) || iri.starts_with(OWL)
}

/// Whether the IRI is a complex-schema value accessor (`intValueAsInt`,
/// `linkValueHasTarget`, ...).
pub fn is_value_accessor(iri: &str) -> bool {
    iri.strip_prefix(KNORA_API_COMPLEX)
        .is_some_and(|local| COMPLEX_RENAMES.iter().any(|(name, _)| *name == local))
}

/// Convert an IRI to its internal-schema form.
pub fn to_internal(iri: &str) -> String {
    let Some(schema) = Schema::of_iri(iri) else {
        return iri.to_owned();
    };
    if schema == Schema::Internal {
        return iri.to_owned();
    }
    let Some((namespace, local)) = split_namespace(iri) else {
        return iri.to_owned();
    };

    if is_knora_api_namespace(namespace) {
        if schema == Schema::Complex
            && let Some((_, target)) = COMPLEX_RENAMES.iter().find(|(name, _)| *name == local)
        {
            return (*target).to_owned();
        }
        return format!("{KNORA_BASE}{local}");
    }

    let Some(path_start) = namespace.find(ONTOLOGY_SEGMENT) else {
        return iri.to_owned();
    };
    let path = &namespace[path_start + ONTOLOGY_SEGMENT.len()..];
    let path = path
        .strip_suffix(SIMPLE_SUFFIX)
        .or_else(|| path.strip_suffix(COMPLEX_SUFFIX))
        .unwrap_or(path);

    format!("{INTERNAL_ONTOLOGY_PREFIX}{path}#{local}")
}

/// Convert an internal IRI to the given API schema.
///
/// Non-internal IRIs, and conversions to the internal schema, are returned
/// unchanged.
pub fn to_external(iri: &str, schema: Schema, host: &str) -> String {
    if schema == Schema::Internal || Schema::of_iri(iri) != Some(Schema::Internal) {
        return iri.to_owned();
    }
    let Some((namespace, local)) = split_namespace(iri) else {
        return iri.to_owned();
    };

    if iri.starts_with(KNORA_BASE) {
        return match schema {
            Schema::Complex => {
                let renamed = COMPLEX_RENAMES
                    .iter()
                    .find(|(_, target)| *target == iri)
                    .map(|(name, _)| *name)
                    .unwrap_or(local);
                format!("{KNORA_API_COMPLEX}{renamed}")
            }
            _ => format!("{KNORA_API_SIMPLE}{local}"),
        };
    }

    let path = &namespace[INTERNAL_ONTOLOGY_PREFIX.len()..];
    let suffix = match schema {
        Schema::Simple => SIMPLE_SUFFIX,
        _ => COMPLEX_SUFFIX,
    };
    format!("http://{host}{ONTOLOGY_SEGMENT}{path}{suffix}#{local}")
}

fn is_knora_api_namespace(namespace: &str) -> bool {
    KNORA_API_COMPLEX.strip_suffix('#') == Some(namespace)
        || KNORA_API_SIMPLE.strip_suffix('#') == Some(namespace)
}

//! Versioned value classes and the predicates that carry their content.

use crate::vocab::{self, knora_api, knora_base, xsd};

/// Kind of a versioned value node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Int,
    Decimal,
    Boolean,
    Uri,
    Date,
    Color,
    Geom,
    List,
    Interval,
    Time,
    Geoname,
    Link,
}

impl ValueKind {
    pub const ALL: [ValueKind; 13] = [
        ValueKind::Text,
        ValueKind::Int,
        ValueKind::Decimal,
        ValueKind::Boolean,
        ValueKind::Uri,
        ValueKind::Date,
        ValueKind::Color,
        ValueKind::Geom,
        ValueKind::List,
        ValueKind::Interval,
        ValueKind::Time,
        ValueKind::Geoname,
        ValueKind::Link,
    ];

    /// Resolve a type IRI to a value kind.
    ///
    /// Accepts internal value classes, XSD datatypes and simple-schema
    /// datatypes. API value class IRIs are resolved through their internal form.
    pub fn from_type_iri(iri: &str) -> Option<ValueKind> {
        if let Some(kind) = Self::ALL.iter().find(|k| k.value_class() == iri) {
            return Some(*kind);
        }

        let kind = match iri {
            xsd::STRING => ValueKind::Text,
            xsd::INTEGER => ValueKind::Int,
            xsd::DECIMAL => ValueKind::Decimal,
            xsd::BOOLEAN => ValueKind::Boolean,
            xsd::ANY_URI => ValueKind::Uri,
            xsd::DATE_TIME_STAMP => ValueKind::Time,
            knora_api::simple::DATE => ValueKind::Date,
            knora_api::simple::COLOR => ValueKind::Color,
            knora_api::simple::GEOM => ValueKind::Geom,
            knora_api::simple::INTERVAL => ValueKind::Interval,
            knora_api::simple::GEONAME => ValueKind::Geoname,
            knora_api::simple::LIST_NODE => ValueKind::List,
            _ => {
                let internal = vocab::to_internal(iri);
                if internal == iri {
                    return None;
                }
                return Self::ALL
                    .iter()
                    .find(|k| k.value_class() == internal)
                    .copied();
            }
        };
        Some(kind)
    }

    /// Internal value class.
    pub fn value_class(self) -> &'static str {
        match self {
            ValueKind::Text => knora_base::TEXT_VALUE,
            ValueKind::Int => knora_base::INT_VALUE,
            ValueKind::Decimal => knora_base::DECIMAL_VALUE,
            ValueKind::Boolean => knora_base::BOOLEAN_VALUE,
            ValueKind::Uri => knora_base::URI_VALUE,
            ValueKind::Date => knora_base::DATE_VALUE,
            ValueKind::Color => knora_base::COLOR_VALUE,
            ValueKind::Geom => knora_base::GEOM_VALUE,
            ValueKind::List => knora_base::LIST_VALUE,
            ValueKind::Interval => knora_base::INTERVAL_VALUE,
            ValueKind::Time => knora_base::TIME_VALUE,
            ValueKind::Geoname => knora_base::GEONAME_VALUE,
            ValueKind::Link => knora_base::LINK_VALUE,
        }
    }

    /// Internal predicate that holds the literal content of a value node.
    ///
    /// Dates and intervals store their human-readable rendering in
    /// `valueHasString` next to their structured form.
    pub fn content_predicate(self) -> &'static str {
        match self {
            ValueKind::Text | ValueKind::Date | ValueKind::Interval => {
                knora_base::VALUE_HAS_STRING
            }
            ValueKind::Int => knora_base::VALUE_HAS_INTEGER,
            ValueKind::Decimal => knora_base::VALUE_HAS_DECIMAL,
            ValueKind::Boolean => knora_base::VALUE_HAS_BOOLEAN,
            ValueKind::Uri => knora_base::VALUE_HAS_URI,
            ValueKind::Color => knora_base::VALUE_HAS_COLOR,
            ValueKind::Geom => knora_base::VALUE_HAS_GEOMETRY,
            ValueKind::List => knora_base::VALUE_HAS_LIST_NODE,
            ValueKind::Time => knora_base::VALUE_HAS_TIME_STAMP,
            ValueKind::Geoname => knora_base::VALUE_HAS_GEONAME_CODE,
            ValueKind::Link => vocab::rdf::OBJECT,
        }
    }

    /// Datatype the simple schema reports for this kind.
    pub fn simple_datatype(self) -> &'static str {
        match self {
            ValueKind::Text => xsd::STRING,
            ValueKind::Int => xsd::INTEGER,
            ValueKind::Decimal => xsd::DECIMAL,
            ValueKind::Boolean => xsd::BOOLEAN,
            ValueKind::Uri => xsd::ANY_URI,
            ValueKind::Date => knora_api::simple::DATE,
            ValueKind::Color => knora_api::simple::COLOR,
            ValueKind::Geom => knora_api::simple::GEOM,
            ValueKind::List => knora_api::simple::LIST_NODE,
            ValueKind::Interval => knora_api::simple::INTERVAL,
            ValueKind::Time => xsd::DATE_TIME_STAMP,
            ValueKind::Geoname => knora_api::simple::GEONAME,
            ValueKind::Link => knora_api::simple::RESOURCE,
        }
    }

    /// Whether the kind's content is a plain literal rather than a node.
    pub fn has_literal_content(self) -> bool {
        !matches!(self, ValueKind::Link | ValueKind::List)
    }
}

//! The knowledge-base skeleton every snapshot is built on.

use crate::vocab::{knora_base as kb, rdf, rdfs, xsd};
use crate::{RawClass, RawOntology, RawProperty};

/// Classes and properties of the knowledge-base ontology that the compiler
/// relies on. Project ontologies are merged on top of this.
pub fn knora_base() -> RawOntology {
    let mut classes = vec![
        class(kb::RESOURCE, &[]).with_cardinality(rdfs::LABEL, "1"),
        class(kb::VALUE, &[]),
        class(kb::LIST_NODE, &[]),
    ];
    for value_class in [
        kb::TEXT_VALUE,
        kb::INT_VALUE,
        kb::DECIMAL_VALUE,
        kb::BOOLEAN_VALUE,
        kb::URI_VALUE,
        kb::DATE_VALUE,
        kb::COLOR_VALUE,
        kb::GEOM_VALUE,
        kb::LIST_VALUE,
        kb::INTERVAL_VALUE,
        kb::TIME_VALUE,
        kb::GEONAME_VALUE,
        kb::LINK_VALUE,
    ] {
        classes.push(class(value_class, &[kb::VALUE]));
    }

    let properties = vec![
        property(kb::HAS_VALUE, &[], Some(kb::RESOURCE), Some(kb::VALUE)),
        property(kb::HAS_LINK_TO, &[], Some(kb::RESOURCE), Some(kb::RESOURCE)),
        property(kb::HAS_LINK_TO_VALUE, &[kb::HAS_VALUE], None, Some(kb::LINK_VALUE)),
        property(rdfs::LABEL, &[], Some(kb::RESOURCE), Some(xsd::STRING)),
        property(kb::IS_MAIN_RESOURCE, &[], Some(kb::RESOURCE), Some(xsd::BOOLEAN)),
        property(kb::IS_DELETED, &[], None, Some(xsd::BOOLEAN)),
        property(kb::HAS_PERMISSIONS, &[], None, Some(xsd::STRING)),
        property(kb::PREVIOUS_VALUE, &[], Some(kb::VALUE), Some(kb::VALUE)),
        property(rdf::SUBJECT, &[], Some(kb::LINK_VALUE), Some(kb::RESOURCE)),
        property(rdf::OBJECT, &[], Some(kb::LINK_VALUE), Some(kb::RESOURCE)),
        content(kb::VALUE_HAS_STRING, kb::VALUE, xsd::STRING),
        content(kb::VALUE_HAS_LANGUAGE, kb::TEXT_VALUE, xsd::STRING),
        content(kb::VALUE_HAS_INTEGER, kb::INT_VALUE, xsd::INTEGER),
        content(kb::VALUE_HAS_DECIMAL, kb::DECIMAL_VALUE, xsd::DECIMAL),
        content(kb::VALUE_HAS_BOOLEAN, kb::BOOLEAN_VALUE, xsd::BOOLEAN),
        content(kb::VALUE_HAS_URI, kb::URI_VALUE, xsd::ANY_URI),
        content(kb::VALUE_HAS_CALENDAR, kb::DATE_VALUE, xsd::STRING),
        content(kb::VALUE_HAS_START_JDN, kb::DATE_VALUE, xsd::INTEGER),
        content(kb::VALUE_HAS_END_JDN, kb::DATE_VALUE, xsd::INTEGER),
        content(kb::VALUE_HAS_COLOR, kb::COLOR_VALUE, xsd::STRING),
        content(kb::VALUE_HAS_GEOMETRY, kb::GEOM_VALUE, xsd::STRING),
        content(kb::VALUE_HAS_LIST_NODE, kb::LIST_VALUE, kb::LIST_NODE),
        content(kb::VALUE_HAS_INTERVAL_START, kb::INTERVAL_VALUE, xsd::DECIMAL),
        content(kb::VALUE_HAS_INTERVAL_END, kb::INTERVAL_VALUE, xsd::DECIMAL),
        content(kb::VALUE_HAS_TIME_STAMP, kb::TIME_VALUE, xsd::DATE_TIME_STAMP),
        content(kb::VALUE_HAS_GEONAME_CODE, kb::GEONAME_VALUE, xsd::STRING),
    ];

    RawOntology {
        classes,
        properties,
    }
}

fn class(iri: &str, supers: &[&str]) -> RawClass {
    RawClass {
        iri: iri.to_owned(),
        sub_class_of: supers.iter().map(|s| (*s).to_owned()).collect(),
        cardinalities: Default::default(),
    }
}

fn property(
    iri: &str,
    supers: &[&str],
    subject_type: Option<&str>,
    object_type: Option<&str>,
) -> RawProperty {
    RawProperty {
        iri: iri.to_owned(),
        sub_property_of: supers.iter().map(|s| (*s).to_owned()).collect(),
        subject_type: subject_type.map(str::to_owned),
        object_type: object_type.map(str::to_owned),
    }
}

fn content(iri: &str, value_class: &str, datatype: &str) -> RawProperty {
    property(iri, &[], Some(value_class), Some(datatype))
}

impl RawClass {
    fn with_cardinality(mut self, property: &str, cardinality: &str) -> Self {
        self.cardinalities
            .insert(property.to_owned(), cardinality.to_owned());
        self
    }
}

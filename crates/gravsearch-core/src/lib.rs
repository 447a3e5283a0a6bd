#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the Gravsearch ontology view.
//!
//! Two layers:
//! - **Deserialization layer**: 1:1 mapping to the ontology JSON export
//! - **Analysis layer**: `OntologySnapshot`, an immutable view with
//!   precomputed sub-class and sub-property closures
//!
//! Snapshots are shared between compilations through `provider`.

use indexmap::{IndexMap, IndexSet};

pub mod builtin;
mod invariants;
pub mod provider;
pub mod value_kind;
pub mod vocab;

pub use provider::{ChangeListener, OntologyProvider, SharedOntology};
pub use value_kind::ValueKind;
pub use vocab::Schema;

use vocab::knora_base;

/// Errors raised while building a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("class `{class}` extends unknown class `{superclass}`")]
    UnknownSuperClass { class: String, superclass: String },

    #[error("property `{property}` extends unknown property `{superproperty}`")]
    UnknownSuperProperty {
        property: String,
        superproperty: String,
    },

    #[error("inheritance cycle through `{iri}`")]
    Cycle { iri: String },

    #[error("`{iri}` is defined more than once")]
    Duplicate { iri: String },

    #[error("class `{class}` has malformed cardinality `{value}` on `{property}`")]
    BadCardinality {
        class: String,
        property: String,
        value: String,
    },

    #[error("property `{property}` inherits unrelated constraints `{first}` and `{second}`")]
    AmbiguousConstraint {
        property: String,
        first: String,
        second: String,
    },

    #[error("invalid ontology JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Deserialization Layer
// ============================================================================

/// Raw ontology export: classes and properties of one or more ontologies.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RawOntology {
    #[serde(default)]
    pub classes: Vec<RawClass>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClass {
    pub iri: String,
    #[serde(default)]
    pub sub_class_of: Vec<String>,
    /// Property IRI to cardinality string (`1`, `0-1`, `0-n`, `1-n`).
    #[serde(default)]
    pub cardinalities: IndexMap<String, String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperty {
    pub iri: String,
    #[serde(default)]
    pub sub_property_of: Vec<String>,
    pub subject_type: Option<String>,
    pub object_type: Option<String>,
}

/// Parse an ontology export into its raw form.
pub fn parse_ontology(json: &str) -> Result<RawOntology, OntologyError> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Common Types
// ============================================================================

/// How many values of a property a resource may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    MustHaveOne,
    MayHaveOne,
    MayHaveMany,
    MustHaveSome,
}

impl Cardinality {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Cardinality::MustHaveOne),
            "0-1" => Some(Cardinality::MayHaveOne),
            "0-n" => Some(Cardinality::MayHaveMany),
            "1-n" => Some(Cardinality::MustHaveSome),
            _ => None,
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Cardinality::MustHaveOne | Cardinality::MustHaveSome)
    }

    pub fn is_multiple(self) -> bool {
        matches!(self, Cardinality::MayHaveMany | Cardinality::MustHaveSome)
    }
}

// ============================================================================
// Analysis Layer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub iri: String,
    pub direct_superclasses: Vec<String>,
    /// Transitive superclasses, nearest first. Excludes the class itself.
    pub superclasses: Vec<String>,
    /// Transitive subclasses in definition order. Excludes the class itself.
    pub subclasses: Vec<String>,
    pub cardinalities: IndexMap<String, Cardinality>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub iri: String,
    pub direct_superproperties: Vec<String>,
    /// Transitive superproperties, nearest first. Excludes the property itself.
    pub superproperties: Vec<String>,
    /// Transitive subproperties in definition order. Excludes the property itself.
    pub subproperties: Vec<String>,
    pub subject_type: Option<String>,
    pub object_type: Option<String>,
}

/// Immutable view of the class and property hierarchy.
///
/// All IRIs are in the internal schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologySnapshot {
    classes: IndexMap<String, ClassInfo>,
    properties: IndexMap<String, PropertyInfo>,
}

impl OntologySnapshot {
    /// Build a snapshot from project ontologies merged over the
    /// knowledge-base skeleton.
    pub fn build(raw: &RawOntology) -> Result<Self, OntologyError> {
        let base = builtin::knora_base();

        let mut classes: IndexMap<String, ClassInfo> = IndexMap::new();
        for raw_class in base.classes.iter().chain(&raw.classes) {
            let mut cardinalities = IndexMap::new();
            for (property, value) in &raw_class.cardinalities {
                let Some(cardinality) = Cardinality::parse(value) else {
                    return Err(OntologyError::BadCardinality {
                        class: raw_class.iri.clone(),
                        property: property.clone(),
                        value: value.clone(),
                    });
                };
                cardinalities.insert(property.clone(), cardinality);
            }

            let info = ClassInfo {
                iri: raw_class.iri.clone(),
                direct_superclasses: raw_class.sub_class_of.clone(),
                superclasses: Vec::new(),
                subclasses: Vec::new(),
                cardinalities,
            };
            if classes.insert(raw_class.iri.clone(), info).is_some() {
                return Err(OntologyError::Duplicate {
                    iri: raw_class.iri.clone(),
                });
            }
        }

        let mut properties: IndexMap<String, PropertyInfo> = IndexMap::new();
        for raw_prop in base.properties.iter().chain(&raw.properties) {
            let info = PropertyInfo {
                iri: raw_prop.iri.clone(),
                direct_superproperties: raw_prop.sub_property_of.clone(),
                superproperties: Vec::new(),
                subproperties: Vec::new(),
                subject_type: raw_prop.subject_type.clone(),
                object_type: raw_prop.object_type.clone(),
            };
            if properties.insert(raw_prop.iri.clone(), info).is_some() {
                return Err(OntologyError::Duplicate {
                    iri: raw_prop.iri.clone(),
                });
            }
        }

        for class in classes.values() {
            if let Some(missing) = class
                .direct_superclasses
                .iter()
                .find(|s| !classes.contains_key(*s))
            {
                return Err(OntologyError::UnknownSuperClass {
                    class: class.iri.clone(),
                    superclass: missing.clone(),
                });
            }
        }
        for prop in properties.values() {
            if let Some(missing) = prop
                .direct_superproperties
                .iter()
                .find(|s| !properties.contains_key(*s))
            {
                return Err(OntologyError::UnknownSuperProperty {
                    property: prop.iri.clone(),
                    superproperty: missing.clone(),
                });
            }
        }

        let class_parents: IndexMap<String, Vec<String>> = classes
            .iter()
            .map(|(iri, c)| (iri.clone(), c.direct_superclasses.clone()))
            .collect();
        let class_closures = closures(&class_parents)?;
        for (iri, closure) in &class_closures {
            for ancestor in closure {
                invariants::ensure_entry(&mut classes, ancestor)
                    .subclasses
                    .push(iri.clone());
            }
        }
        for (iri, closure) in class_closures {
            invariants::ensure_entry(&mut classes, &iri).superclasses = closure;
        }

        let prop_parents: IndexMap<String, Vec<String>> = properties
            .iter()
            .map(|(iri, p)| (iri.clone(), p.direct_superproperties.clone()))
            .collect();
        let prop_closures = closures(&prop_parents)?;
        for (iri, closure) in &prop_closures {
            for ancestor in closure {
                invariants::ensure_entry(&mut properties, ancestor)
                    .subproperties
                    .push(iri.clone());
            }
        }
        for (iri, closure) in prop_closures {
            invariants::ensure_entry(&mut properties, &iri).superproperties = closure;
        }

        tracing::debug!(
            classes = classes.len(),
            properties = properties.len(),
            "ontology snapshot built"
        );

        Ok(Self {
            classes,
            properties,
        })
    }

    /// Snapshot holding only the knowledge-base skeleton.
    pub fn knora_base() -> Result<Self, OntologyError> {
        Self::build(&RawOntology::default())
    }

    pub fn from_json(json: &str) -> Result<Self, OntologyError> {
        Self::build(&parse_ontology(json)?)
    }

    pub fn class(&self, iri: &str) -> Option<&ClassInfo> {
        self.classes.get(iri)
    }

    pub fn property(&self, iri: &str) -> Option<&PropertyInfo> {
        self.properties.get(iri)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.values()
    }

    /// Reflexive sub-class test. Unknown IRIs are only subclasses of themselves.
    pub fn is_subclass_of(&self, sub: &str, sup: &str) -> bool {
        sub == sup
            || self
                .classes
                .get(sub)
                .is_some_and(|c| c.superclasses.iter().any(|s| s == sup))
    }

    /// Reflexive sub-property test.
    pub fn is_subproperty_of(&self, sub: &str, sup: &str) -> bool {
        sub == sup
            || self
                .properties
                .get(sub)
                .is_some_and(|p| p.superproperties.iter().any(|s| s == sup))
    }

    pub fn superclasses(&self, iri: &str) -> &[String] {
        self.classes.get(iri).map_or(&[], |c| &c.superclasses)
    }

    pub fn subclasses(&self, iri: &str) -> &[String] {
        self.classes.get(iri).map_or(&[], |c| &c.subclasses)
    }

    pub fn superproperties(&self, iri: &str) -> &[String] {
        self.properties.get(iri).map_or(&[], |p| &p.superproperties)
    }

    pub fn subproperties(&self, iri: &str) -> &[String] {
        self.properties.get(iri).map_or(&[], |p| &p.subproperties)
    }

    pub fn is_resource_class(&self, iri: &str) -> bool {
        self.classes.contains_key(iri) && self.is_subclass_of(iri, knora_base::RESOURCE)
    }

    pub fn is_value_class(&self, iri: &str) -> bool {
        self.classes.contains_key(iri) && self.is_subclass_of(iri, knora_base::VALUE)
    }

    pub fn is_value_property(&self, iri: &str) -> bool {
        self.properties.contains_key(iri) && self.is_subproperty_of(iri, knora_base::HAS_VALUE)
    }

    pub fn is_link_property(&self, iri: &str) -> bool {
        self.properties.contains_key(iri) && self.is_subproperty_of(iri, knora_base::HAS_LINK_TO)
    }

    pub fn is_link_value_property(&self, iri: &str) -> bool {
        self.properties.contains_key(iri)
            && self.is_subproperty_of(iri, knora_base::HAS_LINK_TO_VALUE)
    }

    /// Subject-type constraint of a property, declared or inherited.
    pub fn effective_subject_type(&self, iri: &str) -> Result<Option<String>, OntologyError> {
        self.effective_constraint(iri, |p| p.subject_type.as_deref())
    }

    /// Object-type constraint of a property, declared or inherited.
    pub fn effective_object_type(&self, iri: &str) -> Result<Option<String>, OntologyError> {
        self.effective_constraint(iri, |p| p.object_type.as_deref())
    }

    /// Declared constraint, else the most specific constraint inherited
    /// through the direct superproperties.
    fn effective_constraint(
        &self,
        iri: &str,
        pick: fn(&PropertyInfo) -> Option<&str>,
    ) -> Result<Option<String>, OntologyError> {
        let Some(prop) = self.properties.get(iri) else {
            return Ok(None);
        };
        if let Some(declared) = pick(prop) {
            return Ok(Some(declared.to_owned()));
        }

        let mut candidates: IndexSet<String> = IndexSet::new();
        for sup in &prop.direct_superproperties {
            if let Some(inherited) = self.effective_constraint(sup, pick)? {
                candidates.insert(inherited);
            }
        }

        let most_specific = candidates
            .iter()
            .find(|c| candidates.iter().all(|o| self.is_subclass_of(c, o)));
        if let Some(found) = most_specific {
            return Ok(Some(found.clone()));
        }

        let mut pairs = candidates.iter().flat_map(|a| {
            candidates
                .iter()
                .filter(move |b| !self.is_subclass_of(a, b) && !self.is_subclass_of(b, a))
                .map(move |b| (a, b))
        });
        match pairs.next() {
            Some((first, second)) => Err(OntologyError::AmbiguousConstraint {
                property: iri.to_owned(),
                first: first.clone(),
                second: second.clone(),
            }),
            None => Ok(None),
        }
    }

    /// Cardinality of `property` on `class`, direct or inherited (nearest wins).
    pub fn cardinality(&self, class: &str, property: &str) -> Option<Cardinality> {
        let info = self.classes.get(class)?;
        std::iter::once(info.iri.as_str())
            .chain(info.superclasses.iter().map(String::as_str))
            .find_map(|c| self.classes.get(c)?.cardinalities.get(property).copied())
    }

    /// All cardinalities of `class`, direct ones first, then inherited ones.
    pub fn cardinalities(&self, class: &str) -> IndexMap<String, Cardinality> {
        let mut out = IndexMap::new();
        let Some(info) = self.classes.get(class) else {
            return out;
        };
        let chain = std::iter::once(info).chain(
            info.superclasses
                .iter()
                .filter_map(|s| self.classes.get(s)),
        );
        for c in chain {
            for (prop, card) in &c.cardinalities {
                out.entry(prop.clone()).or_insert(*card);
            }
        }
        out
    }

    /// The link-value property paired with a link property.
    pub fn link_value_property(&self, link_property: &str) -> Option<&str> {
        if !self.is_link_property(link_property) {
            return None;
        }
        let candidate = format!("{link_property}Value");
        self.properties
            .get_key_value(&candidate)
            .map(|(k, _)| k.as_str())
    }
}

/// Transitive parents of every node, nearest first.
fn closures(
    parents: &IndexMap<String, Vec<String>>,
) -> Result<IndexMap<String, Vec<String>>, OntologyError> {
    let mut out = IndexMap::with_capacity(parents.len());
    for (iri, direct) in parents {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut queue: std::collections::VecDeque<&str> =
            direct.iter().map(String::as_str).collect();
        while let Some(next) = queue.pop_front() {
            if next == iri {
                return Err(OntologyError::Cycle { iri: iri.clone() });
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(grand) = parents.get(next) {
                queue.extend(grand.iter().map(String::as_str));
            }
        }
        out.insert(iri.clone(), seen.into_iter().map(str::to_owned).collect());
    }
    Ok(out)
}

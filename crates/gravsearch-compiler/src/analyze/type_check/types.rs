//! Type inspection output.

use std::fmt;

use indexmap::IndexMap;

use gravsearch_core::vocab;

use crate::pattern::{Entity, Variable};

/// An entity that can carry a type: a variable or an IRI.
///
/// IRIs are keyed by their internal-schema form so lookups work before and
/// after schema flattening.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeableEntity {
    Variable(Variable),
    Iri(String),
}

impl TypeableEntity {
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        match entity {
            Entity::Variable(v) => Some(TypeableEntity::Variable(v.clone())),
            Entity::Iri(iri) => Some(TypeableEntity::Iri(vocab::to_internal(&iri.iri))),
            Entity::Literal(_) => None,
        }
    }
}

impl fmt::Display for TypeableEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeableEntity::Variable(v) => write!(f, "{v}"),
            TypeableEntity::Iri(iri) => write!(f, "<{iri}>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTypeInfo {
    pub object_type_iri: String,
    pub is_value_property: bool,
    pub is_link_property: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonPropertyTypeInfo {
    pub type_iri: String,
    pub is_resource: bool,
    pub is_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTypeInfo {
    Property(PropertyTypeInfo),
    NonProperty(NonPropertyTypeInfo),
}

impl EntityTypeInfo {
    /// Object type for properties, class or datatype otherwise.
    pub fn type_iri(&self) -> &str {
        match self {
            EntityTypeInfo::Property(p) => &p.object_type_iri,
            EntityTypeInfo::NonProperty(n) => &n.type_iri,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyTypeInfo> {
        match self {
            EntityTypeInfo::Property(p) => Some(p),
            EntityTypeInfo::NonProperty(_) => None,
        }
    }

    pub fn as_non_property(&self) -> Option<&NonPropertyTypeInfo> {
        match self {
            EntityTypeInfo::NonProperty(n) => Some(n),
            EntityTypeInfo::Property(_) => None,
        }
    }
}

/// Types inferred for the entities of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInspectionResult {
    entities: IndexMap<TypeableEntity, EntityTypeInfo>,
}

impl TypeInspectionResult {
    pub fn new(entities: IndexMap<TypeableEntity, EntityTypeInfo>) -> Self {
        Self { entities }
    }

    pub fn get(&self, entity: &Entity) -> Option<&EntityTypeInfo> {
        self.entities.get(&TypeableEntity::from_entity(entity)?)
    }

    pub fn get_variable(&self, name: &str) -> Option<&EntityTypeInfo> {
        self.entities
            .get(&TypeableEntity::Variable(Variable::new(name)))
    }

    pub fn get_iri(&self, iri: &str) -> Option<&EntityTypeInfo> {
        self.entities
            .get(&TypeableEntity::Iri(vocab::to_internal(iri)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeableEntity, &EntityTypeInfo)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether the entity is typed as a resource class.
    pub fn is_resource(&self, entity: &Entity) -> bool {
        self.get(entity)
            .and_then(EntityTypeInfo::as_non_property)
            .is_some_and(|n| n.is_resource)
    }

    /// Whether the entity is typed as a value class.
    pub fn is_value(&self, entity: &Entity) -> bool {
        self.get(entity)
            .and_then(EntityTypeInfo::as_non_property)
            .is_some_and(|n| n.is_value)
    }
}

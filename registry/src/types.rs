//! Schema definition types.

use kith_constraint::ConstraintRef;
use kith_core::{TypeId, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Int,
    Float,
    Bool,
    Timestamp,
}

impl PropertyType {
    /// Check whether a value can be stored in a property of this type.
    ///
    /// Null is always accepted; Int widens to Float and Timestamp.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (PropertyType::String, Value::String(_))
                | (PropertyType::Int, Value::Int(_))
                | (PropertyType::Float, Value::Float(_) | Value::Int(_))
                | (PropertyType::Bool, Value::Bool(_))
                | (PropertyType::Timestamp, Value::Timestamp(_) | Value::Int(_))
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::String => "String",
            PropertyType::Int => "Int",
            PropertyType::Float => "Float",
            PropertyType::Bool => "Bool",
            PropertyType::Timestamp => "Timestamp",
        }
    }
}

/// Property definition within a type.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Storage name.
    pub name: String,
    /// Value type.
    pub property_type: PropertyType,
    /// Whether a value must be present at commit.
    pub required: bool,
    /// Value applied when an entity is created without one.
    pub default: Option<Value>,
    /// Constraints in declaration order.
    pub constraints: Vec<ConstraintRef>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: false,
            default: None,
            constraints: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<ConstraintRef>) -> Self {
        self.constraints.extend(constraints);
        self
    }
}

/// How many targets a link holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// Optional single target.
    #[default]
    ZeroOrOne,
    /// Required single target.
    One,
    /// Any number of targets.
    ZeroOrMore,
    /// At least one target.
    OneOrMore,
}

impl Cardinality {
    /// Whether the link holds a set rather than a single target.
    pub fn is_multi(&self) -> bool {
        matches!(self, Cardinality::ZeroOrMore | Cardinality::OneOrMore)
    }

    /// Whether the link must have at least one target at commit.
    pub fn is_required(&self) -> bool {
        matches!(self, Cardinality::One | Cardinality::OneOrMore)
    }

    /// Whether `count` targets satisfy this cardinality.
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Cardinality::ZeroOrOne => count <= 1,
            Cardinality::One => count == 1,
            Cardinality::ZeroOrMore => true,
            Cardinality::OneOrMore => count >= 1,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cardinality::ZeroOrOne => "0..1",
            Cardinality::One => "1",
            Cardinality::ZeroOrMore => "0..N",
            Cardinality::OneOrMore => "1..N",
        };
        write!(f, "{}", s)
    }
}

/// What happens to a link when its target is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnTargetDelete {
    /// Drop the link (default).
    #[default]
    Clear,
    /// Delete the entity holding the link as well.
    Cascade,
    /// Refuse to delete the target.
    Fail,
}

/// Link definition within a type.
#[derive(Debug, Clone)]
pub struct LinkDef {
    /// Storage name.
    pub name: String,
    /// Name of the target entity type.
    pub target: String,
    /// Target type ID, filled in by resolution.
    pub target_id: Option<TypeId>,
    /// Number of targets allowed.
    pub cardinality: Cardinality,
    /// Storage name of the opposite link on the target type.
    pub opposite: Option<String>,
    /// Policy applied when a target is deleted.
    pub on_target_delete: OnTargetDelete,
}

impl LinkDef {
    pub fn new(name: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            target_id: None,
            cardinality,
            opposite: None,
            on_target_delete: OnTargetDelete::default(),
        }
    }

    pub fn with_opposite(mut self, opposite: impl Into<String>) -> Self {
        self.opposite = Some(opposite.into());
        self
    }

    pub fn on_target_delete(mut self, policy: OnTargetDelete) -> Self {
        self.on_target_delete = policy;
        self
    }
}

/// Entity type definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Unique identifier.
    pub id: TypeId,
    /// Type name.
    pub name: String,
    /// Parent type IDs (for inheritance).
    pub parent_ids: Vec<TypeId>,
    /// Property definitions in declaration order.
    pub properties: Vec<PropertyDef>,
    /// Link definitions in declaration order.
    pub links: Vec<LinkDef>,
    /// Whether this type is abstract (cannot be instantiated directly).
    pub is_abstract: bool,
}

impl TypeDef {
    pub fn new(id: TypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_ids: Vec::new(),
            properties: Vec::new(),
            links: Vec::new(),
            is_abstract: false,
        }
    }

    /// Get a property declared on this type (not inherited).
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get a link declared on this type (not inherited).
    pub fn get_link(&self, name: &str) -> Option<&LinkDef> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Names of all properties and links declared on this type.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.links.iter().map(|l| l.name.as_str()))
    }
}

/// Precomputed subtype relationships.
#[derive(Debug, Default)]
pub struct SubtypeIndex {
    /// For each type, the set of all its subtypes (transitive).
    subtypes: HashMap<TypeId, HashSet<TypeId>>,
    /// For each type, the set of all its supertypes (transitive).
    supertypes: HashMap<TypeId, HashSet<TypeId>>,
}

impl SubtypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from acyclic type definitions.
    pub fn build(types: &HashMap<TypeId, TypeDef>) -> Self {
        let mut index = Self::new();
        for &type_id in types.keys() {
            index.subtypes.entry(type_id).or_default();
            let mut ancestors = HashSet::new();
            let mut stack: Vec<TypeId> = types[&type_id].parent_ids.clone();
            while let Some(parent) = stack.pop() {
                if ancestors.insert(parent) {
                    if let Some(parent_def) = types.get(&parent) {
                        stack.extend(parent_def.parent_ids.iter().copied());
                    }
                }
            }
            index.supertypes.insert(type_id, ancestors);
        }
        let pairs: Vec<(TypeId, TypeId)> = index
            .supertypes
            .iter()
            .flat_map(|(sub, sups)| sups.iter().map(move |sup| (*sub, *sup)))
            .collect();
        for (sub, sup) in pairs {
            index.subtypes.entry(sup).or_default().insert(sub);
        }
        index
    }

    /// Check if `sub` is `super_type` or one of its subtypes.
    pub fn is_subtype(&self, sub: TypeId, super_type: TypeId) -> bool {
        if sub == super_type {
            return true;
        }
        self.supertypes
            .get(&sub)
            .map(|set| set.contains(&super_type))
            .unwrap_or(false)
    }

    /// Get all subtypes of a type (not including the type itself).
    pub fn get_subtypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.subtypes
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get all supertypes of a type (not including the type itself).
    pub fn get_supertypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.supertypes
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

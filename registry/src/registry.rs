//! The Registry - immutable schema lookup.

use crate::{LinkDef, PropertyDef, SubtypeIndex, TypeDef};
use kith_core::TypeId;
use std::collections::{HashMap, HashSet};

/// The Registry provides runtime lookup of schema definitions.
/// It is immutable after construction.
#[derive(Debug, Default)]
pub struct Registry {
    /// Entity type definitions by ID.
    types: HashMap<TypeId, TypeDef>,
    /// Entity type ID lookup by name.
    type_names: HashMap<String, TypeId>,
    /// Precomputed subtype relationships.
    subtype_index: SubtypeIndex,
}

impl Registry {
    /// Create a registry from resolved definitions (use RegistryBuilder for
    /// construction).
    pub(crate) fn new(
        types: HashMap<TypeId, TypeDef>,
        type_names: HashMap<String, TypeId>,
        subtype_index: SubtypeIndex,
    ) -> Self {
        Self {
            types,
            type_names,
            subtype_index,
        }
    }

    // ==================== Type Lookups ====================

    /// Get a type definition by name.
    pub fn get_type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.type_names.get(name).and_then(|id| self.types.get(id))
    }

    /// Get a type definition by ID.
    pub fn get_type(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(&id)
    }

    /// Get a type ID by name.
    pub fn get_type_id(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// Name of a type, or `"?"` for an unknown ID.
    pub fn type_name(&self, id: TypeId) -> &str {
        self.types.get(&id).map(|t| t.name.as_str()).unwrap_or("?")
    }

    /// Iterate over all types.
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Get the number of types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// The type and all its ancestors, root first.
    ///
    /// Parents are visited in declaration order, each type once.
    pub fn lineage(&self, type_id: TypeId) -> Vec<TypeId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        self.collect_lineage(type_id, &mut result, &mut seen);
        result
    }

    fn collect_lineage(&self, type_id: TypeId, result: &mut Vec<TypeId>, seen: &mut HashSet<TypeId>) {
        if !seen.insert(type_id) {
            return;
        }
        if let Some(type_def) = self.types.get(&type_id) {
            for &parent_id in &type_def.parent_ids {
                self.collect_lineage(parent_id, result, seen);
            }
            result.push(type_id);
        }
    }

    // ==================== Member Lookups ====================

    /// Find a property on a type or one of its ancestors.
    pub fn find_property(&self, type_id: TypeId, name: &str) -> Option<&PropertyDef> {
        self.lineage(type_id)
            .into_iter()
            .rev()
            .filter_map(|id| self.types.get(&id))
            .find_map(|t| t.get_property(name))
    }

    /// All properties of a type, inherited ones first.
    pub fn all_properties(&self, type_id: TypeId) -> Vec<&PropertyDef> {
        self.lineage(type_id)
            .into_iter()
            .filter_map(|id| self.types.get(&id))
            .flat_map(|t| t.properties.iter())
            .collect()
    }

    /// Find a link on a type or one of its ancestors.
    pub fn find_link(&self, type_id: TypeId, name: &str) -> Option<&LinkDef> {
        self.lineage(type_id)
            .into_iter()
            .rev()
            .filter_map(|id| self.types.get(&id))
            .find_map(|t| t.get_link(name))
    }

    /// All links of a type, inherited ones first.
    pub fn all_links(&self, type_id: TypeId) -> Vec<&LinkDef> {
        self.lineage(type_id)
            .into_iter()
            .filter_map(|id| self.types.get(&id))
            .flat_map(|t| t.links.iter())
            .collect()
    }

    /// The link on the target side that mirrors `link`, if it has one.
    pub fn opposite_of(&self, link: &LinkDef) -> Option<&LinkDef> {
        let target_id = link.target_id?;
        let opposite = link.opposite.as_deref()?;
        self.find_link(target_id, opposite)
    }

    // ==================== Subtype Queries ====================

    /// Check if `sub` is a subtype of `super_type`.
    pub fn is_subtype(&self, sub: TypeId, super_type: TypeId) -> bool {
        self.subtype_index.is_subtype(sub, super_type)
    }

    /// Get all subtypes of a type (not including the type itself).
    pub fn get_subtypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.subtype_index.get_subtypes(type_id)
    }

    /// Get all supertypes of a type (not including the type itself).
    pub fn get_supertypes(&self, type_id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.subtype_index.get_supertypes(type_id)
    }
}

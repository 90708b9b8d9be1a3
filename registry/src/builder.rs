//! RegistryBuilder for constructing an immutable Registry.
//!
//! Declaration order does not matter: types may name parents, link targets
//! and opposites that are declared later. Everything is resolved and
//! checked in [`RegistryBuilder::build`].

use crate::{LinkDef, PropertyDef, Registry, SubtypeIndex, TypeDef};
use kith_constraint::ConstraintError;
use kith_core::TypeId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate type name: {0}")]
    DuplicateTypeName(String),

    #[error("Unknown parent type {parent} for type {type_name}")]
    UnknownParentType { type_name: String, parent: String },

    #[error("Inheritance cycle detected involving type: {0}")]
    InheritanceCycle(String),

    #[error("Cannot extend unknown type: {0}")]
    UnknownExtendedType(String),

    #[error("Duplicate member {member} in type {type_name}")]
    DuplicateMember { type_name: String, member: String },

    #[error("Link {type_name}.{link} targets unknown type {target}")]
    UnknownLinkTarget {
        type_name: String,
        link: String,
        target: String,
    },

    #[error("Link {type_name}.{link} names opposite {opposite}, which does not exist on {target}")]
    MissingOpposite {
        type_name: String,
        link: String,
        opposite: String,
        target: String,
    },

    #[error("Link {type_name}.{link} names opposite {opposite}, which does not name it back")]
    AsymmetricOpposite {
        type_name: String,
        link: String,
        opposite: String,
    },

    #[error("Opposite {opposite} of {type_name}.{link} targets {actual}, expected {type_name}")]
    OppositeTargetMismatch {
        type_name: String,
        link: String,
        opposite: String,
        actual: String,
    },

    #[error("Invalid constraint on {type_name}.{property}: {source}")]
    InvalidConstraint {
        type_name: String,
        property: String,
        #[source]
        source: ConstraintError,
    },
}

impl RegistryError {
    pub fn invalid_constraint(
        type_name: impl Into<String>,
        property: impl Into<String>,
        source: ConstraintError,
    ) -> Self {
        Self::InvalidConstraint {
            type_name: type_name.into(),
            property: property.into(),
            source,
        }
    }
}

/// A type as declared, before parent names are resolved.
#[derive(Debug)]
struct DeclaredType {
    def: TypeDef,
    parent_names: Vec<String>,
}

/// Members added to an existing type from outside its declaration.
#[derive(Debug)]
struct Extension {
    type_name: String,
    properties: Vec<PropertyDef>,
    links: Vec<LinkDef>,
}

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Next type ID to allocate.
    next_type_id: u32,
    /// Types being built.
    types: HashMap<TypeId, DeclaredType>,
    /// Type name to ID mapping.
    type_names: HashMap<String, TypeId>,
    /// Pending extensions, applied in order at build.
    extensions: Vec<Extension>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type definition.
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        let name = name.into();
        let id = TypeId::new(self.next_type_id);
        self.next_type_id += 1;

        TypeBuilder {
            builder: self,
            id,
            name,
            parent_names: Vec::new(),
            properties: Vec::new(),
            links: Vec::new(),
            is_abstract: false,
        }
    }

    /// Add members to a type declared elsewhere (before or after this call).
    pub fn extend_type(&mut self, name: impl Into<String>) -> ExtensionBuilder<'_> {
        ExtensionBuilder {
            builder: self,
            extension: Extension {
                type_name: name.into(),
                properties: Vec::new(),
                links: Vec::new(),
            },
        }
    }

    /// Whether a type with this name has been declared.
    pub fn has_type(&self, name: &str) -> bool {
        self.type_names.contains_key(name)
    }

    /// Resolve all declarations and build the immutable Registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let RegistryBuilder {
            types: declared,
            type_names,
            extensions,
            ..
        } = self;

        let mut ids: Vec<TypeId> = declared.keys().copied().collect();
        ids.sort();

        // Resolve parent names
        let mut types: HashMap<TypeId, TypeDef> = HashMap::with_capacity(declared.len());
        for (id, declared_type) in declared {
            let DeclaredType {
                mut def,
                parent_names,
            } = declared_type;
            for parent_name in parent_names {
                match type_names.get(&parent_name) {
                    Some(&parent_id) => def.parent_ids.push(parent_id),
                    None => {
                        return Err(RegistryError::UnknownParentType {
                            type_name: def.name,
                            parent: parent_name,
                        })
                    }
                }
            }
            types.insert(id, def);
        }
        check_acyclic(&types, &ids)?;

        // Merge extensions
        for extension in extensions {
            let Some(type_def) = type_names
                .get(&extension.type_name)
                .and_then(|id| types.get_mut(id))
            else {
                return Err(RegistryError::UnknownExtendedType(extension.type_name));
            };
            type_def.properties.extend(extension.properties);
            type_def.links.extend(extension.links);
        }

        // Resolve link targets
        for id in &ids {
            let Some(type_def) = types.get_mut(id) else {
                continue;
            };
            for link in &mut type_def.links {
                match type_names.get(&link.target) {
                    Some(&target_id) => link.target_id = Some(target_id),
                    None => {
                        return Err(RegistryError::UnknownLinkTarget {
                            type_name: type_def.name.clone(),
                            link: link.name.clone(),
                            target: link.target.clone(),
                        })
                    }
                }
            }
        }

        let subtype_index = SubtypeIndex::build(&types);
        let registry = Registry::new(types, type_names, subtype_index);

        check_members(&registry, &ids)?;
        check_opposites(&registry, &ids)?;

        debug!(types = registry.type_count(), "registry resolved");
        Ok(registry)
    }
}

fn check_acyclic(types: &HashMap<TypeId, TypeDef>, ids: &[TypeId]) -> Result<(), RegistryError> {
    for &start in ids {
        let Some(start_def) = types.get(&start) else {
            continue;
        };
        let mut seen = HashSet::new();
        let mut stack = start_def.parent_ids.clone();
        while let Some(parent) = stack.pop() {
            if parent == start {
                return Err(RegistryError::InheritanceCycle(start_def.name.clone()));
            }
            if seen.insert(parent) {
                if let Some(parent_def) = types.get(&parent) {
                    stack.extend(parent_def.parent_ids.iter().copied());
                }
            }
        }
    }
    Ok(())
}

/// Properties and links share one namespace across a type and its ancestors.
fn check_members(registry: &Registry, ids: &[TypeId]) -> Result<(), RegistryError> {
    for &id in ids {
        let mut seen = HashSet::new();
        for type_def in registry.lineage(id).iter().filter_map(|t| registry.get_type(*t)) {
            for member in type_def.member_names() {
                if !seen.insert(member) {
                    return Err(RegistryError::DuplicateMember {
                        type_name: registry.type_name(id).to_string(),
                        member: member.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Opposite links must exist on the target, name each other, and point back
/// at the declaring type.
fn check_opposites(registry: &Registry, ids: &[TypeId]) -> Result<(), RegistryError> {
    for &id in ids {
        let Some(type_def) = registry.get_type(id) else {
            continue;
        };
        for link in &type_def.links {
            let Some(opposite) = link.opposite.as_deref() else {
                continue;
            };
            let Some(back) = registry.opposite_of(link) else {
                return Err(RegistryError::MissingOpposite {
                    type_name: type_def.name.clone(),
                    link: link.name.clone(),
                    opposite: opposite.to_string(),
                    target: link.target.clone(),
                });
            };
            if back.opposite.as_deref() != Some(link.name.as_str()) {
                return Err(RegistryError::AsymmetricOpposite {
                    type_name: type_def.name.clone(),
                    link: link.name.clone(),
                    opposite: opposite.to_string(),
                });
            }
            let points_back = back
                .target_id
                .is_some_and(|target| registry.is_subtype(id, target));
            if !points_back {
                return Err(RegistryError::OppositeTargetMismatch {
                    type_name: type_def.name.clone(),
                    link: link.name.clone(),
                    opposite: opposite.to_string(),
                    actual: back.target.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Builder for a type definition.
pub struct TypeBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    id: TypeId,
    name: String,
    parent_names: Vec<String>,
    properties: Vec<PropertyDef>,
    links: Vec<LinkDef>,
    is_abstract: bool,
}

impl<'a> TypeBuilder<'a> {
    /// Add a parent type by name.
    pub fn extends(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_names.push(parent_name.into());
        self
    }

    /// Add a property.
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a link.
    pub fn link(mut self, link: LinkDef) -> Self {
        self.links.push(link);
        self
    }

    /// Mark as abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Finish building this type.
    pub fn done(self) -> Result<TypeId, RegistryError> {
        if self.builder.type_names.contains_key(&self.name) {
            return Err(RegistryError::DuplicateTypeName(self.name));
        }

        let type_def = TypeDef {
            id: self.id,
            name: self.name.clone(),
            parent_ids: Vec::new(),
            properties: self.properties,
            links: self.links,
            is_abstract: self.is_abstract,
        };

        self.builder.type_names.insert(self.name, self.id);
        self.builder.types.insert(
            self.id,
            DeclaredType {
                def: type_def,
                parent_names: self.parent_names,
            },
        );
        Ok(self.id)
    }
}

/// Builder for members added to an existing type.
pub struct ExtensionBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    extension: Extension,
}

impl<'a> ExtensionBuilder<'a> {
    /// Add a property.
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.extension.properties.push(property);
        self
    }

    /// Add a link.
    pub fn link(mut self, link: LinkDef) -> Self {
        self.extension.links.push(link);
        self
    }

    /// Queue the extension; the target type is checked at build.
    pub fn done(self) {
        self.builder.extensions.push(self.extension);
    }
}

//! Descriptor registry and field scanner
//!
//! Type authors declare their reference fields once through
//! [`RegistryBuilder`]. The resulting [`DescriptorRegistry`] is immutable and
//! shared by `Arc`; only its scan cache fills in over time.

use crate::descriptor::{FieldDecl, FieldDescriptor};
use crate::error::RegistryError;
use dashmap::DashMap;
use sceneref_model::{TypeHierarchy, TypeInfo, TypeKey, TypeKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Declaration of one type and the reference fields it introduces
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Type name
    pub name: TypeKey,
    /// Type category
    pub kind: TypeKind,
    /// Direct base type
    pub base: Option<TypeKey>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeKey>,
    /// Reference fields declared at this level, in declaration order
    pub fields: Vec<FieldDecl>,
}

impl TypeDecl {
    /// Create type declaration
    #[must_use]
    pub fn new(name: impl Into<TypeKey>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Behavior type
    #[inline]
    #[must_use]
    pub fn behavior(name: impl Into<TypeKey>) -> Self {
        Self::new(name, TypeKind::Behavior)
    }

    /// Standalone asset type
    #[inline]
    #[must_use]
    pub fn asset(name: impl Into<TypeKey>) -> Self {
        Self::new(name, TypeKind::Asset)
    }

    /// Interface type
    #[inline]
    #[must_use]
    pub fn interface(name: impl Into<TypeKey>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Node type
    #[inline]
    #[must_use]
    pub fn node(name: impl Into<TypeKey>) -> Self {
        Self::new(name, TypeKind::Node)
    }

    /// With base type
    #[inline]
    #[must_use]
    pub fn extends(mut self, base: impl Into<TypeKey>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// With implemented interface
    #[inline]
    #[must_use]
    pub fn implements(mut self, interface: impl Into<TypeKey>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// With reference field
    #[inline]
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }
}

/// Builder for [`DescriptorRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    decls: Vec<TypeDecl>,
}

impl RegistryBuilder {
    /// Create empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With type declaration
    #[must_use]
    pub fn declare(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Add type declaration
    pub fn push(&mut self, decl: TypeDecl) {
        self.decls.push(decl);
    }

    /// Number of declarations so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Check if nothing is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Build the registry
    ///
    /// # Errors
    /// Returns error on duplicate types or fields, undeclared bases, or
    /// inheritance cycles
    pub fn build(self) -> Result<DescriptorRegistry, RegistryError> {
        let mut types = TypeHierarchy::new();
        let mut order = Vec::with_capacity(self.decls.len());
        let mut declared: HashMap<TypeKey, Vec<Arc<FieldDescriptor>>> =
            HashMap::with_capacity(self.decls.len());

        for decl in self.decls {
            if declared.contains_key(&decl.name) {
                return Err(RegistryError::DuplicateType(decl.name));
            }

            let mut names = HashSet::new();
            for field in &decl.fields {
                if !names.insert(field.name.as_str()) {
                    return Err(RegistryError::DuplicateField {
                        owner: decl.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }

            let TypeDecl {
                name,
                kind,
                base,
                interfaces,
                fields,
            } = decl;

            types.insert(
                name.clone(),
                TypeInfo {
                    kind,
                    base,
                    interfaces,
                },
            );
            let descriptors: Vec<Arc<FieldDescriptor>> = fields
                .into_iter()
                .map(|field| Arc::new(FieldDescriptor::new(name.clone(), field)))
                .collect();
            declared.insert(name.clone(), descriptors);
            order.push(name);
        }

        for key in &order {
            check_chain(&types, key)?;
        }

        Ok(DescriptorRegistry {
            types,
            order,
            declared,
            cache: DashMap::new(),
        })
    }
}

fn check_chain(types: &TypeHierarchy, key: &TypeKey) -> Result<(), RegistryError> {
    let mut visited = HashSet::new();
    let mut current = key;
    visited.insert(current);

    while let Some(base) = types.base_of(current) {
        if !types.contains(base) {
            return Err(RegistryError::UnknownBase {
                ty: current.clone(),
                base: base.clone(),
            });
        }
        if !visited.insert(base) {
            return Err(RegistryError::InheritanceCycle(key.clone()));
        }
        current = base;
    }
    Ok(())
}

/// Process-wide table of field descriptors
///
/// # Invariant
/// Descriptors never change after [`RegistryBuilder::build`]; repeated
/// [`scan`](Self::scan)s of a type return the identical `Arc`.
#[derive(Debug)]
pub struct DescriptorRegistry {
    types: TypeHierarchy,
    order: Vec<TypeKey>,
    declared: HashMap<TypeKey, Vec<Arc<FieldDescriptor>>>,
    cache: DashMap<TypeKey, Arc<[Arc<FieldDescriptor>]>>,
}

impl DescriptorRegistry {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Type relations of every declared type
    #[inline]
    #[must_use]
    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    /// Check if a type is declared
    #[inline]
    #[must_use]
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.types.contains(ty)
    }

    /// Fields declared directly on `ty`, excluding inherited ones
    #[must_use]
    pub fn declared_fields(&self, ty: &TypeKey) -> &[Arc<FieldDescriptor>] {
        self.declared.get(ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every annotated field of `ty`, inherited ones included
    ///
    /// Base fields come first; within a type, declaration order. Undeclared
    /// types scan to an empty list.
    pub fn scan(&self, ty: &TypeKey) -> Arc<[Arc<FieldDescriptor>]> {
        if let Some(hit) = self.cache.get(ty) {
            return Arc::clone(hit.value());
        }

        let fields: Arc<[Arc<FieldDescriptor>]> = self
            .types
            .chain(ty)
            .iter()
            .rev()
            .filter_map(|level| self.declared.get(level))
            .flatten()
            .cloned()
            .collect();

        tracing::debug!(ty = %ty, fields = fields.len(), "scanned reference fields");
        Arc::clone(self.cache.entry(ty.clone()).or_insert(fields).value())
    }

    /// Declared types with at least one annotated field, in declaration order
    #[must_use]
    pub fn annotated_types(&self) -> Vec<TypeKey> {
        self.order
            .iter()
            .filter(|ty| !self.scan(ty).is_empty())
            .cloned()
            .collect()
    }

    /// Every declared type, in declaration order
    #[inline]
    #[must_use]
    pub fn declared_types(&self) -> &[TypeKey] {
        &self.order
    }

    /// Number of cached scans
    #[inline]
    #[must_use]
    pub fn cached_scans(&self) -> usize {
        self.cache.len()
    }

    /// Number of declared types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no types are declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

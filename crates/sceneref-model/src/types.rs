//! Type identities and the is-a relation
//!
//! Provides [`TypeKey`] for naming behavior, asset, node and interface types,
//! and [`TypeHierarchy`] which answers "is this concrete type usable where
//! that type is expected" without any runtime introspection.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Interned type name
///
/// Cloning is a reference-count bump, so keys can be stored freely in
/// descriptors, references and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    /// Create key from a type name
    #[inline]
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&TypeKey> for TypeKey {
    fn from(key: &TypeKey) -> Self {
        key.clone()
    }
}

/// Category of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Attachable unit of logic living on a node
    #[default]
    Behavior,

    /// Standalone value that is never attached to a node
    Asset,

    /// Contract implemented by behaviors; cannot be stored directly
    Interface,

    /// The graph node type itself
    Node,
}

/// Declared relations of one type
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    /// Type category
    pub kind: TypeKind,

    /// Direct base type, if any
    pub base: Option<TypeKey>,

    /// Interfaces implemented at this level
    pub interfaces: Vec<TypeKey>,
}

/// Table of type relations
///
/// Unknown types behave as base-less behaviors; every type is-a itself.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    types: HashMap<TypeKey, TypeInfo>,
}

impl TypeHierarchy {
    /// Create empty hierarchy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the relations of a type
    pub fn insert(&mut self, key: TypeKey, info: TypeInfo) {
        self.types.insert(key, info);
    }

    /// Relations of a type, if declared
    #[inline]
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<&TypeInfo> {
        self.types.get(key)
    }

    /// Check whether a type has been declared
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    /// Kind of a type (`Behavior` when undeclared)
    #[must_use]
    pub fn kind_of(&self, key: &TypeKey) -> TypeKind {
        self.types.get(key).map(|info| info.kind).unwrap_or_default()
    }

    /// Base type of a type
    #[must_use]
    pub fn base_of(&self, key: &TypeKey) -> Option<&TypeKey> {
        self.types.get(key).and_then(|info| info.base.as_ref())
    }

    /// The type followed by each of its bases, derived first
    ///
    /// Stops early if a cycle is encountered.
    #[must_use]
    pub fn chain(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut chain = vec![key.clone()];
        let mut current = key;
        while let Some(base) = self.base_of(current) {
            if chain.contains(base) {
                break;
            }
            chain.push(base.clone());
            current = base;
        }
        chain
    }

    /// Check whether `concrete` can be used where `target` is expected
    ///
    /// Walks the base chain of `concrete`, and at every level the declared
    /// interfaces together with the interfaces those extend.
    #[must_use]
    pub fn is_a(&self, concrete: &TypeKey, target: &TypeKey) -> bool {
        if concrete == target {
            return true;
        }

        let mut seen = HashSet::new();
        let mut pending: Vec<&TypeKey> = vec![concrete];
        while let Some(ty) = pending.pop() {
            if !seen.insert(ty) {
                continue;
            }
            if ty == target {
                return true;
            }
            if let Some(info) = self.types.get(ty) {
                pending.extend(info.base.iter());
                pending.extend(info.interfaces.iter());
            }
        }
        false
    }

    /// All declared types
    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &TypeInfo)> {
        self.types.iter()
    }

    /// Number of declared types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

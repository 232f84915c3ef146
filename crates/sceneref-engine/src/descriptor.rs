//! Field declarations and descriptors
//!
//! [`FieldDecl`] is what a type author writes; [`FieldDescriptor`] is the
//! immutable, shared record the registry hands out for each declared field.

use crate::filter::RefFilter;
use sceneref_model::{CollectionShape, LocationStrategy, RefFlags, TypeKey};
use std::sync::Arc;

/// Reference annotation on a field
#[derive(Debug, Clone)]
pub struct RefAttr {
    /// Where the reference must be found
    pub strategy: LocationStrategy,
    /// Modifier flags
    pub flags: RefFlags,
    /// Optional candidate filter
    pub filter: Option<Arc<dyn RefFilter>>,
}

impl RefAttr {
    /// Create annotation for a strategy
    #[inline]
    #[must_use]
    pub fn new(strategy: LocationStrategy) -> Self {
        Self {
            strategy,
            flags: RefFlags::empty(),
            filter: None,
        }
    }

    /// Reference on the owning node
    #[inline]
    #[must_use]
    pub fn on_self() -> Self {
        Self::new(LocationStrategy::OnSelf)
    }

    /// Reference on the owning node or an ancestor
    #[inline]
    #[must_use]
    pub fn parent() -> Self {
        Self::new(LocationStrategy::Parent)
    }

    /// Reference on the owning node or a descendant
    #[inline]
    #[must_use]
    pub fn child() -> Self {
        Self::new(LocationStrategy::Child)
    }

    /// Reference anywhere in the active graph
    #[inline]
    #[must_use]
    pub fn scene() -> Self {
        Self::new(LocationStrategy::Scene)
    }

    /// Manually assigned reference
    #[inline]
    #[must_use]
    pub fn anywhere() -> Self {
        Self::new(LocationStrategy::Anywhere)
    }

    /// With additional flags
    #[inline]
    #[must_use]
    pub fn with_flags(mut self, flags: RefFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// With candidate filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl RefFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }
}

/// Declared reference field
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Declared element type (the interface itself for indirected fields)
    pub element_type: TypeKey,
    /// Container shape
    pub shape: CollectionShape,
    /// Elements are stored behind interface references
    pub indirect: bool,
    /// Reference annotation
    pub attr: RefAttr,
}

impl FieldDecl {
    /// Create field declaration
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        element_type: impl Into<TypeKey>,
        shape: CollectionShape,
        attr: RefAttr,
    ) -> Self {
        Self {
            name: name.into(),
            element_type: element_type.into(),
            shape,
            indirect: false,
            attr,
        }
    }

    /// Single-reference field
    #[inline]
    #[must_use]
    pub fn scalar(name: impl Into<String>, element_type: impl Into<TypeKey>, attr: RefAttr) -> Self {
        Self::new(name, element_type, CollectionShape::Scalar, attr)
    }

    /// Array field
    #[inline]
    #[must_use]
    pub fn array(name: impl Into<String>, element_type: impl Into<TypeKey>, attr: RefAttr) -> Self {
        Self::new(name, element_type, CollectionShape::Array, attr)
    }

    /// List field
    #[inline]
    #[must_use]
    pub fn list(name: impl Into<String>, element_type: impl Into<TypeKey>, attr: RefAttr) -> Self {
        Self::new(name, element_type, CollectionShape::List, attr)
    }

    /// Store elements behind interface references
    #[inline]
    #[must_use]
    pub fn indirect(mut self) -> Self {
        self.indirect = true;
        self
    }
}

/// Immutable metadata of one annotated field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    owner: TypeKey,
    decl: FieldDecl,
}

impl FieldDescriptor {
    /// Create descriptor for a field declared on `owner`
    #[inline]
    #[must_use]
    pub fn new(owner: impl Into<TypeKey>, decl: FieldDecl) -> Self {
        Self {
            owner: owner.into(),
            decl,
        }
    }

    /// Declaring type
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &TypeKey {
        &self.owner
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Declared element type
    #[inline]
    #[must_use]
    pub fn element_type(&self) -> &TypeKey {
        &self.decl.element_type
    }

    /// Location strategy
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> LocationStrategy {
        self.decl.attr.strategy
    }

    /// Modifier flags
    #[inline]
    #[must_use]
    pub fn flags(&self) -> RefFlags {
        self.decl.attr.flags
    }

    /// Whether every bit of `flags` is set
    #[inline]
    #[must_use]
    pub fn has_flags(&self, flags: RefFlags) -> bool {
        self.decl.attr.flags.contains(flags)
    }

    /// Candidate filter
    #[inline]
    #[must_use]
    pub fn filter(&self) -> Option<&dyn RefFilter> {
        self.decl.attr.filter.as_deref()
    }

    /// Container shape
    #[inline]
    #[must_use]
    pub fn shape(&self) -> CollectionShape {
        self.decl.shape
    }

    /// Whether the field holds more than one reference
    #[inline]
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.decl.shape.is_collection()
    }

    /// Whether elements are stored behind interface references
    #[inline]
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.decl.indirect
    }

    /// Element type as shown in diagnostics: `Rigidbody` or `Rigidbody[]`
    #[must_use]
    pub fn expected_label(&self) -> String {
        if self.is_collection() {
            format!("{}[]", self.decl.element_type)
        } else {
            self.decl.element_type.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TypeFilter;

    #[test]
    fn attr_constructors_pick_strategy() {
        assert_eq!(RefAttr::on_self().strategy, LocationStrategy::OnSelf);
        assert_eq!(RefAttr::parent().strategy, LocationStrategy::Parent);
        assert_eq!(RefAttr::child().strategy, LocationStrategy::Child);
        assert_eq!(RefAttr::scene().strategy, LocationStrategy::Scene);
        assert_eq!(RefAttr::anywhere().strategy, LocationStrategy::Anywhere);
    }

    #[test]
    fn with_flags_accumulates() {
        let attr = RefAttr::parent()
            .with_flags(RefFlags::OPTIONAL)
            .with_flags(RefFlags::EXCLUDE_SELF);
        assert_eq!(attr.flags, RefFlags::OPTIONAL | RefFlags::EXCLUDE_SELF);
    }

    #[test]
    fn descriptor_accessors() {
        let decl = FieldDecl::list("targets", "IDamageable", RefAttr::scene().with_filter(TypeFilter::only("Health")))
            .indirect();
        let desc = FieldDescriptor::new("Turret", decl);

        assert_eq!(desc.owner().name(), "Turret");
        assert_eq!(desc.name(), "targets");
        assert!(desc.is_collection());
        assert!(desc.is_indirect());
        assert!(desc.filter().is_some());
        assert_eq!(desc.expected_label(), "IDamageable[]");
    }

    #[test]
    fn scalar_label_has_no_brackets() {
        let desc = FieldDescriptor::new("Player", FieldDecl::scalar("body", "Rigidbody", RefAttr::on_self()));
        assert_eq!(desc.expected_label(), "Rigidbody");
        assert!(!desc.has_flags(RefFlags::OPTIONAL));
    }
}

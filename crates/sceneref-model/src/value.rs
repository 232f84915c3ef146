//! Field values
//!
//! [`FieldValue`] is what a host stores in an annotated field. Collections
//! live behind `Arc` so an unchanged resolution can hand back the very same
//! allocation.

use crate::interface::InterfaceRef;
use crate::reference::Reference;
use crate::strategy::CollectionShape;
use std::sync::Arc;

/// One element of a collection field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Plain reference slot, possibly unassigned
    Direct(Option<Reference>),

    /// Interface-indirected slot
    Interface(InterfaceRef),
}

impl Element {
    /// Concrete reference held by this element, unwrapping indirection
    #[inline]
    #[must_use]
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            Self::Direct(reference) => reference.as_ref(),
            Self::Interface(wrapper) => wrapper.backing(),
        }
    }

    /// Whether this element is interface-indirected
    #[inline]
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        matches!(self, Self::Interface(_))
    }
}

impl From<Reference> for Element {
    fn from(reference: Reference) -> Self {
        Self::Direct(Some(reference))
    }
}

/// Value stored in an annotated field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    /// Nothing stored (null field)
    #[default]
    Unset,

    /// Single plain reference
    Ref(Reference),

    /// Single interface-indirected reference
    Interface(InterfaceRef),

    /// Fixed-size collection
    Array(Arc<[Element]>),

    /// Growable collection
    List(Arc<Vec<Element>>),
}

impl FieldValue {
    /// Build an array value
    #[must_use]
    pub fn array(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::Array(elements.into_iter().collect())
    }

    /// Build a list value
    #[must_use]
    pub fn list(elements: impl IntoIterator<Item = Element>) -> Self {
        Self::List(Arc::new(elements.into_iter().collect()))
    }

    /// Collection elements, if this is a collection
    #[inline]
    #[must_use]
    pub fn elements(&self) -> Option<&[Element]> {
        match self {
            Self::Array(elements) => Some(&elements[..]),
            Self::List(elements) => Some(elements.as_slice()),
            _ => None,
        }
    }

    /// Scalar reference, unwrapping indirection
    #[inline]
    #[must_use]
    pub fn scalar(&self) -> Option<&Reference> {
        match self {
            Self::Ref(reference) => Some(reference),
            Self::Interface(wrapper) => wrapper.backing(),
            _ => None,
        }
    }

    /// Every concrete reference held, in order, unwrapping indirection
    ///
    /// Empty collection slots yield `None`.
    #[must_use]
    pub fn references(&self) -> Vec<Option<&Reference>> {
        match self {
            Self::Unset => Vec::new(),
            Self::Ref(reference) => vec![Some(reference)],
            Self::Interface(wrapper) => vec![wrapper.backing()],
            Self::Array(_) | Self::List(_) => self
                .elements()
                .unwrap_or_default()
                .iter()
                .map(Element::reference)
                .collect(),
        }
    }

    /// Emptiness contract
    ///
    /// Unset, a wrapper without a backing reference, or a collection with
    /// no elements. A collection of unassigned slots is *not* empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Ref(_) => false,
            Self::Interface(wrapper) => !wrapper.has_value(),
            Self::Array(elements) => elements.is_empty(),
            Self::List(elements) => elements.is_empty(),
        }
    }

    /// Whether a value of this variant may be stored in a field of `shape`
    ///
    /// `indirect` is whether the field's elements are interface-indirected.
    /// `Unset` fits every field.
    #[must_use]
    pub fn fits(&self, shape: CollectionShape, indirect: bool) -> bool {
        match (self, shape) {
            (Self::Unset, _) => true,
            (Self::Ref(_), CollectionShape::Scalar) => !indirect,
            (Self::Interface(_), CollectionShape::Scalar) => indirect,
            (Self::Array(elements), CollectionShape::Array) => {
                elements.iter().all(|e| e.is_indirect() == indirect)
            }
            (Self::List(elements), CollectionShape::List) => {
                elements.iter().all(|e| e.is_indirect() == indirect)
            }
            _ => false,
        }
    }

    /// Short variant label for error messages
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Ref(_) => "reference",
            Self::Interface(_) => "interface",
            Self::Array(_) => "array",
            Self::List(_) => "list",
        }
    }
}

impl From<Reference> for FieldValue {
    fn from(reference: Reference) -> Self {
        Self::Ref(reference)
    }
}

impl From<InterfaceRef> for FieldValue {
    fn from(wrapper: InterfaceRef) -> Self {
        Self::Interface(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{AttachmentId, AttachmentRef, NodeId};

    fn attached(ty: &str) -> Reference {
        AttachmentRef::new(AttachmentId::new(), NodeId::new(), ty).into()
    }

    #[test]
    fn emptiness_contract() {
        assert!(FieldValue::Unset.is_empty());
        assert!(FieldValue::Interface(InterfaceRef::new("IDamageable")).is_empty());
        assert!(FieldValue::array(Vec::<Element>::new()).is_empty());
        assert!(FieldValue::list(Vec::<Element>::new()).is_empty());

        assert!(!FieldValue::Ref(attached("Health")).is_empty());
        assert!(!FieldValue::array([Element::Direct(None)]).is_empty());
    }

    #[test]
    fn references_unwrap_wrappers() {
        let health = attached("Health");
        let value = FieldValue::list([
            Element::Interface(InterfaceRef::assigned("IDamageable", health.clone())),
            Element::Direct(None),
        ]);

        assert_eq!(value.references(), vec![Some(&health), None]);
    }

    #[test]
    fn fits_checks_shape_and_indirection() {
        let health = attached("Health");

        assert!(FieldValue::Unset.fits(CollectionShape::Array, true));
        assert!(FieldValue::Ref(health.clone()).fits(CollectionShape::Scalar, false));
        assert!(!FieldValue::Ref(health.clone()).fits(CollectionShape::Scalar, true));
        assert!(!FieldValue::Ref(health.clone()).fits(CollectionShape::List, false));
        assert!(FieldValue::array([Element::from(health.clone())]).fits(CollectionShape::Array, false));
        assert!(!FieldValue::array([Element::from(health)]).fits(CollectionShape::Array, true));
    }
}

//! Interface indirection
//!
//! Interfaces cannot be stored as a terminal reference type, so a field that
//! wants "anything implementing `IDamageable`" stores an [`InterfaceRef`]:
//! the concrete backing reference plus a lazily computed, cached view of it
//! as the interface.

use crate::reference::Reference;
use crate::types::{TypeHierarchy, TypeKey};
use once_cell::unsync::OnceCell;
use std::fmt;

/// Serializable stand-in for an interface-typed reference
///
/// # Invariant
/// The cached downcast is never stale: every change of the backing
/// reference empties the cache.
#[derive(Clone)]
pub struct InterfaceRef {
    /// Declared interface type
    interface: TypeKey,

    /// Concrete backing reference
    implementer: Option<Reference>,

    /// Downcast of `implementer` to `interface`
    cast: OnceCell<Option<Reference>>,
}

impl InterfaceRef {
    /// Create an empty wrapper for an interface type
    #[inline]
    #[must_use]
    pub fn new(interface: impl Into<TypeKey>) -> Self {
        Self {
            interface: interface.into(),
            implementer: None,
            cast: OnceCell::new(),
        }
    }

    /// Create a wrapper already backed by a reference
    #[must_use]
    pub fn assigned(interface: impl Into<TypeKey>, implementer: Reference) -> Self {
        let mut wrapper = Self::new(interface);
        wrapper.implementer = Some(implementer);
        wrapper
    }

    /// Declared interface type
    #[inline]
    #[must_use]
    pub fn ref_type(&self) -> &TypeKey {
        &self.interface
    }

    /// Concrete backing reference, regardless of whether it implements the interface
    #[inline]
    #[must_use]
    pub fn backing(&self) -> Option<&Reference> {
        self.implementer.as_ref()
    }

    /// Whether a backing reference is assigned
    ///
    /// True even when the backing reference does not implement the
    /// interface; see [`InterfaceRef::value`].
    #[inline]
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.implementer.is_some()
    }

    /// Typed view of the backing reference
    ///
    /// `None` both when nothing is assigned and when the assigned reference
    /// does not implement the interface. Computed on first read after a
    /// change and cached until the next change.
    pub fn value(&self, types: &TypeHierarchy) -> Option<&Reference> {
        self.cast
            .get_or_init(|| {
                self.implementer
                    .as_ref()
                    .filter(|candidate| implements(candidate, &self.interface, types))
                    .cloned()
            })
            .as_ref()
    }

    /// Whether the downcast has been computed since the last change
    #[inline]
    #[must_use]
    pub fn is_cast_cached(&self) -> bool {
        self.cast.get().is_some()
    }

    /// Store a new backing reference
    ///
    /// Returns `true` if the backing reference changed. When it did not,
    /// the wrapper (including its cache) is left untouched.
    pub fn on_serialize(&mut self, candidate: Option<Reference>) -> bool {
        if candidate == self.implementer {
            return false;
        }

        self.cast.take();
        self.implementer = candidate;
        true
    }

    /// Reset the backing reference and the cache
    pub fn clear(&mut self) {
        self.cast.take();
        self.implementer = None;
    }
}

fn implements(candidate: &Reference, interface: &TypeKey, types: &TypeHierarchy) -> bool {
    candidate
        .concrete_type()
        .is_some_and(|concrete| types.is_a(concrete, interface))
}

impl PartialEq for InterfaceRef {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface && self.implementer == other.implementer
    }
}

impl Eq for InterfaceRef {}

impl fmt::Debug for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceRef")
            .field("interface", &self.interface)
            .field("implementer", &self.implementer)
            .field("cached", &self.is_cast_cached())
            .finish()
    }
}

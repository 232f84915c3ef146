//! Candidate filters
//!
//! A filter narrows what resolution accepts after the location strategy has
//! produced candidates. Collections keep the accepted candidates; a scalar
//! whose candidate is rejected is cleared.

use sceneref_model::{Reference, TypeHierarchy, TypeKey};
use std::fmt;

/// Candidate predicate attached to a field declaration
pub trait RefFilter: Send + Sync + fmt::Debug {
    /// Whether `candidate` may be stored
    fn include(&self, candidate: &Reference, types: &TypeHierarchy) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFilterMode {
    Only,
    Except,
}

/// Accept or reject candidates by concrete type
///
/// Node references have no concrete type: `only` rejects them, `except`
/// accepts them.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    ty: TypeKey,
    mode: TypeFilterMode,
}

impl TypeFilter {
    /// Accept only candidates that are-a `ty`
    #[inline]
    #[must_use]
    pub fn only(ty: impl Into<TypeKey>) -> Self {
        Self {
            ty: ty.into(),
            mode: TypeFilterMode::Only,
        }
    }

    /// Reject candidates that are-a `ty`
    #[inline]
    #[must_use]
    pub fn except(ty: impl Into<TypeKey>) -> Self {
        Self {
            ty: ty.into(),
            mode: TypeFilterMode::Except,
        }
    }
}

impl RefFilter for TypeFilter {
    fn include(&self, candidate: &Reference, types: &TypeHierarchy) -> bool {
        let matches = candidate
            .concrete_type()
            .is_some_and(|concrete| types.is_a(concrete, &self.ty));
        match self.mode {
            TypeFilterMode::Only => matches,
            TypeFilterMode::Except => !matches,
        }
    }
}

/// Named closure filter
pub struct PredicateFilter<F> {
    name: String,
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: Fn(&Reference) -> bool + Send + Sync,
{
    /// Create named predicate filter
    #[must_use]
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }

    /// Filter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> RefFilter for PredicateFilter<F>
where
    F: Fn(&Reference) -> bool + Send + Sync,
{
    fn include(&self, candidate: &Reference, _types: &TypeHierarchy) -> bool {
        (self.predicate)(candidate)
    }
}

impl<F> fmt::Debug for PredicateFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFilter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

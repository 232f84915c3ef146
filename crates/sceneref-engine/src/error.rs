//! Error types for the reference engine
//!
//! Only programmer errors are errors here: broken declarations and values of
//! the wrong category. Missing or misplaced references are reported as
//! [`crate::validator::Diagnostic`]s instead.

use sceneref_model::{DeclarationError, TypeKey};

/// Fatal engine error
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    /// Interface-typed field stored without an indirection wrapper
    #[error("{owner} field '{field}' is declared as interface {interface}; wrap it in an interface reference")]
    BareInterface {
        /// Declaring type
        owner: TypeKey,
        /// Field name
        field: String,
        /// Interface element type
        interface: TypeKey,
    },

    /// Stored value does not match the declared shape
    #[error("{owner} field '{field}' expects {expected} but holds {found}")]
    ShapeMismatch {
        /// Declaring type
        owner: TypeKey,
        /// Field name
        field: String,
        /// Declared shape label
        expected: String,
        /// Stored value label
        found: &'static str,
    },

    /// Declaration vocabulary error
    #[error("declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// Registry construction error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl RefError {
    /// Declaring type and field, when the error concerns one field
    #[must_use]
    pub fn field(&self) -> Option<(&TypeKey, &str)> {
        match self {
            Self::BareInterface { owner, field, .. } | Self::ShapeMismatch { owner, field, .. } => {
                Some((owner, field.as_str()))
            }
            Self::Declaration(_) | Self::Registry(_) => None,
        }
    }
}

/// Errors building a descriptor registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Type declared twice
    #[error("type {0} is declared more than once")]
    DuplicateType(TypeKey),

    /// Base type never declared
    #[error("type {ty} extends undeclared type {base}")]
    UnknownBase {
        /// Derived type
        ty: TypeKey,
        /// Missing base type
        base: TypeKey,
    },

    /// Base chain loops back on itself
    #[error("inheritance cycle through type {0}")]
    InheritanceCycle(TypeKey),

    /// Field declared twice on the same type
    #[error("type {owner} declares field '{field}' more than once")]
    DuplicateField {
        /// Declaring type
        owner: TypeKey,
        /// Field name
        field: String,
    },
}

/// Result type for engine operations
pub type RefResult<T> = Result<T, RefError>;

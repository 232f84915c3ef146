//! sceneref Model
//!
//! Declaration vocabulary and value shapes for reference binding.
//!
//! # Overview
//!
//! - **TypeKey / TypeHierarchy**: type identities and the is-a relation
//! - **LocationStrategy / RefFlags / CollectionShape**: what a field declares
//! - **Reference**: attachment, standalone asset or node
//! - **InterfaceRef**: indirection for interface-typed references
//! - **FieldValue**: what a host stores in an annotated field
//!
//! # Example
//!
//! ```rust
//! use sceneref_model::{AttachmentId, AttachmentRef, InterfaceRef, NodeId, Reference};
//!
//! let health = Reference::from(AttachmentRef::new(AttachmentId::new(), NodeId::new(), "Health"));
//!
//! let mut wrapper = InterfaceRef::new("IDamageable");
//! assert!(wrapper.on_serialize(Some(health.clone())));
//! assert!(!wrapper.on_serialize(Some(health)));
//! assert!(wrapper.has_value());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod interface;
pub mod reference;
pub mod strategy;
pub mod types;
pub mod value;

// Re-exports
pub use error::DeclarationError;
pub use interface::InterfaceRef;
pub use reference::{AssetId, AssetRef, AttachmentId, AttachmentRef, NodeId, Reference};
pub use strategy::{CollectionShape, LocationStrategy, RefFlags};
pub use types::{TypeHierarchy, TypeInfo, TypeKey, TypeKind};
pub use value::{Element, FieldValue};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring and inspecting references
    pub use crate::{
        AttachmentRef, CollectionShape, Element, FieldValue, InterfaceRef, LocationStrategy,
        NodeId, RefFlags, Reference, TypeHierarchy, TypeKey,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

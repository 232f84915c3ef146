//! sceneref Engine
//!
//! Resolves and validates declared references between behaviors attached to
//! nodes of a host object graph.
//!
//! # Pipeline
//!
//! 1. **Scan**: [`DescriptorRegistry::scan`] lists a type's annotated fields
//! 2. **Resolve**: [`Resolver::update_ref`] finds what each field should hold
//!    and writes it back through the host when it changed
//! 3. **Validate**: [`Validator::validate_ref`] reports missing and misplaced
//!    references as [`Diagnostic`]s
//!
//! # Example
//!
//! ```rust,ignore
//! use sceneref_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = RegistryBuilder::new()
//!     .declare(TypeDecl::behavior("Rigidbody"))
//!     .declare(
//!         TypeDecl::behavior("Player")
//!             .field(FieldDecl::scalar("body", "Rigidbody", RefAttr::on_self())),
//!     )
//!     .build()?;
//!
//! let engine = RefEngine::with_defaults(Arc::new(registry));
//! let outcome = engine.validate_all(&mut scene)?;
//! assert!(outcome.is_success());
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod filter;
pub mod host;
pub mod registry;
pub mod resolver;
pub mod validator;

// Re-exports
pub use config::{EngineConfig, ExecutionMode};
pub use descriptor::{FieldDecl, FieldDescriptor, RefAttr};
pub use engine::RefEngine;
pub use error::{RefError, RefResult, RegistryError};
pub use filter::{PredicateFilter, RefFilter, TypeFilter};
pub use host::{FieldAccess, ObjectGraph, ReferenceHost};
pub use registry::{DescriptorRegistry, RegistryBuilder, TypeDecl};
pub use resolver::{check_declaration, Resolver};
pub use validator::{Diagnostic, DiagnosticKind, Severity, ValidationOutcome, Validator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring types and running the engine
    pub use crate::{
        DescriptorRegistry, Diagnostic, DiagnosticKind, EngineConfig, ExecutionMode, FieldAccess,
        FieldDecl, ObjectGraph, RefAttr, RefEngine, RefError, RegistryBuilder, TypeDecl,
        TypeFilter, ValidationOutcome,
    };
    pub use sceneref_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

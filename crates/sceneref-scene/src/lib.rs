//! sceneref Scene
//!
//! An in-memory host for the reference engine plus a manifest format for
//! describing types and scenes in YAML or JSON.
//!
//! # Example
//!
//! ```rust
//! use sceneref_engine::{EngineConfig, RefEngine};
//! use sceneref_scene::Manifest;
//! use std::sync::Arc;
//!
//! let manifest = Manifest::from_yaml_str(
//!     r#"
//! types:
//!   - name: Rigidbody
//!   - name: Mover
//!     fields:
//!       - { name: body, type: Rigidbody, strategy: self }
//! scene:
//!   - name: Crate
//!     attachments:
//!       - type: Mover
//!       - type: Rigidbody
//! "#,
//! )?;
//! let (registry, mut scene) = manifest.build()?;
//!
//! let engine = RefEngine::new(Arc::new(registry), EngineConfig::new());
//! let outcome = engine.validate_all(&mut scene)?;
//! assert!(outcome.is_success());
//! assert_eq!(scene.writes(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod manifest;
pub mod memory;

// Re-exports
pub use error::{ManifestError, SceneError};
pub use manifest::{AssetSpec, AttachmentSpec, FieldSpec, FilterSpec, Manifest, NodeSpec, RefSpec, TypeSpec};
pub use memory::MemoryScene;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

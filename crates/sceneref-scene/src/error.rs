//! Error types for the in-memory scene and manifest loader

use sceneref_engine::RegistryError;
use sceneref_model::{AttachmentId, DeclarationError, NodeId};
use std::path::PathBuf;

/// Errors editing a [`crate::MemoryScene`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// Node not in this scene
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Attachment not in this scene
    #[error("unknown attachment: {0}")]
    UnknownAttachment(AttachmentId),

    /// Reparenting would make a node its own ancestor
    #[error("cannot move node {node} beneath its own descendant {parent}")]
    WouldCycle {
        /// Node being moved
        node: NodeId,
        /// Requested parent
        parent: NodeId,
    },
}

/// Errors loading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Reading the manifest failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax or shape error
    #[error("invalid YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or shape error
    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither YAML nor JSON
    #[error("unsupported manifest format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Reference path names no node
    #[error("no node at path '{0}'")]
    UnknownPath(String),

    /// Node has no attachment of the named type
    #[error("node '{path}' has no {ty} attachment")]
    UnknownAttachment {
        /// Node path
        path: String,
        /// Requested type
        ty: String,
    },

    /// Asset name not declared
    #[error("unknown asset '@{0}'")]
    UnknownAsset(String),

    /// Assignment to a field the type does not declare
    #[error("{ty} declares no reference field '{field}'")]
    UnknownField {
        /// Attachment type
        ty: String,
        /// Field name
        field: String,
    },

    /// Several references assigned to a single-reference field
    #[error("{ty} field '{field}' holds a single reference but was given a list")]
    NotACollection {
        /// Attachment type
        ty: String,
        /// Field name
        field: String,
    },

    /// Declaration vocabulary error
    #[error("declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// Registry construction error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Scene construction error
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

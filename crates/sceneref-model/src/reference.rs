//! Graph identifiers and references
//!
//! [`Reference`] is the tagged value every annotated field ultimately points
//! at: a behavior attached to a node, a standalone asset, or a node itself.

use crate::types::TypeKey;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate new random identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique node identifier
    NodeId
);

uuid_id!(
    /// Unique identifier of a behavior instance attached to a node
    AttachmentId
);

uuid_id!(
    /// Unique identifier of a standalone asset
    AssetId
);

/// A behavior instance living on a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Attachment identity
    pub id: AttachmentId,

    /// Node the behavior is attached to
    pub node: NodeId,

    /// Concrete behavior type
    pub ty: TypeKey,
}

impl AttachmentRef {
    /// Create attachment reference
    #[inline]
    #[must_use]
    pub fn new(id: AttachmentId, node: NodeId, ty: impl Into<TypeKey>) -> Self {
        Self {
            id,
            node,
            ty: ty.into(),
        }
    }
}

impl Display for AttachmentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ty, self.node)
    }
}

/// A standalone value that is never attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset identity
    pub id: AssetId,

    /// Concrete asset type
    pub ty: TypeKey,

    /// Human-readable asset name
    pub name: String,
}

impl AssetRef {
    /// Create asset reference with a fresh identity
    #[must_use]
    pub fn new(ty: impl Into<TypeKey>, name: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(),
            ty: ty.into(),
            name: name.into(),
        }
    }
}

/// Anything an annotated field may point at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reference {
    /// Behavior attached to a node
    Attached(AttachmentRef),

    /// Standalone asset
    Standalone(AssetRef),

    /// A graph node itself
    Node {
        /// Referenced node
        node: NodeId,
    },
}

impl Reference {
    /// Reference a graph node
    #[inline]
    #[must_use]
    pub fn node(node: NodeId) -> Self {
        Self::Node { node }
    }

    /// Node this reference lives on, if it lives in the graph at all
    #[inline]
    #[must_use]
    pub fn owner_node(&self) -> Option<NodeId> {
        match self {
            Self::Attached(attachment) => Some(attachment.node),
            Self::Node { node } => Some(*node),
            Self::Standalone(_) => None,
        }
    }

    /// Concrete type of the referenced value
    ///
    /// Node references have no type key of their own.
    #[inline]
    #[must_use]
    pub fn concrete_type(&self) -> Option<&TypeKey> {
        match self {
            Self::Attached(attachment) => Some(&attachment.ty),
            Self::Standalone(asset) => Some(&asset.ty),
            Self::Node { .. } => None,
        }
    }

    /// Attachment behind this reference, if any
    #[inline]
    #[must_use]
    pub fn as_attachment(&self) -> Option<&AttachmentRef> {
        match self {
            Self::Attached(attachment) => Some(attachment),
            _ => None,
        }
    }
}

impl From<AttachmentRef> for Reference {
    fn from(attachment: AttachmentRef) -> Self {
        Self::Attached(attachment)
    }
}

impl From<AssetRef> for Reference {
    fn from(asset: AssetRef) -> Self {
        Self::Standalone(asset)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attached(attachment) => write!(f, "{attachment}"),
            Self::Standalone(asset) => write!(f, "{}({})", asset.ty, asset.name),
            Self::Node { node } => write!(f, "node {node}"),
        }
    }
}

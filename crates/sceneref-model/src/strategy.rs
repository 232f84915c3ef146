//! Location strategies, modifier flags and collection shapes
//!
//! The declaration vocabulary of an annotated field: *where* its reference
//! must be found ([`LocationStrategy`]), *how* resolution and validation are
//! relaxed ([`RefFlags`]) and *what* container holds it ([`CollectionShape`]).

use crate::error::DeclarationError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Rule for where a valid reference must be found relative to the owning node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStrategy {
    /// On the owning node itself
    #[serde(rename = "self")]
    OnSelf,

    /// On the owning node or one of its ancestors
    Parent,

    /// On the owning node or one of its descendants
    Child,

    /// Anywhere in the active graph
    Scene,

    /// Assigned manually; only presence is checked
    Anywhere,
}

impl LocationStrategy {
    /// All strategies, in declaration order
    pub const ALL: [Self; 5] = [
        Self::OnSelf,
        Self::Parent,
        Self::Child,
        Self::Scene,
        Self::Anywhere,
    ];

    /// Lowercase name used in manifests and messages
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnSelf => "self",
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Scene => "scene",
            Self::Anywhere => "anywhere",
        }
    }

    /// Whether resolution walks the graph for this strategy
    #[inline]
    #[must_use]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Anywhere)
    }
}

impl Display for LocationStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationStrategy {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == lowered)
            .ok_or_else(|| DeclarationError::UnknownStrategy(s.to_string()))
    }
}

bitflags! {
    /// Modifier flags of an annotated field
    ///
    /// `EDITABLE_ANYWHERE` carries the `EDITABLE` bit as well: a field that
    /// may point anywhere is by definition user-editable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RefFlags: u8 {
        /// Empty values pass validation
        const OPTIONAL = 1 << 0;

        /// The owning node is never a valid location
        const EXCLUDE_SELF = 1 << 1;

        /// Graph walks also visit inactive nodes
        const INCLUDE_INACTIVE = 1 << 2;

        /// A non-empty value is never overwritten by resolution
        const EDITABLE = 1 << 3;

        /// Like `EDITABLE`, and structural location checks are skipped
        const EDITABLE_ANYWHERE = (1 << 4) | Self::EDITABLE.bits();
    }
}

impl Default for RefFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl RefFlags {
    /// Snake-case names accepted by [`RefFlags::parse_name`]
    pub const NAMES: [(&'static str, Self); 5] = [
        ("optional", Self::OPTIONAL),
        ("exclude_self", Self::EXCLUDE_SELF),
        ("include_inactive", Self::INCLUDE_INACTIVE),
        ("editable", Self::EDITABLE),
        ("editable_anywhere", Self::EDITABLE_ANYWHERE),
    ];

    /// Parse a single flag from its snake-case name
    pub fn parse_name(name: &str) -> Result<Self, DeclarationError> {
        let lowered = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == lowered)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| DeclarationError::UnknownFlag(name.to_string()))
    }

    /// Parse and combine a list of flag names
    pub fn parse_names<I, S>(names: I) -> Result<Self, DeclarationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(Self::empty(), |acc, name| Ok(acc | Self::parse_name(name.as_ref())?))
    }
}

/// Container shape of an annotated field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionShape {
    /// Single reference
    #[default]
    Scalar,

    /// Fixed-size array of references
    Array,

    /// Growable list of references
    List,
}

impl CollectionShape {
    /// Whether the shape holds more than one reference
    #[inline]
    #[must_use]
    pub fn is_collection(self) -> bool {
        !matches!(self, Self::Scalar)
    }
}

impl FromStr for CollectionShape {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "array" => Ok(Self::Array),
            "list" => Ok(Self::List),
            _ => Err(DeclarationError::UnknownShape(s.to_string())),
        }
    }
}

//! Scene manifests
//!
//! A manifest declares types with their reference fields, standalone assets
//! and a node tree in one YAML or JSON document:
//!
//! ```yaml
//! types:
//!   - name: Rigidbody
//!   - name: Player
//!     fields:
//!       - { name: body, type: Rigidbody, strategy: self }
//! scene:
//!   - name: World
//!     children:
//!       - name: Player
//!         attachments:
//!           - type: Player
//!           - type: Rigidbody
//! ```
//!
//! Pre-assigned field values are written as `Path/To/Node#Type` (first
//! attachment of that exact type), `Path/To/Node` (the node itself) or
//! `@asset`.

use crate::error::ManifestError;
use crate::memory::MemoryScene;
use indexmap::IndexMap;
use sceneref_engine::{
    DescriptorRegistry, FieldDecl, FieldDescriptor, RefAttr, RegistryBuilder, TypeDecl, TypeFilter,
};
use sceneref_model::{
    AttachmentRef, CollectionShape, Element, FieldValue, InterfaceRef, LocationStrategy, NodeId,
    RefFlags, Reference, TypeKind,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whole manifest document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Type declarations, in order
    #[serde(default)]
    pub types: Vec<TypeSpec>,
    /// Standalone assets
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
    /// Root nodes
    #[serde(default)]
    pub scene: Vec<NodeSpec>,
}

/// Declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    /// Type name
    pub name: String,
    /// Type category
    #[serde(default)]
    pub kind: TypeKind,
    /// Base type
    #[serde(default)]
    pub extends: Option<String>,
    /// Implemented interfaces
    #[serde(default)]
    pub implements: Vec<String>,
    /// Reference fields declared at this level
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// Declared reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Element type
    #[serde(rename = "type")]
    pub ty: String,
    /// `scalar` (default), `array` or `list`
    #[serde(default)]
    pub shape: Option<String>,
    /// Elements are stored behind interface references
    #[serde(default)]
    pub interface: bool,
    /// `self`, `parent`, `child`, `scene` or `anywhere`
    pub strategy: String,
    /// Flag names
    #[serde(default)]
    pub flags: Vec<String>,
    /// Candidate filter
    #[serde(default)]
    pub filter: Option<FilterSpec>,
}

/// Type filter on a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSpec {
    /// Accept only this type
    Only(String),
    /// Reject this type
    Except(String),
}

/// Standalone asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
    /// Asset name, referenced as `@name`
    pub name: String,
    /// Asset type
    #[serde(rename = "type")]
    pub ty: String,
}

/// Node and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// Node name
    pub name: String,
    /// Own active flag
    #[serde(default = "default_active")]
    pub active: bool,
    /// Uninstantiated template
    #[serde(default)]
    pub template: bool,
    /// Attached behaviors
    #[serde(default)]
    pub attachments: Vec<AttachmentSpec>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_active() -> bool {
    true
}

/// Attached behavior with optional pre-assigned fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentSpec {
    /// Behavior type
    #[serde(rename = "type")]
    pub ty: String,
    /// Field assignments
    #[serde(default)]
    pub fields: IndexMap<String, RefSpec>,
}

/// Pre-assigned field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefSpec {
    /// Single reference
    One(String),
    /// Collection; `null` entries are empty slots
    Many(Vec<Option<String>>),
}

struct Pending<'a> {
    instance: AttachmentRef,
    field: &'a str,
    value: &'a RefSpec,
}

impl Manifest {
    /// Parse YAML manifest
    ///
    /// # Errors
    /// Returns error on invalid YAML or unknown keys
    pub fn from_yaml_str(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse JSON manifest
    ///
    /// # Errors
    /// Returns error on invalid JSON or unknown keys
    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a manifest file, picking the format by extension
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(ManifestError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Read a manifest file and build its registry and scene
    ///
    /// # Errors
    /// See [`Manifest::read`] and [`Manifest::build`]
    pub fn load(path: impl AsRef<Path>) -> Result<(DescriptorRegistry, MemoryScene), ManifestError> {
        let path = path.as_ref();
        let (registry, scene) = Self::read(path)?.build()?;
        tracing::debug!(
            "Loaded {}: {} types, {} nodes, {} attachments",
            path.display(),
            registry.len(),
            scene.node_count(),
            scene.attachment_count()
        );
        Ok((registry, scene))
    }

    /// Build the descriptor registry
    ///
    /// # Errors
    /// Returns error on unknown declaration vocabulary or an invalid type graph
    pub fn registry(&self) -> Result<DescriptorRegistry, ManifestError> {
        let mut builder = RegistryBuilder::new();
        for spec in &self.types {
            builder.push(spec.to_decl()?);
        }
        Ok(builder.build()?)
    }

    /// Build the registry and the scene it describes
    ///
    /// # Errors
    /// Returns error on an invalid registry or an unresolvable assignment
    pub fn build(&self) -> Result<(DescriptorRegistry, MemoryScene), ManifestError> {
        let registry = self.registry()?;
        let mut scene = MemoryScene::new();

        for asset in &self.assets {
            scene.add_asset(asset.ty.as_str(), asset.name.as_str());
        }

        let mut pending = Vec::new();
        for root in &self.scene {
            place(&mut scene, None, root, &mut pending)?;
        }

        // Assignments may point anywhere in the tree, so they wait until it is complete
        for assignment in pending {
            assign(&registry, &mut scene, &assignment)?;
        }
        Ok((registry, scene))
    }
}

impl TypeSpec {
    /// Convert into a registry declaration
    ///
    /// # Errors
    /// Returns error on unknown strategy, flag or shape names
    pub fn to_decl(&self) -> Result<TypeDecl, ManifestError> {
        let mut decl = TypeDecl::new(self.name.as_str(), self.kind);
        if let Some(base) = &self.extends {
            decl = decl.extends(base.as_str());
        }
        for interface in &self.implements {
            decl = decl.implements(interface.as_str());
        }
        for field in &self.fields {
            decl = decl.field(field.to_decl()?);
        }
        Ok(decl)
    }
}

impl FieldSpec {
    /// Convert into a field declaration
    ///
    /// # Errors
    /// Returns error on unknown strategy, flag or shape names
    pub fn to_decl(&self) -> Result<FieldDecl, ManifestError> {
        let strategy: LocationStrategy = self.strategy.parse()?;
        let shape: CollectionShape = match &self.shape {
            Some(shape) => shape.parse()?,
            None => CollectionShape::Scalar,
        };
        let flags = RefFlags::parse_names(&self.flags)?;

        let attr = RefAttr::new(strategy).with_flags(flags);
        let attr = match &self.filter {
            Some(FilterSpec::Only(ty)) => attr.with_filter(TypeFilter::only(ty.as_str())),
            Some(FilterSpec::Except(ty)) => attr.with_filter(TypeFilter::except(ty.as_str())),
            None => attr,
        };

        let decl = FieldDecl::new(self.name.as_str(), self.ty.as_str(), shape, attr);
        Ok(if self.interface { decl.indirect() } else { decl })
    }
}

fn place<'a>(
    scene: &mut MemoryScene,
    parent: Option<NodeId>,
    spec: &'a NodeSpec,
    pending: &mut Vec<Pending<'a>>,
) -> Result<(), ManifestError> {
    let node = match parent {
        Some(parent) => scene.add_child(parent, spec.name.as_str())?,
        None => scene.add_root(spec.name.as_str()),
    };
    scene.set_active(node, spec.active)?;
    if spec.template {
        scene.mark_template(node)?;
    }

    for attachment in &spec.attachments {
        let instance = scene.attach(node, attachment.ty.as_str())?;
        pending.extend(attachment.fields.iter().map(|(field, value)| Pending {
            instance: instance.clone(),
            field: field.as_str(),
            value,
        }));
    }

    for child in &spec.children {
        place(scene, Some(node), child, pending)?;
    }
    Ok(())
}

fn assign(
    registry: &DescriptorRegistry,
    scene: &mut MemoryScene,
    assignment: &Pending<'_>,
) -> Result<(), ManifestError> {
    let instance = &assignment.instance;
    let fields = registry.scan(&instance.ty);
    let field = fields
        .iter()
        .find(|f| f.name() == assignment.field)
        .ok_or_else(|| ManifestError::UnknownField {
            ty: instance.ty.to_string(),
            field: assignment.field.to_string(),
        })?;

    let value = match (assignment.value, field.is_collection()) {
        (RefSpec::One(text), false) => scalar_value(field, parse_ref(scene, text)?),
        (RefSpec::One(text), true) => collection_value(field, vec![Some(parse_ref(scene, text)?)]),
        (RefSpec::Many(slots), true) => {
            let references = slots
                .iter()
                .map(|slot| slot.as_deref().map(|text| parse_ref(scene, text)).transpose())
                .collect::<Result<Vec<_>, _>>()?;
            collection_value(field, references)
        }
        (RefSpec::Many(_), false) => {
            return Err(ManifestError::NotACollection {
                ty: instance.ty.to_string(),
                field: assignment.field.to_string(),
            })
        }
    };

    scene.assign(instance, assignment.field, value)?;
    Ok(())
}

/// Parse `Path#Type`, `Path` or `@asset`
fn parse_ref(scene: &MemoryScene, text: &str) -> Result<Reference, ManifestError> {
    if let Some(name) = text.strip_prefix('@') {
        return scene
            .asset(name)
            .cloned()
            .map(Reference::Standalone)
            .ok_or_else(|| ManifestError::UnknownAsset(name.to_string()));
    }

    let (path, ty) = match text.split_once('#') {
        Some((path, ty)) => (path, Some(ty)),
        None => (text, None),
    };
    let node = scene
        .node_by_path(path)
        .ok_or_else(|| ManifestError::UnknownPath(path.to_string()))?;

    match ty {
        None => Ok(Reference::node(node)),
        Some(ty) => scene
            .attachment_of(node, ty)
            .map(Reference::Attached)
            .ok_or_else(|| ManifestError::UnknownAttachment {
                path: path.to_string(),
                ty: ty.to_string(),
            }),
    }
}

fn scalar_value(field: &FieldDescriptor, reference: Reference) -> FieldValue {
    if field.is_indirect() {
        FieldValue::Interface(InterfaceRef::assigned(field.element_type().clone(), reference))
    } else {
        FieldValue::Ref(reference)
    }
}

fn collection_value(field: &FieldDescriptor, references: Vec<Option<Reference>>) -> FieldValue {
    let elements = references.into_iter().map(|slot| {
        if field.is_indirect() {
            let mut wrapper = InterfaceRef::new(field.element_type().clone());
            wrapper.on_serialize(slot);
            Element::Interface(wrapper)
        } else {
            Element::Direct(slot)
        }
    });
    match field.shape() {
        CollectionShape::List => FieldValue::list(elements),
        CollectionShape::Scalar | CollectionShape::Array => FieldValue::array(elements),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sceneref_engine::ObjectGraph;
    use sceneref_model::DeclarationError;
    use std::io::Write;

    const MANIFEST: &str = r#"
types:
  - name: IDamageable
    kind: interface
  - name: Health
    implements: [IDamageable]
  - name: Palette
    kind: asset
  - name: Turret
    fields:
      - { name: targets, type: IDamageable, shape: list, interface: true, strategy: scene }
      - { name: palette, type: Palette, strategy: anywhere, flags: [optional] }
      - { name: owner, type: Health, strategy: parent, flags: [exclude_self] }
assets:
  - { name: warm, type: Palette }
scene:
  - name: World
    attachments:
      - type: Health
    children:
      - name: Tower
        active: false
        attachments:
          - type: Turret
            fields:
              palette: "@warm"
              targets: ["World#Health", null]
              owner: "World#Health"
      - name: Blueprint
        template: true
"#;

    #[test]
    fn yaml_manifest_builds_registry_and_scene() {
        let (registry, scene) = Manifest::from_yaml_str(MANIFEST).unwrap().build().unwrap();

        let names: Vec<String> = registry
            .scan(&"Turret".into())
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["targets", "palette", "owner"]);

        let tower = scene.node_by_path("World/Tower").unwrap();
        assert!(!scene.is_active_self(tower));
        assert!(scene.is_template(scene.node_by_path("World/Blueprint").unwrap()));
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn pre_assigned_references_are_wrapped_per_declaration() {
        let (_, scene) = Manifest::from_yaml_str(MANIFEST).unwrap().build().unwrap();
        let world = scene.node_by_path("World").unwrap();
        let tower = scene.node_by_path("World/Tower").unwrap();
        let health = scene.attachment_of(world, "Health").unwrap();
        let turret = scene.attachment_of(tower, "Turret").unwrap();

        let targets = scene.field(&turret, "targets");
        assert!(matches!(targets, FieldValue::List(_)));
        assert_eq!(targets.references(), vec![Some(&Reference::Attached(health.clone())), None]);
        assert!(targets.elements().unwrap().iter().all(Element::is_indirect));

        assert_eq!(scene.field(&turret, "owner"), FieldValue::Ref(health.into()));
        assert!(matches!(
            scene.field(&turret, "palette"),
            FieldValue::Ref(Reference::Standalone(ref asset)) if asset.name == "warm"
        ));
        assert_eq!(scene.writes(), 0);
    }

    #[test]
    fn unknown_strategy_is_a_declaration_error() {
        let text = "types:\n  - name: A\n    fields:\n      - { name: b, type: B, strategy: sibling }\n";
        let err = Manifest::from_yaml_str(text).unwrap().registry().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Declaration(DeclarationError::UnknownStrategy(ref s)) if s == "sibling"
        ));
    }

    #[test]
    fn unknown_path_is_reported() {
        let text = r#"
types:
  - name: Follower
    fields:
      - { name: leader, type: Leader, strategy: anywhere }
scene:
  - name: World
    attachments:
      - type: Follower
        fields:
          leader: "World/Nowhere#Leader"
"#;
        let err = Manifest::from_yaml_str(text).unwrap().build().unwrap_err();
        assert!(matches!(err, ManifestError::UnknownPath(ref p) if p == "World/Nowhere"));
    }

    #[test]
    fn list_for_scalar_field_is_rejected() {
        let text = r#"
types:
  - name: Follower
    fields:
      - { name: leader, type: Follower, strategy: anywhere }
scene:
  - name: World
    attachments:
      - type: Follower
        fields:
          leader: ["World#Follower"]
"#;
        let err = Manifest::from_yaml_str(text).unwrap().build().unwrap_err();
        assert!(matches!(err, ManifestError::NotACollection { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Manifest::from_yaml_str("types: []\nnodes: []\n").is_err());
    }

    #[test]
    fn json_files_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"types": [{{"name": "Rigidbody"}}], "scene": [{{"name": "World", "attachments": [{{"type": "Rigidbody"}}]}}]}}"#
        )
        .unwrap();

        let (registry, scene) = Manifest::load(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(scene.attachment_count(), 1);
    }

    #[test]
    fn other_extensions_are_unsupported() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = Manifest::read(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedFormat(_)));
    }
}

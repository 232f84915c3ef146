//! In-memory scene host
//!
//! [`MemoryScene`] owns an ordered node tree, the behaviors attached to each
//! node and the values of their annotated fields. It implements both host
//! traits so the engine can run against it directly.

use crate::error::SceneError;
use indexmap::{IndexMap, IndexSet};
use sceneref_engine::{FieldAccess, FieldDescriptor, ObjectGraph};
use sceneref_model::{AssetRef, AttachmentId, AttachmentRef, FieldValue, NodeId, TypeKey};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct NodeEntry {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attachments: Vec<AttachmentId>,
    active: bool,
    template: bool,
}

impl NodeEntry {
    fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            attachments: Vec::new(),
            active: true,
            template: false,
        }
    }
}

#[derive(Debug, Clone)]
struct AttachmentEntry {
    reference: AttachmentRef,
    fields: HashMap<String, FieldValue>,
}

/// Ordered in-memory node tree with field storage
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: IndexMap<NodeId, NodeEntry>,
    roots: Vec<NodeId>,
    attachments: IndexMap<AttachmentId, AttachmentEntry>,
    assets: IndexMap<String, AssetRef>,
    writes: usize,
    dirty: IndexSet<AttachmentId>,
}

impl MemoryScene {
    /// Create empty scene
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, NodeEntry::new(name, None));
        self.roots.push(id);
        id
    }

    /// Add a child node beneath `parent`
    ///
    /// # Errors
    /// Returns error if `parent` is not in this scene
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        self.entry_mut(parent)?.children.push(id);
        self.nodes.insert(id, NodeEntry::new(name, Some(parent)));
        Ok(id)
    }

    /// Attach a behavior of type `ty` to `node`
    ///
    /// # Errors
    /// Returns error if `node` is not in this scene
    pub fn attach(&mut self, node: NodeId, ty: impl Into<TypeKey>) -> Result<AttachmentRef, SceneError> {
        let reference = AttachmentRef::new(AttachmentId::new(), node, ty);
        self.entry_mut(node)?.attachments.push(reference.id);
        self.attachments.insert(
            reference.id,
            AttachmentEntry {
                reference: reference.clone(),
                fields: HashMap::new(),
            },
        );
        Ok(reference)
    }

    /// Remove a behavior and its field values
    ///
    /// # Errors
    /// Returns error if the attachment is not in this scene
    pub fn detach(&mut self, attachment: &AttachmentRef) -> Result<(), SceneError> {
        let entry = self
            .attachments
            .shift_remove(&attachment.id)
            .ok_or(SceneError::UnknownAttachment(attachment.id))?;
        if let Some(node) = self.nodes.get_mut(&entry.reference.node) {
            node.attachments.retain(|id| *id != attachment.id);
        }
        self.dirty.shift_remove(&attachment.id);
        Ok(())
    }

    /// Register a standalone asset under `name`
    pub fn add_asset(&mut self, ty: impl Into<TypeKey>, name: impl Into<String>) -> AssetRef {
        let asset = AssetRef::new(ty, name);
        self.assets.insert(asset.name.clone(), asset.clone());
        asset
    }

    /// Asset registered under `name`
    #[must_use]
    pub fn asset(&self, name: &str) -> Option<&AssetRef> {
        self.assets.get(name)
    }

    /// Set a node's own active flag
    ///
    /// # Errors
    /// Returns error if `node` is not in this scene
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), SceneError> {
        self.entry_mut(node)?.active = active;
        Ok(())
    }

    /// Mark a node, and so its whole subtree, as an uninstantiated template
    ///
    /// # Errors
    /// Returns error if `node` is not in this scene
    pub fn mark_template(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.entry_mut(node)?.template = true;
        Ok(())
    }

    /// Store a field value without counting it as an engine write
    ///
    /// # Errors
    /// Returns error if the attachment is not in this scene
    pub fn assign(
        &mut self,
        instance: &AttachmentRef,
        field: impl Into<String>,
        value: FieldValue,
    ) -> Result<(), SceneError> {
        let entry = self
            .attachments
            .get_mut(&instance.id)
            .ok_or(SceneError::UnknownAttachment(instance.id))?;
        entry.fields.insert(field.into(), value);
        Ok(())
    }

    /// Move `node` beneath `parent`, or to the root list when `None`
    ///
    /// # Errors
    /// Returns error if either node is unknown or `parent` lies beneath `node`
    pub fn reparent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        self.entry(node)?;
        if let Some(parent) = parent {
            self.entry(parent)?;
            if self.is_descendant_of(parent, node) {
                return Err(SceneError::WouldCycle { node, parent });
            }
        }

        let previous = self.entry(node)?.parent;
        match previous {
            Some(old) => self.entry_mut(old)?.children.retain(|c| *c != node),
            None => self.roots.retain(|r| *r != node),
        }
        match parent {
            Some(new) => self.entry_mut(new)?.children.push(node),
            None => self.roots.push(node),
        }
        self.entry_mut(node)?.parent = parent;
        Ok(())
    }

    /// Stored value of a field by name
    #[must_use]
    pub fn field(&self, instance: &AttachmentRef, name: &str) -> FieldValue {
        self.attachments
            .get(&instance.id)
            .and_then(|entry| entry.fields.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Node name
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|entry| entry.name.as_str())
    }

    /// Slash-separated path from the root, e.g. `World/Player`
    #[must_use]
    pub fn path_of(&self, node: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            let entry = self.nodes.get(&n)?;
            names.push(entry.name.as_str());
            current = entry.parent;
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Node at a slash-separated path; the first match wins among same-named siblings
    #[must_use]
    pub fn node_by_path(&self, path: &str) -> Option<NodeId> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self.find_named(&self.roots, first)?;
        for segment in segments {
            current = self.find_named(&self.nodes.get(&current)?.children, segment)?;
        }
        Some(current)
    }

    fn find_named(&self, candidates: &[NodeId], name: &str) -> Option<NodeId> {
        candidates
            .iter()
            .copied()
            .find(|id| self.nodes.get(id).is_some_and(|entry| entry.name == name))
    }

    /// First attachment on `node` whose type is exactly `ty`
    #[must_use]
    pub fn attachment_of(&self, node: NodeId, ty: &str) -> Option<AttachmentRef> {
        self.attachments(node)
            .into_iter()
            .find(|attachment| attachment.ty.name() == ty)
    }

    /// Every attachment in insertion order
    pub fn all_attachments(&self) -> impl Iterator<Item = &AttachmentRef> {
        self.attachments.values().map(|entry| &entry.reference)
    }

    /// Field writes performed through [`FieldAccess::set`]
    #[inline]
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Attachments written since the last [`take_dirty`](Self::take_dirty)
    #[must_use]
    pub fn dirty(&self) -> Vec<AttachmentId> {
        self.dirty.iter().copied().collect()
    }

    /// Drain the dirty set
    pub fn take_dirty(&mut self) -> Vec<AttachmentId> {
        self.dirty.drain(..).collect()
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of attachments
    #[inline]
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    fn entry(&self, node: NodeId) -> Result<&NodeEntry, SceneError> {
        self.nodes.get(&node).ok_or(SceneError::UnknownNode(node))
    }

    fn entry_mut(&mut self, node: NodeId) -> Result<&mut NodeEntry, SceneError> {
        self.nodes.get_mut(&node).ok_or(SceneError::UnknownNode(node))
    }
}

impl ObjectGraph for MemoryScene {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn attachments(&self, node: NodeId) -> Vec<AttachmentRef> {
        self.nodes
            .get(&node)
            .map(|entry| {
                entry
                    .attachments
                    .iter()
                    .filter_map(|id| self.attachments.get(id))
                    .map(|attachment| attachment.reference.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_active_self(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|entry| entry.active)
    }

    fn is_template(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            match self.nodes.get(&n) {
                Some(entry) if entry.template => return true,
                Some(entry) => current = entry.parent,
                None => return false,
            }
        }
        false
    }
}

impl FieldAccess for MemoryScene {
    fn get(&self, instance: &AttachmentRef, field: &FieldDescriptor) -> FieldValue {
        self.field(instance, field.name())
    }

    fn set(&mut self, instance: &AttachmentRef, field: &FieldDescriptor, value: FieldValue) {
        let Some(entry) = self.attachments.get_mut(&instance.id) else {
            tracing::warn!("Dropping write to '{}' on detached {}", field.name(), instance);
            return;
        };
        entry.fields.insert(field.name().to_string(), value);
        self.writes += 1;
        self.dirty.insert(instance.id);
    }
}

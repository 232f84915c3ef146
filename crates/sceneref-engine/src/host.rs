//! Host collaborators
//!
//! The engine never owns the object graph. A host exposes its hierarchy
//! through [`ObjectGraph`] and its field storage through [`FieldAccess`];
//! anything implementing both is a [`ReferenceHost`].

use crate::descriptor::FieldDescriptor;
use sceneref_model::{AttachmentRef, FieldValue, NodeId};

/// Read-only view of a node hierarchy
pub trait ObjectGraph {
    /// Parent of a node, `None` for roots
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Immediate children, in order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Root nodes, in order
    fn roots(&self) -> Vec<NodeId>;

    /// Behaviors attached to a node, in attach order
    fn attachments(&self, node: NodeId) -> Vec<AttachmentRef>;

    /// Whether the node itself is flagged active
    fn is_active_self(&self, node: NodeId) -> bool;

    /// Whether the node belongs to a template that is not placed in a live graph
    fn is_template(&self, node: NodeId) -> bool;

    /// Whether the node and all of its ancestors are active
    fn is_active_in_hierarchy(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if !self.is_active_self(n) {
                return false;
            }
            current = self.parent(n);
        }
        true
    }

    /// The node followed by its ancestors, nearest first
    ///
    /// Without `include_inactive`, nodes inactive in the hierarchy are skipped.
    fn ancestors_of(&self, node: NodeId, include_inactive: bool) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            chain.push(n);
            current = self.parent(n);
        }
        if !include_inactive {
            chain.retain(|n| self.is_active_in_hierarchy(*n));
        }
        chain
    }

    /// The node and its descendants, pre-order
    ///
    /// Without `include_inactive`, inactive subtrees are skipped entirely.
    fn descendants_of(&self, node: NodeId, include_inactive: bool) -> Vec<NodeId> {
        if !include_inactive && !self.is_active_in_hierarchy(node) {
            return Vec::new();
        }

        let mut visited = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            visited.push(n);
            let children = self.children(n);
            stack.extend(
                children
                    .into_iter()
                    .rev()
                    .filter(|child| include_inactive || self.is_active_self(*child)),
            );
        }
        visited
    }

    /// Every behavior in the live graph, roots in order and pre-order within each
    ///
    /// Template nodes are not part of the live graph and are skipped.
    fn all_instances(&self, include_inactive: bool) -> Vec<AttachmentRef> {
        self.roots()
            .into_iter()
            .flat_map(|root| self.descendants_of(root, include_inactive))
            .filter(|node| !self.is_template(*node))
            .flat_map(|node| self.attachments(node))
            .collect()
    }

    /// Whether `node` is `ancestor` or lies beneath it
    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// Read and write access to annotated fields
pub trait FieldAccess {
    /// Current value of a field on an instance
    fn get(&self, instance: &AttachmentRef, field: &FieldDescriptor) -> FieldValue;

    /// Store a new value and mark the instance dirty
    fn set(&mut self, instance: &AttachmentRef, field: &FieldDescriptor, value: FieldValue);
}

/// A host the engine can resolve and validate against
pub trait ReferenceHost: ObjectGraph + FieldAccess {}

impl<T: ObjectGraph + FieldAccess + ?Sized> ReferenceHost for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneref_model::AttachmentId;
    use std::collections::HashMap;

    /// Minimal tree: root -> (a -> a1, b)
    #[derive(Default)]
    struct Tree {
        parents: HashMap<NodeId, NodeId>,
        children: HashMap<NodeId, Vec<NodeId>>,
        roots: Vec<NodeId>,
        inactive: Vec<NodeId>,
        attached: HashMap<NodeId, Vec<AttachmentRef>>,
    }

    impl Tree {
        fn link(&mut self, parent: NodeId, child: NodeId) {
            self.parents.insert(child, parent);
            self.children.entry(parent).or_default().push(child);
        }
    }

    impl ObjectGraph for Tree {
        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.parents.get(&node).copied()
        }
        fn children(&self, node: NodeId) -> Vec<NodeId> {
            self.children.get(&node).cloned().unwrap_or_default()
        }
        fn roots(&self) -> Vec<NodeId> {
            self.roots.clone()
        }
        fn attachments(&self, node: NodeId) -> Vec<AttachmentRef> {
            self.attached.get(&node).cloned().unwrap_or_default()
        }
        fn is_active_self(&self, node: NodeId) -> bool {
            !self.inactive.contains(&node)
        }
        fn is_template(&self, _node: NodeId) -> bool {
            false
        }
    }

    fn tree() -> (Tree, [NodeId; 4]) {
        let ids = [NodeId::new(), NodeId::new(), NodeId::new(), NodeId::new()];
        let [root, a, a1, b] = ids;
        let mut tree = Tree::default();
        tree.roots.push(root);
        tree.link(root, a);
        tree.link(a, a1);
        tree.link(root, b);
        (tree, ids)
    }

    #[test]
    fn descendants_are_pre_order() {
        let (tree, [root, a, a1, b]) = tree();
        assert_eq!(tree.descendants_of(root, false), vec![root, a, a1, b]);
    }

    #[test]
    fn ancestors_start_at_node() {
        let (tree, [root, a, a1, _]) = tree();
        assert_eq!(tree.ancestors_of(a1, false), vec![a1, a, root]);
    }

    #[test]
    fn inactive_subtrees_are_skipped() {
        let (mut tree, [root, a, a1, b]) = tree();
        tree.inactive.push(a);

        assert!(!tree.is_active_in_hierarchy(a1));
        assert_eq!(tree.descendants_of(root, false), vec![root, b]);
        assert_eq!(tree.descendants_of(root, true), vec![root, a, a1, b]);
        assert_eq!(tree.ancestors_of(a1, false), vec![root]);
        assert_eq!(tree.ancestors_of(a1, true), vec![a1, a, root]);
    }

    #[test]
    fn descendant_check_is_inclusive() {
        let (tree, [root, a, a1, b]) = tree();
        assert!(tree.is_descendant_of(a1, root));
        assert!(tree.is_descendant_of(a, a));
        assert!(!tree.is_descendant_of(b, a));
        assert!(!tree.is_descendant_of(root, a1));
    }

    #[test]
    fn all_instances_walks_every_root() {
        let (mut tree, [root, _, a1, _]) = tree();
        let body = AttachmentRef::new(AttachmentId::new(), a1, "Rigidbody");
        let camera = AttachmentRef::new(AttachmentId::new(), root, "Camera");
        tree.attached.insert(a1, vec![body.clone()]);
        tree.attached.insert(root, vec![camera.clone()]);

        assert_eq!(tree.all_instances(false), vec![camera, body]);
    }
}

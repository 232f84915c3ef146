//! Reference resolution
//!
//! [`Resolver::update_ref`] computes the value a field should hold given its
//! declaration and the current graph, and commits it through the host only
//! when it differs from what the field already holds.

use crate::descriptor::FieldDescriptor;
use crate::error::{RefError, RefResult};
use crate::host::{ObjectGraph, ReferenceHost};
use crate::registry::DescriptorRegistry;
use sceneref_model::{
    AttachmentRef, CollectionShape, Element, FieldValue, InterfaceRef, LocationStrategy, NodeId,
    RefFlags, Reference, TypeHierarchy, TypeKey, TypeKind,
};

/// Check that a field's declaration and stored value are usable at all
///
/// # Errors
/// [`RefError::BareInterface`] if an interface-typed field is not indirected,
/// [`RefError::ShapeMismatch`] if the stored value has the wrong category
pub fn check_declaration(
    field: &FieldDescriptor,
    value: &FieldValue,
    types: &TypeHierarchy,
) -> RefResult<()> {
    if !field.is_indirect() && types.kind_of(field.element_type()) == TypeKind::Interface {
        return Err(RefError::BareInterface {
            owner: field.owner().clone(),
            field: field.name().to_string(),
            interface: field.element_type().clone(),
        });
    }

    if !value.fits(field.shape(), field.is_indirect()) {
        return Err(RefError::ShapeMismatch {
            owner: field.owner().clone(),
            field: field.name().to_string(),
            expected: shape_label(field),
            found: value.kind_label(),
        });
    }
    Ok(())
}

fn shape_label(field: &FieldDescriptor) -> String {
    let element = if field.is_indirect() {
        format!("interface reference to {}", field.element_type())
    } else {
        field.element_type().to_string()
    };
    match field.shape() {
        CollectionShape::Scalar => element,
        CollectionShape::Array => format!("array of {element}"),
        CollectionShape::List => format!("list of {element}"),
    }
}

/// Computes and commits resolved field values
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a DescriptorRegistry,
}

impl<'a> Resolver<'a> {
    /// Create resolver over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: &'a DescriptorRegistry) -> Self {
        Self { registry }
    }

    #[inline]
    fn types(&self) -> &'a TypeHierarchy {
        self.registry.types()
    }

    /// Resolve one field of one instance
    ///
    /// Returns the value the field holds afterwards. When resolution finds
    /// nothing, or finds exactly what is stored, `existing` comes back
    /// untouched and the host is not written.
    ///
    /// # Errors
    /// See [`check_declaration`]
    pub fn update_ref<H: ReferenceHost + ?Sized>(
        &self,
        host: &mut H,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        existing: FieldValue,
    ) -> RefResult<FieldValue> {
        check_declaration(field, &existing, self.types())?;

        if field.has_flags(RefFlags::EDITABLE) && holds_reference(field, &existing) {
            return Ok(existing);
        }

        if field.is_collection() {
            Ok(self.update_collection(host, instance, field, existing))
        } else {
            Ok(self.update_scalar(host, instance, field, existing))
        }
    }

    fn update_scalar<H: ReferenceHost + ?Sized>(
        &self,
        host: &mut H,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        existing: FieldValue,
    ) -> FieldValue {
        let element = field.element_type();
        let current = existing.scalar();

        let found = match field.strategy() {
            LocationStrategy::Anywhere => current.map(|r| self.coerce(&*host, r, element)),
            _ => self.locate(&*host, instance, field, true).into_iter().next(),
        };
        let Some(candidate) = found else {
            return existing;
        };

        if let Some(filter) = field.filter() {
            if !filter.include(&candidate, self.types()) {
                return Self::reject(host, instance, field, existing);
            }
        }

        if field.is_indirect() {
            let mut wrapper = match &existing {
                FieldValue::Interface(wrapper) => wrapper.clone(),
                _ => InterfaceRef::new(element.clone()),
            };
            if !wrapper.on_serialize(Some(candidate)) {
                return existing;
            }
            Self::commit(host, instance, field, FieldValue::Interface(wrapper))
        } else {
            if current == Some(&candidate) {
                return existing;
            }
            Self::commit(host, instance, field, FieldValue::Ref(candidate))
        }
    }

    fn update_collection<H: ReferenceHost + ?Sized>(
        &self,
        host: &mut H,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        existing: FieldValue,
    ) -> FieldValue {
        let element = field.element_type();
        let current: Vec<Option<Reference>> = existing
            .references()
            .into_iter()
            .map(|slot| slot.cloned())
            .collect();

        let mut found: Vec<Option<Reference>> = match field.strategy() {
            LocationStrategy::Anywhere => current
                .iter()
                .map(|slot| slot.as_ref().map(|r| self.coerce(&*host, r, element)))
                .collect(),
            _ => self
                .locate(&*host, instance, field, false)
                .into_iter()
                .map(Some)
                .collect(),
        };
        if found.is_empty() {
            return existing;
        }

        if let Some(filter) = field.filter() {
            let types = self.types();
            found.retain(|slot| slot.as_ref().map_or(true, |r| filter.include(r, types)));
        }

        if found == current {
            return existing;
        }

        let elements = found.into_iter().map(|slot| {
            if field.is_indirect() {
                Element::Interface(match slot {
                    Some(reference) => InterfaceRef::assigned(element.clone(), reference),
                    None => InterfaceRef::new(element.clone()),
                })
            } else {
                Element::Direct(slot)
            }
        });
        let value = match field.shape() {
            CollectionShape::List => FieldValue::list(elements),
            CollectionShape::Scalar | CollectionShape::Array => FieldValue::array(elements),
        };
        Self::commit(host, instance, field, value)
    }

    /// Candidates for a graph-walking strategy, in walk order
    fn locate<G: ObjectGraph + ?Sized>(
        &self,
        graph: &G,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        first_only: bool,
    ) -> Vec<Reference> {
        let include_inactive = field.has_flags(RefFlags::INCLUDE_INACTIVE);
        let exclude_self = field.has_flags(RefFlags::EXCLUDE_SELF);

        let nodes: Vec<NodeId> = match field.strategy() {
            LocationStrategy::OnSelf => vec![instance.node],
            LocationStrategy::Parent => {
                let start = if exclude_self {
                    graph.parent(instance.node)
                } else {
                    Some(instance.node)
                };
                start
                    .map(|node| graph.ancestors_of(node, include_inactive))
                    .unwrap_or_default()
            }
            LocationStrategy::Child => {
                if exclude_self {
                    graph
                        .children(instance.node)
                        .into_iter()
                        .flat_map(|child| graph.descendants_of(child, include_inactive))
                        .collect()
                } else {
                    graph.descendants_of(instance.node, include_inactive)
                }
            }
            LocationStrategy::Scene => {
                let everywhere = graph.all_instances(include_inactive);
                return self.matching(everywhere, field.element_type(), first_only);
            }
            LocationStrategy::Anywhere => Vec::new(),
        };

        let attachments = nodes.into_iter().flat_map(|node| graph.attachments(node));
        self.matching(attachments, field.element_type(), first_only)
    }

    fn matching(
        &self,
        attachments: impl IntoIterator<Item = AttachmentRef>,
        element: &TypeKey,
        first_only: bool,
    ) -> Vec<Reference> {
        let types = self.types();
        let matches = attachments
            .into_iter()
            .filter(|attachment| types.is_a(&attachment.ty, element))
            .map(Reference::Attached);
        if first_only {
            matches.take(1).collect()
        } else {
            matches.collect()
        }
    }

    /// Swap a mistyped graph reference for the first matching sibling attachment
    ///
    /// References that already match, standalone assets, and references with
    /// no matching sibling are kept as they are.
    fn coerce<G: ObjectGraph + ?Sized>(
        &self,
        graph: &G,
        existing: &Reference,
        element: &TypeKey,
    ) -> Reference {
        let types = self.types();
        let node = match existing {
            Reference::Attached(attachment) if !types.is_a(&attachment.ty, element) => {
                attachment.node
            }
            Reference::Node { node } if types.kind_of(element) != TypeKind::Node => *node,
            _ => return existing.clone(),
        };

        graph
            .attachments(node)
            .into_iter()
            .find(|attachment| types.is_a(&attachment.ty, element))
            .map_or_else(|| existing.clone(), Reference::Attached)
    }

    /// Clear a field whose candidate the filter rejected
    fn reject<H: ReferenceHost + ?Sized>(
        host: &mut H,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        existing: FieldValue,
    ) -> FieldValue {
        if existing.is_empty() {
            return existing;
        }

        let cleared = match existing {
            FieldValue::Interface(mut wrapper) => {
                wrapper.clear();
                FieldValue::Interface(wrapper)
            }
            _ => FieldValue::Unset,
        };
        Self::commit(host, instance, field, cleared)
    }

    fn commit<H: ReferenceHost + ?Sized>(
        host: &mut H,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        value: FieldValue,
    ) -> FieldValue {
        tracing::debug!(
            instance = %instance,
            field = field.name(),
            value = value.kind_label(),
            "committing resolved reference"
        );
        host.set(instance, field, value.clone());
        value
    }
}

/// Whether the unwrapped value counts as already assigned
fn holds_reference(field: &FieldDescriptor, value: &FieldValue) -> bool {
    if field.is_collection() {
        value.elements().is_some_and(|elements| !elements.is_empty())
    } else {
        value.scalar().is_some()
    }
}

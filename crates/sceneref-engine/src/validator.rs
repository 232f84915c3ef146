//! Reference validation
//!
//! Checks a resolved value against its declaration: presence, then per
//! element the location the strategy demands. Problems become
//! [`Diagnostic`]s; validation never fails with an error.

use crate::descriptor::FieldDescriptor;
use crate::error::RefError;
use crate::host::ObjectGraph;
use sceneref_model::{
    AttachmentRef, CollectionShape, FieldValue, LocationStrategy, RefFlags, Reference, TypeKey,
};
use serde::Serialize;
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reference problem; validation continues
    Error,
    /// Declaration problem that aborted the run
    Fatal,
}

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Required field holds nothing
    MissingRequired,
    /// Collection slot holds nothing
    MissingElement,
    /// Reference sits on the owning node despite `EXCLUDE_SELF`
    ExcludedSelf,
    /// Reference is not where the strategy requires
    WrongLocation,
    /// Standalone value under a strategy that requires a node
    NotAttachable,
    /// Declaration error
    Declaration,
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Problem category
    pub kind: DiagnosticKind,
    /// Offending instance, if known
    pub instance: Option<AttachmentRef>,
    /// Concrete type of the instance (or declaring type for fatal errors)
    pub owner_type: TypeKey,
    /// Field name
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create error-level diagnostic for an instance field
    #[must_use]
    pub fn error(
        kind: DiagnosticKind,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        message: String,
    ) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            instance: Some(instance.clone()),
            owner_type: instance.ty.clone(),
            field: field.name().to_string(),
            message,
        }
    }

    /// Create fatal diagnostic from an engine error
    #[must_use]
    pub fn fatal(error: &RefError) -> Self {
        let (owner_type, field) = match error.field() {
            Some((owner, field)) => (owner.clone(), field.to_string()),
            None => (TypeKey::new(""), String::new()),
        };
        Self {
            severity: Severity::Fatal,
            kind: DiagnosticKind::Declaration,
            instance: None,
            owner_type,
            field,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Aggregated validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    success: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationOutcome {
    /// Create successful outcome with no diagnostics
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            success: true,
            diagnostics: Vec::new(),
        }
    }

    /// Whether every checked field is valid
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Reported diagnostics, in order
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Count diagnostics of one kind
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    /// Record a diagnostic; any diagnostic fails the outcome
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.success = false;
        self.diagnostics.push(diagnostic);
    }

    /// Fold another outcome into this one
    pub fn merge(&mut self, other: Self) {
        self.success &= other.success;
        self.diagnostics.extend(other.diagnostics);
    }

    /// Take the diagnostics
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks resolved values against their declarations
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    log: bool,
}

impl Validator {
    /// Create validator; `log` emits each diagnostic as it is produced
    #[inline]
    #[must_use]
    pub fn new(log: bool) -> Self {
        Self { log }
    }

    /// Validate one field value
    ///
    /// Returns `true` if the value is acceptable. Every violation is
    /// recorded in `outcome`; checking does not stop at the first one.
    pub fn validate_ref<G: ObjectGraph + ?Sized>(
        &self,
        graph: &G,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        value: &FieldValue,
        outcome: &mut ValidationOutcome,
    ) -> bool {
        if value.is_empty() {
            if field.has_flags(RefFlags::OPTIONAL) {
                return true;
            }
            let message = format!(
                "{} missing required {} ref '{}'",
                instance.ty,
                field.expected_label(),
                field.name()
            );
            let diagnostic = Diagnostic::error(DiagnosticKind::MissingRequired, instance, field, message);
            self.report(outcome, diagnostic);
            return false;
        }

        let structural = !field.has_flags(RefFlags::EDITABLE_ANYWHERE);
        let mut valid = true;
        for slot in value.references() {
            let Some(reference) = slot else {
                let container = match field.shape() {
                    CollectionShape::List => "list",
                    CollectionShape::Scalar | CollectionShape::Array => "array",
                };
                let message = format!(
                    "{} missing required element ref in {container} '{}'",
                    instance.ty,
                    field.name()
                );
                let diagnostic = Diagnostic::error(DiagnosticKind::MissingElement, instance, field, message);
                self.report(outcome, diagnostic);
                valid = false;
                continue;
            };

            if structural {
                valid &= self.validate_element(graph, instance, field, reference, outcome);
            }
        }
        valid
    }

    fn validate_element<G: ObjectGraph + ?Sized>(
        &self,
        graph: &G,
        instance: &AttachmentRef,
        field: &FieldDescriptor,
        reference: &Reference,
        outcome: &mut ValidationOutcome,
    ) -> bool {
        let mut valid = true;

        if field.has_flags(RefFlags::EXCLUDE_SELF) && reference.owner_node() == Some(instance.node) {
            let message = format!(
                "{} {} ref '{}' cannot be on the same node",
                instance.ty,
                field.expected_label(),
                field.name()
            );
            let diagnostic = Diagnostic::error(DiagnosticKind::ExcludedSelf, instance, field, message);
            self.report(outcome, diagnostic);
            valid = false;
        }

        let strategy = field.strategy();
        if matches!(strategy, LocationStrategy::Scene | LocationStrategy::Anywhere) {
            return valid;
        }

        let Some(node) = reference.owner_node() else {
            let message = format!(
                "{} {} ref '{}' is not attached to a node and must be Anywhere or Scene",
                instance.ty,
                field.expected_label(),
                field.name()
            );
            let diagnostic = Diagnostic::error(DiagnosticKind::NotAttachable, instance, field, message);
            self.report(outcome, diagnostic);
            return false;
        };

        let (placed, location) = match strategy {
            LocationStrategy::Parent => (graph.is_descendant_of(instance.node, node), "a Parent"),
            LocationStrategy::Child => (graph.is_descendant_of(node, instance.node), "a Child"),
            _ => (node == instance.node, "Self"),
        };
        if !placed {
            let message = format!(
                "{} requires {} ref '{}' to be on {location}",
                instance.ty,
                field.expected_label(),
                field.name()
            );
            let diagnostic = Diagnostic::error(DiagnosticKind::WrongLocation, instance, field, message);
            self.report(outcome, diagnostic);
            valid = false;
        }
        valid
    }

    fn report(&self, outcome: &mut ValidationOutcome, diagnostic: Diagnostic) {
        if self.log {
            tracing::error!(
                owner = %diagnostic.owner_type,
                field = %diagnostic.field,
                "{}",
                diagnostic.message
            );
        }
        outcome.push(diagnostic);
    }
}

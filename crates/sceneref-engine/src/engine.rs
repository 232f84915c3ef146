//! Reference engine
//!
//! [`RefEngine`] drives the per-instance pipeline: scan the instance type,
//! resolve each field, then validate what the field holds.

use crate::config::EngineConfig;
use crate::descriptor::FieldDescriptor;
use crate::error::RefResult;
use crate::host::ReferenceHost;
use crate::registry::DescriptorRegistry;
use crate::resolver::{check_declaration, Resolver};
use crate::validator::{ValidationOutcome, Validator};
use sceneref_model::{AttachmentRef, FieldValue};
use std::sync::Arc;

/// Scan, resolve and validate annotated references
#[derive(Debug, Clone)]
pub struct RefEngine {
    registry: Arc<DescriptorRegistry>,
    config: EngineConfig,
}

impl RefEngine {
    /// Create engine over a shared registry
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<DescriptorRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Create engine with default configuration
    #[inline]
    #[must_use]
    pub fn with_defaults(registry: Arc<DescriptorRegistry>) -> Self {
        Self::new(registry, EngineConfig::default())
    }

    /// Shared descriptor registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve and validate every annotated field of one instance
    ///
    /// In live mode resolution only runs when `update_at_runtime` is set;
    /// fields are still validated as they stand.
    ///
    /// # Errors
    /// Returns error on an unusable declaration or stored value
    pub fn validate<H: ReferenceHost + ?Sized>(
        &self,
        host: &mut H,
        instance: &AttachmentRef,
        update_at_runtime: bool,
    ) -> RefResult<ValidationOutcome> {
        let fields = self.registry.scan(&instance.ty);
        self.validate_fields(host, instance, &fields, update_at_runtime)
    }

    /// Clear every resolvable field of one instance
    ///
    /// `Anywhere` fields are left alone. Interface wrappers are cleared in
    /// place; everything else becomes unset.
    pub fn clean<H: ReferenceHost + ?Sized>(&self, host: &mut H, instance: &AttachmentRef) {
        for field in self.registry.scan(&instance.ty).iter() {
            if !field.strategy().is_resolved() {
                continue;
            }
            let cleared = match host.get(instance, field) {
                FieldValue::Interface(mut wrapper) => {
                    wrapper.clear();
                    FieldValue::Interface(wrapper)
                }
                _ => FieldValue::Unset,
            };
            host.set(instance, field, cleared);
        }
    }

    /// [`clean`](Self::clean) then [`validate`](Self::validate)
    ///
    /// # Errors
    /// See [`validate`](Self::validate)
    pub fn clean_validate<H: ReferenceHost + ?Sized>(
        &self,
        host: &mut H,
        instance: &AttachmentRef,
        update_at_runtime: bool,
    ) -> RefResult<ValidationOutcome> {
        self.clean(host, instance);
        self.validate(host, instance, update_at_runtime)
    }

    /// Validate every live instance of every annotated type
    ///
    /// Each instance is matched by its exact concrete type, so it is
    /// validated once with its own full descriptor chain.
    ///
    /// # Errors
    /// Returns the first fatal error; instances after it are not visited
    pub fn validate_all<H: ReferenceHost + ?Sized>(&self, host: &mut H) -> RefResult<ValidationOutcome> {
        let instances = host.all_instances(self.config.batch_include_inactive);
        let mut outcome = ValidationOutcome::new();

        for ty in self.registry.annotated_types() {
            let targets: Vec<&AttachmentRef> = instances.iter().filter(|a| a.ty == ty).collect();
            if targets.is_empty() {
                continue;
            }

            let fields = self.registry.scan(&ty);
            tracing::info!(
                "validating {} field(s) on {} {} instance(s)",
                fields.len(),
                targets.len(),
                ty
            );
            for instance in targets {
                outcome.merge(self.validate_fields(host, instance, &fields, false)?);
            }
        }
        Ok(outcome)
    }

    fn validate_fields<H: ReferenceHost + ?Sized>(
        &self,
        host: &mut H,
        instance: &AttachmentRef,
        fields: &[Arc<FieldDescriptor>],
        update_at_runtime: bool,
    ) -> RefResult<ValidationOutcome> {
        let mut outcome = ValidationOutcome::new();
        if fields.is_empty() {
            if self.config.warn_on_unannotated {
                tracing::warn!("{} has no annotated reference fields", instance.ty);
            }
            return Ok(outcome);
        }

        let resolve = update_at_runtime || !self.config.mode.is_live();
        let template = host.is_template(instance.node);
        if template {
            tracing::debug!("{} is on an uninstantiated template, skipping validation", instance);
        }

        let types = self.registry.types();
        let resolver = Resolver::new(&self.registry);
        let validator = Validator::new(self.config.log_diagnostics);

        for field in fields {
            let stored = host.get(instance, field);
            let value = if resolve {
                resolver.update_ref(host, instance, field, stored)?
            } else {
                check_declaration(field, &stored, types)?;
                stored
            };

            if !template {
                validator.validate_ref(&*host, instance, field, &value, &mut outcome);
            }
        }
        Ok(outcome)
    }
}

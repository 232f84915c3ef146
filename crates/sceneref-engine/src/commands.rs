//! Command entry points
//!
//! Boolean wrappers over [`RefEngine`] for tool integrations: `true` means
//! every checked reference is valid. Fatal errors are logged and count as
//! failure.

use crate::engine::RefEngine;
use crate::error::RefResult;
use crate::host::ReferenceHost;
use crate::validator::ValidationOutcome;
use sceneref_model::AttachmentRef;

/// Resolve and validate one instance
pub fn validate_one<H: ReferenceHost + ?Sized>(
    engine: &RefEngine,
    host: &mut H,
    instance: &AttachmentRef,
) -> bool {
    settle(engine.validate(host, instance, false))
}

/// Clear, re-resolve and validate one instance
pub fn clean_and_validate_one<H: ReferenceHost + ?Sized>(
    engine: &RefEngine,
    host: &mut H,
    instance: &AttachmentRef,
) -> bool {
    settle(engine.clean_validate(host, instance, false))
}

/// Validate every live instance
pub fn validate_all<H: ReferenceHost + ?Sized>(engine: &RefEngine, host: &mut H) -> bool {
    settle(engine.validate_all(host))
}

fn settle(result: RefResult<ValidationOutcome>) -> bool {
    match result {
        Ok(outcome) => outcome.is_success(),
        Err(e) => {
            tracing::error!("Reference validation aborted: {}", e);
            false
        }
    }
}

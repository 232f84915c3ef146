//! Engine configuration

use serde::{Deserialize, Serialize};

/// Whether the host is editing or running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Authoring time; resolution always runs
    #[default]
    Editing,

    /// Running; resolution runs only for instances that opt in
    Live,
}

impl ExecutionMode {
    /// Whether the host is running
    #[inline]
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Reference engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Execution mode of the host
    pub mode: ExecutionMode,
    /// Log each diagnostic at error level as it is produced
    pub log_diagnostics: bool,
    /// Warn when an instance's type declares no reference fields
    pub warn_on_unannotated: bool,
    /// Batch validation also visits inactive nodes
    pub batch_include_inactive: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With execution mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// With diagnostic logging
    #[inline]
    #[must_use]
    pub fn with_log_diagnostics(mut self, enabled: bool) -> Self {
        self.log_diagnostics = enabled;
        self
    }

    /// With unannotated-type warnings
    #[inline]
    #[must_use]
    pub fn with_warn_on_unannotated(mut self, enabled: bool) -> Self {
        self.warn_on_unannotated = enabled;
        self
    }

    /// With inactive nodes in batch validation
    #[inline]
    #[must_use]
    pub fn with_batch_include_inactive(mut self, enabled: bool) -> Self {
        self.batch_include_inactive = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Editing,
            log_diagnostics: true,
            warn_on_unannotated: true,
            batch_include_inactive: true,
        }
    }
}

//! Declaration errors
//!
//! Raised when a field declaration uses vocabulary the engine does not know.

/// Errors parsing declaration vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    /// Location strategy name not recognized
    #[error("unknown location strategy: '{0}'")]
    UnknownStrategy(String),

    /// Flag name not recognized
    #[error("unknown reference flag: '{0}'")]
    UnknownFlag(String),

    /// Collection shape name not recognized
    #[error("unknown collection shape: '{0}'")]
    UnknownShape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_error_display() {
        let err = DeclarationError::UnknownStrategy("sibling".to_string());
        assert_eq!(err.to_string(), "unknown location strategy: 'sibling'");
    }
}

//! Module Error Handling
//!
//! Error types for module lifecycle operations: identifier validation,
//! dependency resolution, content registration, activation and discovery.

use crate::core::error_handling::ContextualError;

/// Result type alias for module operations
pub type ModuleResult<T> = std::result::Result<T, ModuleError>;

/// Errors raised by the module host
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    /// A registry key is already taken
    #[error("Key '{key}' is already registered in {registry} (owned by '{owner}')")]
    DuplicateKey {
        registry: String,
        key: String,
        owner: String,
    },

    /// A module depends on itself, directly or through an immediate before-id loop
    #[error("Cyclic dependency for module '{module_id}': {cycle}")]
    CyclicDependency { module_id: String, cycle: String },

    /// An identifier is empty, malformed, reserved or already loaded
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// A module hook returned an error or panicked
    #[error("Module '{module_id}' failed during {phase}: {cause}")]
    ActivationFailure {
        module_id: String,
        phase: String,
        cause: String,
    },

    /// A module binary could not be discovered or instantiated
    #[error("Failed to load modules from '{location}': {cause}")]
    BinaryLoadFailure { location: String, cause: String },

    /// No module, command or registry entry with this id
    #[error("Not found: {what}")]
    NotFound { what: String },
}

impl ModuleError {
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        ModuleError::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    pub fn cyclic(module_id: impl Into<String>, cycle: impl Into<String>) -> Self {
        ModuleError::CyclicDependency {
            module_id: module_id.into(),
            cycle: cycle.into(),
        }
    }

    pub fn activation(
        module_id: impl Into<String>,
        phase: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        ModuleError::ActivationFailure {
            module_id: module_id.into(),
            phase: phase.into(),
            cause: cause.into(),
        }
    }

    pub fn binary_load(location: impl Into<String>, cause: impl Into<String>) -> Self {
        ModuleError::BinaryLoadFailure {
            location: location.into(),
            cause: cause.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ModuleError::NotFound { what: what.into() }
    }
}

impl ContextualError for ModuleError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ModuleError::CyclicDependency { .. }
                | ModuleError::InvalidIdentifier { .. }
                | ModuleError::NotFound { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ModuleError::InvalidIdentifier { reason, .. } => Some(reason),
            ModuleError::CyclicDependency { cycle, .. } => Some(cycle),
            ModuleError::NotFound { what } => Some(what),
            _ => None,
        }
    }
}

//! Public API for content registries
//!
//! External code should import from here rather than directly from internal modules.

// Generic registry
pub use crate::content::registry::{ContentRegistry, KeyScheme, RegistryEntry, KEY_SEPARATOR};

// Content kinds and their values
pub use crate::content::kinds::{
    Condition, ConditionDefinition, ConditionFactory, ContentKind, ContentRegistries,
    DaemonDefinition, ExecutableDefinition, ExecutableHandler, ExtensionDefinition,
    PortDefinition,
};

// Commands
pub use crate::content::commands::{
    autocomplete_names, execute, register_command, CommandDefinition, CommandHandler,
    CommandOutput,
};

//! Public API for the module system
//!
//! This module provides the complete public API for the module system.
//! External code should import from here rather than directly from internal modules.

// Host and lifecycle management
pub use crate::module::host::{HostOptions, ModuleHost, WeakModuleHost};
pub use crate::module::loader::ModuleLoader;

// Module authoring
pub use crate::module::context::ModuleContext;
pub use crate::module::traits::{HookResult, Module};

// Error handling
pub use crate::module::error::{ModuleError, ModuleResult};

// Module metadata and records
pub use crate::module::identifier::{clean_id, HOST_OWNER_ID};
pub use crate::module::placeholder::{Loadable, Placeholder};
pub use crate::module::record::{ModuleHandle, ModuleRecord};
pub use crate::module::types::{
    ElementInfo, ModuleDescriptor, ModuleFactory, ModuleInfo, ModuleState,
};

// Dependency resolution
pub use crate::module::resolver::{DependencyResolver, LoadDecision};

// Discovery
pub use crate::module::discovery::{
    get_all_compiled_modules, BinarySource, InventorySource, ModuleEntry, StaticSource,
};

// Markup attribute storage
pub use crate::module::storage::{
    from_element, read_element, to_element, write_element, AttributeField, AttributeStorage,
};

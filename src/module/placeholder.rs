//! Forward references in the reliance graph
//!
//! An entry in the graph is either a live module or a placeholder carrying only
//! the id of a module that is expected but not known yet. Lifecycle operations
//! applied to a placeholder do nothing.

use crate::module::record::ModuleHandle;
use std::fmt;

/// Id-only stand-in for a module that has not been seen yet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    id: String,
}

impl Placeholder {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Something the loader can be asked to load or unload
#[derive(Clone)]
pub enum Loadable {
    Module(ModuleHandle),
    Placeholder(Placeholder),
}

impl Loadable {
    pub fn placeholder(id: impl Into<String>) -> Self {
        Loadable::Placeholder(Placeholder::new(id))
    }

    pub fn id(&self) -> &str {
        match self {
            Loadable::Module(handle) => handle.id(),
            Loadable::Placeholder(placeholder) => placeholder.id(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Loadable::Placeholder(_))
    }

    pub fn as_module(&self) -> Option<&ModuleHandle> {
        match self {
            Loadable::Module(handle) => Some(handle),
            Loadable::Placeholder(_) => None,
        }
    }
}

impl From<ModuleHandle> for Loadable {
    fn from(handle: ModuleHandle) -> Self {
        Loadable::Module(handle)
    }
}

impl fmt::Debug for Loadable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loadable::Module(handle) => write!(f, "Module({})", handle.id()),
            Loadable::Placeholder(placeholder) => write!(f, "Placeholder({})", placeholder.id()),
        }
    }
}

//! Content kinds and the per-kind registries owned by the host
//!
//! The value types here are what modules hand to the host; the host only stores
//! them, tagged with the registering module's id, and retracts them on unload.

use crate::content::commands::CommandDefinition;
use crate::content::registry::{ContentRegistry, KeyScheme};
use crate::core::error_handling::BoxedError;
use crate::module::types::ElementInfo;
use std::fmt;
use std::rc::Rc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Every kind of content a module can register
#[derive(EnumIter, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    Command,
    Port,
    Daemon,
    Executable,
    Extension,
    Condition,
}

impl ContentKind {
    /// Key scheme used by the registry for this kind
    ///
    /// Commands are typed by users and conditions are named by markup, so both
    /// are keyed by their bare name.
    pub fn scheme(&self) -> KeyScheme {
        match self {
            Self::Command | Self::Condition => KeyScheme::Global,
            _ => KeyScheme::Qualified,
        }
    }

    /// Plural label used in listings
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Command => "commands",
            Self::Port => "ports",
            Self::Daemon => "daemons",
            Self::Executable => "executables",
            Self::Extension => "extensions",
            Self::Condition => "conditions",
        }
    }
}

/// A network port a module makes available on host computers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDefinition {
    pub display_name: String,
    pub number: u16,
}

impl PortDefinition {
    pub fn new(display_name: impl Into<String>, number: u16) -> Self {
        Self {
            display_name: display_name.into(),
            number,
        }
    }
}

/// A background service that can be attached to host computers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonDefinition {
    pub display_name: String,
    pub description: String,
}

/// Handler invoked when an executable is run
pub type ExecutableHandler = Rc<dyn Fn(&[String]) -> Result<Vec<String>, BoxedError>>;

/// A runnable program identified by its registry key
#[derive(Clone)]
pub struct ExecutableDefinition {
    pub description: String,
    pub handler: ExecutableHandler,
}

impl fmt::Debug for ExecutableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableDefinition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A packaged extension: a self-contained story or content pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDefinition {
    pub title: String,
    pub description: String,
}

/// A runtime condition built from markup
pub trait Condition {
    /// Whether the condition currently holds
    fn check(&self) -> bool;

    /// Markup that recreates this condition
    fn save_string(&self) -> String;
}

/// Builds a condition from the attributes of its markup element
pub type ConditionFactory = Rc<dyn Fn(&ElementInfo) -> Result<Box<dyn Condition>, BoxedError>>;

/// A condition kind addressable from markup by its element name
#[derive(Clone)]
pub struct ConditionDefinition {
    pub factory: ConditionFactory,
}

impl fmt::Debug for ConditionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionDefinition").finish_non_exhaustive()
    }
}

/// One registry per content kind
#[derive(Debug)]
pub struct ContentRegistries {
    pub commands: ContentRegistry<CommandDefinition>,
    pub ports: ContentRegistry<PortDefinition>,
    pub daemons: ContentRegistry<DaemonDefinition>,
    pub executables: ContentRegistry<ExecutableDefinition>,
    pub extensions: ContentRegistry<ExtensionDefinition>,
    pub conditions: ContentRegistry<ConditionDefinition>,
}

impl Default for ContentRegistries {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRegistries {
    pub fn new() -> Self {
        Self {
            commands: ContentRegistry::new(ContentKind::Command, ContentKind::Command.scheme()),
            ports: ContentRegistry::new(ContentKind::Port, ContentKind::Port.scheme()),
            daemons: ContentRegistry::new(ContentKind::Daemon, ContentKind::Daemon.scheme()),
            executables: ContentRegistry::new(
                ContentKind::Executable,
                ContentKind::Executable.scheme(),
            ),
            extensions: ContentRegistry::new(
                ContentKind::Extension,
                ContentKind::Extension.scheme(),
            ),
            conditions: ContentRegistry::new(
                ContentKind::Condition,
                ContentKind::Condition.scheme(),
            ),
        }
    }

    /// Remove everything `owner` registered, across all kinds
    pub fn unregister_all_for_owner(&self, owner: &str) -> usize {
        ContentKind::iter()
            .map(|kind| self.unregister_kind_for_owner(kind, owner).len())
            .sum()
    }

    fn unregister_kind_for_owner(&self, kind: ContentKind, owner: &str) -> Vec<String> {
        match kind {
            ContentKind::Command => self.commands.unregister_all_for_owner(owner),
            ContentKind::Port => self.ports.unregister_all_for_owner(owner),
            ContentKind::Daemon => self.daemons.unregister_all_for_owner(owner),
            ContentKind::Executable => self.executables.unregister_all_for_owner(owner),
            ContentKind::Extension => self.extensions.unregister_all_for_owner(owner),
            ContentKind::Condition => self.conditions.unregister_all_for_owner(owner),
        }
    }

    /// Keys registered for one kind, sorted
    pub fn keys(&self, kind: ContentKind) -> Vec<String> {
        match kind {
            ContentKind::Command => self.commands.keys(),
            ContentKind::Port => self.ports.keys(),
            ContentKind::Daemon => self.daemons.keys(),
            ContentKind::Executable => self.executables.keys(),
            ContentKind::Extension => self.extensions.keys(),
            ContentKind::Condition => self.conditions.keys(),
        }
    }

    /// Number of entries `owner` holds in one kind
    pub fn count_for_owner(&self, kind: ContentKind, owner: &str) -> usize {
        match kind {
            ContentKind::Command => self.commands.count_for_owner(owner),
            ContentKind::Port => self.ports.count_for_owner(owner),
            ContentKind::Daemon => self.daemons.count_for_owner(owner),
            ContentKind::Executable => self.executables.count_for_owner(owner),
            ContentKind::Extension => self.extensions.count_for_owner(owner),
            ContentKind::Condition => self.conditions.count_for_owner(owner),
        }
    }

    /// Total entries owned by `owner` across all kinds
    pub fn total_for_owner(&self, owner: &str) -> usize {
        ContentKind::iter()
            .map(|kind| self.count_for_owner(kind, owner))
            .sum()
    }

    /// Snapshot of every key of every kind, for footprint comparisons
    pub fn snapshot(&self) -> Vec<(ContentKind, Vec<String>)> {
        ContentKind::iter().map(|kind| (kind, self.keys(kind))).collect()
    }

    /// Build a condition registered under `element.name`
    pub fn build_condition(
        &self,
        element: &ElementInfo,
    ) -> Option<Result<Box<dyn Condition>, BoxedError>> {
        self.conditions
            .lookup(&element.name)
            .map(|definition| (definition.factory)(element))
    }
}

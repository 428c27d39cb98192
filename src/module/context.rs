//! Module Context
//!
//! Handed to every module hook. Everything registered through a context is
//! tagged with the module's id, which is how the host finds and removes a
//! module's footprint when it unloads.

use crate::content::commands::{self, CommandOutput};
use crate::content::kinds::{
    Condition, ConditionDefinition, DaemonDefinition, ExecutableDefinition, ExtensionDefinition,
    PortDefinition,
};
use crate::core::error_handling::BoxedError;
use crate::events::bus::{DispatchSummary, ListenerId, ListenerOptions, ListenerResult};
use crate::module::error::ModuleResult;
use crate::module::host::ModuleHost;
use crate::module::types::ElementInfo;
use std::any::Any;
use std::rc::Rc;

/// A module's view of the host
///
/// The context only borrows the host for the duration of a hook, so it cannot
/// be captured by a listener or command closure. Closures that need the host
/// later should hold `ctx.host().downgrade()`; a cloned `ModuleHost` inside a
/// registered closure keeps the host alive through its own registries.
pub struct ModuleContext<'a> {
    host: &'a ModuleHost,
    module_id: String,
}

impl std::fmt::Debug for ModuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module_id", &self.module_id)
            .finish_non_exhaustive()
    }
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(host: &'a ModuleHost, module_id: &str) -> Self {
        Self {
            host,
            module_id: module_id.to_string(),
        }
    }

    /// Clean id of the module this context belongs to
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// The host, for loads, unloads and queries
    pub fn host(&self) -> &'a ModuleHost {
        self.host
    }

    pub fn subscribe<E, F>(&self, options: ListenerOptions, callback: F) -> ListenerId
    where
        E: Any,
        F: Fn(&mut E) -> ListenerResult + 'static,
    {
        self.host
            .events()
            .subscribe(&self.module_id, options, callback)
    }

    pub fn publish<E: Any>(&self, event: &mut E) -> DispatchSummary {
        self.host.events().publish(event)
    }

    /// Register a command users can type; the key is the bare command name
    pub fn register_command<F>(
        &self,
        name: &str,
        handler: F,
        description: &str,
        autocomplete: bool,
    ) -> ModuleResult<String>
    where
        F: Fn(&[String]) -> Result<CommandOutput, BoxedError> + 'static,
    {
        commands::register_command(
            &self.host.content().commands,
            &self.module_id,
            name,
            handler,
            description,
            autocomplete,
        )
    }

    pub fn register_port(&self, name: &str, port: PortDefinition) -> ModuleResult<String> {
        self.host
            .content()
            .ports
            .register(&self.module_id, name, port)
    }

    pub fn register_daemon(&self, name: &str, daemon: DaemonDefinition) -> ModuleResult<String> {
        self.host
            .content()
            .daemons
            .register(&self.module_id, name, daemon)
    }

    pub fn register_executable<F>(
        &self,
        name: &str,
        description: &str,
        handler: F,
    ) -> ModuleResult<String>
    where
        F: Fn(&[String]) -> Result<Vec<String>, BoxedError> + 'static,
    {
        self.host.content().executables.register(
            &self.module_id,
            name,
            ExecutableDefinition {
                description: description.to_string(),
                handler: Rc::new(handler),
            },
        )
    }

    pub fn register_extension(
        &self,
        name: &str,
        extension: ExtensionDefinition,
    ) -> ModuleResult<String> {
        self.host
            .content()
            .extensions
            .register(&self.module_id, name, extension)
    }

    /// Register a condition addressed from markup by `element_name`
    pub fn register_condition<F>(&self, element_name: &str, factory: F) -> ModuleResult<String>
    where
        F: Fn(&ElementInfo) -> Result<Box<dyn Condition>, BoxedError> + 'static,
    {
        self.host.content().conditions.register(
            &self.module_id,
            element_name,
            ConditionDefinition {
                factory: Rc::new(factory),
            },
        )
    }
}

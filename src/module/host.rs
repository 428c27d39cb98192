//! Module Host
//!
//! The single long-lived root object of the module system. It owns the content
//! registries, the event bus and the loader; there is no process-wide state.
//! `ModuleHost` is a cheap handle and clones share the same host.

use crate::content::commands::{self, CommandOutput};
use crate::content::kinds::ContentRegistries;
use crate::events::bus::EventBus;
use crate::module::discovery::BinarySource;
use crate::module::error::ModuleResult;
use crate::module::identifier::{clean_id, HOST_OWNER_ID};
use crate::module::loader::ModuleLoader;
use crate::module::placeholder::Loadable;
use crate::module::record::ModuleHandle;
use crate::module::types::{ModuleDescriptor, ModuleState};
use std::rc::{Rc, Weak};

/// Host-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOptions {
    /// Clean ids of modules that discovery skips
    pub excluded_modules: Vec<String>,
}

impl HostOptions {
    pub fn with_excluded<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_modules
            .extend(ids.into_iter().map(|id| clean_id(id.as_ref())));
        self
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_modules.iter().any(|excluded| excluded == id)
    }
}

struct HostInner {
    options: HostOptions,
    content: ContentRegistries,
    events: EventBus,
    loader: ModuleLoader,
}

/// Handle to the module host
#[derive(Clone)]
pub struct ModuleHost {
    inner: Rc<HostInner>,
}

/// Non-owning handle to the module host
///
/// Content handlers that need the host hold one of these so the host is not
/// kept alive by its own registries.
#[derive(Clone)]
pub struct WeakModuleHost {
    inner: Weak<HostInner>,
}

impl WeakModuleHost {
    pub fn upgrade(&self) -> Option<ModuleHost> {
        self.inner.upgrade().map(|inner| ModuleHost { inner })
    }
}

impl std::fmt::Debug for WeakModuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakModuleHost").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ModuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHost")
            .field("options", &self.inner.options)
            .field("loaded", &self.inner.loader.loaded_ids())
            .field("content", &self.inner.content)
            .field("events", &self.inner.events)
            .finish()
    }
}

impl Default for ModuleHost {
    fn default() -> Self {
        Self::new(HostOptions::default())
    }
}

impl ModuleHost {
    /// Create a host with the built-in `help` and `modules` commands registered
    pub fn new(options: HostOptions) -> Self {
        let host = Self {
            inner: Rc::new(HostInner {
                options,
                content: ContentRegistries::new(),
                events: EventBus::new(),
                loader: ModuleLoader::new(),
            }),
        };
        host.register_builtin_commands();
        host
    }

    pub fn downgrade(&self) -> WeakModuleHost {
        WeakModuleHost {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn register_builtin_commands(&self) {
        let weak = self.downgrade();
        let help = commands::register_command(
            &self.inner.content.commands,
            HOST_OWNER_ID,
            "help",
            move |_args: &[String]| {
                let host = weak.upgrade().ok_or("host is gone")?;
                Ok(host
                    .content()
                    .commands
                    .entries()
                    .into_iter()
                    .map(|(name, entry)| {
                        if entry.value.description.is_empty() {
                            name
                        } else {
                            format!("{} - {}", name, entry.value.description)
                        }
                    })
                    .collect())
            },
            "List available commands",
            true,
        );

        let weak = self.downgrade();
        let modules = commands::register_command(
            &self.inner.content.commands,
            HOST_OWNER_ID,
            "modules",
            move |_args: &[String]| {
                let host = weak.upgrade().ok_or("host is gone")?;
                Ok(host.loaded_ids())
            },
            "List loaded modules",
            true,
        );

        for result in [help, modules] {
            if let Err(e) = result {
                log::error!("Could not register host command: {}", e);
            }
        }
    }

    pub fn options(&self) -> &HostOptions {
        &self.inner.options
    }

    pub fn content(&self) -> &ContentRegistries {
        &self.inner.content
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.inner.loader
    }

    // ---- lifecycle -----------------------------------------------------

    /// See [`ModuleLoader::load_module`]
    pub fn load_module(&self, handle: ModuleHandle) -> ModuleResult<Option<ModuleHandle>> {
        self.inner.loader.load_module(self, handle)
    }

    /// Instantiate a descriptor and load it
    pub fn load_descriptor(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> ModuleResult<Option<ModuleHandle>> {
        let handle = self.inner.loader.instantiate(descriptor)?;
        self.load_module(handle)
    }

    pub fn load_from_binary(
        &self,
        source: &dyn BinarySource,
        location: &str,
        only_id: Option<&str>,
    ) -> Vec<ModuleHandle> {
        self.inner
            .loader
            .load_from_binary(self, source, location, only_id)
    }

    pub fn load_all(&self, source: &dyn BinarySource) -> Vec<ModuleHandle> {
        self.inner.loader.load_all(self, source)
    }

    pub fn load_content(&self) {
        self.inner.loader.load_content(self)
    }

    pub fn unload_module(&self, handle: &ModuleHandle) {
        self.inner.loader.unload_module(self, handle)
    }

    pub fn unload_loadable(&self, loadable: &Loadable) {
        self.inner.loader.unload_loadable(self, loadable)
    }

    pub fn unload_by_id(&self, id: &str) -> bool {
        self.inner.loader.unload_by_id(self, id)
    }

    pub fn mark_for_unload(&self, handle: &ModuleHandle) -> bool {
        self.inner.loader.mark_for_unload(handle)
    }

    pub fn unload_marked(&self) -> usize {
        self.inner.loader.unload_marked(self)
    }

    pub fn mark_for_load(&self, descriptor: ModuleDescriptor) {
        self.inner.loader.mark_for_load(descriptor)
    }

    pub fn load_marked(&self) -> Vec<ModuleHandle> {
        self.inner.loader.load_marked(self)
    }

    pub fn shutdown(&self) {
        self.inner.loader.shutdown(self, None)
    }

    /// Shut down, telling `HostShutdown` listeners why
    pub fn shutdown_with_reason(&self, reason: impl Into<String>) {
        self.inner.loader.shutdown(self, Some(reason.into()))
    }

    // ---- commands ------------------------------------------------------

    /// Run a command line, `args[0]` being the command name
    pub fn execute_command(&self, args: &[String]) -> ModuleResult<CommandOutput> {
        commands::execute(&self.inner.content.commands, &self.inner.events, args)
    }

    /// Split a line on whitespace and run it
    pub fn execute_line(&self, line: &str) -> ModuleResult<CommandOutput> {
        let args: Vec<String> = line.split_whitespace().map(String::from).collect();
        self.execute_command(&args)
    }

    // ---- queries -------------------------------------------------------

    pub fn loaded_module(&self, id: &str) -> Option<ModuleHandle> {
        self.inner.loader.loaded_module(&clean_id(id))
    }

    pub fn known_module(&self, id: &str) -> Option<ModuleHandle> {
        self.inner.loader.known_module(&clean_id(id))
    }

    pub fn loaded_ids(&self) -> Vec<String> {
        self.inner.loader.loaded_ids()
    }

    pub fn unloaded_ids(&self) -> Vec<String> {
        self.inner.loader.unloaded_ids()
    }

    pub fn module_state(&self, id: &str) -> Option<ModuleState> {
        self.inner.loader.module_state(&clean_id(id))
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.inner.loader.pending_ids()
    }

    pub fn waiting_on(&self, id: &str) -> Vec<String> {
        self.inner.loader.waiting_on(&clean_id(id))
    }
}

//! Module Loader
//!
//! Drives module records through their lifecycle: validation, dependency
//! resolution, activation, the content phase, batch queues and teardown.
//!
//! The loader never holds a borrow of its own state while module code runs.
//! Hooks, listeners and nested loads/unloads triggered from them all see a
//! consistent view and may call back into the host freely.

use crate::core::error_handling::run_guarded;
use crate::events::lifecycle::{ContentLoading, HostShutdown, ModuleLoaded, ModuleUnloaded};
use crate::module::context::ModuleContext;
use crate::module::discovery::BinarySource;
use crate::module::error::{ModuleError, ModuleResult};
use crate::module::host::ModuleHost;
use crate::module::identifier::{clean_id, validate_for_load};
use crate::module::placeholder::Loadable;
use crate::module::record::{ModuleHandle, ModuleRecord};
use crate::module::resolver::{cascade_targets, ready_to_activate, DependencyResolver, LoadDecision};
use crate::module::types::{ModuleDescriptor, ModuleState};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Lifecycle bookkeeping for every module the host knows about
#[derive(Debug, Default)]
pub struct ModuleLoader {
    resolver: RefCell<DependencyResolver>,
    /// Latest record per clean id, whatever its state
    known: RefCell<HashMap<String, ModuleHandle>>,
    /// Ids of active modules in the order they finished loading
    load_order: RefCell<Vec<String>>,
    unloaded: RefCell<BTreeSet<String>>,
    marked_for_unload: RefCell<Vec<ModuleHandle>>,
    marked_for_load: RefCell<Vec<ModuleDescriptor>>,
    content_phase: Cell<bool>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- queries -------------------------------------------------------

    /// Record held for `id`, whatever its state
    pub fn known_module(&self, id: &str) -> Option<ModuleHandle> {
        self.known.borrow().get(id).cloned()
    }

    /// Every record the host holds, sorted by id
    pub fn known_modules(&self) -> Vec<ModuleHandle> {
        let mut modules: Vec<ModuleHandle> = self.known.borrow().values().cloned().collect();
        modules.sort_by(|a, b| a.id().cmp(b.id()));
        modules
    }

    /// Active module with this id
    pub fn loaded_module(&self, id: &str) -> Option<ModuleHandle> {
        self.known_module(id)
            .filter(|handle| handle.state().is_active())
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded_module(id).is_some()
    }

    /// Ids of active modules in load order
    pub fn loaded_ids(&self) -> Vec<String> {
        self.load_order.borrow().clone()
    }

    /// Ids of modules that have been unloaded and not loaded again
    pub fn unloaded_ids(&self) -> Vec<String> {
        self.unloaded.borrow().iter().cloned().collect()
    }

    pub fn module_state(&self, id: &str) -> Option<ModuleState> {
        self.known_module(id).map(|handle| handle.state())
    }

    /// Ids something in the reliance graph is waiting on
    pub fn pending_ids(&self) -> Vec<String> {
        self.resolver.borrow().pending_ids()
    }

    /// Ids waiting on `id`
    pub fn waiting_on(&self, id: &str) -> Vec<String> {
        self.resolver.borrow().waiting_on(id)
    }

    /// Whether the host content phase has run
    pub fn content_phase_started(&self) -> bool {
        self.content_phase.get()
    }

    fn is_taken(&self, id: &str) -> bool {
        self.known_module(id).is_some_and(|handle| {
            matches!(
                handle.state(),
                ModuleState::Loading
                    | ModuleState::Loaded
                    | ModuleState::MarkedForUnload
                    | ModuleState::Unloading
            )
        })
    }

    // ---- discovery -----------------------------------------------------

    /// Create a module record from a discovered descriptor
    pub fn instantiate(&self, descriptor: &ModuleDescriptor) -> ModuleResult<ModuleHandle> {
        let host_api = crate::core::version::get_api_version();
        if !crate::core::version::is_api_compatible(descriptor.api_version) {
            return Err(ModuleError::binary_load(
                &descriptor.bundle,
                format!(
                    "module '{}' targets API version {} but the host provides {}",
                    descriptor.info.id, descriptor.api_version, host_api
                ),
            ));
        }

        let factory = descriptor.factory.clone();
        let behaviour = match catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(behaviour)) => behaviour,
            Ok(Err(e)) => {
                return Err(ModuleError::binary_load(
                    &descriptor.bundle,
                    format!("module '{}' could not be created: {}", descriptor.info.id, e),
                ))
            }
            Err(payload) => {
                return Err(ModuleError::binary_load(
                    &descriptor.bundle,
                    format!(
                        "module '{}' panicked while being created: {}",
                        descriptor.info.id,
                        crate::core::error_handling::panic_message(payload.as_ref())
                    ),
                ))
            }
        };

        Ok(ModuleRecord::handle(
            descriptor.info.clone(),
            descriptor.bundle.clone(),
            behaviour,
        ))
    }

    /// Discover and load every module in one bundle of `source`
    ///
    /// `only_id` restricts loading to a single module. Failures are logged per
    /// module and never stop the remaining modules from loading. Returns the
    /// handles that were loaded or deferred.
    pub fn load_from_binary(
        &self,
        host: &ModuleHost,
        source: &dyn BinarySource,
        location: &str,
        only_id: Option<&str>,
    ) -> Vec<ModuleHandle> {
        let descriptors = match source.discover(location) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                log::error!("{}", e);
                return Vec::new();
            }
        };
        log::debug!("Found {} module(s) in '{}'", descriptors.len(), location);

        let only_id = only_id.map(clean_id);
        let mut result = Vec::new();
        for descriptor in descriptors {
            let id = clean_id(&descriptor.info.id);
            if only_id.as_ref().is_some_and(|only| *only != id) {
                continue;
            }
            if host.options().is_excluded(&id) {
                log::info!("Skipping excluded module '{}'", id);
                continue;
            }

            let handle = match self.instantiate(&descriptor) {
                Ok(handle) => handle,
                Err(e) => {
                    log::error!("{}", e);
                    continue;
                }
            };

            match self.load_module(host, handle) {
                Ok(Some(handle)) => {
                    self.unloaded.borrow_mut().remove(handle.id());
                    result.push(handle);
                }
                Ok(None) => {}
                Err(e) => log::error!("Module '{}' from '{}' rejected: {}", id, location, e),
            }
        }
        result
    }

    /// Load every bundle `source` knows about
    pub fn load_all(&self, host: &ModuleHost, source: &dyn BinarySource) -> Vec<ModuleHandle> {
        source
            .locations()
            .iter()
            .flat_map(|location| self.load_from_binary(host, source, location, None))
            .collect()
    }

    // ---- loading -------------------------------------------------------

    /// Load a module, or defer it until its before-ids are loaded
    ///
    /// Returns `Ok(Some(handle))` when the module is loaded or deferred and
    /// `Ok(None)` when activation failed and was rolled back (already logged).
    /// Invalid identifiers and dependency cycles are returned as errors.
    pub fn load_module(
        &self,
        host: &ModuleHost,
        handle: ModuleHandle,
    ) -> ModuleResult<Option<ModuleHandle>> {
        let id = handle.id().to_string();
        validate_for_load(&id, self.is_taken(&id))?;
        self.replace_deferred(&handle);

        let decision = self.resolver.borrow_mut().prepare_load(
            &handle,
            |other| self.is_loaded(other),
            |other| self.known_module(other),
        )?;

        self.known.borrow_mut().insert(id.clone(), handle.clone());

        if let LoadDecision::Defer { waiting_on } = decision {
            log::info!("Module '{}' waiting for {}", id, waiting_on.join(", "));
            handle.set_state(ModuleState::Deferred);
            return Ok(Some(handle));
        }

        log::info!("Loading module '{}'", id);
        handle.set_state(ModuleState::Loading);
        let ctx = ModuleContext::new(host, &id);

        if let Err(cause) = run_guarded(|| handle.behaviour().load(&ctx)) {
            self.roll_back(host, &handle, "load", cause);
            return Ok(None);
        }

        if self.content_phase.get() {
            if let Err(cause) = run_guarded(|| handle.behaviour().load_content(&ctx)) {
                self.roll_back(host, &handle, "load_content", cause);
                return Ok(None);
            }
            handle.set_content_loaded(true);
        }

        handle.set_state(ModuleState::Loaded);
        self.unloaded.borrow_mut().remove(&id);
        self.load_order.borrow_mut().push(id.clone());
        log::info!("Loaded module '{}'", id);

        host.events().publish(&mut ModuleLoaded {
            module_id: id.clone(),
        });

        self.trigger_waiting(host, &id);
        Ok(Some(handle))
    }

    /// Attempt everything that was waiting on `id`
    fn trigger_waiting(&self, host: &ModuleHost, id: &str) {
        let waiting = self.resolver.borrow_mut().take_waiting(id);
        for entry in waiting {
            let ready = ready_to_activate(
                &entry,
                |other| self.is_loaded(other),
                |other| self.known_module(other),
            );
            match ready {
                Some(dependent) => {
                    log::debug!("Module '{}' triggers '{}'", id, dependent.id());
                    if let Err(e) = self.load_module(host, dependent) {
                        log::error!("{}", e);
                    }
                }
                None => self.requeue_deferred(&entry),
            }
        }
    }

    /// Keep a triggered but still deferred module reachable from the graph
    fn requeue_deferred(&self, entry: &Loadable) {
        let handle = match entry {
            Loadable::Module(handle) => handle.clone(),
            Loadable::Placeholder(placeholder) => match self.known_module(placeholder.id()) {
                Some(handle) => handle,
                None => return,
            },
        };
        if handle.state() != ModuleState::Deferred {
            return;
        }
        let missing = self
            .resolver
            .borrow_mut()
            .requeue(&handle, |other| self.is_loaded(other));
        log::debug!(
            "Module '{}' still waiting for {}",
            handle.id(),
            missing.join(", ")
        );
    }

    /// Retire a different deferred record that `handle` is about to replace
    fn replace_deferred(&self, handle: &ModuleHandle) {
        let Some(previous) = self.known_module(handle.id()) else {
            return;
        };
        if !Rc::ptr_eq(&previous, handle) && previous.state() == ModuleState::Deferred {
            log::debug!("Replacing deferred module '{}'", previous.id());
            self.resolver.borrow_mut().withdraw(previous.id());
            previous.set_state(ModuleState::Unloaded);
        }
    }

    /// Undo a failed activation
    fn roll_back(&self, host: &ModuleHost, handle: &ModuleHandle, phase: &str, cause: String) {
        let error = ModuleError::activation(handle.id(), phase, cause);
        log::error!("{}", error);

        handle.set_state(ModuleState::Unloading);
        self.retract(host, handle);
        self.resolver.borrow_mut().withdraw(handle.id());
        handle.set_state(ModuleState::Unloaded);
        handle.set_content_loaded(false);
        self.unloaded.borrow_mut().remove(handle.id());
    }

    /// Host content phase: run `load_content` for every active module that
    /// has not done so yet, in load order
    pub fn load_content(&self, host: &ModuleHost) {
        self.content_phase.set(true);

        let pending: Vec<ModuleHandle> = self
            .loaded_ids()
            .iter()
            .filter_map(|id| self.loaded_module(id))
            .filter(|handle| !handle.content_loaded())
            .collect();

        host.events().publish(&mut ContentLoading {
            pending_modules: pending.iter().map(|h| h.id().to_string()).collect(),
        });

        for handle in pending {
            self.load_module_content(host, &handle);
        }
    }

    /// Run one module's content hook if it is active and has not run it yet
    fn load_module_content(&self, host: &ModuleHost, handle: &ModuleHandle) {
        if !handle.state().is_active() || handle.content_loaded() {
            return;
        }
        log::debug!("Loading content for module '{}'", handle.id());

        let ctx = ModuleContext::new(host, handle.id());
        match run_guarded(|| handle.behaviour().load_content(&ctx)) {
            Ok(()) => handle.set_content_loaded(true),
            Err(cause) => {
                log::error!(
                    "{}",
                    ModuleError::activation(handle.id(), "load_content", cause)
                );
                self.unload_module(host, handle);
            }
        }
    }

    // ---- unloading -----------------------------------------------------

    /// Unload a module and everything that allowed itself to be unloaded with it
    ///
    /// Placeholders and modules that are not active are left alone; a deferred
    /// module is withdrawn from the reliance graph instead. Never fails.
    pub fn unload_module(&self, host: &ModuleHost, handle: &ModuleHandle) {
        match handle.state() {
            ModuleState::Loaded | ModuleState::MarkedForUnload => {}
            ModuleState::Deferred => {
                self.resolver.borrow_mut().withdraw(handle.id());
                handle.set_state(ModuleState::Unloaded);
                log::info!("Withdrew deferred module '{}'", handle.id());
                return;
            }
            _ => return,
        }

        let id = handle.id().to_string();
        log::info!("Unloading module '{}'", id);
        handle.set_state(ModuleState::Unloading);

        let dependents = cascade_targets(handle, |other| self.loaded_module(other));
        for dependent in dependents {
            log::debug!("Module '{}' unloads dependent '{}'", id, dependent.id());
            self.unload_module(host, &dependent);
        }

        self.retract(host, handle);

        self.unloaded.borrow_mut().insert(id.clone());
        self.load_order.borrow_mut().retain(|loaded| *loaded != id);
        handle.set_state(ModuleState::Unloaded);
        handle.set_content_loaded(false);
        log::info!("Unloaded module '{}'", id);

        host.events().publish(&mut ModuleUnloaded { module_id: id });
    }

    /// Unload whatever a loadable refers to; placeholders are ignored
    pub fn unload_loadable(&self, host: &ModuleHost, loadable: &Loadable) {
        if let Loadable::Module(handle) = loadable {
            self.unload_module(host, handle);
        }
    }

    /// Unload the module known under `id`; false if there is none
    pub fn unload_by_id(&self, host: &ModuleHost, id: &str) -> bool {
        match self.known_module(&clean_id(id)) {
            Some(handle) => {
                self.unload_module(host, &handle);
                true
            }
            None => false,
        }
    }

    /// Remove the module's whole footprint, then run its unload hook
    fn retract(&self, host: &ModuleHost, handle: &ModuleHandle) {
        let id = handle.id();
        let entries = host.content().unregister_all_for_owner(id);
        let listeners = host.events().unsubscribe_all_for_owner(id);
        log::debug!(
            "Module '{}': removed {} content entries and {} listeners",
            id,
            entries,
            listeners
        );

        let ctx = ModuleContext::new(host, id);
        if let Err(cause) = run_guarded(|| handle.behaviour().unload(&ctx)) {
            log::error!("Module '{}' failed during unload: {}", id, cause);
        }
    }

    // ---- batches -------------------------------------------------------

    /// Queue an active module for the next `unload_marked`
    pub fn mark_for_unload(&self, handle: &ModuleHandle) -> bool {
        if handle.state() != ModuleState::Loaded {
            return false;
        }
        handle.set_state(ModuleState::MarkedForUnload);
        self.marked_for_unload.borrow_mut().push(handle.clone());
        true
    }

    /// Unload every marked module in the order they were marked
    pub fn unload_marked(&self, host: &ModuleHost) -> usize {
        let queue = self.marked_for_unload.take();
        let count = queue.len();
        for handle in queue {
            self.unload_module(host, &handle);
        }
        count
    }

    /// Queue a descriptor for the next `load_marked`
    pub fn mark_for_load(&self, descriptor: ModuleDescriptor) {
        self.marked_for_load.borrow_mut().push(descriptor);
    }

    /// Instantiate, load and load content for every queued descriptor
    pub fn load_marked(&self, host: &ModuleHost) -> Vec<ModuleHandle> {
        let queue = self.marked_for_load.take();
        let mut loaded = Vec::new();
        for descriptor in queue {
            let handle = match self.instantiate(&descriptor) {
                Ok(handle) => handle,
                Err(e) => {
                    log::error!("{}", e);
                    continue;
                }
            };
            match self.load_module(host, handle) {
                Ok(Some(handle)) => {
                    self.load_module_content(host, &handle);
                    loaded.push(handle);
                }
                Ok(None) => {}
                Err(e) => log::error!("{}", e),
            }
        }
        loaded
    }

    pub fn marked_for_unload_ids(&self) -> Vec<String> {
        self.marked_for_unload
            .borrow()
            .iter()
            .map(|handle| handle.id().to_string())
            .collect()
    }

    pub fn marked_for_load_count(&self) -> usize {
        self.marked_for_load.borrow().len()
    }

    /// Publish `HostShutdown`, then unload every module, newest first
    pub fn shutdown(&self, host: &ModuleHost, reason: Option<String>) {
        log::info!("Shutting down module host");
        host.events().publish(&mut HostShutdown { reason });

        let ids: Vec<String> = self.loaded_ids().into_iter().rev().collect();
        for id in ids {
            if let Some(handle) = self.loaded_module(&id) {
                self.unload_module(host, &handle);
            }
        }
        self.marked_for_unload.borrow_mut().clear();
        self.marked_for_load.borrow_mut().clear();
    }
}

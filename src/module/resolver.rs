//! Dependency Resolver
//!
//! Owns the reliance graph: for every id that something is waiting on, the
//! ordered list of loadables to attempt once that id finishes loading.
//!
//! The resolver only decides. It never calls module hooks or touches content;
//! the loader asks it what to do and acts on the answer, which keeps every
//! borrow of the graph short enough for nested loads to work.

use crate::module::error::{ModuleError, ModuleResult};
use crate::module::placeholder::Loadable;
use crate::module::record::ModuleHandle;
use crate::module::types::ModuleState;
use std::collections::BTreeMap;

/// Outcome of preparing a module for load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDecision {
    /// Every before-id is loaded; activate now
    Proceed,
    /// Some before-ids are not loaded yet
    Defer { waiting_on: Vec<String> },
}

/// The reliance graph and the load/unload ordering rules
#[derive(Debug, Default)]
pub struct DependencyResolver {
    graph: BTreeMap<String, Vec<Loadable>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `module` in the graph and decide whether it may activate
    ///
    /// `is_loaded` reports whether an id is currently loaded; `known` returns
    /// the record the host holds for an id, loaded or not.
    pub fn prepare_load<L, K>(
        &mut self,
        module: &ModuleHandle,
        is_loaded: L,
        known: K,
    ) -> ModuleResult<LoadDecision>
    where
        L: Fn(&str) -> bool,
        K: Fn(&str) -> Option<ModuleHandle>,
    {
        let id = module.id();
        check_cycles(module, &is_loaded, &known)?;

        self.resolve_forward_references(module);

        let waiting_on = self.register_waiting(module, &is_loaded);

        for after in module.after_ids() {
            let list = self.graph.entry(id.to_string()).or_default();
            if !list.iter().any(|entry| entry.id() == after) {
                list.push(Loadable::placeholder(after.clone()));
            }
        }

        if waiting_on.is_empty() {
            Ok(LoadDecision::Proceed)
        } else {
            log::debug!("Module '{}' deferred until {:?} load", id, waiting_on);
            Ok(LoadDecision::Defer { waiting_on })
        }
    }

    /// Put a deferred module back under each before-id that is not loaded
    ///
    /// A triggered list is taken whole, so a dependent that is still missing
    /// another before-id has to be registered again or nothing would ever
    /// attempt it.
    pub fn requeue<L>(&mut self, module: &ModuleHandle, is_loaded: L) -> Vec<String>
    where
        L: Fn(&str) -> bool,
    {
        self.register_waiting(module, &is_loaded)
    }

    fn register_waiting<L>(&mut self, module: &ModuleHandle, is_loaded: &L) -> Vec<String>
    where
        L: Fn(&str) -> bool,
    {
        let id = module.id();
        let waiting_on: Vec<String> = module
            .before_ids()
            .iter()
            .filter(|before| !is_loaded(before))
            .cloned()
            .collect();
        for before in &waiting_on {
            let list = self.graph.entry(before.clone()).or_default();
            if !list.iter().any(|entry| entry.id() == id) {
                list.push(Loadable::Module(module.clone()));
            }
        }
        waiting_on
    }

    /// Replace every placeholder for `module`'s id with the module itself
    fn resolve_forward_references(&mut self, module: &ModuleHandle) {
        let id = module.id();
        for list in self.graph.values_mut() {
            if !list.iter().any(|entry| entry.is_placeholder() && entry.id() == id) {
                continue;
            }
            let already_present = list
                .iter()
                .any(|entry| !entry.is_placeholder() && entry.id() == id);
            let mut replaced = already_present;
            list.retain_mut(|entry| {
                if entry.is_placeholder() && entry.id() == id {
                    if replaced {
                        return false;
                    }
                    *entry = Loadable::Module(module.clone());
                    replaced = true;
                }
                true
            });
        }
    }

    /// Remove and return everything waiting on `id`, in list order
    pub fn take_waiting(&mut self, id: &str) -> Vec<Loadable> {
        self.graph.remove(id).unwrap_or_default()
    }

    /// Remove a deferred module from every list, pruning emptied keys
    pub fn withdraw(&mut self, id: &str) -> usize {
        let mut removed = 0;
        for (key, list) in self.graph.iter_mut() {
            let before = list.len();
            list.retain(|entry| match entry {
                Loadable::Module(handle) => handle.id() != id,
                Loadable::Placeholder(_) => key != id,
            });
            removed += before - list.len();
        }
        self.graph.retain(|_, list| !list.is_empty());
        removed
    }

    /// Ids something is waiting on
    pub fn pending_ids(&self) -> Vec<String> {
        self.graph.keys().cloned().collect()
    }

    /// Ids of the loadables waiting on `id`, in list order
    pub fn waiting_on(&self, id: &str) -> Vec<String> {
        self.graph
            .get(id)
            .map(|list| list.iter().map(|entry| entry.id().to_string()).collect())
            .unwrap_or_default()
    }

    /// Whether `id` appears anywhere in the graph, as key or entry
    pub fn references(&self, id: &str) -> bool {
        self.graph
            .iter()
            .any(|(key, list)| key == id || list.iter().any(|entry| entry.id() == id))
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// Whether a triggered loadable should be activated now
///
/// Placeholders resolve to a known deferred module of the same id; anything
/// that is not deferred, or still has unloaded before-ids, is left alone.
pub fn ready_to_activate<L, K>(entry: &Loadable, is_loaded: L, known: K) -> Option<ModuleHandle>
where
    L: Fn(&str) -> bool,
    K: Fn(&str) -> Option<ModuleHandle>,
{
    let handle = match entry {
        Loadable::Module(handle) => handle.clone(),
        Loadable::Placeholder(placeholder) => known(placeholder.id())?,
    };
    if handle.state() != ModuleState::Deferred {
        return None;
    }
    if handle.before_ids().iter().all(|before| is_loaded(before)) {
        Some(handle)
    } else {
        None
    }
}

/// Modules to unload before `module` itself: active after-ids that allow it
pub fn cascade_targets<K>(module: &ModuleHandle, loaded: K) -> Vec<ModuleHandle>
where
    K: Fn(&str) -> Option<ModuleHandle>,
{
    module
        .after_ids()
        .iter()
        .filter_map(|after| loaded(after))
        .filter(|dependent| dependent.state().is_active() && dependent.allows_order_unload())
        .collect()
}

fn check_cycles<L, K>(module: &ModuleHandle, is_loaded: &L, known: &K) -> ModuleResult<()>
where
    L: Fn(&str) -> bool,
    K: Fn(&str) -> Option<ModuleHandle>,
{
    let id = module.id();
    if module.before_ids().iter().any(|before| before == id) {
        return Err(ModuleError::cyclic(
            id,
            format!("'{}' lists itself as a before-id", id),
        ));
    }
    if module.after_ids().iter().any(|after| after == id) {
        return Err(ModuleError::cyclic(
            id,
            format!("'{}' lists itself as an after-id", id),
        ));
    }
    for before in module.before_ids() {
        if is_loaded(before) {
            continue;
        }
        if let Some(other) = known(before) {
            if other.state() == ModuleState::Deferred
                && other.before_ids().iter().any(|back| back == id)
            {
                return Err(ModuleError::cyclic(
                    id,
                    format!("'{}' -> '{}' -> '{}'", id, before, id),
                ));
            }
        }
    }
    Ok(())
}

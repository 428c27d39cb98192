//! Live module records
//!
//! A record pairs a module's normalised metadata with its behaviour object and
//! lifecycle state. Records are shared through [`ModuleHandle`]s: the loader,
//! the reliance graph and callers all refer to the same record.

use crate::module::identifier::{clean_id, clean_ids};
use crate::module::traits::Module;
use crate::module::types::{ModuleInfo, ModuleState};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a module record
pub type ModuleHandle = Rc<ModuleRecord>;

/// A module instance known to the host
pub struct ModuleRecord {
    id: String,
    info: ModuleInfo,
    bundle: String,
    state: Cell<ModuleState>,
    content_loaded: Cell<bool>,
    behaviour: Box<dyn Module>,
}

impl ModuleRecord {
    /// Build a record, normalising the declared id and dependency ids
    pub fn new(info: ModuleInfo, bundle: impl Into<String>, behaviour: Box<dyn Module>) -> Self {
        let id = clean_id(&info.id);
        let info = ModuleInfo {
            before: clean_ids(&info.before),
            after: clean_ids(&info.after),
            ..info
        };
        Self {
            id,
            info,
            bundle: bundle.into(),
            state: Cell::new(ModuleState::Unloaded),
            content_loaded: Cell::new(false),
            behaviour,
        }
    }

    /// Build a shared handle
    pub fn handle(
        info: ModuleInfo,
        bundle: impl Into<String>,
        behaviour: Box<dyn Module>,
    ) -> ModuleHandle {
        Rc::new(Self::new(info, bundle, behaviour))
    }

    /// Clean identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    pub fn before_ids(&self) -> &[String] {
        &self.info.before
    }

    pub fn after_ids(&self) -> &[String] {
        &self.info.after
    }

    pub fn allows_order_unload(&self) -> bool {
        self.info.allow_order_unload
    }

    pub fn state(&self) -> ModuleState {
        self.state.get()
    }

    pub(crate) fn set_state(&self, state: ModuleState) {
        log::trace!("Module '{}': {} -> {}", self.id, self.state.get(), state);
        self.state.set(state);
    }

    pub fn content_loaded(&self) -> bool {
        self.content_loaded.get()
    }

    pub(crate) fn set_content_loaded(&self, loaded: bool) {
        self.content_loaded.set(loaded);
    }

    pub(crate) fn behaviour(&self) -> &dyn Module {
        self.behaviour.as_ref()
    }
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("id", &self.id)
            .field("bundle", &self.bundle)
            .field("state", &self.state.get())
            .field("before", &self.info.before)
            .field("after", &self.info.after)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::context::ModuleContext;
    use crate::module::traits::HookResult;

    struct Noop;

    impl Module for Noop {
        fn load(&self, _ctx: &ModuleContext) -> HookResult {
            Ok(())
        }
    }

    #[test]
    fn test_record_normalises_ids() {
        let info = ModuleInfo::new("  net  tools ")
            .before([" core ", "", "core"])
            .after(["disk io"]);
        let record = ModuleRecord::new(info, "bundle", Box::new(Noop));

        assert_eq!(record.id(), "net_tools");
        assert_eq!(record.before_ids(), ["core".to_string()]);
        assert_eq!(record.after_ids(), ["disk_io".to_string()]);
        assert_eq!(record.state(), ModuleState::Unloaded);
        assert!(!record.content_loaded());
    }
}

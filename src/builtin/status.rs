//! Status module
//!
//! Adds a `status` command summarising the host: API version, loaded modules,
//! content per kind and how many load/unload events the module has observed.

use crate::content::kinds::ContentKind;
use crate::events::bus::ListenerOptions;
use crate::events::lifecycle::{ModuleLoaded, ModuleUnloaded};
use crate::module::context::ModuleContext;
use crate::module::traits::{HookResult, Module};
use crate::module::types::{ModuleDescriptor, ModuleInfo};
use std::cell::Cell;
use std::rc::Rc;
use strum::IntoEnumIterator;

crate::module!(|| ModuleDescriptor::new(
    super::BUNDLE,
    StatusModule::static_module_info(),
    || Ok(Box::new(StatusModule::new()) as Box<dyn Module>),
));

#[derive(Debug, Default)]
struct Counters {
    loaded: Cell<usize>,
    unloaded: Cell<usize>,
}

/// Reports host status on demand
#[derive(Debug, Default)]
pub struct StatusModule {
    counters: Rc<Counters>,
}

impl StatusModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn static_module_info() -> ModuleInfo {
        ModuleInfo::new("status")
            .with_name("Status")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_author("modhost")
            .with_description("Reports loaded modules and registered content")
    }
}

impl Module for StatusModule {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        let counters = self.counters.clone();
        ctx.subscribe(
            ListenerOptions::default().named("status: count loads"),
            move |_: &mut ModuleLoaded| {
                counters.loaded.set(counters.loaded.get() + 1);
                Ok(())
            },
        );

        let counters = self.counters.clone();
        ctx.subscribe(
            ListenerOptions::default().named("status: count unloads"),
            move |_: &mut ModuleUnloaded| {
                counters.unloaded.set(counters.unloaded.get() + 1);
                Ok(())
            },
        );

        let weak = ctx.host().downgrade();
        let counters = self.counters.clone();
        ctx.register_command(
            "status",
            move |_args: &[String]| {
                let host = weak.upgrade().ok_or("host is gone")?;
                let loaded = host.loaded_ids();

                let mut lines = vec![
                    format!("API version: {}", crate::core::version::get_api_version()),
                    format!("Loaded modules ({}): {}", loaded.len(), loaded.join(", ")),
                ];
                let pending = host.pending_ids();
                if !pending.is_empty() {
                    lines.push(format!("Waiting on: {}", pending.join(", ")));
                }
                for kind in ContentKind::iter() {
                    lines.push(format!(
                        "{}: {}",
                        kind.plural(),
                        host.content().keys(kind).len()
                    ));
                }
                lines.push(format!(
                    "Observed {} load(s) and {} unload(s)",
                    counters.loaded.get(),
                    counters.unloaded.get()
                ));
                Ok(lines)
            },
            "Show module host status",
            true,
        )?;

        log::debug!("Status module ready");
        Ok(())
    }

    fn unload(&self, _ctx: &ModuleContext) -> HookResult {
        self.counters.loaded.set(0);
        self.counters.unloaded.set(0);
        Ok(())
    }
}

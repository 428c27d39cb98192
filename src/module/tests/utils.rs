//! Module Test Utilities
//!
//! Mock modules and helpers shared by the module system test suites.

use crate::content::kinds::PortDefinition;
use crate::events::bus::ListenerOptions;
use crate::events::lifecycle::{ContentLoading, ModuleLoaded, ModuleUnloaded};
use crate::module::context::ModuleContext;
use crate::module::error::ModuleResult;
use crate::module::host::ModuleHost;
use crate::module::identifier::HOST_OWNER_ID;
use crate::module::record::{ModuleHandle, ModuleRecord};
use crate::module::traits::{HookResult, Module};
use crate::module::types::{ModuleDescriptor, ModuleInfo};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, ordered record of hook calls such as `"A:load"`
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

/// Journal entries for one hook, in call order, e.g. every `unload`
pub fn calls(journal: &Journal, hook: &str) -> Vec<String> {
    let suffix = format!(":{}", hook);
    journal
        .borrow()
        .iter()
        .filter_map(|entry| entry.strip_suffix(&suffix).map(String::from))
        .collect()
}

/// Configurable mock module
///
/// On `load` it registers a command named `<id>_cmd` and one `ContentLoading`
/// listener; on `load_content` it registers a port named `port`.
#[derive(Debug, Clone)]
pub struct MockModule {
    pub id: String,
    pub journal: Journal,
    pub command: Option<String>,
    pub fail_load: bool,
    pub panic_load: bool,
    pub fail_content: bool,
    pub fail_unload: bool,
}

impl MockModule {
    pub fn new(id: &str, journal: &Journal) -> Self {
        Self {
            id: id.to_string(),
            journal: journal.clone(),
            command: Some(format!("{}_cmd", id)),
            fail_load: false,
            panic_load: false,
            fail_content: false,
            fail_unload: false,
        }
    }

    pub fn with_command(mut self, name: &str) -> Self {
        self.command = Some(name.to_string());
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn panicking_load(mut self) -> Self {
        self.panic_load = true;
        self
    }

    pub fn failing_content(mut self) -> Self {
        self.fail_content = true;
        self
    }

    pub fn failing_unload(mut self) -> Self {
        self.fail_unload = true;
        self
    }

    fn record(&self, hook: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{}", self.id, hook));
    }
}

impl Module for MockModule {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        self.record("load");

        if let Some(name) = &self.command {
            let id = self.id.clone();
            ctx.register_command(
                name,
                move |args: &[String]| Ok(vec![format!("{} {}", id, args.join(" "))]),
                "mock command",
                false,
            )?;
        }

        let journal = self.journal.clone();
        let id = self.id.clone();
        ctx.subscribe(ListenerOptions::default(), move |_: &mut ContentLoading| {
            journal.borrow_mut().push(format!("{}:content_event", id));
            Ok(())
        });

        if self.panic_load {
            panic!("{} exploded", self.id);
        }
        if self.fail_load {
            return Err(format!("{} refused to load", self.id).into());
        }
        Ok(())
    }

    fn load_content(&self, ctx: &ModuleContext) -> HookResult {
        self.record("content");
        ctx.register_port("port", PortDefinition::new(&self.id, 1))?;
        if self.fail_content {
            return Err(format!("{} has broken content", self.id).into());
        }
        Ok(())
    }

    fn unload(&self, _ctx: &ModuleContext) -> HookResult {
        self.record("unload");
        if self.fail_unload {
            return Err(format!("{} failed to clean up", self.id).into());
        }
        Ok(())
    }
}

pub fn handle(info: ModuleInfo, module: MockModule) -> ModuleHandle {
    ModuleRecord::handle(info, "test", Box::new(module))
}

/// Load a plain mock module with the given ordering info
pub fn load(
    host: &ModuleHost,
    journal: &Journal,
    info: ModuleInfo,
) -> ModuleResult<Option<ModuleHandle>> {
    let module = MockModule::new(&info.id, journal);
    host.load_module(handle(info, module))
}

pub fn descriptor(bundle: &str, info: ModuleInfo, module: MockModule) -> ModuleDescriptor {
    ModuleDescriptor::new(bundle, info, move || {
        Ok(Box::new(module.clone()) as Box<dyn Module>)
    })
}

/// Content entries plus listeners owned by `id`
pub fn footprint(host: &ModuleHost, id: &str) -> usize {
    host.content().total_for_owner(id) + host.events().owner_listener_count(id)
}

/// Record every `ModuleLoaded`/`ModuleUnloaded` as `"+id"`/`"-id"`
pub fn watch_lifecycle(host: &ModuleHost) -> Journal {
    let seen = journal();

    let loaded = seen.clone();
    host.events().subscribe(
        HOST_OWNER_ID,
        ListenerOptions::default(),
        move |event: &mut ModuleLoaded| {
            loaded.borrow_mut().push(format!("+{}", event.module_id));
            Ok(())
        },
    );

    let unloaded = seen.clone();
    host.events().subscribe(
        HOST_OWNER_ID,
        ListenerOptions::default(),
        move |event: &mut ModuleUnloaded| {
            unloaded.borrow_mut().push(format!("-{}", event.module_id));
            Ok(())
        },
    );

    seen
}

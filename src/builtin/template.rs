//! Template module
//!
//! A reference module that touches every part of the module API: prioritised
//! listeners, a command listener, and one piece of content of every kind
//! registered during the content phase.

use crate::content::kinds::{
    Condition, DaemonDefinition, ExtensionDefinition, PortDefinition,
};
use crate::events::bus::ListenerOptions;
use crate::events::lifecycle::{CommandSent, ContentLoading};
use crate::module::context::ModuleContext;
use crate::module::storage::{from_element, write_element};
use crate::module::traits::{HookResult, Module};
use crate::module::types::{ElementInfo, ModuleDescriptor, ModuleInfo};
use std::cell::RefCell;
use std::rc::Rc;

crate::module!(|| ModuleDescriptor::new(
    super::BUNDLE,
    TemplateModule::static_module_info(),
    || Ok(Box::new(TemplateModule::new()) as Box<dyn Module>),
));

/// Declared id; normalised to `Template_Mod`
pub const TEMPLATE_ID: &str = "Template Mod";

/// Condition that holds when its `Flag` attribute is set
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlagCondition {
    pub flag: Option<String>,
}

crate::attribute_storage!(FlagCondition as "TemplateFlag" {
    flag => "Flag",
});

impl Condition for FlagCondition {
    fn check(&self) -> bool {
        self.flag.as_deref().is_some_and(|flag| !flag.is_empty())
    }

    fn save_string(&self) -> String {
        write_element(self)
    }
}

/// Template module showing how modules use the host
#[derive(Debug, Default)]
pub struct TemplateModule {
    /// Messages from the content-phase listeners, in the order they ran
    trace: Rc<RefCell<Vec<String>>>,
}

impl TemplateModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn static_module_info() -> ModuleInfo {
        ModuleInfo::new(TEMPLATE_ID)
            .with_name("Template")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_author("modhost")
            .with_description("Example module registering one of every content kind")
            .after([super::companion::COMPANION_ID])
    }

    /// Shared view of the listener trace
    pub fn trace(&self) -> Rc<RefCell<Vec<String>>> {
        self.trace.clone()
    }
}

impl Module for TemplateModule {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        log::debug!("Loading template module");

        let trace = self.trace.clone();
        ctx.subscribe(
            ListenerOptions::with_priority(1).named("template: priority one"),
            move |_: &mut ContentLoading| {
                log::info!("I should run second");
                trace.borrow_mut().push("second".to_string());
                Ok(())
            },
        );

        let trace = self.trace.clone();
        ctx.subscribe(
            ListenerOptions::with_priority(2).named("template: priority two"),
            move |_: &mut ContentLoading| {
                log::info!("I should run first");
                trace.borrow_mut().push("first".to_string());
                Ok(())
            },
        );

        ctx.subscribe(
            ListenerOptions::default().named("template: command echo"),
            |event: &mut CommandSent| {
                log::info!("command {}", event.args.join(" "));
                Ok(())
            },
        );

        log::info!("Loading finished");
        Ok(())
    }

    fn load_content(&self, ctx: &ModuleContext) -> HookResult {
        ctx.register_executable("TempExe", "Template executable", |args: &[String]| {
            log::info!("Template exe updating");
            Ok(vec![format!("TempExe ran with {} argument(s)", args.len())])
        })?;

        let port = ctx.register_port("tempPort", PortDefinition::new("TemplateName", 4))?;
        log::info!("added {} to host", port);

        let daemon = ctx.register_daemon(
            "tempdae",
            DaemonDefinition {
                display_name: "TempDae".to_string(),
                description: "Template daemon".to_string(),
            },
        )?;
        log::info!("full id {}", daemon);

        let extension = ctx.register_extension(
            "tempext",
            ExtensionDefinition {
                title: "Temp Extension".to_string(),
                description: "A temporary extension".to_string(),
            },
        )?;
        log::info!("full id {}", extension);

        ctx.register_condition("TemplateFlag", |element: &ElementInfo| {
            Ok(Box::new(from_element::<FlagCondition>(element)) as Box<dyn Condition>)
        })?;

        Ok(())
    }

    fn unload(&self, _ctx: &ModuleContext) -> HookResult {
        log::info!("Unloading template module");
        Ok(())
    }
}

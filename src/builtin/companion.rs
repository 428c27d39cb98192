//! Companion module
//!
//! Waits for the template module before activating and may be unloaded along
//! with it. Exercises deferred loading and cascading unload in the built-in
//! bundle.

use crate::module::context::ModuleContext;
use crate::module::traits::{HookResult, Module};
use crate::module::types::{ModuleDescriptor, ModuleInfo};

crate::module!(|| ModuleDescriptor::new(
    super::BUNDLE,
    CompanionModule::static_module_info(),
    || Ok(Box::new(CompanionModule) as Box<dyn Module>),
));

pub const COMPANION_ID: &str = "template-companion";

/// Adds the `companion` command once the template module is loaded
#[derive(Debug, Default)]
pub struct CompanionModule;

impl CompanionModule {
    pub fn static_module_info() -> ModuleInfo {
        ModuleInfo::new(COMPANION_ID)
            .with_name("Template Companion")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_author("modhost")
            .with_description("Runs the template executable on request")
            .before([super::template::TEMPLATE_ID])
            .allow_order_unload(true)
    }
}

impl Module for CompanionModule {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        let weak = ctx.host().downgrade();
        ctx.register_command(
            "companion",
            move |args: &[String]| {
                let host = weak.upgrade().ok_or("host is gone")?;
                let key = host
                    .content()
                    .executables
                    .keys()
                    .into_iter()
                    .find(|key| key.ends_with(".TempExe"))
                    .ok_or("template executable is not registered yet")?;
                let executable = host
                    .content()
                    .executables
                    .lookup(&key)
                    .ok_or("template executable disappeared")?;
                (executable.handler)(args)
            },
            "Run the template executable",
            true,
        )?;
        Ok(())
    }
}

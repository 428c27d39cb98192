//! Modules defined outside the crate, using only the public API

use modhost::events::api::{ListenerOptions, ModuleLoaded};
use modhost::module::api::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Provides a greeting other modules build on
struct Greeter;

impl Module for Greeter {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        ctx.register_command(
            "greet",
            |args: &[String]| Ok(vec![format!("hello {}", args.join(" "))]),
            "Say hello",
            true,
        )?;
        Ok(())
    }
}

/// Waits for the greeter and watches what loads after it
struct Audience {
    seen: Rc<RefCell<Vec<String>>>,
}

impl Module for Audience {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        let seen = self.seen.clone();
        ctx.subscribe(
            ListenerOptions::default().named("audience"),
            move |event: &mut ModuleLoaded| {
                seen.borrow_mut().push(event.module_id.clone());
                Ok(())
            },
        );
        let weak = ctx.host().downgrade();
        ctx.register_command(
            "cheer",
            move |_args: &[String]| {
                let host = weak.upgrade().ok_or("host is gone")?;
                let mut output = host.execute_line("greet everyone")?;
                output.push("hooray".to_string());
                Ok(output)
            },
            "Greet everyone loudly",
            false,
        )?;
        Ok(())
    }
}

fn greeter_info() -> ModuleInfo {
    ModuleInfo::new("greeter").after(["audience"])
}

fn audience_info() -> ModuleInfo {
    ModuleInfo::new("audience")
        .before(["greeter"])
        .allow_order_unload(true)
}

#[test]
fn test_dependent_module_waits_for_provider() {
    let host = ModuleHost::default();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let audience = host
        .load_module(ModuleRecord::handle(
            audience_info(),
            "external",
            Box::new(Audience { seen: seen.clone() }),
        ))
        .unwrap()
        .unwrap();
    assert_eq!(audience.state(), ModuleState::Deferred);
    assert!(host.execute_line("cheer").is_err());

    host.load_module(ModuleRecord::handle(greeter_info(), "external", Box::new(Greeter)))
        .unwrap();

    assert_eq!(audience.state(), ModuleState::Loaded);
    assert_eq!(
        host.execute_line("cheer").unwrap(),
        vec!["hello everyone", "hooray"]
    );
    // Subscribed during its own activation, so it sees itself load
    assert_eq!(*seen.borrow(), vec!["audience"]);
}

#[test]
fn test_unloading_provider_takes_dependent_along() {
    let host = ModuleHost::default();
    let source = StaticSource::new()
        .with(ModuleDescriptor::new("external", greeter_info(), || {
            Ok(Box::new(Greeter) as Box<dyn Module>)
        }))
        .with(ModuleDescriptor::new("external", audience_info(), || {
            Ok(Box::new(Audience {
                seen: Rc::new(RefCell::new(Vec::new())),
            }) as Box<dyn Module>)
        }));

    host.load_all(&source);
    assert_eq!(host.loaded_ids(), vec!["greeter", "audience"]);

    assert!(host.unload_by_id("greeter"));

    assert!(host.loaded_ids().is_empty());
    assert_eq!(host.unloaded_ids(), vec!["audience", "greeter"]);
    assert_eq!(host.content().commands.keys(), vec!["help", "modules"]);
    assert_eq!(host.events().owner_listener_count("audience"), 0);
}

#[test]
fn test_host_is_dropped_with_modules_loaded() {
    let weak = {
        let host = ModuleHost::default();
        host.load_module(ModuleRecord::handle(greeter_info(), "external", Box::new(Greeter)))
            .unwrap();
        host.downgrade()
    };
    assert!(weak.upgrade().is_none());
}

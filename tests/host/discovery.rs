//! Compiled-in and runtime module sources

use modhost::module::api::*;

struct Probe;

impl Module for Probe {
    fn load(&self, ctx: &ModuleContext) -> HookResult {
        ctx.register_command("probe", |_args: &[String]| Ok(vec!["ok".to_string()]), "", false)?;
        Ok(())
    }
}

modhost::module!(|| ModuleDescriptor::new(
    "integration",
    ModuleInfo::new("probe")
        .with_version("1.2.3")
        .before(["status"]),
    || Ok(Box::new(Probe) as Box<dyn Module>),
));

#[test]
fn test_compiled_modules_include_every_bundle() {
    let descriptors = get_all_compiled_modules();
    let mut ids: Vec<(String, String)> = descriptors
        .iter()
        .map(|d| (d.bundle.clone(), d.info.id.clone()))
        .collect();
    ids.sort();

    assert!(ids.contains(&("integration".to_string(), "probe".to_string())));
    assert!(ids.contains(&("builtin".to_string(), "status".to_string())));
    assert!(InventorySource::new()
        .locations()
        .contains(&"integration".to_string()));
}

#[test]
fn test_probe_waits_for_builtin_status() {
    let host = ModuleHost::default();

    host.load_all(&InventorySource::with_bundles(vec!["integration".to_string()]));
    assert_eq!(host.module_state("probe"), Some(ModuleState::Deferred));
    assert_eq!(host.pending_ids(), vec!["status"]);

    host.load_from_binary(&InventorySource::new(), "builtin", Some("status"));

    assert_eq!(host.loaded_ids(), vec!["status", "probe"]);
    assert_eq!(host.execute_line("probe").unwrap(), vec!["ok"]);
}

#[test]
fn test_disabled_bundle_is_not_discovered() {
    let host = ModuleHost::default();
    let source = InventorySource::with_bundles(vec!["builtin".to_string()]);

    assert!(source.discover("integration").is_err());
    assert!(host.load_from_binary(&source, "integration", None).is_empty());
    assert!(host.known_module("probe").is_none());
}

#[test]
fn test_batch_load_from_descriptors() {
    let host = ModuleHost::default();
    host.load_content();

    for descriptor in get_all_compiled_modules()
        .into_iter()
        .filter(|d| d.bundle == "builtin")
    {
        host.mark_for_load(descriptor);
    }
    let loaded = host.load_marked();

    assert_eq!(loaded.len(), 3);
    assert!(loaded.iter().all(|h| h.bundle() == "builtin"));
    assert!(host.content().ports.contains_key("Template_Mod.tempPort"));

    let status = host.loaded_module("status").unwrap();
    assert!(host.mark_for_unload(&status));
    assert_eq!(host.unload_marked(), 1);
    assert!(host.execute_line("status").is_err());
}

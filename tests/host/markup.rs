//! Module metadata and conditions described by markup elements

use modhost::attribute_storage;
use modhost::content::api::Condition;
use modhost::module::api::*;

#[test]
fn test_module_info_from_element() {
    let element = ElementInfo::new("Module")
        .with_attribute("id", "Fancy Module")
        .with_attribute("version", "2.0.0")
        .with_attribute("before", "base, other ,")
        .with_attribute("after", "extra")
        .with_attribute("allow-order-unload", "yes");

    let info = ModuleInfo::from_element(&element).unwrap();
    let record = ModuleRecord::new(info, "markup", Box::new(Idle));

    assert_eq!(record.id(), "Fancy_Module");
    assert_eq!(record.info().version, "2.0.0");
    assert_eq!(record.before_ids(), ["base", "other"]);
    assert_eq!(record.after_ids(), ["extra"]);
    assert!(record.allows_order_unload());
}

#[test]
fn test_module_info_requires_id() {
    let result = ModuleInfo::from_element(&ElementInfo::new("Module"));
    assert!(matches!(result, Err(ModuleError::InvalidIdentifier { .. })));
}

struct Idle;

impl Module for Idle {
    fn load(&self, _ctx: &ModuleContext) -> HookResult {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FileExists {
    path: Option<String>,
    computer: Option<String>,
}

attribute_storage!(FileExists as "FileExists" {
    path => "Path",
    computer => "Computer",
});

impl Condition for FileExists {
    fn check(&self) -> bool {
        self.path.is_some()
    }

    fn save_string(&self) -> String {
        write_element(self)
    }
}

struct Conditions;

impl Module for Conditions {
    fn load(&self, _ctx: &ModuleContext) -> HookResult {
        Ok(())
    }

    fn load_content(&self, ctx: &ModuleContext) -> HookResult {
        ctx.register_condition("FileExists", |element: &ElementInfo| {
            Ok(Box::new(from_element::<FileExists>(element)) as Box<dyn Condition>)
        })?;
        Ok(())
    }
}

#[test]
fn test_condition_built_from_markup_and_saved_back() {
    let host = ModuleHost::default();
    host.load_module(ModuleRecord::handle(
        ModuleInfo::new("conditions"),
        "markup",
        Box::new(Conditions),
    ))
    .unwrap();
    host.load_content();

    let element = ElementInfo::new("FileExists")
        .with_attribute("Path", "a<b>&\"c\"")
        .with_attribute("Ignored", "x");
    let condition = host.content().build_condition(&element).unwrap().unwrap();

    assert!(condition.check());
    assert_eq!(
        condition.save_string(),
        r#"<FileExists Path="a&lt;b&gt;&amp;&quot;c&quot;"/>"#
    );

    let empty = to_element(&FileExists::default());
    assert_eq!(empty, ElementInfo::new("FileExists"));

    host.unload_by_id("conditions");
    assert!(host.content().build_condition(&element).is_none());
}

//! Type definitions for the module system
//!
//! Declared module metadata, lifecycle states, the key/value element shape
//! produced by the markup reader, and the descriptors handed out by binary
//! discovery.

use crate::core::error_handling::BoxedError;
use crate::module::error::{ModuleError, ModuleResult};
use crate::module::identifier::clean_ids;
use crate::module::traits::Module;
use std::fmt;
use std::rc::Rc;
use strum_macros::{Display, EnumIter};

/// Declared module metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleInfo {
    /// Raw declared id; the host normalises it before use
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    /// Ids that must be loaded before this module activates
    pub before: Vec<String>,
    /// Ids this module depends on at unload time
    pub after: Vec<String>,
    /// Whether this module may be unloaded as a consequence of another unload
    pub allow_order_unload: bool,
}

impl ModuleInfo {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            version: "0.0.0".to_string(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn before<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn after<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn allow_order_unload(mut self, allowed: bool) -> Self {
        self.allow_order_unload = allowed;
        self
    }

    /// Read metadata from a markup element
    ///
    /// Recognised attributes: `id` (required), `name`, `version`, `author`,
    /// `description`, `before` and `after` (comma separated) and
    /// `allow-order-unload` (`true`/`false`).
    pub fn from_element(element: &ElementInfo) -> ModuleResult<Self> {
        let id = element
            .attribute("id")
            .ok_or_else(|| {
                ModuleError::invalid_identifier(
                    "",
                    format!("<{}> element has no 'id' attribute", element.name),
                )
            })?
            .to_string();

        let mut info = ModuleInfo::new(id);
        if let Some(name) = element.attribute("name") {
            info.name = name.to_string();
        }
        if let Some(version) = element.attribute("version") {
            info.version = version.to_string();
        }
        if let Some(author) = element.attribute("author") {
            info.author = author.to_string();
        }
        if let Some(description) = element.attribute("description") {
            info.description = description.to_string();
        }
        if let Some(before) = element.attribute("before") {
            info.before = clean_ids(before.split(','));
        }
        if let Some(after) = element.attribute("after") {
            info.after = clean_ids(after.split(','));
        }
        if let Some(flag) = element.attribute("allow-order-unload") {
            info.allow_order_unload = match flag.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => true,
                "false" | "no" | "0" => false,
                other => {
                    log::warn!(
                        "Module '{}': ignoring allow-order-unload value '{}'",
                        info.id,
                        other
                    );
                    false
                }
            };
        }
        Ok(info)
    }
}

/// Lifecycle state of a module record
#[derive(Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum ModuleState {
    Unloaded,
    /// Waiting for before-ids; no registry or listener footprint
    Deferred,
    Loading,
    Loaded,
    MarkedForUnload,
    Unloading,
}

impl ModuleState {
    /// Loaded and not yet being torn down
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Loaded | Self::MarkedForUnload)
    }
}

/// A markup element reduced to its name and attributes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementInfo {
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
}

impl ElementInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Creates a module's behaviour object
pub type ModuleFactory = Rc<dyn Fn() -> Result<Box<dyn Module>, BoxedError>>;

/// A module found in a binary, ready to be instantiated
#[derive(Clone)]
pub struct ModuleDescriptor {
    /// Name of the binary (bundle) that provides the module
    pub bundle: String,
    pub info: ModuleInfo,
    /// Module API version the module was built against
    pub api_version: u32,
    pub factory: ModuleFactory,
}

impl ModuleDescriptor {
    pub fn new<F>(bundle: impl Into<String>, info: ModuleInfo, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Module>, BoxedError> + 'static,
    {
        Self {
            bundle: bundle.into(),
            info,
            api_version: crate::core::version::get_api_version(),
            factory: Rc::new(factory),
        }
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("bundle", &self.bundle)
            .field("info", &self.info)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

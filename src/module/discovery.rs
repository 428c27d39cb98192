//! Module Discovery
//!
//! A [`BinarySource`] knows a set of locations (bundles) and can list the
//! module descriptors each one provides. Two sources ship with the host:
//!
//! - [`InventorySource`]: modules compiled into the executable, registered with
//!   the [`module!`](crate::module!) macro
//! - [`StaticSource`]: descriptors supplied at runtime, for embedding hosts and tests

use crate::module::error::{ModuleError, ModuleResult};
use crate::module::types::ModuleDescriptor;

/// Somewhere module descriptors can be discovered
pub trait BinarySource {
    /// Every location this source can discover modules in
    fn locations(&self) -> Vec<String>;

    /// Descriptors provided by one location
    fn discover(&self, location: &str) -> ModuleResult<Vec<ModuleDescriptor>>;
}

/// Entry for a compiled-in module in the inventory registry
pub struct ModuleEntry {
    pub factory: fn() -> ModuleDescriptor,
}

inventory::collect!(ModuleEntry);

/// Register a compiled-in module
///
/// The argument is a `fn() -> ModuleDescriptor`; the descriptor's `bundle`
/// decides which location the module is discovered under.
#[macro_export]
macro_rules! module {
    ($factory_expr:expr) => {
        inventory::submit!($crate::module::api::ModuleEntry {
            factory: $factory_expr
        });
    };
}

/// Every compiled-in module descriptor
pub fn get_all_compiled_modules() -> Vec<ModuleDescriptor> {
    inventory::iter::<ModuleEntry>()
        .map(|entry| (entry.factory)())
        .collect()
}

/// Modules compiled into the executable, grouped by bundle
#[derive(Debug, Clone, Default)]
pub struct InventorySource {
    /// Restrict discovery to these bundles; empty means all
    bundles: Vec<String>,
}

impl InventorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundles(bundles: Vec<String>) -> Self {
        Self { bundles }
    }

    fn includes(&self, bundle: &str) -> bool {
        self.bundles.is_empty() || self.bundles.iter().any(|b| b == bundle)
    }
}

impl BinarySource for InventorySource {
    fn locations(&self) -> Vec<String> {
        let mut locations: Vec<String> = get_all_compiled_modules()
            .into_iter()
            .map(|descriptor| descriptor.bundle)
            .filter(|bundle| self.includes(bundle))
            .collect();
        locations.sort();
        locations.dedup();
        locations
    }

    fn discover(&self, location: &str) -> ModuleResult<Vec<ModuleDescriptor>> {
        if !self.includes(location) {
            return Err(ModuleError::binary_load(location, "bundle is not enabled"));
        }
        let descriptors: Vec<ModuleDescriptor> = get_all_compiled_modules()
            .into_iter()
            .filter(|descriptor| descriptor.bundle == location)
            .collect();
        if descriptors.is_empty() {
            return Err(ModuleError::binary_load(location, "no such bundle"));
        }
        Ok(descriptors)
    }
}

/// Descriptors supplied at runtime
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    bundles: Vec<(String, Vec<ModuleDescriptor>)>,
    broken: Vec<(String, String)>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor under its own bundle name
    pub fn add(&mut self, descriptor: ModuleDescriptor) -> &mut Self {
        match self
            .bundles
            .iter()
            .position(|(bundle, _)| *bundle == descriptor.bundle)
        {
            Some(index) => self.bundles[index].1.push(descriptor),
            None => self
                .bundles
                .push((descriptor.bundle.clone(), vec![descriptor])),
        }
        self
    }

    pub fn with(mut self, descriptor: ModuleDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    /// Register a location whose discovery always fails
    pub fn with_broken(mut self, location: impl Into<String>, cause: impl Into<String>) -> Self {
        self.broken.push((location.into(), cause.into()));
        self
    }
}

impl BinarySource for StaticSource {
    fn locations(&self) -> Vec<String> {
        self.bundles
            .iter()
            .map(|(bundle, _)| bundle.clone())
            .chain(self.broken.iter().map(|(location, _)| location.clone()))
            .collect()
    }

    fn discover(&self, location: &str) -> ModuleResult<Vec<ModuleDescriptor>> {
        if let Some((_, cause)) = self.broken.iter().find(|(l, _)| l == location) {
            return Err(ModuleError::binary_load(location, cause.clone()));
        }
        self.bundles
            .iter()
            .find(|(bundle, _)| bundle == location)
            .map(|(_, descriptors)| descriptors.clone())
            .ok_or_else(|| ModuleError::binary_load(location, "no such bundle"))
    }
}

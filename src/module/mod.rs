//! Module System
//!
//! Discovers, loads, activates and unloads modules, resolves the ordering
//! constraints between them and tracks everything they register so it can be
//! retracted on unload.

// Internal modules - all access should go through api module
pub(crate) mod context;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod host;
pub(crate) mod identifier;
pub(crate) mod loader;
pub(crate) mod placeholder;
pub(crate) mod record;
pub(crate) mod resolver;
pub(crate) mod storage;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the module system
pub mod api;

#[cfg(test)]
mod tests;

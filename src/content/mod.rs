//! Owner-tagged content registries
//!
//! Modules register commands, ports, daemons, executables, extensions and
//! conditions here while they are active; the host retracts everything a
//! module owns when it unloads.

// Internal modules - all access should go through api module
pub(crate) mod commands;
pub(crate) mod kinds;
pub(crate) mod registry;

// Public API module - the only public interface for content registries
pub mod api;

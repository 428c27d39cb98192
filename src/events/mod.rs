//! Typed event bus and the lifecycle events published by the host

// Internal modules - all access should go through api module
pub(crate) mod bus;
pub(crate) mod lifecycle;

// Public API module - the only public interface for the event system
pub mod api;

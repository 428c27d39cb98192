//! Public API for the event system
//!
//! External code should import from here rather than directly from internal modules.

// Bus and subscription handling
pub use crate::events::bus::{
    DispatchSummary, EventBus, ListenerId, ListenerInfo, ListenerOptions, ListenerResult,
};

// Events published by the host
pub use crate::events::lifecycle::{
    CommandSent, ContentLoading, HostShutdown, ModuleLoaded, ModuleUnloaded,
};

//! Events published by the module host
//!
//! Modules subscribe to these through their context to react to host phases.

/// A module finished loading and is now active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLoaded {
    pub module_id: String,
}

/// A module was torn down and its footprint retracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleUnloaded {
    pub module_id: String,
}

/// The host is entering its content phase
///
/// Published once per call to `load_content`, before any module content hook runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLoading {
    /// Modules whose content hook is about to run
    pub pending_modules: Vec<String>,
}

/// A command line is about to be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSent {
    /// Full command line, command name first
    pub args: Vec<String>,
    /// Set by a listener to stop the command from running
    pub cancelled: bool,
}

impl CommandSent {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            cancelled: false,
        }
    }

    pub fn command(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// The host is shutting down; every loaded module is about to be unloaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostShutdown {
    pub reason: Option<String>,
}

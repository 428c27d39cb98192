//! Module Trait
//!
//! The interface every module implements. The host drives a module through
//! three hooks:
//!
//! - `load`: activation. Subscribe listeners and register content that must
//!   exist as soon as the module is active.
//! - `load_content`: the host content phase. Runs once per activation, either
//!   when the host enters its content phase or immediately after `load` if the
//!   host is already past it.
//! - `unload`: deactivation. By the time it runs the host has already removed
//!   every registry entry and listener the module owns.
//!
//! Hooks take `&self`; modules that keep state between hooks use interior
//! mutability. Hooks may return any error (including registration errors via
//! `?`); the host treats an error or panic from `load` or `load_content` as an
//! activation failure and rolls the module back.

use crate::core::error_handling::BoxedError;
use crate::module::context::ModuleContext;

/// Result returned by module hooks
pub type HookResult = Result<(), BoxedError>;

/// Base trait that all modules must implement
pub trait Module {
    /// Activate the module
    fn load(&self, ctx: &ModuleContext) -> HookResult;

    /// Register content during the host content phase
    fn load_content(&self, _ctx: &ModuleContext) -> HookResult {
        Ok(())
    }

    /// Release anything the module holds outside the host registries
    fn unload(&self, _ctx: &ModuleContext) -> HookResult {
        Ok(())
    }
}

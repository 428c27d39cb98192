//! Built-in Modules
//!
//! Modules compiled into the host binary. They register themselves with the
//! `module!` macro and are discovered under the [`BUNDLE`] location.

pub mod companion;
pub mod status;
pub mod template;

/// Bundle name the built-in modules are discovered under
pub const BUNDLE: &str = "builtin";

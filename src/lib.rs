pub mod app;
pub mod builtin;
pub mod content;
pub mod core;
pub mod events;
pub mod module;

pub use crate::core::version::get_api_version;

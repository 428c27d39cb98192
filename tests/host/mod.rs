//! Module Host Integration Test Modules

pub mod custom_modules;
pub mod discovery;
pub mod logging;
pub mod markup;

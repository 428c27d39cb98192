//! Test suites for the module system
//!
//! Exercise the loader, resolver and host together through mock modules that
//! journal every hook call.

mod utils;

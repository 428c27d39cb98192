//! Build metadata and the module API version
//!
//! Values are generated by the build script from `Cargo.toml`.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Module API version this host implements (YYYYMMDD)
pub fn get_api_version() -> u32 {
    MODULE_API_VERSION
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Get major version (year) from an API version
pub fn api_major_version(api_version: u32) -> u32 {
    api_version / 10000
}

/// Check if a module API version is compatible with this host
///
/// Same major version (year) is compatible.
pub fn is_api_compatible(module_api_version: u32) -> bool {
    api_major_version(get_api_version()) == api_major_version(module_api_version)
}

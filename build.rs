use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

/// Used when `[package.metadata] module_api_version` is missing or malformed
const FALLBACK_API_VERSION: u32 = 20250727;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("version.rs");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");

    let cargo_toml_content = fs::read_to_string(&cargo_toml_path).unwrap();
    let module_api_version = read_module_api_version(&cargo_toml_content).unwrap_or_else(|| {
        println!(
            "cargo:warning=module_api_version missing from [package.metadata]; using {}",
            FALLBACK_API_VERSION
        );
        FALLBACK_API_VERSION
    });

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let git_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let generated = format!(
        "pub const MODULE_API_VERSION: u32 = {};\n\
         pub const BUILD_TIME: &str = \"{}\";\n\
         pub const GIT_HASH: &str = \"{}\";\n",
        module_api_version, build_time, git_hash
    );

    // Only touch the file when it changes so dependents are not rebuilt needlessly
    if fs::read_to_string(&dest_path).ok().as_deref() != Some(generated.as_str()) {
        fs::write(&dest_path, generated).unwrap();
    }
}

/// `[package.metadata] module_api_version`, which must be a YYYYMMDD date
fn read_module_api_version(cargo_toml: &str) -> Option<u32> {
    let table = cargo_toml.parse::<toml::Table>().ok()?;
    let version = table
        .get("package")?
        .as_table()?
        .get("metadata")?
        .as_table()?
        .get("module_api_version")?
        .as_integer()?;
    u32::try_from(version)
        .ok()
        .filter(|v| (10_000_000..=99_999_999).contains(v))
}

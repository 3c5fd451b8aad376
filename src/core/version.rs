//! Build metadata and store format version shared across the app and the store.
//! This includes the generated version.rs from the build script into a core module,
//! providing a single source of truth.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Parse the store format version string from the build script into u32.
/// Falls back to the first format version if parsing fails.
pub fn store_format_version() -> u32 {
    STORE_FORMAT_VERSION.parse().unwrap_or(1)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Package version from Cargo.toml
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

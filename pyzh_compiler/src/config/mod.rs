//! Configuration for the dialect translator
//!
//! Three layers: compile-time limits generated by `build.rs` from
//! `config/<profile>.toml`, runtime preferences read from `PYZH_*`
//! environment variables, and the keyword table (see `grammar::keywords`).

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("PYZH_BUILD_PROFILE").unwrap_or("development")
    }

    /// Configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("PYZH_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

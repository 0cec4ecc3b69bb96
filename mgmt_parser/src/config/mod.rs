//! Configuration module for the management line parser
//! Compile-time limits come from the TOML profile selected at build time.

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("MGMT_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("MGMT_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::lexical::MAX_LINE_LENGTH > 0);
        assert!(compile_time::lexical::MAX_TOKEN_LENGTH <= compile_time::lexical::MAX_LINE_LENGTH);
        assert!(compile_time::address::MAX_ADDRESS_DEPTH > 0);
        assert!(compile_time::rollout::MAX_CONCURRENT_MEMBERS >= 2);
    }

    #[test]
    fn test_source_info() {
        assert!(super::build_info::source_info().ends_with(".toml"));
    }
}

// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    address: AddressLimits,
    arguments: ArgumentLimits,
    rollout: RolloutLimits,
    headers: HeaderLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_line_length: usize,
    max_token_length: usize,
    max_nesting_depth: usize,
}

#[derive(serde::Deserialize)]
struct AddressLimits {
    max_address_depth: usize,
}

#[derive(serde::Deserialize)]
struct ArgumentLimits {
    max_arguments: usize,
    max_value_length: usize,
}

#[derive(serde::Deserialize)]
struct RolloutLimits {
    max_rollout_groups: usize,
    max_concurrent_members: usize,
    max_group_properties: usize,
}

#[derive(serde::Deserialize)]
struct HeaderLimits {
    max_headers: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MGMT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=MGMT_CONFIG_DIR");

    let profile = env::var("MGMT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("MGMT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of mgmt_parser directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_LINE_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_NESTING_DEPTH: usize = 256;

    if config.lexical.max_line_length == 0
        || config.lexical.max_line_length > ABSOLUTE_MAX_LINE_LENGTH
    {
        panic!("LIMITS: max_line_length must be within 1..={}", ABSOLUTE_MAX_LINE_LENGTH);
    }

    if config.lexical.max_token_length > config.lexical.max_line_length {
        panic!("LIMITS: max_token_length cannot exceed max_line_length");
    }

    if config.lexical.max_nesting_depth == 0
        || config.lexical.max_nesting_depth > ABSOLUTE_MAX_NESTING_DEPTH
    {
        panic!("LIMITS: max_nesting_depth must be within 1..={}", ABSOLUTE_MAX_NESTING_DEPTH);
    }

    if config.address.max_address_depth == 0 {
        panic!("LIMITS: max_address_depth cannot be zero");
    }

    if config.rollout.max_concurrent_members < 2 {
        panic!("LIMITS: max_concurrent_members must allow at least two members");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.lexical.max_line_length > 65_536 {
        panic!("PRODUCTION: max_line_length too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_LINE_LENGTH: usize = {};
        pub const MAX_TOKEN_LENGTH: usize = {};
        pub const MAX_NESTING_DEPTH: usize = {};
    }}

    pub mod address {{
        pub const MAX_ADDRESS_DEPTH: usize = {};
    }}

    pub mod arguments {{
        pub const MAX_ARGUMENTS: usize = {};
        pub const MAX_VALUE_LENGTH: usize = {};
    }}

    pub mod rollout {{
        pub const MAX_ROLLOUT_GROUPS: usize = {};
        pub const MAX_CONCURRENT_MEMBERS: usize = {};
        pub const MAX_GROUP_PROPERTIES: usize = {};
    }}

    pub mod headers {{
        pub const MAX_HEADERS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.lexical.max_line_length,
        config.lexical.max_token_length,
        config.lexical.max_nesting_depth,
        config.address.max_address_depth,
        config.arguments.max_arguments,
        config.arguments.max_value_length,
        config.rollout.max_rollout_groups,
        config.rollout.max_concurrent_members,
        config.rollout.max_group_properties,
        config.headers.max_headers,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, DecoderConfig, ParcelConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "parcel.toml";

/// Find the parcel configuration file
///
/// Search order:
/// 1. `PARCEL_CONFIG_PATH` environment variable
/// 2. Current working directory: `./parcel.toml`
/// 3. Parent directories (searches up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("PARCEL_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by PARCEL_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "parcel configuration file '{}' not found in any of these locations:\n{}\n\nSet PARCEL_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<ParcelConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: ParcelConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `PARCEL_DECODER_MAX_DEPTH` -> `decoder.max_depth`
/// - `PARCEL_DECODER_MAX_CONTAINER_LENGTH` -> `decoder.max_container_length`
/// - `PARCEL_DECODER_MAX_RAW_LENGTH` -> `decoder.max_raw_length`
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a set variable is not a non-negative integer
pub fn apply_environment_overrides(config: &mut ParcelConfig) -> ConfigResult<()> {
    let lookup = |key: &'static str| env::var(key).ok().map(|value| (key, value));
    apply_decoder_overrides(
        &mut config.decoder,
        lookup("PARCEL_DECODER_MAX_DEPTH"),
        lookup("PARCEL_DECODER_MAX_CONTAINER_LENGTH"),
        lookup("PARCEL_DECODER_MAX_RAW_LENGTH"),
    )
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"max_depth": "64"}`)
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a given argument is not a non-negative integer
pub fn apply_cli_overrides(
    config: &mut ParcelConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    let lookup = |key: &'static str| cli_args.get(key).map(|value| (key, value.clone()));
    apply_decoder_overrides(
        &mut config.decoder,
        lookup("max_depth"),
        lookup("max_container_length"),
        lookup("max_raw_length"),
    )
}

/// Each override is `(source name, raw text)`
fn apply_decoder_overrides(
    decoder: &mut DecoderConfig,
    max_depth: Option<(&str, String)>,
    max_container_length: Option<(&str, String)>,
    max_raw_length: Option<(&str, String)>,
) -> ConfigResult<()> {
    if let Some(depth) = max_depth {
        decoder.max_depth = parse_limit(depth)?;
    }
    if let Some(length) = max_container_length {
        decoder.max_container_length = parse_limit(length)?;
    }
    if let Some(length) = max_raw_length {
        decoder.max_raw_length = parse_limit(length)?;
    }
    Ok(())
}

fn parse_limit((source, raw): (&str, String)) -> ConfigResult<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        ConfigError::InvalidValue(format!(
            "{} = '{}' is not a non-negative integer",
            source, raw
        ))
    })
}

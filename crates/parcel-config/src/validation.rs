// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! within ranges the wire format can actually express.

use crate::{ConfigError, ConfigResult, DecoderConfig, ParcelConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    LengthOutOfRange { field: String, length: usize },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::LengthOutOfRange { field, length } => {
                write!(
                    f,
                    "{} = {} exceeds the largest encodable length ({})",
                    field,
                    length,
                    DecoderConfig::WIRE_MAX_LENGTH
                )
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - A nesting depth between 1 and `DecoderConfig::MAX_DEPTH_CEILING`
/// - Length limits the wire format can represent
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation if validation fails
pub fn validate_config(config: &ParcelConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_decoder(&config.decoder, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_decoder(decoder: &DecoderConfig, errors: &mut Vec<ConfigValidationError>) {
    if decoder.max_depth == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "decoder.max_depth".to_string(),
            reason: "must be at least 1".to_string(),
        });
    } else if decoder.max_depth > DecoderConfig::MAX_DEPTH_CEILING {
        errors.push(ConfigValidationError::InvalidValue {
            field: "decoder.max_depth".to_string(),
            reason: format!(
                "{} exceeds the ceiling of {}",
                decoder.max_depth,
                DecoderConfig::MAX_DEPTH_CEILING
            ),
        });
    }

    let lengths = [
        ("decoder.max_container_length", decoder.max_container_length),
        ("decoder.max_raw_length", decoder.max_raw_length),
    ];
    for (field, length) in lengths {
        if length > DecoderConfig::WIRE_MAX_LENGTH {
            errors.push(ConfigValidationError::LengthOutOfRange {
                field: field.to_string(),
                length,
            });
        }
    }
}

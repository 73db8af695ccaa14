// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `parcel.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParcelConfig {
    pub decoder: DecoderConfig,
}

/// Resource limits applied while decoding untrusted streams.
///
/// Declared lengths are checked against these limits before any element is
/// read, so a hostile header cannot force a huge allocation or unbounded
/// recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum container nesting depth, at most [`Self::MAX_DEPTH_CEILING`].
    /// A top level scalar is depth 0.
    pub max_depth: usize,
    /// Maximum element count of a single array, or pair count of a single map
    pub max_container_length: usize,
    /// Maximum byte length of a single raw value
    pub max_raw_length: usize,
}

impl DecoderConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Hard cap on `max_depth`. Decoding recurses once per open container.
    pub const MAX_DEPTH_CEILING: usize = 1024;

    /// Largest length the wire format can carry (32-bit lengths are read as signed)
    pub const WIRE_MAX_LENGTH: usize = i32::MAX as usize;
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_container_length: Self::WIRE_MAX_LENGTH,
            max_raw_length: Self::WIRE_MAX_LENGTH,
        }
    }
}

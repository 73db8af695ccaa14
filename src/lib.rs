//! # parcel
//!
//! Binary object serialization with a MessagePack-compatible wire format. This
//! crate re-exports the workspace members so most users need a single
//! dependency.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! parcel = "0.1"  # Default: codec + TOML configuration loading
//! ```
//!
//! ```rust
//! use parcel::prelude::*;
//!
//! let bytes = to_vec(&vec!["a".to_string(), "b".to_string()])?;
//! let value = from_slice(&bytes)?;
//! assert_eq!(value.as_array()?[1].as_str()?, "b");
//! # Ok::<(), ParcelError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): load decoder limits from `parcel.toml` with
//!   environment and CLI overrides
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: parcel-config                              │
//! │  (DecoderConfig limits, TOML loading, validation)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Codec: parcel-serialization                            │
//! │  (Value, WireFormat, Encoder, Decoder, Serializable)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use parcel_config as config;
pub use parcel_serialization as serialization;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::serialization::{
        from_slice, from_slice_as, to_vec, Decoder, DecoderConfig, Encoder, MsgPack,
        ParcelError, ParcelResult, Serializable, Value, ValueKind, WireFormat,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, ParcelConfig};
}

//! # Parcel Serialization
//!
//! This crate converts typed data to and from a compact binary byte stream. The
//! default wire format is MessagePack compatible: integers are written in their
//! smallest width, containers and raw buffers pick the shortest length header,
//! and every value starts with a single tag byte.
//!
//! ## Core Components
//!
//! - **[`Value`]** - Dynamically typed decoded value, owning its children
//! - **[`Encoder`]** - Writes primitives, buffers, containers and [`Serializable`] types to a sink
//! - **[`Decoder`]** - Reads one complete [`Value`] (or typed value) at a time from a source
//! - **[`WireFormat`]** - Byte-level rules shared by both, with [`MsgPack`] and [`Tagged`] provided
//! - **[`Serializable`]** - Common trait for types that encode and decode themselves
//!
//! ## Basic Usage
//!
//! ```rust
//! use parcel_serialization::{from_slice, Encoder, Value};
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_map_header(1).unwrap();
//! encoder.write_str("samples").unwrap();
//! encoder.write_array(&[1u16, 500, 40_000]).unwrap();
//! let bytes = encoder.into_inner();
//!
//! let value = from_slice(&bytes).unwrap();
//! let samples = value.get(&Value::from("samples")).unwrap();
//! assert_eq!(samples.as_array().unwrap().len(), 3);
//! assert_eq!(samples.as_array().unwrap()[1], Value::UInt16(500));
//! ```
//!
//! Decoding limits (nesting depth, container and raw lengths) come from
//! [`DecoderConfig`], which can be loaded from `parcel.toml` with the
//! `parcel-config` crate.

mod decoder;
mod encoder;
mod error;
mod serializable;
mod value;
mod value_kind;
pub mod wire_format;

pub use decoder::{from_slice, from_slice_as, Decoder};
pub use encoder::{to_vec, Encoder};
pub use error::{ParcelError, ParcelResult};
pub use parcel_config::DecoderConfig;
pub use serializable::Serializable;
pub use value::Value;
pub use value_kind::ValueKind;
pub use wire_format::{
    Header, IntegerEncoding, IntegerWidth, MsgPack, NativeMsgPack, Tagged, WireFormat,
};

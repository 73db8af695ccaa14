//! Wire formats: the byte-level rules shared by [`Encoder`](crate::Encoder) and
//! [`Decoder`](crate::Decoder).
//!
//! A [`WireFormat`] decides which tag and payload layout represent a scalar, and
//! how container and raw headers are framed. It does not iterate containers or
//! copy raw payloads; the drivers do that, so the same recursion runs over every
//! format.

mod msgpack;
mod tagged;

pub use msgpack::{MsgPack, NativeMsgPack};
pub use tagged::Tagged;

use crate::{ParcelError, ParcelResult, Value, ValueKind};
use std::fmt::Display;
use std::io::{Read, Write};

/// Width of a fixed-size integer payload
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum IntegerWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntegerWidth {
    pub fn bits(&self) -> u32 {
        match self {
            IntegerWidth::W8 => 8,
            IntegerWidth::W16 => 16,
            IntegerWidth::W32 => 32,
            IntegerWidth::W64 => 64,
        }
    }
}

/// How an integer should be laid out on the wire.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum IntegerEncoding {
    /// Smallest representation that holds the value
    Compact,
    /// The tag for exactly this width, so the decoded kind matches the encoded one
    Exact(IntegerWidth),
}

/// What a format found at the front of the stream.
///
/// Lengths are signed so a format can report a declared length that reads back
/// negative. The decoder treats those as empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    /// A complete nil, bool or number
    Scalar(Value),
    /// A raw buffer of this many bytes follows
    Raw(i64),
    /// This many values follow
    Array(i64),
    /// This many key/value pairs follow
    Map(i64),
}

impl Header {
    /// The kind of value this header starts.
    pub fn kind(&self) -> ValueKind {
        match self {
            Header::Scalar(value) => value.kind(),
            Header::Raw(_) => ValueKind::Raw,
            Header::Array(_) => ValueKind::Array,
            Header::Map(_) => ValueKind::Map,
        }
    }
}

/// Byte-level encoding rules, injected into the encoder and decoder drivers.
///
/// Implementations are stateless strategies. Every write method appends exactly
/// one tag with its payload (or one container/raw header) to `out`, and
/// [`read_header`](WireFormat::read_header) consumes exactly one tag with its
/// scalar payload or length field.
pub trait WireFormat {
    fn write_nil<W: Write>(&self, out: &mut W) -> ParcelResult<()>;

    fn write_bool<W: Write>(&self, out: &mut W, value: bool) -> ParcelResult<()>;

    fn write_signed<W: Write>(
        &self,
        out: &mut W,
        value: i64,
        encoding: IntegerEncoding,
    ) -> ParcelResult<()>;

    fn write_unsigned<W: Write>(
        &self,
        out: &mut W,
        value: u64,
        encoding: IntegerEncoding,
    ) -> ParcelResult<()>;

    fn write_f32<W: Write>(&self, out: &mut W, value: f32) -> ParcelResult<()>;

    fn write_f64<W: Write>(&self, out: &mut W, value: f64) -> ParcelResult<()>;

    fn write_raw_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()>;

    fn write_array_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()>;

    fn write_map_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()>;

    /// Reads one tag and classifies it. Scalars are returned complete; for raw
    /// buffers and containers only the declared length is consumed.
    fn read_header<R: Read>(&self, input: &mut R) -> ParcelResult<Header>;
}

/// Largest length any format will write. Bigger counts would read back negative.
pub(crate) const MAX_ENCODABLE_LENGTH: usize = i32::MAX as usize;

pub(crate) fn encodable_length(length: usize) -> ParcelResult<u32> {
    if length > MAX_ENCODABLE_LENGTH {
        return Err(ParcelError::LimitExceeded(format!(
            "length {} exceeds the largest encodable length {}",
            length, MAX_ENCODABLE_LENGTH
        )));
    }
    // Bounded by i32::MAX above
    Ok(length as u32)
}

/// Narrows an integer for an exact-width payload.
pub(crate) fn narrow<S, T>(value: S, width: IntegerWidth) -> ParcelResult<T>
where
    S: Copy + Display,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| {
        ParcelError::LimitExceeded(format!(
            "{} does not fit in a {}-bit integer",
            value,
            width.bits()
        ))
    })
}

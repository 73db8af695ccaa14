use super::{encodable_length, narrow, Header, IntegerEncoding, IntegerWidth, WireFormat};
use crate::{ParcelResult, Value, ValueKind};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use std::marker::PhantomData;
use tracing::debug;

/// A plain kind-byte format.
///
/// Every value starts with its [`ValueKind`] byte, followed by a payload of the
/// kind's natural width in byte order `E`. Bools are one byte, raw buffers and
/// containers carry a signed 32-bit count. Nothing is minimized, so each kind
/// always reads back as itself.
///
/// # Example
/// ```
/// use parcel_serialization::{Decoder, Encoder, Tagged, Value};
///
/// let format: Tagged = Tagged::new();
/// let mut encoder = Encoder::with_format(Vec::new(), format);
/// encoder.write_u8(7).unwrap();
/// let bytes = encoder.into_inner();
///
/// // Compact integers are widened to 64 bits
/// assert_eq!(bytes, vec![9, 0, 0, 0, 0, 0, 0, 0, 7]);
///
/// let mut decoder = Decoder::with_format(bytes.as_slice(), format);
/// assert_eq!(decoder.read().unwrap(), Value::UInt64(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tagged<E: ByteOrder = BigEndian> {
    byte_order: PhantomData<E>,
}

impl<E: ByteOrder> Tagged<E> {
    pub const fn new() -> Self {
        Self {
            byte_order: PhantomData,
        }
    }

    fn write_counted<W: Write>(out: &mut W, kind: ValueKind, length: usize) -> ParcelResult<()> {
        let count = encodable_length(length)?;
        out.write_u8(kind as u8)?;
        // Bounded by i32::MAX
        out.write_i32::<E>(count as i32)?;
        Ok(())
    }
}

impl<E: ByteOrder> Default for Tagged<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ByteOrder> WireFormat for Tagged<E> {
    fn write_nil<W: Write>(&self, out: &mut W) -> ParcelResult<()> {
        out.write_u8(ValueKind::Nil as u8)?;
        Ok(())
    }

    fn write_bool<W: Write>(&self, out: &mut W, value: bool) -> ParcelResult<()> {
        out.write_u8(ValueKind::Bool as u8)?;
        out.write_u8(u8::from(value))?;
        Ok(())
    }

    fn write_signed<W: Write>(
        &self,
        out: &mut W,
        value: i64,
        encoding: IntegerEncoding,
    ) -> ParcelResult<()> {
        let width = match encoding {
            IntegerEncoding::Compact => IntegerWidth::W64,
            IntegerEncoding::Exact(width) => width,
        };
        match width {
            IntegerWidth::W8 => {
                out.write_u8(ValueKind::Int8 as u8)?;
                out.write_i8(narrow(value, width)?)?;
            }
            IntegerWidth::W16 => {
                out.write_u8(ValueKind::Int16 as u8)?;
                out.write_i16::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W32 => {
                out.write_u8(ValueKind::Int32 as u8)?;
                out.write_i32::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W64 => {
                out.write_u8(ValueKind::Int64 as u8)?;
                out.write_i64::<E>(value)?;
            }
        }
        Ok(())
    }

    fn write_unsigned<W: Write>(
        &self,
        out: &mut W,
        value: u64,
        encoding: IntegerEncoding,
    ) -> ParcelResult<()> {
        let width = match encoding {
            IntegerEncoding::Compact => IntegerWidth::W64,
            IntegerEncoding::Exact(width) => width,
        };
        match width {
            IntegerWidth::W8 => {
                out.write_u8(ValueKind::UInt8 as u8)?;
                out.write_u8(narrow(value, width)?)?;
            }
            IntegerWidth::W16 => {
                out.write_u8(ValueKind::UInt16 as u8)?;
                out.write_u16::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W32 => {
                out.write_u8(ValueKind::UInt32 as u8)?;
                out.write_u32::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W64 => {
                out.write_u8(ValueKind::UInt64 as u8)?;
                out.write_u64::<E>(value)?;
            }
        }
        Ok(())
    }

    fn write_f32<W: Write>(&self, out: &mut W, value: f32) -> ParcelResult<()> {
        out.write_u8(ValueKind::Float32 as u8)?;
        out.write_f32::<E>(value)?;
        Ok(())
    }

    fn write_f64<W: Write>(&self, out: &mut W, value: f64) -> ParcelResult<()> {
        out.write_u8(ValueKind::Float64 as u8)?;
        out.write_f64::<E>(value)?;
        Ok(())
    }

    fn write_raw_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()> {
        Self::write_counted(out, ValueKind::Raw, length)
    }

    fn write_array_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()> {
        Self::write_counted(out, ValueKind::Array, length)
    }

    fn write_map_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()> {
        Self::write_counted(out, ValueKind::Map, length)
    }

    fn read_header<R: Read>(&self, input: &mut R) -> ParcelResult<Header> {
        let byte = input.read_u8()?;
        let kind = ValueKind::try_from(byte).inspect_err(|_| {
            debug!(tag = byte, "rejecting malformed kind byte");
        })?;
        let header = match kind {
            ValueKind::Nil => Header::Scalar(Value::Nil),
            ValueKind::Bool => Header::Scalar(Value::Bool(input.read_u8()? != 0)),
            ValueKind::Int8 => Header::Scalar(Value::Int8(input.read_i8()?)),
            ValueKind::Int16 => Header::Scalar(Value::Int16(input.read_i16::<E>()?)),
            ValueKind::Int32 => Header::Scalar(Value::Int32(input.read_i32::<E>()?)),
            ValueKind::Int64 => Header::Scalar(Value::Int64(input.read_i64::<E>()?)),
            ValueKind::UInt8 => Header::Scalar(Value::UInt8(input.read_u8()?)),
            ValueKind::UInt16 => Header::Scalar(Value::UInt16(input.read_u16::<E>()?)),
            ValueKind::UInt32 => Header::Scalar(Value::UInt32(input.read_u32::<E>()?)),
            ValueKind::UInt64 => Header::Scalar(Value::UInt64(input.read_u64::<E>()?)),
            ValueKind::Float32 => Header::Scalar(Value::Float32(input.read_f32::<E>()?)),
            ValueKind::Float64 => Header::Scalar(Value::Float64(input.read_f64::<E>()?)),
            ValueKind::Raw => Header::Raw(i64::from(input.read_i32::<E>()?)),
            ValueKind::Array => Header::Array(i64::from(input.read_i32::<E>()?)),
            ValueKind::Map => Header::Map(i64::from(input.read_i32::<E>()?)),
        };
        Ok(header)
    }
}

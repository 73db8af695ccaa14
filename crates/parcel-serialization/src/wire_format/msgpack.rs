use super::{encodable_length, narrow, Header, IntegerEncoding, IntegerWidth, WireFormat};
use crate::{ParcelError, ParcelResult, Value};
use byteorder::{BigEndian, ByteOrder, NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use std::marker::PhantomData;
use tracing::debug;

/// Tag bytes of the MessagePack format
mod tag {
    pub const POSITIVE_FIXNUM_MAX: u8 = 0x7f;
    pub const FIXMAP: u8 = 0x80;
    pub const FIXARRAY: u8 = 0x90;
    pub const FIXRAW: u8 = 0xa0;
    pub const NIL: u8 = 0xc0;
    pub const FALSE: u8 = 0xc2;
    pub const TRUE: u8 = 0xc3;
    pub const FLOAT32: u8 = 0xca;
    pub const FLOAT64: u8 = 0xcb;
    pub const UINT8: u8 = 0xcc;
    pub const UINT16: u8 = 0xcd;
    pub const UINT32: u8 = 0xce;
    pub const UINT64: u8 = 0xcf;
    pub const INT8: u8 = 0xd0;
    pub const INT16: u8 = 0xd1;
    pub const INT32: u8 = 0xd2;
    pub const INT64: u8 = 0xd3;
    pub const RAW16: u8 = 0xda;
    pub const RAW32: u8 = 0xdb;
    pub const ARRAY16: u8 = 0xdc;
    pub const ARRAY32: u8 = 0xdd;
    pub const MAP16: u8 = 0xde;
    pub const MAP32: u8 = 0xdf;
    pub const NEGATIVE_FIXNUM: u8 = 0xe0;

    pub const FIXRAW_MAX_LENGTH: usize = 31;
    pub const FIXCONTAINER_MAX_LENGTH: usize = 15;
    pub const NEGATIVE_FIXNUM_MIN: i64 = -32;
}

/// The MessagePack wire format.
///
/// Multi-byte payloads and length fields use the byte order `E`. The default,
/// [`BigEndian`], is what every other MessagePack implementation reads.
///
/// # Example
/// ```
/// use parcel_serialization::{Encoder, NativeMsgPack};
///
/// let mut encoder = Encoder::new(Vec::new());
/// encoder.write_u16(0x1234).unwrap();
/// assert_eq!(encoder.into_inner(), vec![0xcd, 0x12, 0x34]);
///
/// let mut encoder = Encoder::with_format(Vec::new(), NativeMsgPack::new());
/// encoder.write_u16(0x1234).unwrap();
/// let mut expected = vec![0xcd];
/// expected.extend_from_slice(&0x1234u16.to_ne_bytes());
/// assert_eq!(encoder.into_inner(), expected);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MsgPack<E: ByteOrder = BigEndian> {
    byte_order: PhantomData<E>,
}

/// MessagePack with payloads in host byte order
pub type NativeMsgPack = MsgPack<NativeEndian>;

impl<E: ByteOrder> MsgPack<E> {
    pub const fn new() -> Self {
        Self {
            byte_order: PhantomData,
        }
    }

    fn write_length_header<W: Write>(
        out: &mut W,
        length: usize,
        fix_tag: u8,
        fix_max: usize,
        tag16: u8,
        tag32: u8,
    ) -> ParcelResult<()> {
        if length <= fix_max {
            // fix_max is at most 31
            out.write_u8(fix_tag | length as u8)?;
        } else if let Ok(short) = u16::try_from(length) {
            out.write_u8(tag16)?;
            out.write_u16::<E>(short)?;
        } else {
            let long = encodable_length(length)?;
            out.write_u8(tag32)?;
            out.write_u32::<E>(long)?;
        }
        Ok(())
    }

    fn write_exact_signed<W: Write>(
        out: &mut W,
        value: i64,
        width: IntegerWidth,
    ) -> ParcelResult<()> {
        match width {
            IntegerWidth::W8 => {
                out.write_u8(tag::INT8)?;
                out.write_i8(narrow(value, width)?)?;
            }
            IntegerWidth::W16 => {
                out.write_u8(tag::INT16)?;
                out.write_i16::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W32 => {
                out.write_u8(tag::INT32)?;
                out.write_i32::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W64 => {
                out.write_u8(tag::INT64)?;
                out.write_i64::<E>(value)?;
            }
        }
        Ok(())
    }

    fn write_exact_unsigned<W: Write>(
        out: &mut W,
        value: u64,
        width: IntegerWidth,
    ) -> ParcelResult<()> {
        match width {
            IntegerWidth::W8 => {
                out.write_u8(tag::UINT8)?;
                out.write_u8(narrow(value, width)?)?;
            }
            IntegerWidth::W16 => {
                out.write_u8(tag::UINT16)?;
                out.write_u16::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W32 => {
                out.write_u8(tag::UINT32)?;
                out.write_u32::<E>(narrow(value, width)?)?;
            }
            IntegerWidth::W64 => {
                out.write_u8(tag::UINT64)?;
                out.write_u64::<E>(value)?;
            }
        }
        Ok(())
    }
}

impl<E: ByteOrder> Default for MsgPack<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ByteOrder> WireFormat for MsgPack<E> {
    fn write_nil<W: Write>(&self, out: &mut W) -> ParcelResult<()> {
        out.write_u8(tag::NIL)?;
        Ok(())
    }

    fn write_bool<W: Write>(&self, out: &mut W, value: bool) -> ParcelResult<()> {
        out.write_u8(if value { tag::TRUE } else { tag::FALSE })?;
        Ok(())
    }

    fn write_signed<W: Write>(
        &self,
        out: &mut W,
        value: i64,
        encoding: IntegerEncoding,
    ) -> ParcelResult<()> {
        let width = match encoding {
            IntegerEncoding::Exact(width) => return Self::write_exact_signed(out, value, width),
            IntegerEncoding::Compact => {
                if let Ok(non_negative) = u64::try_from(value) {
                    return self.write_unsigned(out, non_negative, IntegerEncoding::Compact);
                }
                if value >= tag::NEGATIVE_FIXNUM_MIN {
                    // The two's complement byte is the fixnum tag itself
                    out.write_i8(narrow(value, IntegerWidth::W8)?)?;
                    return Ok(());
                }
                if i8::try_from(value).is_ok() {
                    IntegerWidth::W8
                } else if i16::try_from(value).is_ok() {
                    IntegerWidth::W16
                } else if i32::try_from(value).is_ok() {
                    IntegerWidth::W32
                } else {
                    IntegerWidth::W64
                }
            }
        };
        Self::write_exact_signed(out, value, width)
    }

    fn write_unsigned<W: Write>(
        &self,
        out: &mut W,
        value: u64,
        encoding: IntegerEncoding,
    ) -> ParcelResult<()> {
        let width = match encoding {
            IntegerEncoding::Exact(width) => width,
            IntegerEncoding::Compact => {
                if value <= u64::from(tag::POSITIVE_FIXNUM_MAX) {
                    out.write_u8(narrow(value, IntegerWidth::W8)?)?;
                    return Ok(());
                }
                if u8::try_from(value).is_ok() {
                    IntegerWidth::W8
                } else if u16::try_from(value).is_ok() {
                    IntegerWidth::W16
                } else if u32::try_from(value).is_ok() {
                    IntegerWidth::W32
                } else {
                    IntegerWidth::W64
                }
            }
        };
        Self::write_exact_unsigned(out, value, width)
    }

    fn write_f32<W: Write>(&self, out: &mut W, value: f32) -> ParcelResult<()> {
        out.write_u8(tag::FLOAT32)?;
        out.write_f32::<E>(value)?;
        Ok(())
    }

    fn write_f64<W: Write>(&self, out: &mut W, value: f64) -> ParcelResult<()> {
        out.write_u8(tag::FLOAT64)?;
        out.write_f64::<E>(value)?;
        Ok(())
    }

    fn write_raw_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()> {
        Self::write_length_header(
            out,
            length,
            tag::FIXRAW,
            tag::FIXRAW_MAX_LENGTH,
            tag::RAW16,
            tag::RAW32,
        )
    }

    fn write_array_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()> {
        Self::write_length_header(
            out,
            length,
            tag::FIXARRAY,
            tag::FIXCONTAINER_MAX_LENGTH,
            tag::ARRAY16,
            tag::ARRAY32,
        )
    }

    fn write_map_header<W: Write>(&self, out: &mut W, length: usize) -> ParcelResult<()> {
        Self::write_length_header(
            out,
            length,
            tag::FIXMAP,
            tag::FIXCONTAINER_MAX_LENGTH,
            tag::MAP16,
            tag::MAP32,
        )
    }

    fn read_header<R: Read>(&self, input: &mut R) -> ParcelResult<Header> {
        let byte = input.read_u8()?;
        let header = match byte {
            0x00..=tag::POSITIVE_FIXNUM_MAX => Header::Scalar(Value::Int8(byte as i8)),
            0x80..=0x8f => Header::Map(i64::from(byte & 0x0f)),
            0x90..=0x9f => Header::Array(i64::from(byte & 0x0f)),
            0xa0..=0xbf => Header::Raw(i64::from(byte & 0x1f)),
            tag::NIL => Header::Scalar(Value::Nil),
            tag::FALSE => Header::Scalar(Value::Bool(false)),
            tag::TRUE => Header::Scalar(Value::Bool(true)),
            tag::FLOAT32 => Header::Scalar(Value::Float32(input.read_f32::<E>()?)),
            tag::FLOAT64 => Header::Scalar(Value::Float64(input.read_f64::<E>()?)),
            tag::UINT8 => Header::Scalar(Value::UInt8(input.read_u8()?)),
            tag::UINT16 => Header::Scalar(Value::UInt16(input.read_u16::<E>()?)),
            tag::UINT32 => Header::Scalar(Value::UInt32(input.read_u32::<E>()?)),
            tag::UINT64 => Header::Scalar(Value::UInt64(input.read_u64::<E>()?)),
            tag::INT8 => Header::Scalar(Value::Int8(input.read_i8()?)),
            tag::INT16 => Header::Scalar(Value::Int16(input.read_i16::<E>()?)),
            tag::INT32 => Header::Scalar(Value::Int32(input.read_i32::<E>()?)),
            tag::INT64 => Header::Scalar(Value::Int64(input.read_i64::<E>()?)),
            tag::RAW16 => Header::Raw(i64::from(input.read_u16::<E>()?)),
            tag::RAW32 => Header::Raw(i64::from(input.read_i32::<E>()?)),
            tag::ARRAY16 => Header::Array(i64::from(input.read_u16::<E>()?)),
            tag::ARRAY32 => Header::Array(i64::from(input.read_i32::<E>()?)),
            tag::MAP16 => Header::Map(i64::from(input.read_u16::<E>()?)),
            tag::MAP32 => Header::Map(i64::from(input.read_i32::<E>()?)),
            // Two's complement of the tag is the value, -32..=-1
            tag::NEGATIVE_FIXNUM..=0xff => Header::Scalar(Value::Int32(i32::from(byte as i8))),
            _ => {
                debug!(tag = byte, "rejecting malformed msgpack tag");
                return Err(ParcelError::MalformedTag(byte));
            }
        };
        Ok(header)
    }
}

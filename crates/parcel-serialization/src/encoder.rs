use crate::wire_format::{IntegerEncoding, IntegerWidth, MsgPack, WireFormat};
use crate::{ParcelResult, Serializable, Value};
use std::io::Write;

/// Writes values to a byte sink using a [`WireFormat`].
///
/// Every write appends one complete value (or one container header) to the sink.
/// Rust integers are written in their most compact form. [`Value`]s are written
/// with the width of their own kind, so they decode back to the same kind.
///
/// # Example
/// ```
/// use parcel_serialization::Encoder;
///
/// let mut encoder = Encoder::new(Vec::new());
/// encoder.write_u32(127).unwrap();
/// encoder.write_i64(-33).unwrap();
/// encoder.write_str("hi").unwrap();
/// encoder.write_array(&[1u8, 2, 3]).unwrap();
///
/// assert_eq!(
///     encoder.into_inner(),
///     vec![0x7f, 0xd0, 0xdf, 0xa2, b'h', b'i', 0x93, 0x01, 0x02, 0x03]
/// );
/// ```
#[derive(Debug)]
pub struct Encoder<W: Write, F: WireFormat = MsgPack> {
    writer: W,
    format: F,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder writing standard (big-endian) MessagePack.
    pub fn new(writer: W) -> Self {
        Self::with_format(writer, MsgPack::new())
    }
}

impl<W: Write, F: WireFormat> Encoder<W, F> {
    //region Constructors and Access

    pub fn with_format(writer: W, format: F) -> Self {
        Self { writer, format }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    //endregion

    /// Writes anything implementing [`Serializable`].
    pub fn write<T: Serializable + ?Sized>(&mut self, value: &T) -> ParcelResult<()> {
        value.encode(self)
    }

    //region Scalars

    pub fn write_nil(&mut self) -> ParcelResult<()> {
        self.format.write_nil(&mut self.writer)
    }

    pub fn write_bool(&mut self, value: bool) -> ParcelResult<()> {
        self.format.write_bool(&mut self.writer, value)
    }

    pub fn write_i8(&mut self, value: i8) -> ParcelResult<()> {
        self.write_signed(value.into())
    }

    pub fn write_i16(&mut self, value: i16) -> ParcelResult<()> {
        self.write_signed(value.into())
    }

    pub fn write_i32(&mut self, value: i32) -> ParcelResult<()> {
        self.write_signed(value.into())
    }

    pub fn write_i64(&mut self, value: i64) -> ParcelResult<()> {
        self.write_signed(value)
    }

    pub fn write_u8(&mut self, value: u8) -> ParcelResult<()> {
        self.write_unsigned(value.into())
    }

    pub fn write_u16(&mut self, value: u16) -> ParcelResult<()> {
        self.write_unsigned(value.into())
    }

    pub fn write_u32(&mut self, value: u32) -> ParcelResult<()> {
        self.write_unsigned(value.into())
    }

    pub fn write_u64(&mut self, value: u64) -> ParcelResult<()> {
        self.write_unsigned(value)
    }

    pub fn write_f32(&mut self, value: f32) -> ParcelResult<()> {
        self.format.write_f32(&mut self.writer, value)
    }

    pub fn write_f64(&mut self, value: f64) -> ParcelResult<()> {
        self.format.write_f64(&mut self.writer, value)
    }

    fn write_signed(&mut self, value: i64) -> ParcelResult<()> {
        self.format
            .write_signed(&mut self.writer, value, IntegerEncoding::Compact)
    }

    fn write_unsigned(&mut self, value: u64) -> ParcelResult<()> {
        self.format
            .write_unsigned(&mut self.writer, value, IntegerEncoding::Compact)
    }

    //endregion

    //region Raw Buffers

    /// Writes a raw header sized to `bytes`, then the bytes themselves.
    pub fn write_raw(&mut self, bytes: &[u8]) -> ParcelResult<()> {
        self.format.write_raw_header(&mut self.writer, bytes.len())?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Writes the UTF-8 bytes of `text` as a raw buffer.
    pub fn write_str(&mut self, text: &str) -> ParcelResult<()> {
        self.write_raw(text.as_bytes())
    }

    //endregion

    //region Containers

    /// Starts an array. Exactly `length` values must be written after it.
    pub fn write_array_header(&mut self, length: usize) -> ParcelResult<()> {
        self.format.write_array_header(&mut self.writer, length)
    }

    /// Starts a map. Exactly `length` key/value pairs must be written after it.
    pub fn write_map_header(&mut self, length: usize) -> ParcelResult<()> {
        self.format.write_map_header(&mut self.writer, length)
    }

    /// Writes a homogeneous sequence as an array, sized by the iterator's length.
    pub fn write_array<'a, T, I>(&mut self, items: I) -> ParcelResult<()>
    where
        T: Serializable + 'a,
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        self.write_array_header(items.len())?;
        for item in items {
            item.encode(self)?;
        }
        Ok(())
    }

    /// Writes key/value pairs as a map, in iteration order.
    ///
    /// # Example
    /// ```
    /// use parcel_serialization::Encoder;
    /// use std::collections::BTreeMap;
    ///
    /// let mut scores = BTreeMap::new();
    /// scores.insert("a".to_string(), 1u8);
    ///
    /// let mut encoder = Encoder::new(Vec::new());
    /// encoder.write_map(&scores).unwrap();
    /// assert_eq!(encoder.into_inner(), vec![0x81, 0xa1, b'a', 0x01]);
    /// ```
    pub fn write_map<'a, K, V, I>(&mut self, pairs: I) -> ParcelResult<()>
    where
        K: Serializable + 'a,
        V: Serializable + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let pairs = pairs.into_iter();
        self.write_map_header(pairs.len())?;
        for (key, value) in pairs {
            key.encode(self)?;
            value.encode(self)?;
        }
        Ok(())
    }

    /// Writes `None` as nil.
    pub fn write_option<T: Serializable + ?Sized>(&mut self, value: Option<&T>) -> ParcelResult<()> {
        match value {
            Some(value) => value.encode(self),
            None => self.write_nil(),
        }
    }

    //endregion

    /// Writes a value tree. Each integer keeps its own width on the wire.
    pub fn write_value(&mut self, value: &Value) -> ParcelResult<()> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_bool(*b),
            Value::Int8(v) => self.write_exact_signed((*v).into(), IntegerWidth::W8),
            Value::Int16(v) => self.write_exact_signed((*v).into(), IntegerWidth::W16),
            Value::Int32(v) => self.write_exact_signed((*v).into(), IntegerWidth::W32),
            Value::Int64(v) => self.write_exact_signed(*v, IntegerWidth::W64),
            Value::UInt8(v) => self.write_exact_unsigned((*v).into(), IntegerWidth::W8),
            Value::UInt16(v) => self.write_exact_unsigned((*v).into(), IntegerWidth::W16),
            Value::UInt32(v) => self.write_exact_unsigned((*v).into(), IntegerWidth::W32),
            Value::UInt64(v) => self.write_exact_unsigned(*v, IntegerWidth::W64),
            Value::Float32(v) => self.write_f32(*v),
            Value::Float64(v) => self.write_f64(*v),
            Value::Raw(bytes) => self.write_raw(bytes),
            Value::Array(items) => {
                self.write_array_header(items.len())?;
                for item in items {
                    self.write_value(item)?;
                }
                Ok(())
            }
            Value::Map(pairs) => {
                self.write_map_header(pairs.len())?;
                for (key, value) in pairs {
                    self.write_value(key)?;
                    self.write_value(value)?;
                }
                Ok(())
            }
        }
    }

    fn write_exact_signed(&mut self, value: i64, width: IntegerWidth) -> ParcelResult<()> {
        self.format
            .write_signed(&mut self.writer, value, IntegerEncoding::Exact(width))
    }

    fn write_exact_unsigned(&mut self, value: u64, width: IntegerWidth) -> ParcelResult<()> {
        self.format
            .write_unsigned(&mut self.writer, value, IntegerEncoding::Exact(width))
    }
}

/// Encodes `value` as standard MessagePack into a new buffer.
///
/// # Example
/// ```
/// use parcel_serialization::{to_vec, Value};
///
/// assert_eq!(to_vec(&true).unwrap(), vec![0xc3]);
/// // Values keep their width: an Int16 is never shortened to a fixnum
/// assert_eq!(to_vec(&Value::Int16(1)).unwrap(), vec![0xd1, 0x00, 0x01]);
/// ```
pub fn to_vec<T: Serializable + ?Sized>(value: &T) -> ParcelResult<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write(value)?;
    Ok(encoder.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParcelError;
    use std::io;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_scalars() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_nil().unwrap();
        encoder.write_bool(false).unwrap();
        encoder.write_bool(true).unwrap();
        encoder.write_f32(1.5).unwrap();
        assert_eq!(
            encoder.into_inner(),
            vec![0xc0, 0xc2, 0xc3, 0xca, 0x3f, 0xc0, 0x00, 0x00]
        );
    }

    #[test]
    fn test_primitive_integers_are_minimized() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_u64(127).unwrap();
        encoder.write_i32(128).unwrap();
        encoder.write_u16(256).unwrap();
        encoder.write_i8(-32).unwrap();
        encoder.write_i16(-33).unwrap();
        assert_eq!(
            encoder.into_inner(),
            vec![0x7f, 0xcc, 0x80, 0xcd, 0x01, 0x00, 0xe0, 0xd0, 0xdf]
        );
    }

    #[test]
    fn test_values_keep_their_width() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_value(&Value::UInt8(5)).unwrap();
        encoder.write_value(&Value::Int32(-1)).unwrap();
        assert_eq!(
            encoder.into_inner(),
            vec![0xcc, 0x05, 0xd2, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_option() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_option::<u8>(None).unwrap();
        encoder.write_option(Some(&3u8)).unwrap();
        assert_eq!(encoder.into_inner(), vec![0xc0, 0x03]);
    }

    #[test]
    fn test_manual_framing() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_map_header(1).unwrap();
        encoder.write_str("id").unwrap();
        encoder.write_array_header(0).unwrap();
        assert_eq!(encoder.get_ref(), &vec![0x81, 0xa2, b'i', b'd', 0x90]);
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut encoder = Encoder::new(FailingSink);
        match encoder.write_bool(true) {
            Err(ParcelError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}

use crate::wire_format::{Header, MsgPack, WireFormat};
use crate::{ParcelError, ParcelResult, Serializable, Value, ValueKind};
use parcel_config::DecoderConfig;
use std::io::Read;
use tracing::{debug, trace};

/// Upper bound on capacity reserved from a declared length before elements arrive
const PREALLOCATION_LIMIT: usize = 1024;

/// Reads values from a byte source using a [`WireFormat`].
///
/// Each [`read`](Decoder::read) consumes exactly one complete value, recursing into
/// containers. If the stream ends early or holds a tag the format does not know,
/// the read fails and everything built so far is dropped.
///
/// Declared lengths come from untrusted input, so they are checked against the
/// [`DecoderConfig`] limits before anything is read, and storage grows only as
/// elements actually arrive.
///
/// # Example
/// ```
/// use parcel_serialization::{Decoder, Value};
///
/// let bytes = [0x92, 0x01, 0xa2, b'o', b'k'];
/// let mut decoder = Decoder::new(&bytes[..]);
/// let value = decoder.read().unwrap();
///
/// assert_eq!(value, Value::Array(vec![Value::Int8(1), Value::from("ok")]));
/// ```
#[derive(Debug)]
pub struct Decoder<R: Read, F: WireFormat = MsgPack> {
    reader: R,
    format: F,
    config: DecoderConfig,
    /// Containers currently open
    depth: usize,
    /// Header read ahead by `peek_kind`
    pending: Option<Header>,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder for standard (big-endian) MessagePack with default limits.
    pub fn new(reader: R) -> Self {
        Self::with_format(reader, MsgPack::new())
    }
}

impl<R: Read, F: WireFormat> Decoder<R, F> {
    //region Constructors and Access

    pub fn with_format(reader: R, format: F) -> Self {
        Self::with_config(reader, format, DecoderConfig::default())
    }

    pub fn with_config(reader: R, format: F, config: DecoderConfig) -> Self {
        Self {
            reader,
            format,
            config,
            depth: 0,
            pending: None,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns the source. A header already read ahead by
    /// [`peek_kind`](Decoder::peek_kind) is discarded with the decoder, so the
    /// source is then positioned after that header.
    pub fn into_inner(self) -> R {
        self.reader
    }

    //endregion

    //region Reading

    /// Reads one complete value.
    pub fn read(&mut self) -> ParcelResult<Value> {
        match self.next_header()? {
            Header::Scalar(value) => Ok(value),
            Header::Raw(declared) => {
                let length = self.checked_length(declared, self.config.max_raw_length, "raw")?;
                Ok(Value::Raw(self.read_raw_payload(length)?))
            }
            Header::Array(declared) => {
                let length =
                    self.checked_length(declared, self.config.max_container_length, "array")?;
                trace!(length, depth = self.depth, "array header");
                self.read_nested(|decoder| {
                    let mut items = Vec::with_capacity(length.min(PREALLOCATION_LIMIT));
                    for _ in 0..length {
                        items.push(decoder.read()?);
                    }
                    Ok(Value::Array(items))
                })
            }
            Header::Map(declared) => {
                let length =
                    self.checked_length(declared, self.config.max_container_length, "map")?;
                trace!(length, depth = self.depth, "map header");
                self.read_nested(|decoder| {
                    let mut pairs = Vec::with_capacity(length.min(PREALLOCATION_LIMIT));
                    for _ in 0..length {
                        let key = decoder.read()?;
                        let value = decoder.read()?;
                        pairs.push((key, value));
                    }
                    Ok(Value::Map(pairs))
                })
            }
        }
    }

    /// Reads one value as `T`.
    ///
    /// # Example
    /// ```
    /// use parcel_serialization::{Decoder, ParcelError};
    ///
    /// let bytes = [0xcd, 0x01, 0x00, 0xc3];
    /// let mut decoder = Decoder::new(&bytes[..]);
    /// assert_eq!(decoder.read_as::<u32>().unwrap(), 256);
    /// assert!(matches!(
    ///     decoder.read_as::<u32>(),
    ///     Err(ParcelError::TypeMismatch { .. })
    /// ));
    /// ```
    pub fn read_as<T: Serializable>(&mut self) -> ParcelResult<T> {
        T::decode(self)
    }

    /// Reads one raw buffer.
    pub fn read_raw(&mut self) -> ParcelResult<Vec<u8>> {
        self.read()?.into_raw()
    }

    /// Reads an array header and returns its element count.
    ///
    /// The caller reads the elements itself, normally inside
    /// [`read_nested`](Decoder::read_nested).
    pub fn read_array_header(&mut self) -> ParcelResult<usize> {
        match self.next_header()? {
            Header::Array(declared) => {
                self.checked_length(declared, self.config.max_container_length, "array")
            }
            other => Err(ParcelError::type_mismatch(ValueKind::Array, other.kind())),
        }
    }

    /// Reads a map header and returns its pair count.
    pub fn read_map_header(&mut self) -> ParcelResult<usize> {
        match self.next_header()? {
            Header::Map(declared) => {
                self.checked_length(declared, self.config.max_container_length, "map")
            }
            other => Err(ParcelError::type_mismatch(ValueKind::Map, other.kind())),
        }
    }

    /// Reads a map as key/value pairs in wire order, keeping every duplicate key.
    ///
    /// # Example
    /// ```
    /// use parcel_serialization::{Decoder, Encoder};
    ///
    /// let pairs = vec![("k".to_string(), 1u8), ("k".to_string(), 2u8)];
    /// let mut encoder = Encoder::new(Vec::new());
    /// encoder.write_map(pairs.iter().map(|(k, v)| (k, v))).unwrap();
    /// let bytes = encoder.into_inner();
    ///
    /// let mut decoder = Decoder::new(bytes.as_slice());
    /// assert_eq!(decoder.read_map_pairs::<String, u8>().unwrap(), pairs);
    /// ```
    pub fn read_map_pairs<K: Serializable, V: Serializable>(
        &mut self,
    ) -> ParcelResult<Vec<(K, V)>> {
        let length = self.read_map_header()?;
        self.read_nested(|decoder| {
            let mut pairs = Vec::with_capacity(length.min(PREALLOCATION_LIMIT));
            for _ in 0..length {
                let key = K::decode(decoder)?;
                let value = V::decode(decoder)?;
                pairs.push((key, value));
            }
            Ok(pairs)
        })
    }

    /// Returns the kind of the next value without consuming it.
    pub fn peek_kind(&mut self) -> ParcelResult<ValueKind> {
        let header = match self.pending.take() {
            Some(header) => header,
            None => self.format.read_header(&mut self.reader)?,
        };
        let kind = header.kind();
        self.pending = Some(header);
        Ok(kind)
    }

    /// Runs `read_children` one container level deeper, enforcing the depth limit.
    ///
    /// A configured `max_depth` above [`DecoderConfig::MAX_DEPTH_CEILING`] is
    /// capped at the ceiling.
    pub fn read_nested<T>(
        &mut self,
        read_children: impl FnOnce(&mut Self) -> ParcelResult<T>,
    ) -> ParcelResult<T> {
        let max_depth = self.config.max_depth.min(DecoderConfig::MAX_DEPTH_CEILING);
        if self.depth >= max_depth {
            debug!(max_depth, "container nesting limit exceeded");
            return Err(ParcelError::LimitExceeded(format!(
                "nesting deeper than {} containers",
                max_depth
            )));
        }
        self.depth += 1;
        let result = read_children(self);
        self.depth -= 1;
        result
    }

    //endregion

    fn next_header(&mut self) -> ParcelResult<Header> {
        match self.pending.take() {
            Some(header) => Ok(header),
            None => self.format.read_header(&mut self.reader),
        }
    }

    /// Maps a declared length to a usable one. Negative lengths read as empty.
    fn checked_length(&self, declared: i64, limit: usize, what: &str) -> ParcelResult<usize> {
        let Ok(length) = usize::try_from(declared) else {
            debug!(declared, what, "negative declared length, treating as empty");
            return Ok(0);
        };
        if length > limit {
            debug!(length, limit, what, "declared length exceeds limit");
            return Err(ParcelError::LimitExceeded(format!(
                "{} length {} exceeds limit {}",
                what, length, limit
            )));
        }
        Ok(length)
    }

    fn read_raw_payload(&mut self, length: usize) -> ParcelResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(length.min(PREALLOCATION_LIMIT));
        let read = (&mut self.reader)
            .take(length as u64)
            .read_to_end(&mut bytes)?;
        if read < length {
            return Err(ParcelError::TruncatedStream);
        }
        Ok(bytes)
    }
}

/// Decodes one standard MessagePack value from the front of `bytes`.
pub fn from_slice(bytes: &[u8]) -> ParcelResult<Value> {
    Decoder::new(bytes).read()
}

/// Decodes one standard MessagePack value from the front of `bytes` as `T`.
///
/// # Example
/// ```
/// use parcel_serialization::{from_slice_as, to_vec};
///
/// let bytes = to_vec(&vec![Some(1u16), None]).unwrap();
/// let back: Vec<Option<u16>> = from_slice_as(&bytes).unwrap();
/// assert_eq!(back, vec![Some(1), None]);
/// ```
pub fn from_slice_as<T: Serializable>(bytes: &[u8]) -> ParcelResult<T> {
    Decoder::new(bytes).read_as()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limited(bytes: &[u8], config: DecoderConfig) -> ParcelResult<Value> {
        Decoder::with_config(bytes, MsgPack::<byteorder::BigEndian>::new(), config).read()
    }

    #[test]
    fn test_negative_lengths_read_as_empty() {
        assert_eq!(
            from_slice(&[0xdd, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            Value::Array(vec![])
        );
        assert_eq!(
            from_slice(&[0xdf, 0x80, 0x00, 0x00, 0x00]).unwrap(),
            Value::Map(vec![])
        );
        assert_eq!(
            from_slice(&[0xdb, 0xff, 0xff, 0xff, 0xfe]).unwrap(),
            Value::Raw(vec![])
        );
    }

    #[test]
    fn test_negative_length_consumes_no_payload() {
        let bytes = [0xdd, 0xff, 0xff, 0xff, 0xff, 0x05];
        let mut decoder = Decoder::new(&bytes[..]);
        assert_eq!(decoder.read().unwrap(), Value::Array(vec![]));
        assert_eq!(decoder.read().unwrap(), Value::Int8(5));
    }

    #[test]
    fn test_truncated_raw_payload() {
        assert!(matches!(
            from_slice(&[0xa3, b'a', b'b']),
            Err(ParcelError::TruncatedStream)
        ));
    }

    #[test]
    fn test_truncated_container() {
        assert!(matches!(
            from_slice(&[0x82, 0x01, 0x02, 0x03]),
            Err(ParcelError::TruncatedStream)
        ));
    }

    #[test]
    fn test_huge_declared_length_does_not_preallocate() {
        // array32 declaring i32::MAX elements, followed by two
        let bytes = [0xdd, 0x7f, 0xff, 0xff, 0xff, 0x01, 0x02];
        assert!(matches!(from_slice(&bytes), Err(ParcelError::TruncatedStream)));
    }

    #[test]
    fn test_depth_limit() {
        let config = DecoderConfig {
            max_depth: 2,
            ..DecoderConfig::default()
        };
        assert!(limited(&[0x91, 0x91, 0x01], config).is_ok());
        assert!(matches!(
            limited(&[0x91, 0x91, 0x91, 0x01], config),
            Err(ParcelError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_depth_limit_is_capped_at_ceiling() {
        // Runs on a large stack so reaching the ceiling itself cannot overflow
        let outcome = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let config = DecoderConfig {
                    max_depth: 1_000_000,
                    ..DecoderConfig::default()
                };
                let bytes = vec![0x91u8; 200_000];
                limited(&bytes, config)
            })
            .unwrap()
            .join()
            .unwrap();
        assert!(matches!(outcome, Err(ParcelError::LimitExceeded(_))));
    }

    #[test]
    fn test_into_inner_drops_peeked_header() {
        let bytes = [0xc3, 0x07];
        let mut decoder = Decoder::new(&bytes[..]);
        assert_eq!(decoder.peek_kind().unwrap(), ValueKind::Bool);
        let rest = decoder.into_inner();
        assert_eq!(rest, &[0x07][..]);
    }

    #[test]
    fn test_length_limits() {
        let config = DecoderConfig {
            max_container_length: 2,
            max_raw_length: 1,
            ..DecoderConfig::default()
        };
        assert!(limited(&[0x92, 0x01, 0x02], config).is_ok());
        assert!(matches!(
            limited(&[0x93, 0x01, 0x02, 0x03], config),
            Err(ParcelError::LimitExceeded(_))
        ));
        assert!(matches!(
            limited(&[0xa2, b'a', b'b'], config),
            Err(ParcelError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let bytes = [0xc0, 0x07];
        let mut decoder = Decoder::new(&bytes[..]);
        assert_eq!(decoder.peek_kind().unwrap(), ValueKind::Nil);
        assert_eq!(decoder.peek_kind().unwrap(), ValueKind::Nil);
        assert_eq!(decoder.read().unwrap(), Value::Nil);
        assert_eq!(decoder.read_as::<u8>().unwrap(), 7);
    }

    #[test]
    fn test_header_readers_check_kind() {
        let mut decoder = Decoder::new(&[0x81u8, 0x90][..]);
        assert!(matches!(
            decoder.read_array_header(),
            Err(ParcelError::TypeMismatch {
                expected: ValueKind::Array,
                found: ValueKind::Map
            })
        ));
        assert_eq!(decoder.read_array_header().unwrap(), 0);
    }

    #[test]
    fn test_malformed_tag_inside_container() {
        assert!(matches!(
            from_slice(&[0x92, 0x01, 0xc1]),
            Err(ParcelError::MalformedTag(0xc1))
        ));
    }
}

use crate::{Decoder, Encoder, ParcelError, ParcelResult, Value, ValueKind, WireFormat};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::io::{Read, Write};

/// Common trait for types that write themselves through an [`Encoder`] and read
/// themselves back through a [`Decoder`].
///
/// Aggregates write their fields in a fixed order and read them back in the same
/// order. The order is purely positional: the decoder only notices a mismatch
/// when a field comes back as the wrong kind.
///
/// # Example
/// ```
/// use parcel_serialization::{
///     from_slice_as, to_vec, Decoder, Encoder, ParcelResult, Serializable, WireFormat,
/// };
/// use std::io::{Read, Write};
///
/// #[derive(Debug, PartialEq)]
/// struct Reading {
///     sensor: String,
///     celsius: f32,
/// }
///
/// impl Serializable for Reading {
///     fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
///         encoder.write_array_header(2)?;
///         encoder.write(&self.sensor)?;
///         encoder.write_f32(self.celsius)
///     }
///
///     fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
///         decoder.read_array_header()?;
///         Ok(Reading {
///             sensor: decoder.read_as()?,
///             celsius: decoder.read_as()?,
///         })
///     }
/// }
///
/// let reading = Reading { sensor: "porch".to_string(), celsius: 21.5 };
/// let bytes = to_vec(&reading).unwrap();
/// assert_eq!(from_slice_as::<Reading>(&bytes).unwrap(), reading);
/// ```
pub trait Serializable {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()>;

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self>
    where
        Self: Sized;
}

//region Scalars

impl Serializable for bool {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_bool(*self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        decoder.read()?.as_bool()
    }
}

macro_rules! impl_serializable_integer {
    ($($rust:ty => $write:ident),* $(,)?) => {
        $(
            impl Serializable for $rust {
                fn encode<W: Write, F: WireFormat>(
                    &self,
                    encoder: &mut Encoder<W, F>,
                ) -> ParcelResult<()> {
                    encoder.$write(*self)
                }

                fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
                    <$rust>::try_from(&decoder.read()?)
                }
            }
        )*
    };
}

impl_serializable_integer!(
    i8 => write_i8,
    i16 => write_i16,
    i32 => write_i32,
    i64 => write_i64,
    u8 => write_u8,
    u16 => write_u16,
    u32 => write_u32,
    u64 => write_u64,
);

impl Serializable for f32 {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_f32(*self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        decoder.read()?.as_f32()
    }
}

impl Serializable for f64 {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_f64(*self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        decoder.read()?.as_f64()
    }
}

impl Serializable for String {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_str(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        String::from_utf8(decoder.read_raw()?)
            .map_err(|_| ParcelError::type_mismatch(ValueKind::Raw, ValueKind::Raw))
    }
}

/// Encode only. Decode into `String`.
impl Serializable for str {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_str(self)
    }

    fn decode<R: Read, F: WireFormat>(_decoder: &mut Decoder<R, F>) -> ParcelResult<Self>
    where
        for<'a> Self: Sized,
    {
        unreachable!("str is unsized")
    }
}

impl Serializable for Value {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_value(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        decoder.read()
    }
}

//endregion

//region Wrappers and Collections

impl<T: Serializable> Serializable for Option<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_option(self.as_ref())
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        if decoder.peek_kind()? == ValueKind::Nil {
            decoder.read()?;
            return Ok(None);
        }
        T::decode(decoder).map(Some)
    }
}

impl<T: Serializable> Serializable for Box<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        (**self).encode(encoder)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        T::decode(decoder).map(Box::new)
    }
}

/// Reads an array header, then hands each decoded element to `insert`.
fn decode_elements<R, F, T>(
    decoder: &mut Decoder<R, F>,
    mut insert: impl FnMut(T),
) -> ParcelResult<()>
where
    R: Read,
    F: WireFormat,
    T: Serializable,
{
    let length = decoder.read_array_header()?;
    decoder.read_nested(|decoder| {
        for _ in 0..length {
            insert(T::decode(decoder)?);
        }
        Ok(())
    })
}

impl<T: Serializable> Serializable for Vec<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let mut items = Vec::new();
        decode_elements(decoder, |item| items.push(item))?;
        Ok(items)
    }
}

/// Encode only. Decode into `Vec<T>`.
impl<T: Serializable> Serializable for [T] {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(_decoder: &mut Decoder<R, F>) -> ParcelResult<Self>
    where
        Self: Sized,
    {
        unreachable!("slices are unsized")
    }
}

impl<T: Serializable> Serializable for VecDeque<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let mut items = VecDeque::new();
        decode_elements(decoder, |item| items.push_back(item))?;
        Ok(items)
    }
}

impl<T: Serializable> Serializable for LinkedList<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let mut items = LinkedList::new();
        decode_elements(decoder, |item| items.push_back(item))?;
        Ok(items)
    }
}

/// Written in the heap's internal order, which is unspecified.
impl<T: Serializable + Ord> Serializable for BinaryHeap<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let mut heap = BinaryHeap::new();
        decode_elements(decoder, |item| heap.push(item))?;
        Ok(heap)
    }
}

/// Repeated elements on the wire collapse into one.
impl<T: Serializable + Ord> Serializable for BTreeSet<T> {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let mut set = BTreeSet::new();
        decode_elements(decoder, |item| {
            set.insert(item);
        })?;
        Ok(set)
    }
}

/// Repeated elements on the wire collapse into one.
impl<T, S> Serializable for HashSet<T, S>
where
    T: Serializable + Eq + Hash,
    S: BuildHasher + Default,
{
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let mut set = HashSet::with_hasher(S::default());
        decode_elements(decoder, |item| {
            set.insert(item);
        })?;
        Ok(set)
    }
}

/// A two element array.
impl<A: Serializable, B: Serializable> Serializable for (A, B) {
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_array_header(2)?;
        self.0.encode(encoder)?;
        self.1.encode(encoder)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let length = decoder.read_array_header()?;
        if length != 2 {
            return Err(ParcelError::LimitExceeded(format!(
                "pair holds {} elements, expected 2",
                length
            )));
        }
        decoder.read_nested(|decoder| Ok((A::decode(decoder)?, B::decode(decoder)?)))
    }
}

/// Later duplicates of a key replace earlier ones.
impl<K, V> Serializable for BTreeMap<K, V>
where
    K: Serializable + Ord,
    V: Serializable,
{
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_map(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let length = decoder.read_map_header()?;
        decoder.read_nested(|decoder| {
            let mut map = BTreeMap::new();
            for _ in 0..length {
                let key = K::decode(decoder)?;
                let value = V::decode(decoder)?;
                map.insert(key, value);
            }
            Ok(map)
        })
    }
}

/// Later duplicates of a key replace earlier ones.
impl<K, V, S> Serializable for HashMap<K, V, S>
where
    K: Serializable + Eq + Hash,
    V: Serializable,
    S: BuildHasher + Default,
{
    fn encode<W: Write, F: WireFormat>(&self, encoder: &mut Encoder<W, F>) -> ParcelResult<()> {
        encoder.write_map(self)
    }

    fn decode<R: Read, F: WireFormat>(decoder: &mut Decoder<R, F>) -> ParcelResult<Self> {
        let length = decoder.read_map_header()?;
        decoder.read_nested(|decoder| {
            let mut map = HashMap::with_hasher(S::default());
            for _ in 0..length {
                let key = K::decode(decoder)?;
                let value = V::decode(decoder)?;
                map.insert(key, value);
            }
            Ok(map)
        })
    }
}

//endregion

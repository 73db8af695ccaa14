use crate::{ParcelError, ParcelResult, ValueKind};
use std::fmt::{Display, Formatter};

/// A decoded, dynamically typed unit of data.
///
/// `Value` is a closed sum over every kind the wire formats can carry. Containers
/// own their children directly, so a decoded value is always a tree: dropping the
/// root releases the whole subtree, and no value can sit in two containers.
///
/// Accessors never coerce across kinds. Asking a `Raw` for a bool is a
/// [`ParcelError::TypeMismatch`]. The integer accessors accept any of the eight
/// integer kinds as long as the number fits the requested Rust type unchanged.
///
/// # Example
/// ```
/// use parcel_serialization::{Value, ValueKind};
///
/// let value = Value::Array(vec![Value::from(1u8), Value::from("two")]);
/// assert_eq!(value.kind(), ValueKind::Array);
///
/// let items = value.as_array().unwrap();
/// assert_eq!(items[0].as_u64().unwrap(), 1);
/// assert_eq!(items[1].as_str().unwrap(), "two");
/// assert!(items[1].as_bool().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Raw(Vec<u8>),
    Array(Vec<Value>),
    /// Pairs in wire order. Duplicate keys are kept.
    Map(Vec<(Value, Value)>),
}

impl Value {
    //region Kind

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int8(_) => ValueKind::Int8,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt8(_) => ValueKind::UInt8,
            Value::UInt16(_) => ValueKind::UInt16,
            Value::UInt32(_) => ValueKind::UInt32,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Raw(_) => ValueKind::Raw,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    //endregion

    //region Scalar Accessors

    pub fn as_bool(&self) -> ParcelResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(ParcelError::type_mismatch(ValueKind::Bool, other.kind())),
        }
    }

    /// Returns the number held by any integer kind, if it fits an `i64`.
    ///
    /// # Example
    /// ```
    /// use parcel_serialization::Value;
    ///
    /// assert_eq!(Value::UInt16(300).as_i64().unwrap(), 300);
    /// assert!(Value::UInt64(u64::MAX).as_i64().is_err());
    /// assert!(Value::Float64(1.0).as_i64().is_err());
    /// ```
    pub fn as_i64(&self) -> ParcelResult<i64> {
        let mismatch = || ParcelError::type_mismatch(ValueKind::Int64, self.kind());
        match *self {
            Value::Int8(v) => Ok(v.into()),
            Value::Int16(v) => Ok(v.into()),
            Value::Int32(v) => Ok(v.into()),
            Value::Int64(v) => Ok(v),
            Value::UInt8(v) => Ok(v.into()),
            Value::UInt16(v) => Ok(v.into()),
            Value::UInt32(v) => Ok(v.into()),
            Value::UInt64(v) => i64::try_from(v).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }

    /// Returns the number held by any integer kind, if it is non-negative.
    pub fn as_u64(&self) -> ParcelResult<u64> {
        let mismatch = || ParcelError::type_mismatch(ValueKind::UInt64, self.kind());
        match *self {
            Value::UInt8(v) => Ok(v.into()),
            Value::UInt16(v) => Ok(v.into()),
            Value::UInt32(v) => Ok(v.into()),
            Value::UInt64(v) => Ok(v),
            Value::Int8(v) => u64::try_from(v).map_err(|_| mismatch()),
            Value::Int16(v) => u64::try_from(v).map_err(|_| mismatch()),
            Value::Int32(v) => u64::try_from(v).map_err(|_| mismatch()),
            Value::Int64(v) => u64::try_from(v).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }

    pub fn as_f32(&self) -> ParcelResult<f32> {
        match self {
            Value::Float32(v) => Ok(*v),
            other => Err(ParcelError::type_mismatch(ValueKind::Float32, other.kind())),
        }
    }

    pub fn as_f64(&self) -> ParcelResult<f64> {
        match self {
            Value::Float64(v) => Ok(*v),
            other => Err(ParcelError::type_mismatch(ValueKind::Float64, other.kind())),
        }
    }

    //endregion

    //region Buffer and Container Accessors

    pub fn as_raw(&self) -> ParcelResult<&[u8]> {
        match self {
            Value::Raw(bytes) => Ok(bytes),
            other => Err(ParcelError::type_mismatch(ValueKind::Raw, other.kind())),
        }
    }

    /// Returns the raw bytes as text. Bytes that are not valid UTF-8 are a type mismatch.
    pub fn as_str(&self) -> ParcelResult<&str> {
        std::str::from_utf8(self.as_raw()?)
            .map_err(|_| ParcelError::type_mismatch(ValueKind::Raw, ValueKind::Raw))
    }

    pub fn as_array(&self) -> ParcelResult<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(ParcelError::type_mismatch(ValueKind::Array, other.kind())),
        }
    }

    pub fn as_map(&self) -> ParcelResult<&[(Value, Value)]> {
        match self {
            Value::Map(pairs) => Ok(pairs),
            other => Err(ParcelError::type_mismatch(ValueKind::Map, other.kind())),
        }
    }

    pub fn into_raw(self) -> ParcelResult<Vec<u8>> {
        match self {
            Value::Raw(bytes) => Ok(bytes),
            other => Err(ParcelError::type_mismatch(ValueKind::Raw, other.kind())),
        }
    }

    pub fn into_array(self) -> ParcelResult<Vec<Value>> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(ParcelError::type_mismatch(ValueKind::Array, other.kind())),
        }
    }

    pub fn into_map(self) -> ParcelResult<Vec<(Value, Value)>> {
        match self {
            Value::Map(pairs) => Ok(pairs),
            other => Err(ParcelError::type_mismatch(ValueKind::Map, other.kind())),
        }
    }

    /// Looks up the first value stored under `key`. Returns `None` if this is not a map.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()
            .ok()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterates every value stored under `key`, in wire order.
    ///
    /// # Example
    /// ```
    /// use parcel_serialization::Value;
    ///
    /// let map = Value::Map(vec![
    ///     (Value::from("k"), Value::from(1u8)),
    ///     (Value::from("other"), Value::Nil),
    ///     (Value::from("k"), Value::from(2u8)),
    /// ]);
    /// let found: Vec<u64> = map
    ///     .get_all(&Value::from("k"))
    ///     .map(|v| v.as_u64().unwrap())
    ///     .collect();
    /// assert_eq!(found, vec![1, 2]);
    /// ```
    pub fn get_all<'a, 'k>(
        &'a self,
        key: &'k Value,
    ) -> impl Iterator<Item = &'a Value> + use<'a, 'k> {
        let pairs: &[(Value, Value)] = match self {
            Value::Map(pairs) => pairs,
            _ => &[],
        };
        pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v)
    }

    //endregion
}

//region Conversions

macro_rules! impl_from_scalar {
    ($($rust:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$rust> for Value {
                fn from(value: $rust) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Vec<u8> => Raw,
    Vec<Value> => Array,
    Vec<(Value, Value)> => Map,
);

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Raw(value.to_vec())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Raw(value.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Raw(value.into_bytes())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

macro_rules! impl_try_from_integer {
    ($($rust:ty => $kind:ident via $accessor:ident),* $(,)?) => {
        $(
            impl TryFrom<&Value> for $rust {
                type Error = ParcelError;
                fn try_from(value: &Value) -> Result<Self, ParcelError> {
                    let wide = value
                        .$accessor()
                        .map_err(|_| ParcelError::type_mismatch(ValueKind::$kind, value.kind()))?;
                    <$rust>::try_from(wide)
                        .map_err(|_| ParcelError::type_mismatch(ValueKind::$kind, value.kind()))
                }
            }
        )*
    };
}

impl_try_from_integer!(
    i8 => Int8 via as_i64,
    i16 => Int16 via as_i64,
    i32 => Int32 via as_i64,
    i64 => Int64 via as_i64,
    u8 => UInt8 via as_u64,
    u16 => UInt16 via as_u64,
    u32 => UInt32 via as_u64,
    u64 => UInt64 via as_u64,
);

//endregion

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt8(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Raw(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

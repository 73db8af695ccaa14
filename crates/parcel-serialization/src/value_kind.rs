use crate::ParcelError;
use std::fmt::{Display, Formatter};

/// Names every kind a [`Value`](crate::Value) can take.
///
/// The discriminants double as the kind byte of the [`Tagged`](crate::Tagged)
/// wire format.
///
/// # Example
/// ```
/// use parcel_serialization::ValueKind;
///
/// assert_eq!(ValueKind::Nil as u8, 0);
/// assert_eq!(ValueKind::Map as u8, 14);
/// assert_eq!(ValueKind::try_from(12u8).unwrap(), ValueKind::Raw);
/// ```
#[repr(u8)]
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum ValueKind {
    Nil = 0u8,
    Bool = 1u8,
    Int8 = 2u8,
    Int16 = 3u8,
    Int32 = 4u8,
    Int64 = 5u8,
    UInt8 = 6u8,
    UInt16 = 7u8,
    UInt32 = 8u8,
    UInt64 = 9u8,
    Float32 = 10u8,
    Float64 = 11u8,
    /// Byte buffer
    Raw = 12u8,
    /// Ordered sequence of values
    Array = 13u8,
    /// Ordered key/value pairs, duplicate keys permitted
    Map = 14u8,
}

impl ValueKind {
    /// Returns true for the eight fixed-width integer kinds.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ValueKind::Int8
                | ValueKind::Int16
                | ValueKind::Int32
                | ValueKind::Int64
                | ValueKind::UInt8
                | ValueKind::UInt16
                | ValueKind::UInt32
                | ValueKind::UInt64
        )
    }

    /// Returns true for the kinds that own child values.
    pub fn is_container(&self) -> bool {
        matches!(self, ValueKind::Array | ValueKind::Map)
    }
}

impl TryFrom<u8> for ValueKind {
    type Error = ParcelError;
    fn try_from(value: u8) -> Result<Self, ParcelError> {
        match value {
            0 => Ok(ValueKind::Nil),
            1 => Ok(ValueKind::Bool),
            2 => Ok(ValueKind::Int8),
            3 => Ok(ValueKind::Int16),
            4 => Ok(ValueKind::Int32),
            5 => Ok(ValueKind::Int64),
            6 => Ok(ValueKind::UInt8),
            7 => Ok(ValueKind::UInt16),
            8 => Ok(ValueKind::UInt32),
            9 => Ok(ValueKind::UInt64),
            10 => Ok(ValueKind::Float32),
            11 => Ok(ValueKind::Float64),
            12 => Ok(ValueKind::Raw),
            13 => Ok(ValueKind::Array),
            14 => Ok(ValueKind::Map),
            _ => Err(ParcelError::MalformedTag(value)),
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Nil => "Nil",
            ValueKind::Bool => "Bool",
            ValueKind::Int8 => "Int8",
            ValueKind::Int16 => "Int16",
            ValueKind::Int32 => "Int32",
            ValueKind::Int64 => "Int64",
            ValueKind::UInt8 => "UInt8",
            ValueKind::UInt16 => "UInt16",
            ValueKind::UInt32 => "UInt32",
            ValueKind::UInt64 => "UInt64",
            ValueKind::Float32 => "Float32",
            ValueKind::Float64 => "Float64",
            ValueKind::Raw => "Raw",
            ValueKind::Array => "Array",
            ValueKind::Map => "Map",
        };
        write!(f, "{name}")
    }
}

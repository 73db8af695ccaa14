use crate::ValueKind;
use std::io;

/// Common error type for parcel encode and decode operations.
///
/// Every failure is reported synchronously to the caller of the operation that
/// detected it. Decoding never hands back a partially built value alongside an
/// error.
///
/// # Examples
/// ```
/// use parcel_serialization::{from_slice, ParcelError};
///
/// // A fixarray header announcing one element, with nothing after it
/// let result = from_slice(&[0x91]);
/// assert!(matches!(result, Err(ParcelError::TruncatedStream)));
///
/// // 0xc1 is never used by the format
/// let result = from_slice(&[0xc1]);
/// assert!(matches!(result, Err(ParcelError::MalformedTag(0xc1))));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParcelError {
    /// The stream ended before the current tag or payload was complete
    #[error("Stream ended before the current value was complete")]
    TruncatedStream,

    /// A tag byte that matches no known fixed tag or masked range
    #[error("Malformed tag byte 0x{0:02x}")]
    MalformedTag(u8),

    /// A value was requested as a kind other than its own
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    /// A configured decode limit, or the largest encodable length, was exceeded
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Any other failure of the underlying sink or source
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl ParcelError {
    pub(crate) fn type_mismatch(expected: ValueKind, found: ValueKind) -> Self {
        ParcelError::TypeMismatch { expected, found }
    }
}

impl From<io::Error> for ParcelError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => ParcelError::TruncatedStream,
            _ => ParcelError::Io(err),
        }
    }
}

/// Result type for parcel operations
pub type ParcelResult<T> = Result<T, ParcelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_eof_maps_to_truncated_stream() {
        let err: ParcelError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, ParcelError::TruncatedStream));
    }

    #[test]
    fn test_other_io_errors_propagate_unchanged() {
        let err: ParcelError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        match err {
            ParcelError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ParcelError::MalformedTag(0xc1).to_string(),
            "Malformed tag byte 0xc1"
        );
        assert_eq!(
            ParcelError::type_mismatch(ValueKind::Bool, ValueKind::Raw).to_string(),
            "Type mismatch: expected Bool, found Raw"
        );
    }
}

//! Tests for parcel serialization
//!
//! Exercises the encoder and decoder drivers end to end over the MessagePack and
//! tagged wire formats: exact wire bytes, header tiers, integer minimization,
//! stream errors and round trips of nested value trees.

use byteorder::{BigEndian, LittleEndian};
use parcel_serialization::{
    from_slice, from_slice_as, to_vec, Decoder, DecoderConfig, Encoder, MsgPack,
    NativeMsgPack, ParcelError, Tagged, Value,
};
use proptest::prelude::*;

fn encode_value(value: &Value) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_value(value).unwrap();
    encoder.into_inner()
}

/// Array of arrays of maps of arrays of maps, five containers deep
fn sample_nested_value() -> Value {
    let leaf_map = Value::Map(vec![
        (Value::from("id"), Value::UInt32(70_000)),
        (Value::from("ok"), Value::Bool(true)),
        (Value::from("id"), Value::Int16(-300)),
    ]);
    let inner_array = Value::Array(vec![leaf_map, Value::Float32(0.25), Value::Nil]);
    let middle_map = Value::Map(vec![
        (Value::UInt8(1), inner_array),
        (Value::Raw(vec![0, 159, 146, 150]), Value::Float64(-1.5e300)),
    ]);
    Value::Array(vec![
        Value::Array(vec![middle_map, Value::Int64(i64::MIN)]),
        Value::from("tail"),
    ])
}

//region Wire Bytes

#[test]
fn test_single_byte_tags() {
    assert_eq!(to_vec(&Value::Nil).unwrap(), vec![0xc0]);
    assert_eq!(to_vec(&false).unwrap(), vec![0xc2]);
    assert_eq!(to_vec(&true).unwrap(), vec![0xc3]);
    assert_eq!(from_slice(&[0xc2]).unwrap(), Value::Bool(false));
}

#[test]
fn test_integer_width_minimization() {
    let cases: [(i64, &[u8]); 6] = [
        (127, &[0x7f]),
        (128, &[0xcc, 0x80]),
        (256, &[0xcd, 0x01, 0x00]),
        (-32, &[0xe0]),
        (-33, &[0xd0, 0xdf]),
        (-2_147_483_648, &[0xd2, 0x80, 0x00, 0x00, 0x00]),
    ];
    for (number, expected) in cases {
        assert_eq!(to_vec(&number).unwrap(), expected, "encoding {}", number);
        assert_eq!(from_slice_as::<i64>(expected).unwrap(), number);
    }
}

#[test]
fn test_fixnum_kinds() {
    // Positive fixnums are Int8, negative fixnums Int32
    assert_eq!(from_slice(&to_vec(&5u64).unwrap()).unwrap(), Value::Int8(5));
    assert_eq!(from_slice(&to_vec(&-7i64).unwrap()).unwrap(), Value::Int32(-7));
    assert_eq!(from_slice(&[0xe0]).unwrap(), Value::Int32(-32));
    assert_eq!(from_slice_as::<i8>(&[0xe0]).unwrap(), -32);
}

#[test]
fn test_fixed_width_tags_decode_to_matching_kind() {
    let cases: [(&[u8], Value); 8] = [
        (&[0xcc, 0xff], Value::UInt8(255)),
        (&[0xcd, 0xff, 0xff], Value::UInt16(65_535)),
        (&[0xce, 0xff, 0xff, 0xff, 0xff], Value::UInt32(u32::MAX)),
        (&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff], Value::UInt64(u64::MAX)),
        (&[0xd0, 0x80], Value::Int8(i8::MIN)),
        (&[0xd1, 0x80, 0x00], Value::Int16(i16::MIN)),
        (&[0xd2, 0x00, 0x00, 0x00, 0x01], Value::Int32(1)),
        (&[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0], Value::Int64(i64::MIN)),
    ];
    for (bytes, expected) in cases {
        assert_eq!(from_slice(bytes).unwrap(), expected);
    }
}

#[test]
fn test_float_layout() {
    assert_eq!(
        to_vec(&1.0f64).unwrap(),
        vec![0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        from_slice(&[0xca, 0x40, 0x49, 0x0f, 0xdb]).unwrap(),
        Value::Float32(std::f32::consts::PI)
    );
}

//endregion

//region Header Tiers

#[test]
fn test_raw_tiers() {
    let cases: [(usize, &[u8]); 6] = [
        (0, &[0xa0]),
        (1, &[0xa1]),
        (31, &[0xbf]),
        (32, &[0xda, 0x00, 0x20]),
        (65_535, &[0xda, 0xff, 0xff]),
        (65_536, &[0xdb, 0x00, 0x01, 0x00, 0x00]),
    ];
    for (length, header) in cases {
        let value = Value::Raw(vec![0x5a; length]);
        let bytes = encode_value(&value);
        assert!(bytes.starts_with(header), "raw of length {}", length);
        assert_eq!(bytes.len(), header.len() + length);
        assert_eq!(from_slice(&bytes).unwrap(), value);
    }
}

#[test]
fn test_array_tiers() {
    let cases: [(usize, &[u8]); 5] = [
        (0, &[0x90]),
        (15, &[0x9f]),
        (16, &[0xdc, 0x00, 0x10]),
        (65_535, &[0xdc, 0xff, 0xff]),
        (65_536, &[0xdd, 0x00, 0x01, 0x00, 0x00]),
    ];
    for (length, header) in cases {
        let value = Value::Array(vec![Value::Nil; length]);
        let bytes = encode_value(&value);
        assert!(bytes.starts_with(header), "array of length {}", length);
        assert_eq!(from_slice(&bytes).unwrap(), value);
    }
}

#[test]
fn test_map_tiers() {
    let cases: [(usize, &[u8]); 5] = [
        (0, &[0x80]),
        (15, &[0x8f]),
        (16, &[0xde, 0x00, 0x10]),
        (65_535, &[0xde, 0xff, 0xff]),
        (65_536, &[0xdf, 0x00, 0x01, 0x00, 0x00]),
    ];
    for (length, header) in cases {
        let value = Value::Map(vec![(Value::Nil, Value::Bool(true)); length]);
        let bytes = encode_value(&value);
        assert!(bytes.starts_with(header), "map of length {}", length);
        assert_eq!(from_slice(&bytes).unwrap(), value);
    }
}

#[test]
fn test_map_keeps_duplicate_keys_in_order() {
    let bytes = [0x82, 0x01, 0xa1, b'a', 0x01, 0xa1, b'b'];
    let value = from_slice(&bytes).unwrap();
    let pairs = value.as_map().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].1, Value::from("a"));
    assert_eq!(pairs[1].1, Value::from("b"));
}

//endregion

//region Value Trees

#[test]
fn test_numeric_kinds_survive_round_trip() {
    let values = vec![
        Value::Int8(i8::MIN),
        Value::Int8(0),
        Value::Int16(i16::MAX),
        Value::Int32(i32::MIN),
        Value::Int64(i64::MAX),
        Value::UInt8(0),
        Value::UInt16(u16::MAX),
        Value::UInt32(1),
        Value::UInt64(u64::MAX),
        Value::Float32(-0.5),
        Value::Float64(f64::MAX),
    ];
    for value in values {
        assert_eq!(from_slice(&encode_value(&value)).unwrap(), value);
    }
}

#[test]
fn test_nested_round_trip() {
    let value = sample_nested_value();
    let bytes = to_vec(&value).unwrap();
    assert_eq!(from_slice(&bytes).unwrap(), value);
}

#[test]
fn test_consecutive_values_share_a_stream() {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_str("first").unwrap();
    encoder.write_value(&sample_nested_value()).unwrap();
    encoder.write_u8(9).unwrap();
    let bytes = encoder.into_inner();

    let mut decoder = Decoder::new(bytes.as_slice());
    assert_eq!(decoder.read_raw().unwrap(), b"first".to_vec());
    assert_eq!(decoder.read().unwrap(), sample_nested_value());
    assert_eq!(decoder.read_as::<u8>().unwrap(), 9);
    assert!(matches!(decoder.read(), Err(ParcelError::TruncatedStream)));
}

//endregion

//region Stream Errors

#[test]
fn test_every_truncation_is_reported() {
    let bytes = to_vec(&sample_nested_value()).unwrap();
    for end in 0..bytes.len() {
        match from_slice(&bytes[..end]) {
            Err(ParcelError::TruncatedStream) => {}
            other => panic!("prefix of {} bytes gave {:?}", end, other),
        }
    }
}

#[test]
fn test_malformed_tags_are_rejected() {
    for tag in [0xc1u8, 0xc4, 0xc7, 0xc9, 0xd4, 0xd9] {
        match from_slice(&[0x91, tag]) {
            Err(ParcelError::MalformedTag(found)) => assert_eq!(found, tag),
            other => panic!("tag 0x{:02x} gave {:?}", tag, other),
        }
    }
}

#[test]
fn test_negative_lengths_are_empty() {
    // raw32, array32 and map32 declaring -1, then a trailing fixnum
    let bytes = [
        0xdb, 0xff, 0xff, 0xff, 0xff, 0xdd, 0xff, 0xff, 0xff, 0xff, 0xdf, 0xff, 0xff, 0xff,
        0xff, 0x2a,
    ];
    let mut decoder = Decoder::new(&bytes[..]);
    assert_eq!(decoder.read().unwrap(), Value::Raw(vec![]));
    assert_eq!(decoder.read().unwrap(), Value::Array(vec![]));
    assert_eq!(decoder.read().unwrap(), Value::Map(vec![]));
    assert_eq!(decoder.read().unwrap(), Value::Int8(42));
}

#[test]
fn test_configured_limits() {
    let config = DecoderConfig {
        max_depth: 4,
        max_container_length: 8,
        max_raw_length: 16,
    };
    let bytes = to_vec(&sample_nested_value()).unwrap();
    let mut decoder = Decoder::with_config(bytes.as_slice(), MsgPack::<BigEndian>::new(), config);
    assert!(matches!(decoder.read(), Err(ParcelError::LimitExceeded(_))));

    let long_raw = to_vec(&"x".repeat(17)).unwrap();
    let mut decoder = Decoder::with_config(long_raw.as_slice(), MsgPack::<BigEndian>::new(), config);
    assert!(matches!(decoder.read(), Err(ParcelError::LimitExceeded(_))));
}

//endregion

//region Other Formats

#[test]
fn test_native_msgpack_uses_host_order() {
    let mut encoder = Encoder::with_format(Vec::new(), NativeMsgPack::new());
    encoder.write_value(&Value::UInt32(0x0102_0304)).unwrap();
    let bytes = encoder.into_inner();

    let mut expected = vec![0xce];
    expected.extend_from_slice(&0x0102_0304u32.to_ne_bytes());
    assert_eq!(bytes, expected);

    let mut decoder = Decoder::with_format(bytes.as_slice(), NativeMsgPack::new());
    assert_eq!(decoder.read().unwrap(), Value::UInt32(0x0102_0304));
}

#[test]
fn test_tagged_format_round_trip() {
    let format = Tagged::<LittleEndian>::new();
    let value = sample_nested_value();

    let mut encoder = Encoder::with_format(Vec::new(), format);
    encoder.write_value(&value).unwrap();
    let bytes = encoder.into_inner();
    assert_eq!(bytes[0], 13);
    assert_eq!(&bytes[1..5], &2i32.to_le_bytes());

    let mut decoder = Decoder::with_format(bytes.as_slice(), format);
    assert_eq!(decoder.read().unwrap(), value);
}

#[test]
fn test_tagged_format_negative_length_and_truncation() {
    let format = Tagged::<LittleEndian>::new();
    let bytes = [13u8, 0xff, 0xff, 0xff, 0xff, 12, 4, 0, 0, 0, b'a'];
    let mut decoder = Decoder::with_format(&bytes[..], format);
    assert_eq!(decoder.read().unwrap(), Value::Array(vec![]));
    assert!(matches!(decoder.read(), Err(ParcelError::TruncatedStream)));
}

//endregion

//region Properties

fn arb_scalar() -> impl Strategy<Value = Value> {
    let integers = prop_oneof![
        any::<i8>().prop_map(Value::Int8),
        any::<i16>().prop_map(Value::Int16),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        any::<u8>().prop_map(Value::UInt8),
        any::<u16>().prop_map(Value::UInt16),
        any::<u32>().prop_map(Value::UInt32),
        any::<u64>().prop_map(Value::UInt64),
    ];
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        integers,
        (-1.0e30f32..1.0e30).prop_map(Value::Float32),
        (-1.0e300f64..1.0e300).prop_map(Value::Float64),
        proptest::collection::vec(any::<u8>(), 0..48).prop_map(Value::Raw),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(5, 96, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            proptest::collection::vec((inner.clone(), inner), 0..8).prop_map(Value::Map),
        ]
    })
}

proptest! {
    #[test]
    fn prop_msgpack_round_trip(value in arb_value()) {
        let bytes = to_vec(&value).unwrap();
        prop_assert_eq!(from_slice(&bytes).unwrap(), value);
    }

    #[test]
    fn prop_tagged_round_trip(value in arb_value()) {
        let format = Tagged::<LittleEndian>::new();
        let mut encoder = Encoder::with_format(Vec::new(), format);
        encoder.write_value(&value).unwrap();
        let bytes = encoder.into_inner();
        let mut decoder = Decoder::with_format(bytes.as_slice(), format);
        prop_assert_eq!(decoder.read().unwrap(), value);
    }

    #[test]
    fn prop_compact_integers_use_smallest_width(number in any::<i64>()) {
        let bytes = to_vec(&number).unwrap();
        let expected_len = if (-32..=127).contains(&number) {
            1
        } else if (-128..=255).contains(&number) {
            2
        } else if (-32_768..=65_535).contains(&number) {
            3
        } else if (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&number) {
            5
        } else {
            9
        };
        prop_assert_eq!(bytes.len(), expected_len);
        prop_assert_eq!(from_slice_as::<i64>(&bytes).unwrap(), number);
    }

    #[test]
    fn prop_truncated_prefix_never_decodes(value in arb_value(), cut in any::<prop::sample::Index>()) {
        let bytes = to_vec(&value).unwrap();
        let end = cut.index(bytes.len());
        prop_assert!(matches!(from_slice(&bytes[..end]), Err(ParcelError::TruncatedStream)));
    }
}

//endregion

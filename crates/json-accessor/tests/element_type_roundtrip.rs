use std::str::FromStr;

use bigdecimal::BigDecimal;
use json_accessor::element_type::{
    BigDecimalType, BigIntegerType, BooleanType, ByteType, DoubleType, FloatType, IntegerType,
    LongType, ShortType, StringType,
};
use json_accessor::{root, JsonAccessor, JsonElementType};
use num_bigint::BigInt;
use proptest::prelude::*;
use serde_json::json;

fn round_trip<K: JsonElementType>(value: K::Value) -> Option<K::Value> {
    let node = K::to_element(Some(value));
    assert!(K::is_instance(Some(&node)), "{} not an instance of {}", node, K::KIND);
    K::from_element(Some(&node)).expect("decode")
}

proptest! {
    #[test]
    fn integer_round_trip(v in any::<i32>()) {
        prop_assert_eq!(round_trip::<IntegerType>(v), Some(v));
    }

    #[test]
    fn long_round_trip(v in any::<i64>()) {
        prop_assert_eq!(round_trip::<LongType>(v), Some(v));
    }

    #[test]
    fn byte_round_trip(v in any::<i8>()) {
        prop_assert_eq!(round_trip::<ByteType>(v), Some(v));
    }

    #[test]
    fn short_round_trip(v in any::<i16>()) {
        prop_assert_eq!(round_trip::<ShortType>(v), Some(v));
    }

    #[test]
    fn float_round_trip(v in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
        prop_assert_eq!(round_trip::<FloatType>(v), Some(v));
    }

    #[test]
    fn double_round_trip(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        prop_assert_eq!(round_trip::<DoubleType>(v), Some(v));
    }

    #[test]
    fn string_round_trip(v in ".*") {
        prop_assert_eq!(round_trip::<StringType>(v.clone()), Some(v));
    }

    #[test]
    fn boolean_round_trip(v in any::<bool>()) {
        prop_assert_eq!(round_trip::<BooleanType>(v), Some(v));
    }

    #[test]
    fn big_integer_round_trip(v in any::<i128>()) {
        let big = BigInt::from(v) * BigInt::from(1_000_000_007u64);
        prop_assert_eq!(round_trip::<BigIntegerType>(big.clone()), Some(big));
    }

    #[test]
    fn big_decimal_round_trip(mantissa in any::<i64>(), scale in 0i64..30) {
        let decimal = BigDecimal::new(BigInt::from(mantissa), scale);
        prop_assert_eq!(round_trip::<BigDecimalType>(decimal.clone()), Some(decimal));
    }

    #[test]
    fn accessor_set_then_get(v in any::<i64>(), index in 0usize..8) {
        let slot = root().property("values").element(index).as_long();
        let mut doc = json!({});
        slot.set(&mut doc, v).expect("set");
        prop_assert_eq!(slot.get(&doc).expect("get"), Some(v));
        prop_assert_eq!(doc["values"].as_array().map(Vec::len), Some(index + 1));
    }
}

#[test]
fn float_edge_values_round_trip() {
    for v in [0.1f32, 0.3, f32::MAX, f32::MIN, f32::MIN_POSITIVE, f32::from_bits(1), 16_777_217.0, -0.0] {
        assert_eq!(round_trip::<FloatType>(v), Some(v), "{v:e}");
    }
}

#[test]
fn big_decimal_from_wire_text() {
    let node: serde_json::Value = serde_json::from_str("0.1000000000000000000000000001").expect("json");
    let value = BigDecimalType::from_element(Some(&node)).expect("decode");
    assert_eq!(value, Some(BigDecimal::from_str("0.1000000000000000000000000001").expect("decimal")));
}

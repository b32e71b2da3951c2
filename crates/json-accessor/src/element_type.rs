//! Element-type registry: one witness per supported JSON value kind.
//!
//! Each witness knows how to recognise its kind in a [`Value`], how to
//! down-cast a node to a Rust value, and how to wrap a Rust value back
//! into a node. All three operations are null-safe: an absent node or a
//! JSON `null` is never an instance and always decodes to `None`.
//!
//! Numeric witnesses share one template. Any JSON number is an instance of
//! every numeric kind; the conversion narrows or widens with Rust's `as`
//! casts, so out-of-range values wrap (integers) or saturate (floats)
//! instead of failing.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde_json::{Map, Number, Value};

use crate::error::{AccessorError, Result};

/// Runtime witness of a JSON value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Object,
    Array,
    String,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Byte,
    Short,
    BigDecimal,
    BigInteger,
}

impl ElementKind {
    /// Every registered kind, composite kinds first.
    pub const ALL: [ElementKind; 12] = [
        ElementKind::Object,
        ElementKind::Array,
        ElementKind::String,
        ElementKind::Boolean,
        ElementKind::Integer,
        ElementKind::Long,
        ElementKind::Float,
        ElementKind::Double,
        ElementKind::Byte,
        ElementKind::Short,
        ElementKind::BigDecimal,
        ElementKind::BigInteger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Object => "Object",
            ElementKind::Array => "Array",
            ElementKind::String => "String",
            ElementKind::Boolean => "Boolean",
            ElementKind::Integer => "Integer",
            ElementKind::Long => "Long",
            ElementKind::Float => "Float",
            ElementKind::Double => "Double",
            ElementKind::Byte => "Byte",
            ElementKind::Short => "Short",
            ElementKind::BigDecimal => "BigDecimal",
            ElementKind::BigInteger => "BigInteger",
        }
    }

    /// Returns true for the kinds backed by a JSON number.
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            ElementKind::Object | ElementKind::Array | ElementKind::String | ElementKind::Boolean
        )
    }

    /// Returns true iff `node` is present, not JSON `null`, and of this kind.
    pub fn is_instance(self, node: Option<&Value>) -> bool {
        let Some(node) = node else {
            return false;
        };
        match self {
            ElementKind::Object => node.is_object(),
            ElementKind::Array => node.is_array(),
            ElementKind::String => node.is_string(),
            ElementKind::Boolean => node.is_boolean(),
            _ => node.is_number(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Statically typed witness of a JSON value kind.
///
/// Implementors are zero-sized markers such as [`StringType`]; accessors are
/// parameterised by them (see [`TypedAccessor`](crate::TypedAccessor)).
pub trait JsonElementType: Send + Sync + 'static {
    /// The Rust representation of this kind.
    type Value;

    /// The runtime witness for this kind.
    const KIND: ElementKind;

    /// Down-casts a node already known to be an instance of [`Self::KIND`].
    ///
    /// Returns `None` when the node is not an instance.
    fn convert(node: &Value) -> Option<Self::Value>;

    /// Wraps a non-null value as a node.
    fn wrap(value: Self::Value) -> Value;

    /// Null-safe instance check.
    fn is_instance(node: Option<&Value>) -> bool {
        Self::KIND.is_instance(node)
    }

    /// Null-safe down-cast.
    ///
    /// Absent nodes and JSON `null` yield `Ok(None)`. Callers must check
    /// [`is_instance`](Self::is_instance) first: reaching this with a node of
    /// another kind is an internal bug and fails with an assertion failure.
    fn from_element(node: Option<&Value>) -> Result<Option<Self::Value>> {
        let node = match node {
            None | Some(Value::Null) => return Ok(None),
            Some(node) => node,
        };
        if !Self::is_instance(Some(node)) {
            return Err(AccessorError::assertion(format!(
                "'{node}' is not an instance of {}",
                Self::KIND
            )));
        }
        Self::convert(node)
            .map(Some)
            .ok_or_else(|| AccessorError::assertion(format!("cannot convert '{node}' to {}", Self::KIND)))
    }

    /// Null-safe construction: `None` yields JSON `null`.
    fn to_element(value: Option<Self::Value>) -> Value {
        value.map_or(Value::Null, Self::wrap)
    }
}

/// Witness for JSON objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectType;

impl JsonElementType for ObjectType {
    type Value = Map<String, Value>;
    const KIND: ElementKind = ElementKind::Object;

    fn convert(node: &Value) -> Option<Self::Value> {
        node.as_object().cloned()
    }

    fn wrap(value: Self::Value) -> Value {
        Value::Object(value)
    }
}

/// Witness for JSON arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayType;

impl JsonElementType for ArrayType {
    type Value = Vec<Value>;
    const KIND: ElementKind = ElementKind::Array;

    fn convert(node: &Value) -> Option<Self::Value> {
        node.as_array().cloned()
    }

    fn wrap(value: Self::Value) -> Value {
        Value::Array(value)
    }
}

/// Witness for JSON strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl JsonElementType for StringType {
    type Value = String;
    const KIND: ElementKind = ElementKind::String;

    fn convert(node: &Value) -> Option<Self::Value> {
        node.as_str().map(str::to_owned)
    }

    fn wrap(value: Self::Value) -> Value {
        Value::String(value)
    }
}

/// Witness for JSON booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl JsonElementType for BooleanType {
    type Value = bool;
    const KIND: ElementKind = ElementKind::Boolean;

    fn convert(node: &Value) -> Option<Self::Value> {
        node.as_bool()
    }

    fn wrap(value: Self::Value) -> Value {
        Value::Bool(value)
    }
}

fn number_to_i64(n: &Number) -> i64 {
    if let Some(v) = n.as_i64() {
        return v;
    }
    if let Some(v) = n.as_u64() {
        return v as i64;
    }
    n.as_f64().map(|v| v as i64).unwrap_or_default()
}

fn number_to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or_default()
}

// Re-materializes a decimal rendering as a JSON number, keeping every digit.
fn parse_number(text: &str) -> Value {
    match serde_json::from_str::<Number>(text) {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Null,
    }
}

macro_rules! numeric_element_type {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $ty:ty, |$n:ident| $convert:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl JsonElementType for $name {
            type Value = $ty;
            const KIND: ElementKind = ElementKind::$kind;

            fn convert(node: &Value) -> Option<Self::Value> {
                let $n = match node {
                    Value::Number(n) => n,
                    _ => return None,
                };
                $convert
            }

            fn wrap(value: Self::Value) -> Value {
                Value::from(value)
            }
        }
    };
}

numeric_element_type!(
    /// Witness for 32-bit signed integers.
    IntegerType, Integer, i32, |n| Some(number_to_i64(n) as i32)
);
numeric_element_type!(
    /// Witness for 64-bit signed integers.
    LongType, Long, i64, |n| Some(number_to_i64(n))
);
numeric_element_type!(
    /// Witness for 8-bit signed integers.
    ByteType, Byte, i8, |n| Some(number_to_i64(n) as i8)
);
numeric_element_type!(
    /// Witness for 16-bit signed integers.
    ShortType, Short, i16, |n| Some(number_to_i64(n) as i16)
);
numeric_element_type!(
    /// Witness for single precision floats. Non-finite values wrap to `null`.
    FloatType, Float, f32, |n| Some(number_to_f64(n) as f32)
);
numeric_element_type!(
    /// Witness for double precision floats. Non-finite values wrap to `null`.
    DoubleType, Double, f64, |n| Some(number_to_f64(n))
);

/// Witness for arbitrary precision decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigDecimalType;

impl JsonElementType for BigDecimalType {
    type Value = BigDecimal;
    const KIND: ElementKind = ElementKind::BigDecimal;

    fn convert(node: &Value) -> Option<Self::Value> {
        match node {
            Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
            _ => None,
        }
    }

    fn wrap(value: Self::Value) -> Value {
        parse_number(&value.to_string())
    }
}

/// Witness for arbitrary precision integers.
///
/// Fractional numbers are truncated toward zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntegerType;

impl JsonElementType for BigIntegerType {
    type Value = BigInt;
    const KIND: ElementKind = ElementKind::BigInteger;

    fn convert(node: &Value) -> Option<Self::Value> {
        let Value::Number(n) = node else {
            return None;
        };
        let text = n.to_string();
        if let Ok(v) = BigInt::from_str(&text) {
            return Some(v);
        }
        BigDecimal::from_str(&text)
            .ok()
            .map(|d| d.with_scale(0).into_bigint_and_exponent().0)
    }

    fn wrap(value: Self::Value) -> Value {
        parse_number(&value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_instance_null_safe() {
        for kind in ElementKind::ALL {
            assert!(!kind.is_instance(None), "{kind}");
            assert!(!kind.is_instance(Some(&Value::Null)), "{kind}");
        }
    }

    #[test]
    fn test_is_instance_by_shape() {
        assert!(ElementKind::Object.is_instance(Some(&json!({}))));
        assert!(!ElementKind::Object.is_instance(Some(&json!([]))));
        assert!(ElementKind::Array.is_instance(Some(&json!([1]))));
        assert!(ElementKind::String.is_instance(Some(&json!("x"))));
        assert!(!ElementKind::String.is_instance(Some(&json!(1))));
        assert!(ElementKind::Boolean.is_instance(Some(&json!(false))));
        for kind in ElementKind::ALL.iter().filter(|k| k.is_numeric()) {
            assert!(kind.is_instance(Some(&json!(1.5))), "{kind}");
            assert!(!kind.is_instance(Some(&json!("1.5"))), "{kind}");
        }
    }

    #[test]
    fn test_from_element_null_and_absent() {
        assert_eq!(StringType::from_element(None).unwrap(), None);
        assert_eq!(StringType::from_element(Some(&Value::Null)).unwrap(), None);
        assert_eq!(ObjectType::from_element(Some(&Value::Null)).unwrap(), None);
    }

    #[test]
    fn test_from_element_mismatch_is_assertion_failure() {
        let err = StringType::from_element(Some(&json!(12))).unwrap_err();
        assert!(err.is_assertion_failure());
        let err = IntegerType::from_element(Some(&json!([1]))).unwrap_err();
        assert!(err.is_assertion_failure());
    }

    #[test]
    fn test_to_element_null() {
        assert_eq!(StringType::to_element(None), Value::Null);
        assert_eq!(BigIntegerType::to_element(None), Value::Null);
        assert_eq!(StringType::to_element(Some("a".into())), json!("a"));
    }

    #[test]
    fn test_numeric_narrowing() {
        assert_eq!(IntegerType::from_element(Some(&json!(7.9))).unwrap(), Some(7));
        assert_eq!(LongType::from_element(Some(&json!(-3))).unwrap(), Some(-3));
        assert_eq!(ByteType::from_element(Some(&json!(300))).unwrap(), Some(300i64 as i8));
        assert_eq!(ShortType::from_element(Some(&json!(70000))).unwrap(), Some(70000i64 as i16));
        assert_eq!(
            IntegerType::from_element(Some(&json!(4_294_967_297i64))).unwrap(),
            Some(1)
        );
        assert_eq!(DoubleType::from_element(Some(&json!(2))).unwrap(), Some(2.0));
    }

    #[test]
    fn test_big_numbers_keep_precision() {
        let text = "123456789012345678901234567890.000000000000000001";
        let node: Value = serde_json::from_str(text).unwrap();
        let decimal = BigDecimalType::from_element(Some(&node)).unwrap().unwrap();
        assert_eq!(decimal, BigDecimal::from_str(text).unwrap());
        let encoded = BigDecimalType::to_element(Some(decimal.clone()));
        assert_eq!(BigDecimalType::from_element(Some(&encoded)).unwrap(), Some(decimal));

        let big = BigInt::from_str("98765432109876543210987654321").unwrap();
        let node = BigIntegerType::to_element(Some(big.clone()));
        assert_eq!(BigIntegerType::from_element(Some(&node)).unwrap(), Some(big));
    }

    #[test]
    fn test_big_integer_truncates_fraction() {
        let v = BigIntegerType::from_element(Some(&json!(-12.75))).unwrap();
        assert_eq!(v, Some(BigInt::from(-12)));
    }

    #[test]
    fn test_non_finite_float_wraps_to_null() {
        assert_eq!(DoubleType::to_element(Some(f64::NAN)), Value::Null);
        assert_eq!(FloatType::to_element(Some(f32::INFINITY)), Value::Null);
    }
}

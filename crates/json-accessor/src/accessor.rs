//! Reusable, typed accessors over a JSON document.
//!
//! Accessors are built once by chaining calls from [`root()`] and then
//! applied to any number of documents:
//!
//! ```
//! use json_accessor::{root, JsonAccessor};
//! use serde_json::json;
//!
//! let size = root().property("query").property("size").as_integer();
//!
//! let mut body = json!({});
//! size.set(&mut body, 20).unwrap();
//! assert_eq!(body, json!({"query": {"size": 20}}));
//! assert_eq!(size.get(&body).unwrap(), Some(20));
//! ```
//!
//! An accessor is pure structure: it holds no document, is cheap to clone,
//! and can be shared between threads. Mutating calls against one document
//! need a single writer; `&mut Value` enforces that.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::element_type::{
    ArrayType, BigDecimalType, BigIntegerType, BooleanType, ByteType, DoubleType, FloatType,
    IntegerType, JsonElementType, LongType, ObjectType, ShortType, StringType,
};
use crate::error::{AccessorError, Result};
use crate::path::{Path, Step};

/// The uniform contract shared by every accessor.
pub trait JsonAccessor {
    /// The value read and written through this accessor.
    type Value;

    /// Reads the value, returning `None` when it or one of its ancestors is
    /// absent.
    fn get(&self, root: &Value) -> Result<Option<Self::Value>>;

    /// Writes the value, creating every missing ancestor.
    fn set(&self, root: &mut Value, value: Self::Value) -> Result<()>;

    /// Returns the current value, or stores and returns the one produced by
    /// `supplier` when the location is absent or JSON `null`.
    ///
    /// Calling this twice returns the first created value both times.
    fn get_or_create<F>(&self, root: &mut Value, supplier: F) -> Result<Self::Value>
    where
        F: FnOnce() -> Self::Value;

    /// Rendering with property names, indices and type tags, for diagnostics.
    fn runtime_path(&self) -> String;

    /// Rendering with property names only, for structural identity.
    fn static_path(&self) -> String;
}

/// Returns the accessor for the document root.
pub fn root() -> RootAccessor {
    RootAccessor::new()
}

/// Identity accessor over the root object of a document.
///
/// The root always exists, so it is never created and cannot be replaced.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RootAccessor {
    path: Arc<Path>,
}

impl RootAccessor {
    pub fn new() -> Self {
        Self { path: Path::root() }
    }

    /// Accessor for a named property of the root object.
    pub fn property(&self, name: impl Into<String>) -> PropertyAccessor {
        PropertyAccessor {
            path: self.path.child(Step::Property(name.into())),
        }
    }
}

impl Default for RootAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonAccessor for RootAccessor {
    type Value = Map<String, Value>;

    fn get(&self, root: &Value) -> Result<Option<Self::Value>> {
        Ok(self.path.resolve(root)?.and_then(Value::as_object).cloned())
    }

    fn set(&self, _root: &mut Value, _value: Self::Value) -> Result<()> {
        Err(AccessorError::unsupported(
            "the root object cannot be replaced, only populated",
        ))
    }

    fn get_or_create<F>(&self, root: &mut Value, _supplier: F) -> Result<Self::Value>
    where
        F: FnOnce() -> Self::Value,
    {
        self.get(root)?
            .ok_or_else(|| AccessorError::assertion("root document must not be null"))
    }

    fn runtime_path(&self) -> String {
        self.path.runtime_path()
    }

    fn static_path(&self) -> String {
        self.path.static_path()
    }
}

/// Untyped accessor for a named property of an object.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropertyAccessor {
    path: Arc<Path>,
}

impl PropertyAccessor {
    /// Adds `value` to this property.
    ///
    /// A missing property is set to `value`. An array has `value` appended in
    /// place. Any other present value, JSON `null` included, is replaced by
    /// the two-element array `[previous, value]`.
    pub fn add(&self, root: &mut Value, value: Value) -> Result<()> {
        self.path.add(root, value)
    }
}

/// Untyped accessor for an indexed element of an array.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ElementAccessor {
    path: Arc<Path>,
}

macro_rules! untyped_accessor {
    ($name:ident) => {
        impl $name {
            /// Typed view of this location.
            pub fn as_type<K: JsonElementType>(&self) -> TypedAccessor<K> {
                TypedAccessor::new(self.path.child(Step::Assert {
                    kind: K::KIND,
                    implicit: false,
                }))
            }

            pub fn as_object(&self) -> ObjectAccessor {
                self.as_type()
            }

            pub fn as_array(&self) -> ArrayAccessor {
                self.as_type()
            }

            pub fn as_string(&self) -> StringAccessor {
                self.as_type()
            }

            pub fn as_boolean(&self) -> BooleanAccessor {
                self.as_type()
            }

            pub fn as_integer(&self) -> IntegerAccessor {
                self.as_type()
            }

            pub fn as_long(&self) -> LongAccessor {
                self.as_type()
            }

            pub fn as_float(&self) -> FloatAccessor {
                self.as_type()
            }

            pub fn as_double(&self) -> DoubleAccessor {
                self.as_type()
            }

            pub fn as_byte(&self) -> ByteAccessor {
                self.as_type()
            }

            pub fn as_short(&self) -> ShortAccessor {
                self.as_type()
            }

            pub fn as_big_decimal(&self) -> BigDecimalAccessor {
                self.as_type()
            }

            pub fn as_big_integer(&self) -> BigIntegerAccessor {
                self.as_type()
            }

            /// Shortcut for `as_object().property(name)`.
            ///
            /// The implied object assertion is left out of the runtime path.
            pub fn property(&self, name: impl Into<String>) -> PropertyAccessor {
                let object = self.path.child(Step::Assert {
                    kind: ObjectType::KIND,
                    implicit: true,
                });
                PropertyAccessor {
                    path: object.child(Step::Property(name.into())),
                }
            }

            /// Shortcut for `as_array().element(index)`.
            ///
            /// The implied array assertion is left out of the runtime path.
            pub fn element(&self, index: usize) -> ElementAccessor {
                let array = self.path.child(Step::Assert {
                    kind: ArrayType::KIND,
                    implicit: true,
                });
                ElementAccessor {
                    path: array.child(Step::Element(index)),
                }
            }
        }

        impl JsonAccessor for $name {
            type Value = Value;

            fn get(&self, root: &Value) -> Result<Option<Value>> {
                Ok(self.path.resolve(root)?.cloned())
            }

            fn set(&self, root: &mut Value, value: Value) -> Result<()> {
                self.path.assign(root, value)
            }

            fn get_or_create<F>(&self, root: &mut Value, supplier: F) -> Result<Value>
            where
                F: FnOnce() -> Value,
            {
                Ok(self.path.resolve_or_create(root, Box::new(move || Ok(supplier())))?.clone())
            }

            fn runtime_path(&self) -> String {
                self.path.runtime_path()
            }

            fn static_path(&self) -> String {
                self.path.static_path()
            }
        }
    };
}

untyped_accessor!(PropertyAccessor);
untyped_accessor!(ElementAccessor);

/// Accessor asserting the kind `K` at its location.
///
/// Reads apply the single-element-array rule: `null` and `[]` read as
/// absent, `[x]` reads as `x`, and any other mismatch fails with
/// [`AccessorError::UnexpectedElementType`].
pub struct TypedAccessor<K> {
    path: Arc<Path>,
    _kind: PhantomData<fn() -> K>,
}

pub type ObjectAccessor = TypedAccessor<ObjectType>;
pub type ArrayAccessor = TypedAccessor<ArrayType>;
pub type StringAccessor = TypedAccessor<StringType>;
pub type BooleanAccessor = TypedAccessor<BooleanType>;
pub type IntegerAccessor = TypedAccessor<IntegerType>;
pub type LongAccessor = TypedAccessor<LongType>;
pub type FloatAccessor = TypedAccessor<FloatType>;
pub type DoubleAccessor = TypedAccessor<DoubleType>;
pub type ByteAccessor = TypedAccessor<ByteType>;
pub type ShortAccessor = TypedAccessor<ShortType>;
pub type BigDecimalAccessor = TypedAccessor<BigDecimalType>;
pub type BigIntegerAccessor = TypedAccessor<BigIntegerType>;

impl<K> TypedAccessor<K> {
    fn new(path: Arc<Path>) -> Self {
        Self {
            path,
            _kind: PhantomData,
        }
    }
}

impl<K: JsonElementType> JsonAccessor for TypedAccessor<K> {
    type Value = K::Value;

    fn get(&self, root: &Value) -> Result<Option<K::Value>> {
        K::from_element(self.path.resolve(root)?)
    }

    fn set(&self, root: &mut Value, value: K::Value) -> Result<()> {
        self.path.assign(root, K::to_element(Some(value)))
    }

    fn get_or_create<F>(&self, root: &mut Value, supplier: F) -> Result<K::Value>
    where
        F: FnOnce() -> K::Value,
    {
        // A supplied value encoding to `null` (a NaN double) would not read back.
        let seed = move || match K::to_element(Some(supplier())) {
            Value::Null => Err(AccessorError::unexpected_type(self.path.runtime_path(), K::KIND, &Value::Null)),
            node => Ok(node),
        };
        let node = self.path.resolve_or_create(root, Box::new(seed))?;
        K::from_element(Some(&*node))?
            .ok_or_else(|| AccessorError::assertion(format!("'{}' created a null node", self.path)))
    }

    fn runtime_path(&self) -> String {
        self.path.runtime_path()
    }

    fn static_path(&self) -> String {
        self.path.static_path()
    }
}

impl TypedAccessor<ObjectType> {
    /// Accessor for a named property of this object.
    pub fn property(&self, name: impl Into<String>) -> PropertyAccessor {
        PropertyAccessor {
            path: self.path.child(Step::Property(name.into())),
        }
    }

    /// Returns the live object, creating it and its ancestors if needed.
    pub fn get_or_create_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Map<String, Value>> {
        let node = self
            .path
            .resolve_or_create(root, Box::new(|| Ok(Value::Object(Map::new()))))?;
        match node {
            Value::Object(object) => Ok(object),
            other => Err(AccessorError::unexpected_type(self.path.runtime_path(), ObjectType::KIND, other)),
        }
    }
}

impl TypedAccessor<ArrayType> {
    /// Accessor for an indexed element of this array.
    pub fn element(&self, index: usize) -> ElementAccessor {
        ElementAccessor {
            path: self.path.child(Step::Element(index)),
        }
    }

    /// Returns the live array, creating it and its ancestors if needed.
    pub fn get_or_create_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Vec<Value>> {
        let node = self
            .path
            .resolve_or_create(root, Box::new(|| Ok(Value::Array(Vec::new()))))?;
        match node {
            Value::Array(items) => Ok(items),
            other => Err(AccessorError::unexpected_type(self.path.runtime_path(), ArrayType::KIND, other)),
        }
    }

    /// Appends `value` unless an equal element is already present.
    ///
    /// Returns whether the element was added.
    pub fn add_element_if_absent(&self, root: &mut Value, value: Value) -> Result<bool> {
        let items = self.get_or_create_mut(root)?;
        if items.contains(&value) {
            return Ok(false);
        }
        items.push(value);
        Ok(true)
    }
}

impl<K> Clone for TypedAccessor<K> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.path))
    }
}

impl<K> PartialEq for TypedAccessor<K> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<K> Eq for TypedAccessor<K> {}

impl<K> Hash for TypedAccessor<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

macro_rules! display_runtime_path {
    ($($name:ty),* $(,)?) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.path, f)
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({:?})", stringify!($name), self.path.runtime_path())
                }
            }
        )*
    };
}

display_runtime_path!(RootAccessor, PropertyAccessor, ElementAccessor);

impl<K> fmt::Display for TypedAccessor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl<K> fmt::Debug for TypedAccessor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedAccessor({:?})", self.path.runtime_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_get_is_identity() {
        let doc = json!({"a": 1});
        let value = root().get(&doc).unwrap();
        assert_eq!(value, Some(json!({"a": 1}).as_object().unwrap().clone()));
    }

    #[test]
    fn test_root_rejects_null_document() {
        let err = root().get(&Value::Null).unwrap_err();
        assert!(err.is_assertion_failure());
    }

    #[test]
    fn test_root_set_is_unsupported() {
        let mut doc = json!({"a": 1});
        let err = root().set(&mut doc, Map::new()).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_root_get_or_create_never_calls_supplier() {
        let mut doc = json!({});
        let value = root()
            .get_or_create(&mut doc, || panic!("supplier must not run"))
            .unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_property_get_absent_and_null() {
        let a = root().property("a");
        assert_eq!(a.get(&json!({})).unwrap(), None);
        assert_eq!(a.get(&json!({"a": null})).unwrap(), Some(Value::Null));
        assert_eq!(a.as_string().get(&json!({"a": null})).unwrap(), None);
    }

    #[test]
    fn test_set_creates_ancestors() {
        let leaf = root()
            .property("a")
            .as_object()
            .property("b")
            .as_array()
            .element(2)
            .as_string();
        let mut doc = json!({});
        leaf.set(&mut doc, "x".to_string()).unwrap();
        assert_eq!(doc, json!({"a": {"b": [null, null, "x"]}}));
    }

    #[test]
    fn test_set_overwrites_null_property() {
        let a = root().property("a");
        let mut doc = json!({"a": null});
        a.set(&mut doc, json!(5)).unwrap();
        assert_eq!(doc, json!({"a": 5}));
    }

    #[test]
    fn test_typed_get_or_create_on_empty_array_fails() {
        let a = root().property("a").as_string();
        let mut doc = json!({"a": []});
        let err = a.get_or_create(&mut doc, || "x".into()).unwrap_err();
        assert!(err.is_unexpected_type());
        assert_eq!(doc, json!({"a": []}));
    }

    #[test]
    fn test_typed_write_through_single_element_array() {
        let b = root().property("a").as_object().property("b");
        let mut doc = json!({"a": [{"c": 1}]});
        b.set(&mut doc, json!(2)).unwrap();
        assert_eq!(doc, json!({"a": [{"c": 1, "b": 2}]}));
    }

    #[test]
    fn test_add_element_if_absent() {
        let tags = root().property("tags").as_array();
        let mut doc = json!({});
        assert!(tags.add_element_if_absent(&mut doc, json!("a")).unwrap());
        assert!(tags.add_element_if_absent(&mut doc, json!("b")).unwrap());
        assert!(!tags.add_element_if_absent(&mut doc, json!("a")).unwrap());
        assert_eq!(doc, json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn test_get_or_create_mut_returns_live_node() {
        let settings = root().property("settings").as_object();
        let mut doc = json!({});
        settings
            .get_or_create_mut(&mut doc)
            .unwrap()
            .insert("refresh".into(), json!(true));
        assert_eq!(doc, json!({"settings": {"refresh": true}}));
    }

    #[test]
    fn test_debug_and_display() {
        let a = root().property("a").element(0).as_long();
        assert_eq!(a.to_string(), ".a[0](Long)");
        assert_eq!(format!("{a:?}"), "TypedAccessor(\".a[0](Long)\")");
        assert_eq!(format!("{:?}", root().property("x")), "PropertyAccessor(\".x\")");
    }
}

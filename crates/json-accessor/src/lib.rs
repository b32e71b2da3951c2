//! Typed accessors over mutable JSON documents.
//!
//! This crate builds and reads JSON request and response bodies through
//! reusable path descriptors instead of ad-hoc tree walking, and marshals
//! records whose JSON form carries properties beyond their declared fields.
//!
//! - [`root()`] starts an accessor chain; `.property(name)`, `.element(index)`
//!   and `.as_string()`-style calls extend it. The result is a stateless
//!   descriptor applied to any document with [`JsonAccessor::get`],
//!   [`JsonAccessor::set`] and [`JsonAccessor::get_or_create`].
//! - [`element_type`] is the registry of supported value kinds.
//! - [`adapter::ExtraPropertiesAdapter`] reads and writes open records.
//! - [`merge`] holds helpers for callers that already hold an object node.
//!
//! # Example
//!
//! ```
//! use json_accessor::{root, JsonAccessor};
//! use serde_json::json;
//!
//! let analyzer = root()
//!     .property("settings")
//!     .property("analysis")
//!     .property("analyzer")
//!     .as_string();
//!
//! let mut body = json!({});
//! analyzer.set(&mut body, "standard".to_string()).unwrap();
//! assert_eq!(body, json!({"settings": {"analysis": {"analyzer": "standard"}}}));
//!
//! // Backends sometimes wrap single values in an array.
//! let response = json!({"settings": {"analysis": {"analyzer": ["english"]}}});
//! assert_eq!(analyzer.get(&response).unwrap(), Some("english".to_string()));
//! assert_eq!(analyzer.runtime_path(), ".settings.analysis.analyzer(String)");
//! ```

pub mod accessor;
pub mod adapter;
pub mod element_type;
pub mod error;
pub mod merge;

mod path;

pub use accessor::{
    root, ArrayAccessor, BigDecimalAccessor, BigIntegerAccessor, BooleanAccessor, ByteAccessor,
    DoubleAccessor, ElementAccessor, FloatAccessor, IntegerAccessor, JsonAccessor, LongAccessor,
    ObjectAccessor, PropertyAccessor, RootAccessor, ShortAccessor, StringAccessor, TypedAccessor,
};
pub use adapter::{ExtraProperties, ExtraPropertiesAdapter, FieldAdapter};
pub use element_type::{ElementKind, JsonElementType};
pub use error::{AccessorError, Result};

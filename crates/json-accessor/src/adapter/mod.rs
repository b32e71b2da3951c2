//! Open/closed record marshaling.
//!
//! [`ExtraPropertiesAdapter`] maps a record with a fixed set of declared
//! fields onto a JSON object that may carry any number of additional
//! properties, and back, without losing or reordering those properties.

mod extra_properties;
mod field;

pub use extra_properties::{ExtraProperties, ExtraPropertiesAdapter, ExtraPropertiesAdapterBuilder, Marshal};
pub use field::FieldAdapter;

//! Binding between one declared record field and its wire name.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AccessorError, Result};

type Decode<T> = Arc<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;
type Encode<T> = Arc<dyn Fn(&T) -> Result<Value> + Send + Sync>;

/// Reads and writes one field of a record of type `T` under a given name.
///
/// The codec is serde: the field type only needs `Serialize` and
/// `DeserializeOwned`. A canonical adapter is serialized; an alias created
/// with [`FieldAdapter::alias`] shares its codec but is only accepted on
/// read.
pub struct FieldAdapter<T> {
    name: String,
    serialized: bool,
    decode: Decode<T>,
    encode: Encode<T>,
}

impl<T> FieldAdapter<T> {
    /// Creates the canonical, serialized adapter for a field.
    pub fn new<F, G, S>(name: impl Into<String>, getter: G, setter: S) -> Self
    where
        T: 'static,
        F: Serialize + DeserializeOwned + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            serialized: true,
            decode: Arc::new(move |instance: &mut T, value: Value| {
                setter(instance, serde_json::from_value(value)?);
                Ok(())
            }),
            encode: Arc::new(move |instance: &T| Ok(serde_json::to_value(getter(instance))?)),
        }
    }

    /// Creates a read-only alias sharing this adapter's codec.
    pub fn alias(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serialized: false,
            decode: Arc::clone(&self.decode),
            encode: Arc::clone(&self.encode),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this adapter emits its field on write.
    pub fn is_serialized(&self) -> bool {
        self.serialized
    }

    /// Decodes `value` and assigns it onto `instance`.
    pub fn read(&self, instance: &mut T, value: Value) -> Result<()> {
        (self.decode)(instance, value)
    }

    /// Encodes the field of `instance`.
    ///
    /// Aliases are never written; asking one to write is a wiring bug.
    pub fn write(&self, instance: &T) -> Result<Value> {
        if !self.serialized {
            return Err(AccessorError::assertion(format!(
                "field alias '{}' is read-only and cannot be written",
                self.name
            )));
        }
        (self.encode)(instance)
    }
}

impl<T> Clone for FieldAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            serialized: self.serialized,
            decode: Arc::clone(&self.decode),
            encode: Arc::clone(&self.encode),
        }
    }
}

impl<T> fmt::Debug for FieldAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAdapter")
            .field("name", &self.name)
            .field("serialized", &self.serialized)
            .finish()
    }
}

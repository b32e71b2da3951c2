//! Marshaling of records that mix declared fields with unknown properties.
//!
//! A record type declares a fixed set of fields plus one slot holding an
//! [`ExtraProperties`] bag. Reading a JSON object assigns every known name
//! to its field and keeps every other entry, in arrival order, in the bag.
//! Writing emits the declared fields in declaration order, then the bag in
//! insertion order, so `write(read(x))` reproduces `x` as long as no extra
//! name collides with a declared name or alias.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{DeserializeOwned, DeserializeSeed, Deserializer, Error as _, MapAccess, Visitor};
use serde::ser::{Error as _, SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::field::FieldAdapter;
use crate::error::{AccessorError, Result};

/// Ordered bag of properties a record does not declare.
pub type ExtraProperties = Map<String, Value>;

struct ExtrasSlot<T> {
    get: fn(&T) -> Option<&ExtraProperties>,
    get_mut: fn(&mut T) -> &mut Option<ExtraProperties>,
}

/// Reads and writes records of type `T` as open JSON objects.
///
/// # Example
///
/// ```
/// use json_accessor::adapter::{ExtraProperties, ExtraPropertiesAdapter};
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Shards {
///     total: Option<i32>,
///     extra: Option<ExtraProperties>,
/// }
///
/// let adapter = ExtraPropertiesAdapter::<Shards>::builder()
///     .field("total", |s| &s.total, |s, v| s.total = v)
///     .extra_properties(|s| s.extra.as_ref(), |s| &mut s.extra)
///     .build()
///     .unwrap();
///
/// let source = json!({"skipped": 0, "total": 5});
/// let shards = adapter.read(&source).unwrap().unwrap();
/// assert_eq!(shards.total, Some(5));
/// assert_eq!(
///     serde_json::to_string(&adapter.write(Some(&shards)).unwrap()).unwrap(),
///     r#"{"total":5,"skipped":0}"#
/// );
/// ```
pub struct ExtraPropertiesAdapter<T> {
    type_name: &'static str,
    construct: Arc<dyn Fn() -> T + Send + Sync>,
    fields: Vec<FieldAdapter<T>>,
    index: HashMap<String, usize>,
    extras: ExtrasSlot<T>,
    serialize_nulls: bool,
}

impl<T: Default + 'static> ExtraPropertiesAdapter<T> {
    /// Starts a schema for a record built with `T::default()`.
    pub fn builder() -> ExtraPropertiesAdapterBuilder<T> {
        Self::builder_with(T::default)
    }
}

impl<T: 'static> ExtraPropertiesAdapter<T> {
    /// Starts a schema for a record built with `construct`.
    pub fn builder_with<C>(construct: C) -> ExtraPropertiesAdapterBuilder<T>
    where
        C: Fn() -> T + Send + Sync + 'static,
    {
        ExtraPropertiesAdapterBuilder {
            construct: Arc::new(construct),
            fields: Vec::new(),
            extras: None,
            serialize_nulls: false,
        }
    }
}

impl<T> ExtraPropertiesAdapter<T> {
    /// Field adapters in declaration order, aliases included.
    pub fn fields(&self) -> &[FieldAdapter<T>] {
        &self.fields
    }

    /// Looks up the field adapter registered under `name` or as an alias.
    pub fn field(&self, name: &str) -> Option<&FieldAdapter<T>> {
        self.index.get(name).and_then(|&i| self.fields.get(i))
    }

    /// Reads a record from a JSON tree.
    ///
    /// JSON `null` yields `None`; anything but an object is malformed input.
    pub fn read(&self, source: &Value) -> Result<Option<T>> {
        let object = match source {
            Value::Null => return Ok(None),
            Value::Object(object) => object,
            other => {
                return Err(AccessorError::malformed(format!(
                    "expected a JSON object or null for {}, got '{other}'",
                    self.type_name
                )))
            }
        };
        let mut instance = (self.construct)();
        for (name, value) in object {
            self.accept(&mut instance, name, value.clone())?;
        }
        Ok(Some(instance))
    }

    /// Reads a record from JSON text, token by token.
    ///
    /// Any failure of the token stream, including a field that cannot be
    /// decoded, is reported as malformed input.
    pub fn read_str(&self, json: &str) -> Result<Option<T>> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let record = self
            .deserialize(&mut deserializer)
            .and_then(|record| deserializer.end().map(|()| record))
            .map_err(|err| AccessorError::malformed(err.to_string()))?;
        Ok(record)
    }

    /// Writes a record as a JSON tree; `None` yields JSON `null`.
    pub fn write(&self, instance: Option<&T>) -> Result<Value> {
        let Some(instance) = instance else {
            return Ok(Value::Null);
        };
        let mut object = Map::new();
        for (name, value) in self.declared_entries(instance)? {
            object.insert(name.to_owned(), value);
        }
        if let Some(extras) = (self.extras.get)(instance) {
            for (name, value) in extras {
                object.insert(name.clone(), value.clone());
            }
        }
        Ok(Value::Object(object))
    }

    /// Returns a [`Serialize`] view writing `instance` through this adapter.
    pub fn marshal<'a>(&'a self, instance: Option<&'a T>) -> Marshal<'a, T> {
        Marshal {
            adapter: self,
            instance,
        }
    }

    fn accept(&self, instance: &mut T, name: &str, value: Value) -> Result<()> {
        if let Some(field) = self.field(name) {
            return field.read(instance, value);
        }
        trace!(record = self.type_name, property = name, "keeping extra property");
        (self.extras.get_mut)(instance)
            .get_or_insert_with(Map::new)
            .insert(name.to_owned(), value);
        Ok(())
    }

    fn declared_entries<'a>(&'a self, instance: &T) -> Result<Vec<(&'a str, Value)>> {
        let mut entries = Vec::with_capacity(self.fields.len());
        for field in self.fields.iter().filter(|f| f.is_serialized()) {
            let value = field.write(instance)?;
            if value.is_null() && !self.serialize_nulls {
                continue;
            }
            entries.push((field.name(), value));
        }
        Ok(entries)
    }
}

impl<T> fmt::Debug for ExtraPropertiesAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraPropertiesAdapter")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("serialize_nulls", &self.serialize_nulls)
            .finish()
    }
}

/// Schema builder for [`ExtraPropertiesAdapter`].
pub struct ExtraPropertiesAdapterBuilder<T> {
    construct: Arc<dyn Fn() -> T + Send + Sync>,
    fields: Vec<FieldAdapter<T>>,
    extras: Option<ExtrasSlot<T>>,
    serialize_nulls: bool,
}

impl<T: 'static> ExtraPropertiesAdapterBuilder<T> {
    /// Declares a field written and read under `name`.
    pub fn field<F, G, S>(self, name: &str, getter: G, setter: S) -> Self
    where
        F: Serialize + DeserializeOwned + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.field_with_aliases(name, &[], getter, setter)
    }

    /// Declares a field written under `name` and also read under `aliases`.
    pub fn field_with_aliases<F, G, S>(mut self, name: &str, aliases: &[&str], getter: G, setter: S) -> Self
    where
        F: Serialize + DeserializeOwned + 'static,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let field = FieldAdapter::new(name, getter, setter);
        let aliases: Vec<_> = aliases.iter().map(|alias| field.alias(*alias)).collect();
        self.fields.push(field);
        self.fields.extend(aliases);
        self
    }

    /// Designates the slot holding unknown properties.
    pub fn extra_properties(
        mut self,
        get: fn(&T) -> Option<&ExtraProperties>,
        get_mut: fn(&mut T) -> &mut Option<ExtraProperties>,
    ) -> Self {
        self.extras = Some(ExtrasSlot { get, get_mut });
        self
    }

    /// Writes declared fields whose encoded value is JSON `null`.
    ///
    /// By default they are omitted, so a field absent from the input stays
    /// absent on write.
    pub fn serialize_nulls(mut self) -> Self {
        self.serialize_nulls = true;
        self
    }

    /// Validates the schema.
    ///
    /// A missing extra-properties slot or a name declared twice is a wiring
    /// bug and fails with an assertion failure.
    pub fn build(self) -> Result<ExtraPropertiesAdapter<T>> {
        let type_name = type_name::<T>();
        let extras = self.extras.ok_or_else(|| {
            AccessorError::assertion(format!("{type_name} declares no extra-properties slot"))
        })?;
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            if index.insert(field.name().to_owned(), i).is_some() {
                return Err(AccessorError::assertion(format!(
                    "{type_name} declares '{}' more than once",
                    field.name()
                )));
            }
        }
        debug!(
            record = type_name,
            fields = self.fields.iter().filter(|f| f.is_serialized()).count(),
            aliases = self.fields.iter().filter(|f| !f.is_serialized()).count(),
            "built extra-properties adapter"
        );
        Ok(ExtraPropertiesAdapter {
            type_name,
            construct: self.construct,
            fields: self.fields,
            index,
            extras,
            serialize_nulls: self.serialize_nulls,
        })
    }
}

/// [`Serialize`] view of a record, see [`ExtraPropertiesAdapter::marshal`].
pub struct Marshal<'a, T> {
    adapter: &'a ExtraPropertiesAdapter<T>,
    instance: Option<&'a T>,
}

impl<T> Serialize for Marshal<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let Some(instance) = self.instance else {
            return serializer.serialize_none();
        };
        let declared = self.adapter.declared_entries(instance).map_err(S::Error::custom)?;
        let extras = (self.adapter.extras.get)(instance);
        let mut map = serializer.serialize_map(Some(declared.len() + extras.map_or(0, Map::len)))?;
        for (name, value) in &declared {
            map.serialize_entry(name, value)?;
        }
        for (name, value) in extras.into_iter().flatten() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de, T> DeserializeSeed<'de> for &ExtraPropertiesAdapter<T> {
    type Value = Option<T>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Option<T>, D::Error> {
        deserializer.deserialize_any(RecordVisitor { adapter: self })
    }
}

struct RecordVisitor<'a, T> {
    adapter: &'a ExtraPropertiesAdapter<T>,
}

impl<'de, T> Visitor<'de> for RecordVisitor<'_, T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a JSON object or null for {}", self.adapter.type_name)
    }

    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Option<T>, E> {
        Ok(None)
    }

    fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Option<T>, E> {
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Option<T>, A::Error> {
        let mut instance = (self.adapter.construct)();
        while let Some(name) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;
            self.adapter
                .accept(&mut instance, &name, value)
                .map_err(A::Error::custom)?;
        }
        Ok(Some(instance))
    }
}

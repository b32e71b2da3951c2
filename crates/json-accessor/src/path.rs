//! Step algebra behind every accessor.
//!
//! A [`Path`] is an immutable chain of steps ending at the root. It never
//! holds a document; applying it to a root walks the chain recursively from
//! the root down. Reads never create anything. Writes create every missing
//! ancestor on the way down: an object for a property step, an array for an
//! element step.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::element_type::ElementKind;
use crate::error::{AccessorError, Result};
use crate::merge;

/// Supplies the node to store when a missing or `null` child is created.
///
/// A failing seed leaves the slot untouched.
pub(crate) type Seed<'s> = Box<dyn FnOnce() -> Result<Value> + 's>;

/// A single navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Step {
    /// Identity over the document root.
    Root,
    /// Named property of an object.
    Property(String),
    /// Indexed element of an array.
    Element(usize),
    /// Assertion that the node has a given kind.
    ///
    /// Implicit assertions are introduced by navigation shortcuts and are not
    /// rendered in the runtime path.
    Assert { kind: ElementKind, implicit: bool },
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct Path {
    parent: Option<Arc<Path>>,
    step: Step,
}

impl Path {
    pub(crate) fn root() -> Arc<Path> {
        Arc::new(Path {
            parent: None,
            step: Step::Root,
        })
    }

    pub(crate) fn child(self: &Arc<Self>, step: Step) -> Arc<Path> {
        Arc::new(Path {
            parent: Some(Arc::clone(self)),
            step,
        })
    }

    /// Concrete rendering: names, indices and type tags.
    pub(crate) fn runtime_path(&self) -> String {
        let mut out = String::new();
        self.write_runtime_path(&mut out);
        out
    }

    /// Structural rendering: property names only.
    pub(crate) fn static_path(&self) -> String {
        let mut out = String::new();
        self.write_static_path(&mut out);
        out
    }

    fn write_runtime_path(&self, out: &mut String) {
        if let Some(parent) = &self.parent {
            parent.write_runtime_path(out);
        }
        match &self.step {
            Step::Root => {}
            Step::Property(name) => {
                out.push('.');
                out.push_str(name);
            }
            Step::Element(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
            Step::Assert { implicit: true, .. } => {}
            Step::Assert { kind, .. } => {
                out.push('(');
                out.push_str(kind.name());
                out.push(')');
            }
        }
    }

    fn write_static_path(&self, out: &mut String) {
        if let Some(parent) = &self.parent {
            parent.write_static_path(out);
        }
        if let Step::Property(name) = &self.step {
            out.push('.');
            out.push_str(name);
        }
    }

    fn parent(&self) -> Result<&Path> {
        self.parent
            .as_deref()
            .ok_or_else(|| AccessorError::assertion("non-root step without a parent"))
    }

    /// Reads the node at this path without modifying the document.
    ///
    /// `Ok(None)` means the node, or one of its ancestors, is absent. A
    /// present JSON `null` is returned as `Some(&Value::Null)` by property
    /// and element steps.
    pub(crate) fn resolve<'a>(&self, root: &'a Value) -> Result<Option<&'a Value>> {
        match &self.step {
            Step::Root => check_root(root).map(Some),
            Step::Property(name) => {
                let Some(parent) = self.parent()?.resolve(root)? else {
                    return Ok(None);
                };
                Ok(expect_object(parent)?.get(name))
            }
            Step::Element(index) => {
                let Some(parent) = self.parent()?.resolve(root)? else {
                    return Ok(None);
                };
                Ok(expect_array(parent)?.get(*index))
            }
            Step::Assert { kind, .. } => {
                let node = self.parent()?.resolve(root)?;
                coerce(node, *kind, self)
            }
        }
    }

    /// Returns the node at this path, creating it with `seed` when it is
    /// absent or JSON `null`. Missing ancestors are created along the way.
    pub(crate) fn resolve_or_create<'a>(&self, root: &'a mut Value, seed: Seed<'_>) -> Result<&'a mut Value> {
        match &self.step {
            Step::Root => check_root_mut(root),
            Step::Property(name) => {
                let object = self.parent_object_mut(root)?;
                if object.get(name).map_or(true, Value::is_null) {
                    trace!(path = %self.runtime_path(), "creating missing JSON property");
                    let value = seed()?;
                    object.insert(name.clone(), value);
                }
                object
                    .get_mut(name)
                    .ok_or_else(|| AccessorError::assertion(format!("'{self}' vanished after creation")))
            }
            Step::Element(index) => {
                let items = self.parent_array_mut(root)?;
                if items.get(*index).map_or(true, Value::is_null) {
                    trace!(path = %self.runtime_path(), "creating missing JSON element");
                    let value = seed()?;
                    *fill_to(items, *index, self)? = value;
                }
                items
                    .get_mut(*index)
                    .ok_or_else(|| AccessorError::assertion(format!("'{self}' vanished after creation")))
            }
            Step::Assert { kind, .. } => {
                let node = self.parent()?.resolve_or_create(root, seed)?;
                if coerce(Some(&*node), *kind, self)?.is_none() {
                    return Err(AccessorError::unexpected_type(self.runtime_path(), *kind, node));
                }
                coerce_mut(node, *kind, self)?
                    .ok_or_else(|| AccessorError::assertion(format!("'{self}' resolved to nothing")))
            }
        }
    }

    /// Overwrites the node at this path, creating missing ancestors.
    pub(crate) fn assign(&self, root: &mut Value, value: Value) -> Result<()> {
        match &self.step {
            Step::Root => Err(AccessorError::unsupported(
                "the root object cannot be replaced, only populated",
            )),
            Step::Property(name) => {
                self.parent_object_mut(root)?.insert(name.clone(), value);
                Ok(())
            }
            Step::Element(index) => {
                let items = self.parent_array_mut(root)?;
                *fill_to(items, *index, self)? = value;
                Ok(())
            }
            Step::Assert { .. } => self.parent()?.assign(root, value),
        }
    }

    /// Adds `value` to the property at this path with set-or-append semantics.
    pub(crate) fn add(&self, root: &mut Value, value: Value) -> Result<()> {
        let Step::Property(name) = &self.step else {
            return Err(AccessorError::assertion(format!("'{self}' is not a property path")));
        };
        merge::add_or_merge(self.parent_object_mut(root)?, name, value);
        Ok(())
    }

    fn parent_object_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Map<String, Value>> {
        let parent = self
            .parent()?
            .resolve_or_create(root, Box::new(|| Ok(Value::Object(Map::new()))))?;
        match parent {
            Value::Object(object) => Ok(object),
            other => Err(AccessorError::assertion(format!(
                "parent of '{self}' is not an object: '{other}'"
            ))),
        }
    }

    fn parent_array_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Vec<Value>> {
        let parent = self
            .parent()?
            .resolve_or_create(root, Box::new(|| Ok(Value::Array(Vec::new()))))?;
        match parent {
            Value::Array(items) => Ok(items),
            other => Err(AccessorError::assertion(format!(
                "parent of '{self}' is not an array: '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.runtime_path())
    }
}

fn check_root(root: &Value) -> Result<&Value> {
    match root {
        Value::Object(_) => Ok(root),
        Value::Null => Err(AccessorError::assertion("root document must not be null")),
        other => Err(AccessorError::assertion(format!(
            "root document must be a JSON object, got '{other}'"
        ))),
    }
}

fn check_root_mut(root: &mut Value) -> Result<&mut Value> {
    check_root(root)?;
    Ok(root)
}

fn expect_object(node: &Value) -> Result<&Map<String, Value>> {
    node.as_object()
        .ok_or_else(|| AccessorError::assertion(format!("expected an object, got '{node}'")))
}

fn expect_array(node: &Value) -> Result<&Vec<Value>> {
    node.as_array()
        .ok_or_else(|| AccessorError::assertion(format!("expected an array, got '{node}'")))
}

// Pads `items` with `null` up to `index` inclusive and returns the slot.
fn fill_to<'a>(items: &'a mut Vec<Value>, index: usize, path: &Path) -> Result<&'a mut Value> {
    if index >= items.len() {
        let len = index
            .checked_add(1)
            .ok_or_else(|| AccessorError::unsupported(format!("'{path}': array index {index} is out of range")))?;
        items.try_reserve(len - items.len()).map_err(|err| {
            AccessorError::unsupported(format!("'{path}': cannot extend array to {len} elements: {err}"))
        })?;
        trace!(path = %path, from = items.len(), to = len, "extending JSON array with nulls");
        items.resize(len, Value::Null);
    }
    items
        .get_mut(index)
        .ok_or_else(|| AccessorError::assertion(format!("'{path}' is out of bounds after filling")))
}

/// Applies the single-element-array rule.
///
/// `null` and `[]` read as absent, a matching node reads as itself, a
/// one-element array reads as its element, anything else is an error.
pub(crate) fn coerce<'a>(node: Option<&'a Value>, kind: ElementKind, path: &Path) -> Result<Option<&'a Value>> {
    let node = match node {
        None | Some(Value::Null) => return Ok(None),
        Some(node) => node,
    };
    if kind.is_instance(Some(node)) {
        return Ok(Some(node));
    }
    match node {
        Value::Array(items) if items.is_empty() => Ok(None),
        Value::Array(items) if items.len() == 1 => coerce(items.first(), kind, path),
        other => Err(AccessorError::unexpected_type(path.runtime_path(), kind, other)),
    }
}

fn coerce_mut<'a>(node: &'a mut Value, kind: ElementKind, path: &Path) -> Result<Option<&'a mut Value>> {
    if node.is_null() {
        return Ok(None);
    }
    if kind.is_instance(Some(&*node)) {
        return Ok(Some(node));
    }
    match node.as_array().map(Vec::len) {
        Some(0) => Ok(None),
        Some(1) => match node.as_array_mut().and_then(|items| items.first_mut()) {
            Some(item) => coerce_mut(item, kind, path),
            None => Ok(None),
        },
        _ => Err(AccessorError::unexpected_type(path.runtime_path(), kind, node)),
    }
}

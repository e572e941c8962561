// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Typed instances and the attribute store.
//!
//! An `Instance` pairs a shape with a coercion registry and a per-instance
//! attribute store. The store is the single source of truth for field
//! state: generated accessors never bypass it. The registry binds at
//! construction time, not at shape declaration — registries can be swapped
//! or extended after a shape is declared, as long as resolution happens
//! before first use.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ComposeError;
use crate::registry::CoercionRegistry;
use crate::shape::{Shape, INGEST_METHOD};
use crate::value::Value;

/// A typed object: shape + bound registry + attribute store.
#[derive(Clone)]
pub struct Instance {
    shape: Arc<Shape>,
    registry: Arc<CoercionRegistry>,
    attrs: BTreeMap<String, Value>,
}

impl Instance {
    /// Create an empty instance of `shape` bound to `registry`.
    pub fn new(shape: Arc<Shape>, registry: Arc<CoercionRegistry>) -> Self {
        Self {
            shape,
            registry,
            attrs: BTreeMap::new(),
        }
    }

    /// Construct an instance from a plain record, flowing every field
    /// through the ingestion entry point (and any trait wrappers on it).
    pub fn from_record(
        shape: Arc<Shape>,
        registry: Arc<CoercionRegistry>,
        record: serde_json::Value,
    ) -> Self {
        let mut instance = Self::new(shape, registry);
        instance.fill(Value::from(record));
        instance
    }

    /// The instance's shape.
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// The registry this instance resolves coercions against.
    pub fn registry(&self) -> &Arc<CoercionRegistry> {
        &self.registry
    }

    /// Read a field.
    ///
    /// Routes through the field's custom getter when one is declared.
    /// Otherwise reads the attribute store, initializing the slot to `Null`
    /// on first read so relation- or container-like fields can be operated
    /// on without explicit initialization.
    pub fn get(&mut self, name: &str) -> Value {
        let shape = Arc::clone(&self.shape);
        if let Some(field) = shape.field(name) {
            if let Some(getter) = field.getter() {
                return getter(self);
            }
        }
        if let Some(value) = self.attrs.get(name) {
            return value.clone();
        }
        self.attrs.insert(name.to_string(), Value::Null);
        Value::Null
    }

    /// Write a field.
    ///
    /// Declared fields coerce the incoming value through the bound registry
    /// (or route through the custom setter, which bypasses coercion).
    /// Undeclared names are stored raw as ad hoc keys.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let shape = Arc::clone(&self.shape);
        match shape.field(name) {
            Some(field) => {
                if let Some(setter) = field.setter() {
                    setter(self, value);
                    return;
                }
                let stored = match field.spec() {
                    Some(spec) => self.registry.cast(value, spec),
                    None => value,
                };
                self.attrs.insert(name.to_string(), stored);
            }
            None => {
                self.attrs.insert(name.to_string(), value);
            }
        }
    }

    /// Read the attribute store directly, without accessor routing and
    /// without initializing absent slots.
    pub fn peek(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// The identity-key value, used by containers for duplicate
    /// suppression. Absent identity reads as `Null` ("never a duplicate").
    pub fn identity(&self) -> Value {
        self.attrs
            .get(self.shape.identity_key())
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Invoke an installed method. An unknown method name is a hard error:
    /// calling a method that was never composed is a programming mistake.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, ComposeError> {
        let method = self
            .shape
            .method(name)
            .ok_or_else(|| ComposeError::MethodNotFound(name.to_string()))?;
        Ok(method(self, args))
    }

    /// Capability probe: invoke the method if the shape carries one,
    /// otherwise do nothing. This is how traits depend on each other
    /// optionally instead of mandatorily.
    pub fn try_call(&mut self, name: &str, args: &[Value]) -> Option<Value> {
        let method = self.shape.method(name)?;
        Some(method(self, args))
    }

    /// Run a record through the ingestion entry point.
    pub fn fill(&mut self, record: Value) {
        let _ = self.try_call(INGEST_METHOD, &[record]);
    }

    /// Structural serialize: every visible declared field (through the
    /// registry, using its recorded spec when known) plus any ad hoc store
    /// keys, excluding underscore-prefixed internals.
    pub fn to_record(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for field in self.shape.fields() {
            if !field.is_visible() || field.name().starts_with('_') {
                continue;
            }
            let value = self.attrs.get(field.name()).cloned().unwrap_or(Value::Null);
            let plain = match field.spec() {
                Some(spec) => self.registry.serialize(value, spec),
                None => value,
            };
            out.insert(field.name().to_string(), plain.to_json());
        }
        for (key, value) in &self.attrs {
            if self.shape.field(key).is_some() || key.starts_with('_') {
                continue;
            }
            out.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(out)
    }

    /// Reflection-style key listing: visible declared fields in declaration
    /// order, then ad hoc keys, underscore-prefixed internals excluded.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .shape
            .fields()
            .iter()
            .filter(|f| f.is_visible() && !f.name().starts_with('_'))
            .map(|f| f.name().to_string())
            .collect();
        for key in self.attrs.keys() {
            if self.shape.field(key).is_none() && !key.starts_with('_') {
                keys.push(key.clone());
            }
        }
        keys
    }
}

/// Structural equality: same shape name, equal attribute stores. The bound
/// registry is deliberately not part of the contract.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.shape.name() == other.shape.name() && self.attrs == other.attrs
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("shape", &self.shape.name())
            .field("attrs", &self.attrs)
            .finish()
    }
}

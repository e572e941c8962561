// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Shape composition.
//!
//! A `Shape` is the composed schema that fields and traits attach to: an
//! ordered list of field descriptors, a method table, and an identity-key
//! name. Composition is monotonically additive — build, then use. There is
//! no teardown and no collision validation: last registration wins, by
//! design, so traits and callers can deliberately override earlier
//! installations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::instance::Instance;
use crate::value::Value;

/// Name of the data-ingestion entry point installed on every shape.
/// Traits wrap this method to observe record ingestion.
pub const INGEST_METHOD: &str = "fill";

/// Default identity-key field name.
pub const DEFAULT_IDENTITY_KEY: &str = "id";

/// Custom getter closure. Bypasses coercion entirely; trusted to manage its
/// own backing state.
pub type Getter = Arc<dyn Fn(&mut Instance) -> Value + Send + Sync>;

/// Custom setter closure. Bypasses coercion entirely.
pub type Setter = Arc<dyn Fn(&mut Instance, Value) + Send + Sync>;

/// An installed shape method. Wrapping a method means capturing the prior
/// `Arc` via [`Shape::method`] and installing a replacement that calls it.
pub type Method = Arc<dyn Fn(&mut Instance, &[Value]) -> Value + Send + Sync>;

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// A declared field: name, type specifier, optional custom accessors, and a
/// visibility flag. Created once at declaration, never mutated afterwards.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    spec: Option<String>,
    get: Option<Getter>,
    set: Option<Setter>,
    visible: bool,
}

impl FieldDescriptor {
    /// Declare a typed field with a specifier string (e.g. `"decimal:2"`).
    pub fn new(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: Some(spec.into()),
            get: None,
            set: None,
            visible: true,
        }
    }

    /// Declare a field with no type specifier; pair with custom accessors.
    pub fn computed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: None,
            get: None,
            set: None,
            visible: true,
        }
    }

    /// Attach a custom getter.
    pub fn with_get<G>(mut self, get: G) -> Self
    where
        G: Fn(&mut Instance) -> Value + Send + Sync + 'static,
    {
        self.get = Some(Arc::new(get));
        self
    }

    /// Attach a custom setter.
    pub fn with_set<S>(mut self, set: S) -> Self
    where
        S: Fn(&mut Instance, Value) + Send + Sync + 'static,
    {
        self.set = Some(Arc::new(set));
        self
    }

    /// Exclude the field from key listings and structural serialization.
    /// Accessor behavior is unaffected.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded type specifier, if any.
    pub fn spec(&self) -> Option<&str> {
        self.spec.as_deref()
    }

    /// Custom getter, if any.
    pub(crate) fn getter(&self) -> Option<Getter> {
        self.get.clone()
    }

    /// Custom setter, if any.
    pub(crate) fn setter(&self) -> Option<Setter> {
        self.set.clone()
    }

    /// Visibility flag.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("custom_get", &self.get.is_some())
            .field("custom_set", &self.set.is_some())
            .field("visible", &self.visible)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// The composed schema object.
pub struct Shape {
    name: String,
    identity_key: String,
    fields: Vec<FieldDescriptor>,
    methods: HashMap<String, Method>,
}

impl Shape {
    /// Create a shape with the default ingestion method installed.
    pub fn new(name: impl Into<String>) -> Self {
        let mut shape = Self {
            name: name.into(),
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            fields: Vec::new(),
            methods: HashMap::new(),
        };
        // Default data-ingestion entry point: assign every record key
        // through the coerced setters. Traits wrap this to observe
        // ingestion.
        shape.install_method(INGEST_METHOD, |inst: &mut Instance, args: &[Value]| {
            if let Some(Value::Map(entries)) = args.first() {
                for (key, value) in entries.clone() {
                    inst.set(&key, value);
                }
            }
            Value::Null
        });
        shape
    }

    /// Shape name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity-key field name used for duplicate suppression by containers.
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// Override the identity-key field name.
    pub fn set_identity_key(&mut self, key: impl Into<String>) {
        self.identity_key = key.into();
    }

    /// Install one field descriptor. Redeclaring a name replaces the
    /// descriptor in place, keeping its declaration position.
    pub fn install_field(&mut self, descriptor: FieldDescriptor) {
        match self.fields.iter().position(|f| f.name == descriptor.name) {
            Some(index) => self.fields[index] = descriptor,
            None => self.fields.push(descriptor),
        }
    }

    /// Install a batch of field descriptors.
    pub fn install_fields<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        for descriptor in descriptors {
            self.install_field(descriptor);
        }
    }

    /// Look up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Install or replace a method. No collision validation: last
    /// registration wins.
    pub fn install_method<M>(&mut self, name: impl Into<String>, method: M)
    where
        M: Fn(&mut Instance, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
    }

    /// Get a method by name. Capturing the returned `Arc` before installing
    /// a replacement is how traits layer behavior over earlier traits.
    pub fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    /// Capability probe: does this shape carry a method of this name?
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field("identity_key", &self.identity_key)
            .field("fields", &self.fields)
            .field("methods", &methods)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_declaration_order() {
        let mut shape = Shape::new("Invoice");
        shape.install_fields([
            FieldDescriptor::new("total", "decimal:2"),
            FieldDescriptor::new("issued_on", "date"),
            FieldDescriptor::new("id", "number"),
        ]);
        let names: Vec<&str> = shape.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["total", "issued_on", "id"]);
    }

    #[test]
    fn redeclaration_replaces_in_place() {
        let mut shape = Shape::new("Invoice");
        shape.install_field(FieldDescriptor::new("total", "number"));
        shape.install_field(FieldDescriptor::new("issued_on", "date"));
        shape.install_field(FieldDescriptor::new("total", "decimal:2"));

        assert_eq!(shape.fields().len(), 2);
        assert_eq!(shape.fields()[0].name(), "total");
        assert_eq!(shape.field("total").and_then(|f| f.spec()), Some("decimal:2"));
    }

    #[test]
    fn default_ingestion_method_is_present() {
        let shape = Shape::new("Invoice");
        assert!(shape.has_method(INGEST_METHOD));
        assert!(!shape.has_method("touch"));
    }

    #[test]
    fn method_overwrite_wins() {
        let mut shape = Shape::new("Invoice");
        shape.install_method("m", |_, _| Value::Int(1));
        shape.install_method("m", |_, _| Value::Int(2));
        assert!(shape.has_method("m"));
        assert_eq!(shape.methods.len(), 2); // fill + m
    }

    #[test]
    fn descriptor_flags() {
        let field = FieldDescriptor::new("secret", "string").hidden();
        assert!(!field.is_visible());
        assert_eq!(field.spec(), Some("string"));

        let computed = FieldDescriptor::computed("derived").with_get(|_| Value::Int(9));
        assert_eq!(computed.spec(), None);
        assert!(computed.getter().is_some());
    }

    #[test]
    fn identity_key_is_overridable() {
        let mut shape = Shape::new("Invoice");
        assert_eq!(shape.identity_key(), "id");
        shape.set_identity_key("invoice_no");
        assert_eq!(shape.identity_key(), "invoice_no");
    }
}

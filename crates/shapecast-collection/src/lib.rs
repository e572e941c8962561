// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Ordered typed container.
//!
//! A `RecordSet` is a straightforward consumer of the coercion engine: it
//! applies a caller-supplied coercion closure to every inserted element,
//! suppresses duplicates by identity key, and offers fold-based aggregate
//! helpers. A `null` or absent identity value means "never considered a
//! duplicate".
//!
//! # Example
//!
//! ```rust
//! use shapecast_collection::RecordSet;
//! use shapecast::{CoercionRegistry, Value};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(CoercionRegistry::with_builtins());
//! let reg = Arc::clone(&registry);
//! let mut set = RecordSet::new(move |raw| reg.cast(raw, "number"));
//!
//! assert!(set.push(Value::from("1")));
//! assert!(set.push(Value::from("2")));
//! assert_eq!(set.items(), &[Value::Int(1), Value::Int(2)]);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use shapecast::Value;

/// Default identity-key field name.
pub const DEFAULT_IDENTITY_KEY: &str = "id";

/// Coercion closure applied to every inserted element.
pub type CoerceFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Ordered collection of typed elements with identity-key duplicate
/// suppression.
pub struct RecordSet {
    coerce: CoerceFn,
    identity_key: String,
    items: Vec<Value>,
}

impl RecordSet {
    /// Create an empty set with the given coercion closure and the default
    /// identity key.
    pub fn new<F>(coerce: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            coerce: Arc::new(coerce),
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            items: Vec::new(),
        }
    }

    /// Override the identity-key field name.
    pub fn with_identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = key.into();
        self
    }

    /// Identity-key field name.
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// Insert a raw element, coercing it first.
    ///
    /// Returns `false` when the element's identity duplicates an existing
    /// one — the newcomer is suppressed and the existing element kept
    /// unchanged. Elements without an identity are always inserted.
    pub fn push(&mut self, raw: Value) -> bool {
        let typed = (self.coerce)(raw);
        let identity = self.identity_of(&typed);
        if !identity.is_null() && self.get(&identity).is_some() {
            log::debug!(
                "record set: suppressing duplicate identity {:?}",
                identity
            );
            return false;
        }
        self.items.push(typed);
        true
    }

    /// The identity value of an element: its identity-key field for maps
    /// and typed objects, `Null` for everything else.
    pub fn identity_of(&self, item: &Value) -> Value {
        field_of(item, &self.identity_key)
    }

    /// Find an element by identity value.
    pub fn get(&self, identity: &Value) -> Option<&Value> {
        if identity.is_null() {
            return None;
        }
        self.items
            .iter()
            .find(|item| self.identity_of(item) == *identity)
    }

    /// Remove and return an element by identity value.
    pub fn remove(&mut self, identity: &Value) -> Option<Value> {
        if identity.is_null() {
            return None;
        }
        let index = self
            .items
            .iter()
            .position(|item| self.identity_of(item) == *identity)?;
        Some(self.items.remove(index))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in insertion order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Iterate over elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Collect a named field from every element.
    pub fn pluck(&self, field: &str) -> Vec<Value> {
        self.items.iter().map(|item| field_of(item, field)).collect()
    }

    /// Sum a numeric field across all elements (non-numeric values are
    /// skipped).
    pub fn sum(&self, field: &str) -> f64 {
        self.numeric_values(field).fold(0.0, |acc, v| acc + v)
    }

    /// Average of a numeric field, `None` when no element carries one.
    pub fn avg(&self, field: &str) -> Option<f64> {
        let (count, total) = self
            .numeric_values(field)
            .fold((0usize, 0.0), |(n, acc), v| (n + 1, acc + v));
        if count == 0 {
            None
        } else {
            Some(total / count as f64)
        }
    }

    /// Minimum of a numeric field.
    pub fn min(&self, field: &str) -> Option<f64> {
        self.numeric_values(field).fold(None, |acc, v| {
            Some(acc.map_or(v, |m: f64| m.min(v)))
        })
    }

    /// Maximum of a numeric field.
    pub fn max(&self, field: &str) -> Option<f64> {
        self.numeric_values(field).fold(None, |acc, v| {
            Some(acc.map_or(v, |m: f64| m.max(v)))
        })
    }

    /// Group elements by the rendered value of a field, preserving
    /// insertion order inside each group.
    pub fn group_by(&self, field: &str) -> BTreeMap<String, Vec<Value>> {
        let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for item in &self.items {
            let key = render(&field_of(item, field));
            groups.entry(key).or_default().push(item.clone());
        }
        groups
    }

    /// Sort elements in place by a field, numerics first by value, other
    /// values by their rendered form. The sort is stable.
    pub fn sort_by(&mut self, field: &str) {
        self.items.sort_by(|a, b| {
            let av = field_of(a, field);
            let bv = field_of(b, field);
            compare(&av, &bv)
        });
    }

    /// Serialize the whole set onto the plain-record boundary.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.items.iter().map(Value::to_json).collect())
    }

    fn numeric_values<'a>(&'a self, field: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.items
            .iter()
            .filter_map(move |item| field_of(item, field).as_f64())
    }
}

impl fmt::Debug for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSet")
            .field("identity_key", &self.identity_key)
            .field("items", &self.items)
            .finish()
    }
}

/// Field lookup across the element kinds a set can hold.
fn field_of(item: &Value, field: &str) -> Value {
    match item {
        Value::Map(entries) => entries.get(field).cloned().unwrap_or(Value::Null),
        Value::Object(inst) => inst.peek(field).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Render a value as a grouping key.
fn render(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

/// Ordering for sort_by: numeric when both sides are numeric, rendered
/// string comparison otherwise.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => render(a).cmp(&render(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapecast::{CoercionRegistry, FieldDescriptor, Instance, Shape};

    fn record_set() -> RecordSet {
        let registry = Arc::new(CoercionRegistry::with_builtins());
        let mut shape = Shape::new("Reading");
        shape.install_fields([
            FieldDescriptor::new("id", "number"),
            FieldDescriptor::new("sensor", "string"),
            FieldDescriptor::new("value", "decimal:1"),
        ]);
        let shape = Arc::new(shape);
        RecordSet::new(move |raw| {
            let mut inst = Instance::new(Arc::clone(&shape), Arc::clone(&registry));
            inst.fill(raw);
            Value::from(inst)
        })
    }

    fn reading(id: i64, sensor: &str, value: f64) -> Value {
        Value::from(serde_json::json!({
            "id": id, "sensor": sensor, "value": value
        }))
    }

    #[test]
    fn insert_applies_coercion() {
        let mut set = record_set();
        set.push(Value::from(serde_json::json!({
            "id": "1", "sensor": "t0", "value": "21.44"
        })));
        assert_eq!(set.len(), 1);
        assert_eq!(set.pluck("id"), vec![Value::Int(1)]);
        assert_eq!(set.pluck("value"), vec![Value::Float(21.4)]);
    }

    #[test]
    fn duplicate_identity_is_suppressed() {
        let mut set = record_set();
        assert!(set.push(reading(1, "t0", 20.0)));
        assert!(!set.push(reading(1, "t1", 99.0)));
        assert_eq!(set.len(), 1);
        // The existing element is kept unchanged.
        assert_eq!(set.pluck("sensor"), vec![Value::from("t0")]);
    }

    #[test]
    fn null_identity_never_duplicates() {
        let mut set = record_set();
        assert!(set.push(Value::from(serde_json::json!({"sensor": "a"}))));
        assert!(set.push(Value::from(serde_json::json!({"sensor": "b"}))));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn get_and_remove_by_identity() {
        let mut set = record_set();
        set.push(reading(1, "t0", 20.0));
        set.push(reading(2, "t1", 22.0));

        assert!(set.get(&Value::Int(2)).is_some());
        assert!(set.get(&Value::Int(9)).is_none());
        assert!(set.get(&Value::Null).is_none());

        let removed = set.remove(&Value::Int(1)).unwrap();
        assert_eq!(field_of(&removed, "sensor"), Value::from("t0"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn identity_key_is_configurable() {
        let mut set = RecordSet::new(|raw| raw).with_identity_key("serial");
        assert!(set.push(Value::from(serde_json::json!({"serial": "a1"}))));
        assert!(!set.push(Value::from(serde_json::json!({"serial": "a1"}))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn aggregates_delegate_to_a_fold() {
        let mut set = record_set();
        set.push(reading(1, "t0", 20.0));
        set.push(reading(2, "t0", 22.0));
        set.push(reading(3, "t1", 27.0));

        assert_eq!(set.sum("value"), 69.0);
        assert_eq!(set.avg("value"), Some(23.0));
        assert_eq!(set.min("value"), Some(20.0));
        assert_eq!(set.max("value"), Some(27.0));
        assert_eq!(set.avg("missing"), None);
    }

    #[test]
    fn group_and_sort() {
        let mut set = record_set();
        set.push(reading(1, "t1", 27.0));
        set.push(reading(2, "t0", 20.0));
        set.push(reading(3, "t1", 22.0));

        let groups = set.group_by("sensor");
        assert_eq!(groups["t0"].len(), 1);
        assert_eq!(groups["t1"].len(), 2);

        set.sort_by("value");
        assert_eq!(
            set.pluck("id"),
            vec![Value::Int(2), Value::Int(3), Value::Int(1)]
        );
    }

    #[test]
    fn plain_map_elements_work_without_shapes() {
        let registry = Arc::new(CoercionRegistry::with_builtins());
        let mut set = RecordSet::new(move |raw| registry.cast(raw, "number"));
        set.push(Value::from("10"));
        set.push(Value::from("32"));
        // Scalar elements have no identity, so nothing is suppressed.
        assert_eq!(set.items(), &[Value::Int(10), Value::Int(32)]);
    }

    #[test]
    fn to_json_is_plain() {
        let mut set = record_set();
        set.push(reading(1, "t0", 21.5));
        let json = set.to_json();
        assert_eq!(json[0]["sensor"], serde_json::json!("t0"));
        assert_eq!(json[0]["value"], serde_json::json!(21.5));
    }
}

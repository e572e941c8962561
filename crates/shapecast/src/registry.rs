// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! The coercion registry.
//!
//! Maps lower-cased type names to cast/serialize function pairs and resolves
//! `"name:param:param"` specifiers against them. The registry is the
//! invocation context of every coercion function, so nested coercions
//! (`array:date` delegating each element to `date`) run through the same
//! table.
//!
//! Failure policy: the cast path never propagates an error. An unknown type
//! name or a failing coercion function is logged and the input value is
//! returned unchanged. A missing *serializer* is softer still — an info-level
//! note — because serialization gaps are common and non-fatal by design.

use std::collections::HashMap;
use std::sync::Arc;

use crate::builtins::{self, LIST_TYPE};
use crate::error::CoerceError;
use crate::typespec::TypeSpec;
use crate::value::Value;

/// A cast or serialize function.
///
/// The registry passes itself as the first argument so coercions can
/// delegate to other registered types.
pub type CoerceFn =
    Arc<dyn Fn(&CoercionRegistry, &Value, &[String]) -> Result<Value, CoerceError> + Send + Sync>;

/// A registered cast/serialize pair bound to a type name.
#[derive(Clone)]
pub struct Coercion {
    cast: CoerceFn,
    serialize: Option<CoerceFn>,
}

/// In-memory table of named coercions.
///
/// Plain mutable map with no internal locking: build it once at startup,
/// then share it read-only (`Arc`).
#[derive(Clone, Default)]
pub struct CoercionRegistry {
    coercions: HashMap<String, Coercion>,
}

impl CoercionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the built-in coercions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Register a cast-only coercion under `name`.
    ///
    /// The name is lower-cased; re-registering overwrites silently (last
    /// writer wins), which is how built-ins are overridden.
    pub fn register<C>(&mut self, name: &str, cast: C)
    where
        C: Fn(&CoercionRegistry, &Value, &[String]) -> Result<Value, CoerceError>
            + Send
            + Sync
            + 'static,
    {
        self.coercions.insert(
            name.to_lowercase(),
            Coercion {
                cast: Arc::new(cast),
                serialize: None,
            },
        );
    }

    /// Register a cast/serialize pair under `name`.
    pub fn register_with<C, S>(&mut self, name: &str, cast: C, serialize: S)
    where
        C: Fn(&CoercionRegistry, &Value, &[String]) -> Result<Value, CoerceError>
            + Send
            + Sync
            + 'static,
        S: Fn(&CoercionRegistry, &Value, &[String]) -> Result<Value, CoerceError>
            + Send
            + Sync
            + 'static,
    {
        self.coercions.insert(
            name.to_lowercase(),
            Coercion {
                cast: Arc::new(cast),
                serialize: Some(Arc::new(serialize)),
            },
        );
    }

    /// Check whether a type name is registered (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.coercions.contains_key(&name.to_lowercase())
    }

    /// List registered type names (sorted for determinism).
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.coercions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Cast a raw value to the type named by `spec`.
    ///
    /// Unknown type or failing caster: logs and returns `value` unchanged.
    pub fn cast(&self, value: Value, spec: &str) -> Value {
        let parsed = TypeSpec::parse(spec);
        let coercion = match self.coercions.get(&parsed.name) {
            Some(c) => c,
            None => {
                log::warn!("cast: no coercion registered for type '{}'", parsed.name);
                return value;
            }
        };
        match (coercion.cast)(self, &value, &parsed.params) {
            Ok(typed) => typed,
            Err(err) => {
                log::warn!("cast: coercion '{}' failed: {}", parsed.name, err);
                value
            }
        }
    }

    /// Serialize a typed value back to its plain representation.
    ///
    /// Typed objects defer to their own structural serialize; lists map the
    /// element serializer recursively. A missing serializer is an info-level
    /// note and the value passes through unchanged.
    pub fn serialize(&self, value: Value, spec: &str) -> Value {
        // Objects carry their own structural-serialize contract. Dates and
        // lists are excluded by construction: they are distinct variants
        // with rules of their own below.
        if let Value::Object(inst) = &value {
            return Value::from(inst.to_record());
        }

        let parsed = TypeSpec::parse(spec);
        if parsed.name == LIST_TYPE {
            if let Value::List(items) = value {
                let mapped = match parsed.element_spec() {
                    Some(elem) => items
                        .into_iter()
                        .map(|item| self.serialize(item, &elem))
                        .collect(),
                    None => items,
                };
                return Value::List(mapped);
            }
        }

        let coercion = match self.coercions.get(&parsed.name) {
            Some(c) => c,
            None => {
                log::info!(
                    "serialize: no coercion registered for type '{}', passing through",
                    parsed.name
                );
                return value;
            }
        };
        let serialize = match &coercion.serialize {
            Some(f) => f,
            None => {
                log::info!(
                    "serialize: type '{}' has no serializer, passing through",
                    parsed.name
                );
                return value;
            }
        };
        match serialize(self, &value, &parsed.params) {
            Ok(plain) => plain,
            Err(err) => {
                log::warn!("serialize: serializer '{}' failed: {}", parsed.name, err);
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_cast(
        _reg: &CoercionRegistry,
        value: &Value,
        _params: &[String],
    ) -> Result<Value, CoerceError> {
        match value {
            Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
            other => Err(CoerceError::incompatible("upper", format!("{:?}", other))),
        }
    }

    #[test]
    fn register_and_cast() {
        let mut reg = CoercionRegistry::new();
        reg.register("upper", upper_cast);
        assert_eq!(
            reg.cast(Value::from("abc"), "upper"),
            Value::from("ABC")
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut reg = CoercionRegistry::new();
        reg.register("Upper", upper_cast);
        assert!(reg.contains("UPPER"));
        assert_eq!(
            reg.cast(Value::from("abc"), "UPPER"),
            Value::from("ABC")
        );
    }

    #[test]
    fn unknown_type_passes_through() {
        let reg = CoercionRegistry::new();
        assert_eq!(
            reg.cast(Value::from("abc"), "no-such-type"),
            Value::from("abc")
        );
    }

    #[test]
    fn failing_caster_passes_through() {
        let mut reg = CoercionRegistry::new();
        reg.register("upper", upper_cast);
        // Caster rejects non-strings; the registry degrades to pass-through.
        assert_eq!(reg.cast(Value::Int(7), "upper"), Value::Int(7));
    }

    #[test]
    fn reregistration_overwrites() {
        let mut reg = CoercionRegistry::new();
        reg.register("t", |_, _, _| Ok(Value::Int(1)));
        reg.register("t", |_, _, _| Ok(Value::Int(2)));
        assert_eq!(reg.cast(Value::Null, "t"), Value::Int(2));
    }

    #[test]
    fn missing_serializer_passes_through() {
        let mut reg = CoercionRegistry::new();
        reg.register("upper", upper_cast);
        assert_eq!(
            reg.serialize(Value::from("ABC"), "upper"),
            Value::from("ABC")
        );
    }

    #[test]
    fn coercions_can_delegate_through_the_registry() {
        let mut reg = CoercionRegistry::new();
        reg.register("upper", upper_cast);
        reg.register("shout", |reg, value, _| {
            // Delegates to another registered coercion by name.
            match reg.cast(value.clone(), "upper") {
                Value::Str(s) => Ok(Value::Str(format!("{}!", s))),
                other => Ok(other),
            }
        });
        assert_eq!(reg.cast(Value::from("hey"), "shout"), Value::from("HEY!"));
    }
}

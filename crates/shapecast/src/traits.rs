// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Trait registry and built-in traits.
//!
//! A trait is a named composition function applied to a shape: it may
//! install fields, install methods, or wrap a previously installed method
//! by capturing its `Arc` before replacement. Application order is
//! caller-determined and matters: a trait observes exactly the shape state
//! left by earlier traits. Inter-trait dependencies are optional-by-probe,
//! never mandatory — a missing collaborator method is silently skipped.
//!
//! Unknown trait names are hard errors. Unlike coercion misses, applying a
//! trait that was never registered is a composition-time wiring mistake
//! that must not be swallowed.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;

use crate::error::ComposeError;
use crate::shape::{FieldDescriptor, Shape, INGEST_METHOD};
use crate::value::Value;

/// Built-in trait names.
pub const TIMESTAMPS_TRAIT: &str = "timestamps";
pub const SOFT_DELETE_TRAIT: &str = "soft-delete";

/// Method names installed by the built-in traits.
pub const TOUCH_METHOD: &str = "touch";
pub const DELETE_METHOD: &str = "delete";
pub const RESTORE_METHOD: &str = "restore";
pub const IS_DELETED_METHOD: &str = "is_deleted";

/// A composition function: receives the shape under composition and the
/// caller's options.
pub type TraitFn = Arc<dyn Fn(&mut Shape, &TraitOptions) + Send + Sync>;

// ---------------------------------------------------------------------------
// TraitOptions
// ---------------------------------------------------------------------------

/// String key/value options passed to a trait at application time.
#[derive(Debug, Clone, Default)]
pub struct TraitOptions {
    options: BTreeMap<String, String>,
}

impl TraitOptions {
    /// No options: every trait falls back to its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style option assignment.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up an option.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Look up an option, falling back to a default.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }
}

// ---------------------------------------------------------------------------
// TraitRegistry
// ---------------------------------------------------------------------------

/// Name-keyed store of composition functions.
#[derive(Clone, Default)]
pub struct TraitRegistry {
    traits: HashMap<String, TraitFn>,
}

impl TraitRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the built-in traits.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TIMESTAMPS_TRAIT, timestamps);
        registry.register(SOFT_DELETE_TRAIT, soft_delete);
        registry
    }

    /// Register a trait under a name. Re-registration overwrites.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&mut Shape, &TraitOptions) + Send + Sync + 'static,
    {
        self.traits.insert(name.to_string(), Arc::new(f));
    }

    /// Check whether a trait name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }

    /// List registered trait names (sorted for determinism).
    pub fn trait_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.traits.keys().cloned().collect();
        names.sort();
        names
    }

    /// Apply a registered trait to a shape.
    ///
    /// An unknown name fails with [`ComposeError::TraitNotFound`] and
    /// leaves the shape unmodified.
    pub fn apply(
        &self,
        shape: &mut Shape,
        name: &str,
        options: &TraitOptions,
    ) -> Result<(), ComposeError> {
        let trait_fn = self
            .traits
            .get(name)
            .ok_or_else(|| ComposeError::TraitNotFound(name.to_string()))?;
        trait_fn(shape, options);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Built-in traits
// ---------------------------------------------------------------------------

/// Timestamps trait.
///
/// Installs two `datetime` fields (option keys `created_field` /
/// `updated_field`), a `touch` method stamping the updated field, and a
/// wrapper around the ingestion entry point so that first-time ingestion
/// stamps the created field when absent and always refreshes the updated
/// field. `touch` honors an explicit moment passed as its first argument,
/// letting collaborators pin several stamps to the same instant.
fn timestamps(shape: &mut Shape, options: &TraitOptions) {
    let created = options.get_or("created_field", "created_at");
    let updated = options.get_or("updated_field", "updated_at");

    shape.install_fields([
        FieldDescriptor::new(created.as_str(), "datetime"),
        FieldDescriptor::new(updated.as_str(), "datetime"),
    ]);

    let touch_field = updated.clone();
    shape.install_method(TOUCH_METHOD, move |inst, args| {
        let moment = match args.first() {
            Some(Value::DateTime(dt)) => *dt,
            _ => Utc::now().naive_utc(),
        };
        inst.set(&touch_field, Value::DateTime(moment));
        Value::DateTime(moment)
    });

    // Wrap the ingestion entry point, capturing the prior method before
    // replacement.
    let inner = shape.method(INGEST_METHOD);
    shape.install_method(INGEST_METHOD, move |inst, args| {
        if let Some(inner) = &inner {
            inner(inst, args);
        }
        let now = Utc::now().naive_utc();
        let never_created = !matches!(inst.peek(&created), Some(v) if v.is_temporal());
        if never_created {
            inst.set(&created, Value::DateTime(now));
        }
        inst.set(&updated, Value::DateTime(now));
        Value::Null
    });
}

/// Soft-delete trait.
///
/// Installs one `datetime` marker field (option key `deleted_field`) and
/// the `delete` / `restore` / `is_deleted` methods. The `touch`
/// collaborator is captured at application time: applying soft-delete
/// before timestamps means the probe finds nothing and the touch side
/// effect is silently skipped — graceful degradation, not an error.
fn soft_delete(shape: &mut Shape, options: &TraitOptions) {
    let deleted = options.get_or("deleted_field", "deleted_at");

    shape.install_field(FieldDescriptor::new(deleted.as_str(), "datetime"));

    let touch = shape.method(TOUCH_METHOD);
    let marker = deleted.clone();
    shape.install_method(DELETE_METHOD, move |inst, _args| {
        let moment = Value::DateTime(Utc::now().naive_utc());
        inst.set(&marker, moment.clone());
        match &touch {
            // Same instant for the marker and the touch stamp.
            Some(touch) => {
                touch(inst, &[moment]);
            }
            None => log::debug!("soft-delete: no touch method composed, skipping"),
        }
        Value::Null
    });

    let touch = shape.method(TOUCH_METHOD);
    let marker = deleted.clone();
    shape.install_method(RESTORE_METHOD, move |inst, _args| {
        inst.set(&marker, Value::Null);
        match &touch {
            Some(touch) => {
                touch(inst, &[]);
            }
            None => log::debug!("soft-delete: no touch method composed, skipping"),
        }
        Value::Null
    });

    let marker = deleted;
    shape.install_method(IS_DELETED_METHOD, move |inst, _args| {
        let deleted = matches!(inst.peek(&marker), Some(v) if v.is_temporal());
        Value::Bool(deleted)
    });
}

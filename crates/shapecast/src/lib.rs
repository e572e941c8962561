// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Schema-driven data coercion and object composition.
//!
//! Given a plain, untyped record (network response, form input, storage
//! row), shapecast produces a richly typed object whose fields have been
//! converted to declared types, and reverses the conversion back to plain
//! data for transport or storage.
//!
//! # Features
//!
//! - **Coercion registry**: named bidirectional cast/serialize pairs,
//!   resolved from `"name:param"` specifiers (`"decimal:2"`, `"array:date"`)
//! - **Built-in coercions**: number, decimal, string, boolean, date,
//!   datetime, array — with documented best-effort degradation, never an
//!   exception on bad input
//! - **Shape composition**: field declarations become accessors routed
//!   through the registry and a per-instance attribute store
//! - **Traits**: named, reusable composition units that add fields and
//!   methods and wrap earlier installations (timestamps, soft-delete)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shapecast::{
//!     CoercionRegistry, FieldDescriptor, Instance, Shape, TraitOptions, TraitRegistry,
//! };
//!
//! let registry = Arc::new(CoercionRegistry::with_builtins());
//! let traits = TraitRegistry::with_builtins();
//!
//! let mut shape = Shape::new("Invoice");
//! shape.install_fields([
//!     FieldDescriptor::new("id", "number"),
//!     FieldDescriptor::new("total", "decimal:2"),
//!     FieldDescriptor::new("issued_on", "date"),
//! ]);
//! traits.apply(&mut shape, "timestamps", &TraitOptions::new()).unwrap();
//! let shape = Arc::new(shape);
//!
//! let mut invoice = Instance::from_record(
//!     shape,
//!     registry,
//!     serde_json::json!({"id": "7", "total": "19.999", "issued_on": "2024-03-09"}),
//! );
//! assert_eq!(invoice.get("total"), shapecast::Value::Float(20.0));
//!
//! let record = invoice.to_record();
//! assert_eq!(record["issued_on"], serde_json::json!("2024-03-09"));
//! ```
//!
//! # Failure policy
//!
//! The coercion path never raises: unknown type names and failing coercion
//! functions are logged (via the `log` facade) and the input passes through
//! unchanged. Composition-time mistakes — applying an unregistered trait,
//! calling an uninstalled method — are hard [`ComposeError`]s.

pub mod builtins;
pub mod error;
pub mod instance;
pub mod registry;
pub mod shape;
pub mod traits;
pub mod typespec;
pub mod value;

pub use error::{CoerceError, ComposeError};
pub use instance::Instance;
pub use registry::{CoerceFn, Coercion, CoercionRegistry};
pub use shape::{FieldDescriptor, Getter, Method, Setter, Shape, INGEST_METHOD};
pub use traits::{TraitOptions, TraitRegistry};
pub use typespec::TypeSpec;
pub use value::Value;

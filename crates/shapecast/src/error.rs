// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Error types.
//!
//! Two severities, two types. `CoerceError` travels only from a coercion
//! function back to the registry, which degrades it into a logged soft miss
//! and returns the input unchanged — it never crosses the public API.
//! `ComposeError` is the hard channel for composition-time programmer
//! mistakes (unknown trait, unknown method) and is returned to the caller.

use thiserror::Error;

/// Failure inside a coercion function.
///
/// The registry catches this, logs it, and passes the original value
/// through; a missing or failing caster must never crash the owning
/// application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("no coercion registered for type '{0}'")]
    UnknownType(String),

    #[error("cannot coerce {got} to {wanted}")]
    Incompatible { wanted: String, got: String },

    #[error("invalid parameter for type '{spec}': {reason}")]
    BadParameter { spec: String, reason: String },
}

impl CoerceError {
    /// Convenience constructor for the common mismatch case.
    pub fn incompatible(wanted: impl Into<String>, got: impl Into<String>) -> Self {
        Self::Incompatible {
            wanted: wanted.into(),
            got: got.into(),
        }
    }
}

/// Composition-time failure.
///
/// Unlike coercion misses these are raised to the caller: applying an
/// unregistered trait or calling an uninstalled method is a wiring mistake,
/// and swallowing it would hide a bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("trait not found: '{0}'")]
    TraitNotFound(String),

    #[error("method not found: '{0}'")]
    MethodNotFound(String),
}

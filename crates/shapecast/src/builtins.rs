// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Built-in coercions.
//!
//! A fixed library for the primitive and common shapes: `number`, `decimal`
//! (precision parameter, default 2), `string`, `boolean`, `date`,
//! `datetime`, and `array` (optional element type parameter).
//!
//! Degradation table, relied on by consumers and preserved exactly:
//!
//! | input                | number | boolean | array    | other scalars |
//! |----------------------|--------|---------|----------|---------------|
//! | null / absent        | null   | false   | [null]   | null          |
//! | present, uncoercible | 0      | truthy  | wrapped  | pass-through  |
//!
//! The `0` vs `null` asymmetry for numerics lets consumers distinguish
//! "never set" from "set to something uncoercible". Unrecognized date input
//! passes through unchanged rather than being rejected.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CoerceError;
use crate::registry::CoercionRegistry;
use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT};

/// Name of the built-in list type, special-cased by the registry's
/// serialize path.
pub const LIST_TYPE: &str = "array";

/// Default fractional digits for the `decimal` coercion.
const DEFAULT_DECIMAL_DIGITS: u32 = 2;

/// Register every built-in coercion into `registry`.
pub fn install(registry: &mut CoercionRegistry) {
    registry.register_with("number", cast_number, serialize_identity);
    registry.register_with("decimal", cast_decimal, serialize_identity);
    registry.register_with("string", cast_string, serialize_identity);
    registry.register_with("boolean", cast_boolean, serialize_identity);
    registry.register_with("date", cast_date, serialize_date);
    registry.register_with("datetime", cast_datetime, serialize_datetime);
    registry.register_with(LIST_TYPE, cast_array, serialize_array);
}

// ---------------------------------------------------------------------------
// Numerics
// ---------------------------------------------------------------------------

fn cast_number(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::Int(v) => Value::Int(*v),
        Value::Float(v) => Value::Float(*v),
        Value::Bool(b) => Value::Int(i64::from(*b)),
        Value::Str(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = s.parse::<f64>() {
                Value::Float(f)
            } else {
                // Present but uncoercible: 0, never an error.
                Value::Int(0)
            }
        }
        _ => Value::Int(0),
    })
}

fn cast_decimal(
    _reg: &CoercionRegistry,
    value: &Value,
    params: &[String],
) -> Result<Value, CoerceError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let digits = params
        .first()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_DECIMAL_DIGITS);
    let raw = match value {
        Value::Int(v) => *v as f64,
        Value::Float(v) => *v,
        Value::Bool(b) => f64::from(*b),
        Value::Str(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    // f64::round is round-half-away-from-zero, the documented rule.
    let factor = 10f64.powi(digits as i32);
    Ok(Value::Float((raw * factor).round() / factor))
}

// ---------------------------------------------------------------------------
// String and boolean
// ---------------------------------------------------------------------------

fn cast_string(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::Str(s) => Value::Str(s.clone()),
        Value::Bool(b) => Value::Str(b.to_string()),
        Value::Int(v) => Value::Str(v.to_string()),
        Value::Float(v) => Value::Str(v.to_string()),
        Value::Date(d) => Value::Str(d.format(DATE_FORMAT).to_string()),
        Value::DateTime(dt) => Value::Str(dt.format(DATETIME_FORMAT).to_string()),
        composite => Value::Str(composite.to_json().to_string()),
    })
}

fn cast_boolean(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    // The one scalar where null does not stay null: absent means false.
    Ok(Value::Bool(match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(v) => *v != 0,
        Value::Float(v) => *v != 0.0,
        Value::Str(s) => !s.is_empty(),
        _ => true,
    }))
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

fn cast_date(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::Date(d) => Value::Date(*d),
        Value::DateTime(dt) => Value::Date(dt.date()),
        Value::Str(s) => match parse_timestamp(s) {
            Some(dt) => Value::Date(dt.date()),
            // Unrecognized dates pass through rather than being rejected.
            None => Value::Str(s.clone()),
        },
        Value::Int(ms) => match from_epoch_millis(*ms) {
            Some(dt) => Value::Date(dt.date()),
            None => Value::Int(*ms),
        },
        other => other.clone(),
    })
}

fn cast_datetime(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::DateTime(dt) => Value::DateTime(*dt),
        Value::Date(d) => match d.and_hms_opt(0, 0, 0) {
            Some(dt) => Value::DateTime(dt),
            None => Value::Date(*d),
        },
        Value::Str(s) => match parse_timestamp(s) {
            Some(dt) => Value::DateTime(dt),
            None => Value::Str(s.clone()),
        },
        Value::Int(ms) => match from_epoch_millis(*ms) {
            Some(dt) => Value::DateTime(dt),
            None => Value::Int(*ms),
        },
        other => other.clone(),
    })
}

fn serialize_date(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(match value {
        Value::Date(d) => Value::Str(d.format(DATE_FORMAT).to_string()),
        Value::DateTime(dt) => Value::Str(dt.date().format(DATE_FORMAT).to_string()),
        other => other.clone(),
    })
}

fn serialize_datetime(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(match value {
        Value::DateTime(dt) => Value::Str(dt.format(DATETIME_FORMAT).to_string()),
        Value::Date(d) => match d.and_hms_opt(0, 0, 0) {
            Some(dt) => Value::Str(dt.format(DATETIME_FORMAT).to_string()),
            None => Value::Date(*d),
        },
        other => other.clone(),
    })
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

fn cast_array(
    reg: &CoercionRegistry,
    value: &Value,
    params: &[String],
) -> Result<Value, CoerceError> {
    // Non-list input wraps into a single-element list, null included.
    let items = match value {
        Value::List(items) => items.clone(),
        other => vec![other.clone()],
    };
    let items = if params.is_empty() {
        items
    } else {
        let elem = params.join(":");
        items
            .into_iter()
            .map(|item| reg.cast(item, &elem))
            .collect()
    };
    Ok(Value::List(items))
}

fn serialize_array(
    reg: &CoercionRegistry,
    value: &Value,
    params: &[String],
) -> Result<Value, CoerceError> {
    match value {
        Value::List(items) => {
            let items = if params.is_empty() {
                items.clone()
            } else {
                let elem = params.join(":");
                items
                    .iter()
                    .map(|item| reg.serialize(item.clone(), &elem))
                    .collect()
            };
            Ok(Value::List(items))
        }
        other => Ok(other.clone()),
    }
}

fn serialize_identity(
    _reg: &CoercionRegistry,
    value: &Value,
    _params: &[String],
) -> Result<Value, CoerceError> {
    Ok(value.clone())
}

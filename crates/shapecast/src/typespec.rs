// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 shapecast developers

//! Type specifier parsing.
//!
//! A specifier is a string of the form `name(":" param)*`, e.g. `"decimal:2"`
//! or `"array:date"`. The first segment is the type name (looked up
//! case-insensitively in the registry), the remaining segments are ordered
//! parameters interpreted by the coercion itself.

/// Delimiter between the type name and its parameters.
pub const SPEC_DELIMITER: char = ':';

/// A parsed type specifier. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// Type name, lower-cased (registry lookup is case-insensitive).
    pub name: String,
    /// Ordered positional parameters, kept verbatim.
    pub params: Vec<String>,
}

impl TypeSpec {
    /// Parse a specifier string.
    ///
    /// An empty string yields an empty name, which no registry entry can
    /// match — a recoverable soft miss, not an error.
    pub fn parse(spec: &str) -> Self {
        let mut segments = spec.split(SPEC_DELIMITER);
        let name = segments.next().unwrap_or("").trim().to_lowercase();
        let params = segments.map(|s| s.to_string()).collect();
        Self { name, params }
    }

    /// Re-join the parameters into the element specifier for container
    /// types, so `array:decimal:2` casts its elements as `decimal:2`.
    pub fn element_spec(&self) -> Option<String> {
        if self.params.is_empty() {
            None
        } else {
            Some(self.params.join(&SPEC_DELIMITER.to_string()))
        }
    }

    /// First parameter parsed as an unsigned number, if present and valid.
    pub fn numeric_param(&self, index: usize) -> Option<u32> {
        self.params.get(index).and_then(|p| p.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_name() {
        let spec = TypeSpec::parse("number");
        assert_eq!(spec.name, "number");
        assert!(spec.params.is_empty());
        assert_eq!(spec.element_spec(), None);
    }

    #[test]
    fn parse_with_params() {
        let spec = TypeSpec::parse("decimal:2");
        assert_eq!(spec.name, "decimal");
        assert_eq!(spec.params, vec!["2"]);
        assert_eq!(spec.numeric_param(0), Some(2));
    }

    #[test]
    fn parse_nested_element_spec() {
        let spec = TypeSpec::parse("array:decimal:2");
        assert_eq!(spec.name, "array");
        assert_eq!(spec.params, vec!["decimal", "2"]);
        assert_eq!(spec.element_spec().as_deref(), Some("decimal:2"));
    }

    #[test]
    fn name_is_lowercased() {
        let spec = TypeSpec::parse("DateTime");
        assert_eq!(spec.name, "datetime");
    }

    #[test]
    fn empty_specifier() {
        let spec = TypeSpec::parse("");
        assert_eq!(spec.name, "");
        assert!(spec.params.is_empty());
    }
}

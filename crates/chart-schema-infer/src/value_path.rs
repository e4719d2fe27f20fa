//! Discovered value paths and their classification

use serde::Serialize;
use std::collections::BTreeMap;

/// Marker appended to a path segment that denotes an array element
pub const ARRAY_MARKER: &str = "[]";

/// Table of value paths keyed by normalized dotted path
///
/// Ordered so that iteration is lexicographic, which keeps schema output
/// deterministic.
pub type ValueTable = BTreeMap<String, ValuePath>;

// =============================================================================
// VALUE KIND
// =============================================================================

/// Classification of a value path inferred from template usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Iterated as a list, indexed, or carrying an explicit `[]` marker
    Array,
    /// Iterated as key/value pairs or passed to a map function
    Map,
    /// Has nested fields referenced below it
    Object,
    /// No usable hint; emitted without a type constraint
    Unknown,
}

impl ValueKind {
    /// Returns true for container kinds (array, map or object)
    #[inline]
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Array => write!(f, "array"),
            Self::Map => write!(f, "map"),
            Self::Object => write!(f, "object"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// =============================================================================
// VALUE PATH
// =============================================================================

/// A `.Values` path discovered in a chart's templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePath {
    /// Normalized dotted path, without the `.Values.` prefix
    pub path: String,

    /// Inferred classification
    pub kind: ValueKind,

    /// Whether the value must be supplied
    pub required: bool,

    /// Default value, when one is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl ValuePath {
    pub fn new(path: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            path: path.into(),
            kind,
            required: false,
            default: None,
        }
    }

    /// Copy of this path re-keyed under `prefix.`
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            path: format!("{}.{}", prefix, self.path),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_kinds() {
        assert!(ValueKind::Array.is_structural());
        assert!(ValueKind::Map.is_structural());
        assert!(ValueKind::Object.is_structural());
        assert!(!ValueKind::Unknown.is_structural());
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueKind::Array.to_string(), "array");
        assert_eq!(ValueKind::Map.to_string(), "map");
        assert_eq!(ValueKind::Object.to_string(), "object");
        assert_eq!(ValueKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_prefixed_keeps_classification() {
        let value = ValuePath::new("auth.enabled", ValueKind::Unknown);
        let prefixed = value.prefixed("redis");

        assert_eq!(prefixed.path, "redis.auth.enabled");
        assert_eq!(prefixed.kind, ValueKind::Unknown);
        assert!(!prefixed.required);
    }
}

//! Category documents and category-identifier interpretation.

use serde::{Deserialize, Serialize};

/// Fallback name attached when an item has no resolvable category.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// A category document, read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "categoryName")]
    pub category_name: Option<String>,
}

impl Category {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            category_name: Some(name.into()),
        }
    }
}

/// Resolved interpretation of an item's category identifier.
///
/// A 24-hex-character id is treated as an object reference into the store;
/// anything else is matched literally. Object-reference interpretation is
/// tried first; literal matching is the fallback when the parse fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryRef {
    /// Normalized (lowercase) 24-hex-character object reference.
    ObjectRef(String),
    /// Opaque string matched as-is.
    Literal(String),
}

impl CategoryRef {
    /// Interpret a raw category id, object-reference first.
    ///
    /// The input is trimmed; blank input is the caller's concern (the
    /// enricher short-circuits to the fallback before parsing).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.len() == 24 && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            CategoryRef::ObjectRef(trimmed.to_ascii_lowercase())
        } else {
            CategoryRef::Literal(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryRef::ObjectRef(s) | CategoryRef::Literal(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_24_parses_as_object_ref() {
        let r = CategoryRef::parse("65F1A2B3C4D5E6F708192A3B");
        assert_eq!(
            r,
            CategoryRef::ObjectRef("65f1a2b3c4d5e6f708192a3b".to_string())
        );
    }

    #[test]
    fn non_hex_falls_back_to_literal() {
        assert_eq!(
            CategoryRef::parse("home-and-garden"),
            CategoryRef::Literal("home-and-garden".to_string())
        );
        // Right length, wrong alphabet.
        assert_eq!(
            CategoryRef::parse("zzzzzzzzzzzzzzzzzzzzzzzz"),
            CategoryRef::Literal("zzzzzzzzzzzzzzzzzzzzzzzz".to_string())
        );
    }

    #[test]
    fn wrong_length_hex_is_literal() {
        assert_eq!(
            CategoryRef::parse("abcdef"),
            CategoryRef::Literal("abcdef".to_string())
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            CategoryRef::parse("  electronics "),
            CategoryRef::Literal("electronics".to_string())
        );
    }
}

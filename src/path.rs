//! Slash-delimited store paths.
//!
//! A path alternates collection names and document ids: even-indexed
//! segments (0-based) name collections, odd-indexed segments name documents
//! under the preceding collection. `users/u1/orders` is a collection
//! target, `users/u1` a document target. Paths are built once per
//! invocation and never mutated.

use std::fmt;

use crate::error::{Error, Result};

/// An immutable collection or document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parse a slash-delimited path, rejecting empty segments.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidPath {
                path: raw.to_string(),
                reason: "path is empty".to_string(),
            });
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidPath {
                    path: raw.to_string(),
                    reason: "empty path segment".to_string(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Parse a path that must name a collection (odd segment count).
    pub fn parse_collection(raw: &str) -> Result<Self> {
        let path = Self::parse(raw)?;
        if !path.is_collection() {
            return Err(Error::InvalidPath {
                path: raw.to_string(),
                reason: "a collection path needs an odd number of segments".to_string(),
            });
        }
        Ok(path)
    }

    /// Parse a path that must name a document (even segment count).
    pub fn parse_document(raw: &str) -> Result<Self> {
        let path = Self::parse(raw)?;
        if path.is_collection() {
            return Err(Error::InvalidPath {
                path: raw.to_string(),
                reason: "a document path needs an even number of segments".to_string(),
            });
        }
        Ok(path)
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.segments.len() % 2 == 1
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment: the collection name or document id this path ends on.
    #[must_use]
    pub fn last(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Append one segment, turning a collection path into a document path
    /// or vice versa.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    /// Everything but the last segment; `None` for a single-segment path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_target() {
        let path = StorePath::parse_collection("users/u1/orders").unwrap();
        assert_eq!(path.segments(), ["users", "u1", "orders"]);
        assert!(path.is_collection());
    }

    #[test]
    fn test_document_target() {
        let path = StorePath::parse_document("users/u1").unwrap();
        assert!(!path.is_collection());
        assert_eq!(path.last(), "u1");
    }

    #[test]
    fn test_segment_count_mismatch() {
        assert!(StorePath::parse_collection("users/u1").is_err());
        assert!(StorePath::parse_document("users").is_err());
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(StorePath::parse("").is_err());
        assert!(StorePath::parse("users//orders").is_err());
        assert!(StorePath::parse("/users").is_err());
        assert!(StorePath::parse("users/").is_err());
    }

    #[test]
    fn test_child_and_parent() {
        let collection = StorePath::parse_collection("users").unwrap();
        let doc = collection.child("u1");
        assert!(!doc.is_collection());
        assert_eq!(doc.to_string(), "users/u1");
        assert_eq!(doc.parent().unwrap(), collection);
        assert!(collection.parent().is_none());
    }
}

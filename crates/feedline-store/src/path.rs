//! Collection addressing for the hierarchical document store.

use crate::error::{StoreError, StoreResult};

/// Path to a collection: a root collection name, optionally nested under
/// parent documents (`publications`, `publications/{id}/comments`).
///
/// Segments alternate collection name and document id. Every segment must be
/// non-empty and free of `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Path to a root collection.
    pub fn root(name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        validate_segment(&name)?;
        Ok(Self {
            segments: vec![name],
        })
    }

    /// Path to a sub-collection nested under a document of this collection.
    pub fn child(&self, doc_id: impl Into<String>, name: impl Into<String>) -> StoreResult<Self> {
        let doc_id = doc_id.into();
        let name = name.into();
        validate_segment(&doc_id)?;
        validate_segment(&name)?;

        let mut segments = self.segments.clone();
        segments.push(doc_id);
        segments.push(name);
        Ok(Self { segments })
    }

    /// Path segments, alternating collection name and document id.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the addressed collection (the final segment).
    pub fn collection_id(&self) -> &str {
        self.segments.last().expect("a path has at least one segment")
    }

    /// Segments of the parent document path; empty for a root collection.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Validate a caller-supplied document key.
pub fn validate_key(key: &str) -> StoreResult<()> {
    validate_segment(key)
}

fn validate_segment(segment: &str) -> StoreResult<()> {
    if segment.is_empty() {
        return Err(StoreError::InvalidPath("empty path segment".to_string()));
    }
    if segment.contains('/') {
        return Err(StoreError::InvalidPath(format!(
            "segment contains '/': {segment}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let path = CollectionPath::root("publications").unwrap();
        assert_eq!(path.to_string(), "publications");
        assert_eq!(path.collection_id(), "publications");
        assert!(path.parent_segments().is_empty());
    }

    #[test]
    fn test_child_path() {
        let path = CollectionPath::root("publications")
            .unwrap()
            .child("pub-1", "comments")
            .unwrap();
        assert_eq!(path.to_string(), "publications/pub-1/comments");
        assert_eq!(path.collection_id(), "comments");
        assert_eq!(path.parent_segments(), ["publications", "pub-1"]);
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(CollectionPath::root("").is_err());
        let root = CollectionPath::root("publications").unwrap();
        assert!(root.child("", "comments").is_err());
        assert!(root.child("pub-1", "").is_err());
    }

    #[test]
    fn test_slash_in_segment_rejected() {
        let root = CollectionPath::root("publications").unwrap();
        let result = root.child("a/b", "comments");
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("user-1").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("a/b").is_err());
    }
}

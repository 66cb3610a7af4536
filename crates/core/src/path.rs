//! Path resolution
//!
//! A storage path is `container[/object/name]`. Zero or one segment addresses a
//! container (the empty path is the account root), two or more address an object
//! whose name keeps its inner slashes.

use std::fmt;

/// Which kind of entity a path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Container,
    Object,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Container => write!(f, "container"),
            EntityKind::Object => write!(f, "object"),
        }
    }
}

/// A resolved storage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path with leading and trailing slashes removed
    pub path: String,
    /// First segment; empty for the account root
    pub container: String,
    /// Remaining segments joined by `/`; `None` for containers
    pub object: Option<String>,
}

impl ResolvedPath {
    pub fn kind(&self) -> EntityKind {
        if self.object.is_some() {
            EntityKind::Object
        } else {
            EntityKind::Container
        }
    }

    /// True for the account root (empty path)
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Resolve a slash-delimited path into container and object parts
///
/// Leading slashes are always dropped. A trailing slash is dropped from container
/// paths but kept on object paths, where it names a pseudo-directory marker.
pub fn resolve(path: &str) -> ResolvedPath {
    let path = path.trim_start_matches('/');

    match path.split_once('/') {
        Some((container, object)) if !object.trim_matches('/').is_empty() => ResolvedPath {
            path: path.to_string(),
            container: container.to_string(),
            object: Some(object.to_string()),
        },
        _ => {
            let container = path.trim_end_matches('/');
            ResolvedPath {
                path: container.to_string(),
                container: container.to_string(),
                object: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_container() {
        let p = resolve("photos");
        assert_eq!(p.kind(), EntityKind::Container);
        assert_eq!(p.container, "photos");
        assert_eq!(p.object, None);
        assert_eq!(p.path, "photos");
    }

    #[test]
    fn test_resolve_object() {
        let p = resolve("photos/2024/cat.jpg");
        assert_eq!(p.kind(), EntityKind::Object);
        assert_eq!(p.container, "photos");
        assert_eq!(p.object.as_deref(), Some("2024/cat.jpg"));
        assert_eq!(p.path, "photos/2024/cat.jpg");
    }

    #[test]
    fn test_resolve_trims_slashes() {
        let p = resolve("/photos/cat.jpg");
        assert_eq!(p.kind(), EntityKind::Object);
        assert_eq!(p.path, "photos/cat.jpg");

        let p = resolve("/photos/");
        assert_eq!(p.kind(), EntityKind::Container);
        assert_eq!(p.path, "photos");
    }

    #[test]
    fn test_resolve_keeps_directory_marker() {
        let p = resolve("photos/2024/");
        assert_eq!(p.kind(), EntityKind::Object);
        assert_eq!(p.container, "photos");
        assert_eq!(p.object.as_deref(), Some("2024/"));
        assert_eq!(p.path, "photos/2024/");

        let p = resolve("photos//");
        assert_eq!(p.kind(), EntityKind::Container);
        assert_eq!(p.path, "photos");
    }

    #[test]
    fn test_resolve_root() {
        for root in ["", "/", "//"] {
            let p = resolve(root);
            assert!(p.is_root());
            assert_eq!(p.kind(), EntityKind::Container);
            assert_eq!(p.container, "");
        }
    }

    #[test]
    fn test_resolve_segment_property() {
        let cases = [
            ("a/b", "a", "b"),
            ("a/b/c", "a", "b/c"),
            ("bucket/dir/sub/file.tar.gz", "bucket", "dir/sub/file.tar.gz"),
        ];
        for (input, container, object) in cases {
            let p = resolve(input);
            assert_eq!(p.kind(), EntityKind::Object, "{input}");
            assert_eq!(p.container, container, "{input}");
            assert_eq!(p.object.as_deref(), Some(object), "{input}");
        }
    }
}

//! Slash-delimited registry paths.
//!
//! The parent/child relation here scopes registry watches and membership
//! lookups: a watcher on `/nodes` sees `/nodes/a/b` but never `/nodesx`.
//! Everything in this module is pure.

use crate::CoreError;

/// Path separator used by registry keys.
pub const SEPARATOR: char = '/';

/// The root path.
pub const ROOT: &str = "/";

/// Strip trailing separators. The root (and the empty string) normalize to `/`.
pub fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        ROOT
    } else {
        trimmed
    }
}

/// Returns true if `child` is a strict descendant of `parent` at any depth.
///
/// Trailing slashes on either side are ignored, a path is never its own
/// parent, and `/b` is not a parent of `/bc`.
pub fn is_parent(parent: &str, child: &str) -> bool {
    let parent = normalize(parent);
    let child = normalize(child);

    if parent == child || !child.starts_with(SEPARATOR) {
        return false;
    }
    if parent == ROOT {
        return true;
    }

    match child.strip_prefix(parent) {
        Some(rest) => rest.len() > 1 && rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Returns true if `path` equals `prefix` or lies beneath it.
pub fn is_within(prefix: &str, path: &str) -> bool {
    normalize(prefix) == normalize(path) || is_parent(prefix, path)
}

/// Join a child segment onto a parent path.
pub fn join(parent: &str, segment: &str) -> String {
    let parent = normalize(parent);
    let segment = segment.trim_matches(SEPARATOR);
    if parent == ROOT {
        format!("{ROOT}{segment}")
    } else {
        format!("{parent}{SEPARATOR}{segment}")
    }
}

/// Non-empty segments of a path, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Last segment of a path, if it has one.
pub fn last_segment(path: &str) -> Option<&str> {
    segments(path).last()
}

/// Name of the segment directly below `parent` on the way to `descendant`.
///
/// `child_segment("/a", "/a/b/c")` is `Some("b")`.
pub fn child_segment<'a>(parent: &str, descendant: &'a str) -> Option<&'a str> {
    if !is_parent(parent, descendant) {
        return None;
    }
    let depth = segments(parent).count();
    segments(descendant).nth(depth)
}

/// Check that a path is absolute and has no empty interior segments.
pub fn validate(path: &str) -> Result<(), CoreError> {
    if !path.starts_with(SEPARATOR) {
        return Err(CoreError::InvalidPath(path.to_string()));
    }
    let normalized = normalize(path);
    if normalized != ROOT && normalized[1..].split(SEPARATOR).any(str::is_empty) {
        return Err(CoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_parent() {
        assert!(!is_parent("/a", "/b"));
        assert!(!is_parent("/a", "/a"));
        assert!(!is_parent("/b/c", "/b"));
        assert!(!is_parent("/b/c", "/b/"));

        assert!(is_parent("/", "/b"));
        assert!(is_parent("/b/c", "/b/c/d"));
        assert!(is_parent("/b", "/b/c/d"));
        assert!(is_parent("/b/", "/b/c/d"));
    }

    #[test]
    fn test_never_own_parent() {
        for p in ["/", "/a", "/a/", "/a/b", "/nodes/worker-groups/default"] {
            assert!(!is_parent(p, p), "{p} must not be its own parent");
        }
        assert!(!is_parent("/a/", "/a"));
        assert!(!is_parent("/", "//"));
    }

    #[test]
    fn test_child_with_trailing_slash_on_parent() {
        for p in ["/a", "/a/", "/a/b", "/a/b/"] {
            assert!(is_parent(p, &format!("{}/x", normalize(p))));
            assert!(is_parent(p, &format!("{}/x/", normalize(p))));
        }
    }

    #[test]
    fn test_shared_prefix_is_not_parent() {
        assert!(!is_parent("/b", "/bc"));
        assert!(!is_parent("/nodes/worker", "/nodes/workers/a"));
        assert!(!is_parent("/", "b"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/b/"), "/b");
        assert_eq!(normalize("/b///"), "/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_join_and_segments() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a/", "b"), "/a/b");
        assert_eq!(join("/a", "/b/"), "/a/b");
        assert_eq!(segments("/a/b/c").collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(last_segment("/a/b/"), Some("b"));
        assert_eq!(last_segment("/"), None);
    }

    #[test]
    fn test_child_segment() {
        assert_eq!(child_segment("/a", "/a/b/c"), Some("b"));
        assert_eq!(child_segment("/", "/a/b"), Some("a"));
        assert_eq!(child_segment("/a", "/ab/c"), None);
        assert_eq!(child_segment("/a", "/a"), None);
    }

    #[test]
    fn test_validate() {
        assert!(validate("/").is_ok());
        assert!(validate("/a/b").is_ok());
        assert!(validate("/a/b/").is_ok());
        assert!(validate("a/b").is_err());
        assert!(validate("/a//b").is_err());
    }
}

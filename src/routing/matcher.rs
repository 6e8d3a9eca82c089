//! Route matching logic.
//!
//! # Responsibilities
//! - Match a request path against a mount prefix
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefixes match on segment boundaries: `/api/v1/tours` does not claim `/api/v1/toursx`
//! - The root prefix `/` matches every path
//! - No regex, matching is a single prefix comparison

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing slash is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.len() > 1 && prefix.ends_with('/') {
            prefix.pop();
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api/v1/tours");

        assert!(matcher.matches("/api/v1/tours"));
        assert!(matcher.matches("/api/v1/tours/5c88fa8cf4afda39709c2955"));
        assert!(!matcher.matches("/api/v1/toursx"));
        assert!(!matcher.matches("/api/v1/users"));
    }

    #[test]
    fn test_root_matches_everything() {
        let matcher = PathPrefixMatcher::new("/");
        assert!(matcher.matches("/"));
        assert!(matcher.matches("/tour/the-sea-explorer"));
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let matcher = PathPrefixMatcher::new("/api/v1/users/");
        assert_eq!(matcher.prefix(), "/api/v1/users");
        assert!(matcher.matches("/api/v1/users"));
    }

    #[test]
    fn test_case_sensitive() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(!matcher.matches("/API/v1"));
    }
}

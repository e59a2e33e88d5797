/// Positional view over the `/`-separated segments of a path
///
/// For `/api/users`, index 0 is `""`, index 1 is `"api"`, index 2 is `"users"`.
/// Indexing past the end yields `""` instead of panicking, which is what the
/// positional classification rules expect.
///
/// # Examples
///
/// ```
/// use waymark_router::path::PathSegments;
///
/// let segments = PathSegments::new("/api/users");
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments.get(1), "api");
/// assert_eq!(segments.get(7), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegments<'a> {
    segments: Vec<&'a str>,
}

impl<'a> PathSegments<'a> {
    /// Splits `path` on every `/`
    ///
    /// An empty path still has one (empty) segment.
    pub fn new(path: &'a str) -> Self {
        Self {
            segments: path.split('/').collect(),
        }
    }

    /// Segment at `index`, or `""` if the path is shorter
    pub fn get(&self, index: usize) -> &'a str {
        self.segments.get(index).copied().unwrap_or("")
    }

    /// Number of segments actually produced by the split
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a split yields at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_has_one_segment() {
        let segments = PathSegments::new("");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments.get(0), "");
        assert!(!segments.is_empty());
    }

    #[test]
    fn test_missing_index_reads_empty() {
        let segments = PathSegments::new("/en");
        assert_eq!(segments.as_slice(), &["", "en"]);
        assert_eq!(segments.get(2), "");
        assert_eq!(segments.get(100), "");
    }

    #[test]
    fn test_relative_path() {
        let segments = PathSegments::new("en");
        assert_eq!(segments.get(0), "en");
        assert_eq!(segments.get(1), "");
    }
}

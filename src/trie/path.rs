//! Path normalization.

/// Turn a slash-delimited path into a lookup key: the non-empty
/// segments between slashes.
///
/// Leading, trailing, and adjacent slashes produce no segments, so
/// `""`, `"/"`, and `"///"` all normalize to the empty sequence (the
/// root).
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_empty_inputs() {
        assert!(split_path("").is_empty());
        assert!(split_path("/").is_empty());
        assert!(split_path("///").is_empty());
    }

    #[test]
    fn test_split_single_segment() {
        assert_eq!(split_path("foo"), vec!["foo"]);
        assert_eq!(split_path("/foo"), vec!["foo"]);
        assert_eq!(split_path("/foo/"), vec!["foo"]);
    }

    #[test]
    fn test_split_multiple_segments() {
        assert_eq!(split_path("/foo/bar"), vec!["foo", "bar"]);
        assert_eq!(split_path("foo/bar"), vec!["foo", "bar"]);
        assert_eq!(split_path("/foo/bar/"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_split_collapses_adjacent_slashes() {
        assert_eq!(split_path("///foo/bar"), vec!["foo", "bar"]);
        assert_eq!(split_path("/foo//bar/"), vec!["foo", "bar"]);
        assert_eq!(split_path("/foo/////bar/"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_split_non_ascii() {
        assert_eq!(split_path("/füßball"), vec!["füßball"]);
    }
}

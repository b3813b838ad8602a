//! File path matching for `allow-in` patterns.

use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Matches a call site's file against an `allow-in` pattern.
///
/// The host analyzer owns path semantics; implement this to plug in a
/// different normalization than [`GlobPathMatcher`].
pub trait PathMatcher: Send + Sync {
    /// Returns `true` if `file` matches `pattern`.
    fn matches(&self, pattern: &str, file: &Path) -> bool;
}

/// `fnmatch`-style options: `*` crosses `/`, case-sensitive, dotfiles are
/// not special.
const FNMATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Default [`PathMatcher`]: absolutizes patterns against the project root
/// and globs them against the absolute file path.
///
/// # Example
///
/// ```ignore
/// let paths = GlobPathMatcher::new("/project");
/// assert!(paths.matches("src/*-allow/*.*", Path::new("/project/src/x-allow/a.php")));
/// ```
#[derive(Debug, Clone)]
pub struct GlobPathMatcher {
    root: PathBuf,
}

impl GlobPathMatcher {
    /// Creates a matcher rooted at the given project directory.
    ///
    /// `.` and `..` segments of the root are resolved lexically.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&root.into()),
        }
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turns a root-relative pattern into an absolute one.
    ///
    /// The root is escaped so glob metacharacters in directory names match
    /// literally.
    #[must_use]
    pub fn absolutize_pattern(&self, pattern: &str) -> String {
        if Path::new(pattern).is_absolute() {
            return pattern.to_string();
        }
        let root = self.root.to_string_lossy();
        let root = root.trim_end_matches('/');
        let relative = pattern.trim_start_matches("./");
        format!("{}/{}", Pattern::escape(root), relative)
    }

    fn absolutize_file(&self, file: &Path) -> PathBuf {
        normalize(&self.root.join(file))
    }
}

/// Resolves `.` and `..` segments without touching the filesystem.
///
/// `..` above the root of an absolute path is dropped; leading `..` of a
/// relative path is kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

impl PathMatcher for GlobPathMatcher {
    fn matches(&self, pattern: &str, file: &Path) -> bool {
        let absolute = self.absolutize_pattern(pattern);
        match Pattern::new(&absolute) {
            Ok(compiled) => compiled.matches_path_with(&self.absolutize_file(file), FNMATCH),
            Err(e) => {
                warn!("Ignoring unusable path pattern {}: {}", absolute, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> GlobPathMatcher {
        GlobPathMatcher::new("/project")
    }

    #[test]
    fn test_absolutize_relative_pattern() {
        assert_eq!(
            matcher().absolutize_pattern("src/allowed/*.php"),
            "/project/src/allowed/*.php"
        );
        assert_eq!(
            matcher().absolutize_pattern("./src/*.php"),
            "/project/src/*.php"
        );
    }

    #[test]
    fn test_absolute_pattern_untouched() {
        assert_eq!(matcher().absolutize_pattern("/etc/*.conf"), "/etc/*.conf");
    }

    #[test]
    fn test_root_metacharacters_are_escaped() {
        let m = GlobPathMatcher::new("/work/[repo]");
        assert!(m.matches("src/*.php", Path::new("/work/[repo]/src/a.php")));
        assert!(!m.matches("src/*.php", Path::new("/work/r/src/a.php")));
    }

    #[test]
    fn test_star_crosses_directories() {
        assert!(matcher().matches("src/*.php", Path::new("/project/src/deep/nested/a.php")));
    }

    #[test]
    fn test_wildcard_directory_segment() {
        let m = matcher();
        assert!(m.matches(
            "src/*-allow/*.*",
            Path::new("/project/src/disallowed-allow/staticCalls.php")
        ));
        assert!(!m.matches(
            "src/*-allow/*.*",
            Path::new("/project/src/disallowed/staticCalls.php")
        ));
    }

    #[test]
    fn test_relative_file_is_joined_to_root() {
        assert!(matcher().matches("src/allowed/*.php", Path::new("src/allowed/x.php")));
        assert!(!matcher().matches("src/allowed/*.php", Path::new("src/other/x.php")));
    }

    #[test]
    fn test_root_dot_segments_are_resolved() {
        let m = GlobPathMatcher::new("/work/./repo/sub/..");
        assert_eq!(m.root(), Path::new("/work/repo"));
        assert!(m.matches("src/*", Path::new("/work/repo/src/a.php")));
        assert!(m.matches("src/*", Path::new("./src/a.php")));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../a/..")), PathBuf::from(".."));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matcher().matches("src/*.php", Path::new("/project/SRC/a.php")));
    }
}

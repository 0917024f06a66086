//! The `.kitkatignore` pattern engine.
//!
//! A gitignore-style subset: literal paths, directory patterns (trailing
//! `/`), and globs with `*`, `?`, and `**`. Tracked files always win — a
//! path present in the index is never ignored, whatever the patterns say.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::storage::IndexMap;

/// One compiled pattern from the ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    /// The pattern with any trailing `/` stripped.
    pub pattern: String,
    /// Whether the source line named a directory (trailing `/`).
    pub is_directory: bool,
}

impl IgnorePattern {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(Self {
            pattern: line.trim_end_matches('/').to_string(),
            is_directory: line.ends_with('/'),
        })
    }
}

/// Load patterns from `.kitkatignore` at the working root. A missing file
/// means no patterns.
pub fn load_patterns(root: &Path) -> Result<Vec<IgnorePattern>> {
    let raw = match fs::read_to_string(root.join(super::IGNORE_FILE)) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(raw.lines().filter_map(IgnorePattern::parse).collect())
}

/// Decide whether `path` is ignored.
///
/// Precedence: tracked override, literal match, directory match, glob.
pub fn should_ignore(path: &str, patterns: &[IgnorePattern], index: &IndexMap) -> bool {
    if index.contains_key(path) {
        return false;
    }

    for p in patterns {
        if p.pattern == path {
            return true;
        }
        if p.is_directory {
            if path == p.pattern || path.starts_with(&format!("{}/", p.pattern)) {
                return true;
            }
            continue;
        }
        if glob_match(&p.pattern, path) {
            return true;
        }
    }
    false
}

/// Glob semantics:
/// - a pattern without `/` is matched against the basename, so `*.log`
///   catches log files at any depth;
/// - a pattern with `/` is matched component-wise against the whole path,
///   `**` spanning any number of components (including zero);
/// - within a component, `*` matches a run of non-separator characters and
///   `?` exactly one.
fn glob_match(pattern: &str, path: &str) -> bool {
    if !pattern.contains('/') {
        let basename = path.rsplit('/').next().unwrap_or(path);
        return segment_match(pattern, basename);
    }
    let pat: Vec<&str> = pattern.split('/').collect();
    let segs: Vec<&str> = path.split('/').collect();
    components_match(&pat, &segs)
}

fn components_match(pattern: &[&str], segments: &[&str]) -> bool {
    match pattern.split_first() {
        None => segments.is_empty(),
        Some((&"**", rest)) => {
            // `**` may swallow zero or more leading components.
            (0..=segments.len()).any(|skip| components_match(rest, &segments[skip..]))
        }
        Some((first, rest)) => match segments.split_first() {
            Some((seg, seg_rest)) => segment_match(first, seg) && components_match(rest, seg_rest),
            None => false,
        },
    }
}

/// `*`/`?` matching within a single path component.
fn segment_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    seg_match_at(&p, &t)
}

fn seg_match_at(p: &[char], t: &[char]) -> bool {
    match p.split_first() {
        None => t.is_empty(),
        Some(('*', rest)) => (0..=t.len()).any(|skip| seg_match_at(rest, &t[skip..])),
        Some(('?', rest)) => match t.split_first() {
            Some((_, t_rest)) => seg_match_at(rest, t_rest),
            None => false,
        },
        Some((c, rest)) => match t.split_first() {
            Some((tc, t_rest)) => c == tc && seg_match_at(rest, t_rest),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectHash;

    fn pattern(line: &str) -> IgnorePattern {
        IgnorePattern::parse(line).unwrap()
    }

    fn ignored(path: &str, lines: &[&str]) -> bool {
        let patterns: Vec<_> = lines.iter().map(|l| pattern(l)).collect();
        should_ignore(path, &patterns, &IndexMap::new())
    }

    #[test]
    fn test_literal_match() {
        assert!(ignored("file.txt", &["file.txt"]));
        assert!(!ignored("other.txt", &["file.txt"]));
        assert!(ignored("subdir/file.txt", &["subdir/file.txt"]));
    }

    #[test]
    fn test_directory_pattern() {
        assert!(ignored("build/output.log", &["build/"]));
        assert!(ignored("build", &["build/"]));
        assert!(!ignored("builder.go", &["build/"]));
    }

    #[test]
    fn test_wildcards() {
        assert!(ignored("error.log", &["*.log"]));
        assert!(ignored("logs/error.log", &["*.log"]));
        assert!(ignored("temp_123", &["temp*"]));
        assert!(ignored("image.jzg", &["image.j?g"]));
        assert!(!ignored("image.jpeg", &["image.j?g"]));
    }

    #[test]
    fn test_double_star() {
        assert!(ignored("logs/mw/error.log", &["logs/**/*.log"]));
        assert!(ignored("logs/error.log", &["logs/**/*.log"]), "** matches zero components");
        assert!(ignored("foo/bar/baz.txt", &["**/baz.txt"]));
        assert!(ignored("foo/bar/node_modules/cache", &["foo/**"]));
        assert!(!ignored("bar/baz.rs", &["foo/**"]));
    }

    #[test]
    fn test_tracked_override_beats_patterns() {
        let patterns = vec![pattern("ignored.txt"), pattern("*.txt")];
        let mut index = IndexMap::new();
        index.insert("ignored.txt".to_string(), ObjectHash::of_bytes(b"x"));

        assert!(!should_ignore("ignored.txt", &patterns, &index));
        // A different path still matches.
        assert!(should_ignore("free.txt", &patterns, &index));
    }

    #[test]
    fn test_empty_patterns_ignore_nothing() {
        assert!(!ignored("file.txt", &[]));
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        assert!(IgnorePattern::parse("# comment").is_none());
        assert!(IgnorePattern::parse("").is_none());
        assert!(IgnorePattern::parse("   ").is_none());
        assert!(IgnorePattern::parse("real.txt").is_some());
    }

    #[test]
    fn test_object_suffix_anywhere() {
        assert!(ignored("src/vendor/lib.o", &["*.o"]));
    }
}

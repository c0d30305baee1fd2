use crate::error::Result;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

/// A compiled gitignore-style pattern.
///
/// Brace groups are expanded up front and every alternative is compiled into
/// one `GlobSet`, so a match on any alternative is a match of the pattern.
/// A trailing `/` makes the pattern directory-only. A pattern containing a
/// `/` (other than a trailing one) is anchored at the scan root; a bare
/// name matches at any depth.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    dir_only: bool,
    alternatives: Vec<String>,
    set: GlobSet,
}

impl PatternMatcher {
    pub fn new(pattern: &str) -> Self {
        let dir_only = pattern.ends_with('/');
        let alternatives = expand_braces(pattern);

        let mut builder = GlobSetBuilder::new();
        let mut compiled = 0usize;
        for alternative in &alternatives {
            let Some(glob_str) = translate_to_glob(alternative) else {
                log::trace!("Pattern alternative '{}' is empty, skipping", alternative);
                continue;
            };
            match compile_glob(&glob_str) {
                Ok(glob) => {
                    log::trace!(
                        "Compiled pattern alternative '{}' as glob '{}'",
                        alternative,
                        glob_str
                    );
                    builder.add(glob);
                    compiled += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Invalid pattern \"{}\" (alternative \"{}\"): {}",
                        pattern,
                        alternative,
                        e
                    );
                }
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            log::warn!("Could not build matcher for \"{}\": {}", pattern, e);
            GlobSet::empty()
        });
        if compiled == 0 {
            log::debug!("Pattern \"{}\" has no valid alternative and never matches", pattern);
        }

        Self {
            dir_only,
            alternatives,
            set,
        }
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    /// Brace-expanded forms of the pattern, before glob translation.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn matches(&self, relative_path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let candidate = normalize_relpath(relative_path);
        if candidate.is_empty() {
            return false;
        }
        self.set.is_match(candidate.as_str())
    }
}

/// Path separators are literal, so `*` never crosses a `/`.
fn compile_glob(glob_str: &str) -> Result<Glob> {
    let glob = GlobBuilder::new(glob_str)
        .literal_separator(true)
        .backslash_escape(true)
        .build()?;
    Ok(glob)
}

/// Expands the first `{a,b,...}` group and recurses on each result.
/// Nested groups are not recognized; an unterminated or empty group is
/// left as literal text.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|offset| open + offset) else {
        return vec![pattern.to_string()];
    };
    let body = &pattern[open + 1..close];
    if body.is_empty() {
        return vec![pattern.to_string()];
    }

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut expanded: Vec<String> = Vec::new();
    for option in body.split(',') {
        for candidate in expand_braces(&format!("{prefix}{option}{suffix}")) {
            if !expanded.contains(&candidate) {
                expanded.push(candidate);
            }
        }
    }
    expanded
}

/// Converts a relative path to the form patterns are matched against:
/// forward slashes, no leading `./` or `/`, no trailing `/`.
pub fn normalize_relpath(relative_path: &str) -> String {
    let unified = relative_path.replace('\\', "/");
    let mut path = unified.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    let path = path.trim_start_matches('/').trim_end_matches('/');
    if path == "." {
        String::new()
    } else {
        path.to_string()
    }
}

fn translate_to_glob(alternative: &str) -> Option<String> {
    let trimmed = alternative.trim_end_matches('/');
    let (anchored, body) = match trimmed.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (trimmed.contains('/'), trimmed),
    };
    if body.is_empty() {
        return None;
    }
    if anchored || body.starts_with("**") {
        Some(body.to_string())
    } else {
        Some(format!("**/{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_single_group() {
        assert_eq!(expand_braces("src/{a,b}.py"), vec!["src/a.py", "src/b.py"]);
    }

    #[test]
    fn expands_groups_left_to_right() {
        assert_eq!(
            expand_braces("{src,lib}/*.{rs,toml}"),
            vec!["src/*.rs", "src/*.toml", "lib/*.rs", "lib/*.toml"]
        );
    }

    #[test]
    fn leaves_unterminated_and_empty_groups_alone() {
        assert_eq!(expand_braces("a{b"), vec!["a{b"]);
        assert_eq!(expand_braces("a{}b"), vec!["a{}b"]);
        assert_eq!(expand_braces("plain/*.txt"), vec!["plain/*.txt"]);
    }

    #[test]
    fn bare_names_match_at_any_depth() {
        let m = PatternMatcher::new("*.py");
        assert!(m.matches("main.py", false));
        assert!(m.matches("pkg/sub/__init__.py", false));
        assert!(!m.matches("main.pyc", false));
    }

    #[test]
    fn slash_anchors_to_root() {
        let m = PatternMatcher::new("src/*.rs");
        assert!(m.matches("src/main.rs", false));
        assert!(!m.matches("nested/src/main.rs", false));
        assert!(!m.matches("src/bin/tool.rs", false));

        let rooted = PatternMatcher::new("/notes.md");
        assert!(rooted.matches("notes.md", false));
        assert!(!rooted.matches("docs/notes.md", false));
    }

    #[test]
    fn double_star_crosses_segments() {
        let m = PatternMatcher::new("data/**/*.csv");
        assert!(m.matches("data/users.csv", false));
        assert!(m.matches("data/2024/q1/sales.csv", false));
        assert!(!m.matches("other/users.csv", false));

        let everything = PatternMatcher::new("**");
        assert!(everything.matches("a", true));
        assert!(everything.matches("a/b/c.txt", false));
    }

    #[test]
    fn trailing_slash_is_directory_only() {
        let m = PatternMatcher::new("config/");
        assert!(m.is_dir_only());
        assert!(m.matches("config", true));
        assert!(m.matches("nested/config", true));
        assert!(!m.matches("config", false));
        assert!(!m.matches("config.txt", false));
    }

    #[test]
    fn trailing_double_star_does_not_match_the_directory_itself() {
        let m = PatternMatcher::new("build/**");
        assert!(!m.matches("build", true));
        assert!(m.matches("build/temp.js", false));
        assert!(m.matches("build/reports", true));
    }

    #[test]
    fn invalid_pattern_never_matches() {
        let m = PatternMatcher::new("[abc");
        assert!(!m.matches("[abc", false));
        assert!(!m.matches("a", false));
    }

    #[test]
    fn normalizes_candidates() {
        assert_eq!(normalize_relpath("./src/main.rs"), "src/main.rs");
        assert_eq!(normalize_relpath("src\\lib.rs"), "src/lib.rs");
        assert_eq!(normalize_relpath("build/"), "build");
        assert_eq!(normalize_relpath("."), "");
        assert_eq!(normalize_relpath(""), "");
    }
}

use std::fmt;

/// Pattern that matches every path; used for the implicit whitelist rule.
pub const MATCH_ALL_PATTERN: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Include,
    Exclude,
    ExcludeDir,
}

impl RuleKind {
    /// The verdict a matching rule of this kind contributes.
    pub fn action(self) -> Action {
        match self {
            RuleKind::Include => Action::Include,
            RuleKind::Exclude | RuleKind::ExcludeDir => Action::Exclude,
        }
    }

    /// Command-line flag that produces rules of this kind.
    pub fn flag(self) -> &'static str {
        match self {
            RuleKind::Include => "--include",
            RuleKind::Exclude => "--exclude",
            RuleKind::ExcludeDir => "--exclude-dir",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Include,
    Exclude,
}

/// A single include/exclude rule. Fields are private so the pattern is
/// always stored in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    kind: RuleKind,
    pattern: String,
}

impl Rule {
    pub fn new(kind: RuleKind, pattern: impl AsRef<str>) -> Self {
        Self {
            kind,
            pattern: normalize_pattern(kind, pattern.as_ref()),
        }
    }

    pub fn include(pattern: impl AsRef<str>) -> Self {
        Self::new(RuleKind::Include, pattern)
    }

    pub fn exclude(pattern: impl AsRef<str>) -> Self {
        Self::new(RuleKind::Exclude, pattern)
    }

    pub fn exclude_dir(pattern: impl AsRef<str>) -> Self {
        Self::new(RuleKind::ExcludeDir, pattern)
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn action(&self) -> Action {
        self.kind.action()
    }

    pub fn is_include(&self) -> bool {
        self.kind == RuleKind::Include
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind.flag(), self.pattern)
    }
}

/// Trims surrounding whitespace and a leading `./`; directory exclusions
/// always end in `/`.
pub fn normalize_pattern(kind: RuleKind, raw: &str) -> String {
    let trimmed = raw.trim();
    let mut pattern = trimmed.strip_prefix("./").unwrap_or(trimmed).to_string();
    if kind == RuleKind::ExcludeDir && !pattern.ends_with('/') {
        pattern.push('/');
    }
    pattern
}

/// Prepends `Exclude("**")` when the first rule is an include, turning an
/// include-led rule list into a whitelist. Returns whether a rule was added.
pub fn apply_implicit_whitelist(rules: &mut Vec<Rule>) -> bool {
    match rules.first() {
        Some(first) if first.is_include() => {
            log::debug!(
                "First rule {} is an include; prepending implicit exclude of '{}'",
                first,
                MATCH_ALL_PATTERN
            );
            rules.insert(0, Rule::exclude(MATCH_ALL_PATTERN));
            true
        }
        _ => false,
    }
}

//! Last-match-wins rule evaluation.
//!
//! Every rule whose pattern matches a path is applied in order, so the last
//! matching rule decides. A path no rule matches keeps its starting action,
//! which is `Include` for ordinary queries.

pub mod pattern;
pub mod tracker;

pub use pattern::{PatternMatcher, expand_braces, normalize_relpath};
pub use tracker::MatchTracker;

use crate::rules::{Action, Rule};
use globset::Glob;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    rules: Vec<Rule>,
    matchers: HashMap<String, PatternMatcher>,
}

impl FilterEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut matchers = HashMap::new();
        for rule in &rules {
            matchers
                .entry(rule.pattern().to_string())
                .or_insert_with(|| PatternMatcher::new(rule.pattern()));
        }
        log::debug!(
            "Filter engine built with {} rules ({} distinct patterns)",
            rules.len(),
            matchers.len()
        );
        Self { rules, matchers }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `pattern` matches the path. Patterns outside the rule list
    /// are compiled on the fly.
    pub fn matches(&self, pattern: &str, relpath: &str, is_dir: bool) -> bool {
        match self.matchers.get(pattern) {
            Some(matcher) => matcher.matches(relpath, is_dir),
            None => PatternMatcher::new(pattern).matches(relpath, is_dir),
        }
    }

    /// Rules matching the path, with their positions, in rule order.
    pub fn matching_rules<'a>(
        &'a self,
        relpath: &'a str,
        is_dir: bool,
    ) -> impl Iterator<Item = (usize, &'a Rule)> + 'a {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, rule)| self.matches(rule.pattern(), relpath, is_dir))
    }

    pub fn effective_action(&self, relpath: &str, is_dir: bool) -> Action {
        self.effective_action_from(relpath, is_dir, Action::Include)
    }

    /// Like [`Self::effective_action`], but starting from `inherited`
    /// instead of `Include`. The walker passes the parent's verdict here
    /// when it descends into a directory that is itself excluded.
    pub fn effective_action_from(&self, relpath: &str, is_dir: bool, inherited: Action) -> Action {
        self.matching_rules(relpath, is_dir)
            .fold(inherited, |_, (_, rule)| rule.action())
    }

    /// Evaluates like [`Self::effective_action_from`] and records every
    /// matching pattern in `tracker`.
    pub fn evaluate(
        &self,
        relpath: &str,
        is_dir: bool,
        inherited: Action,
        tracker: &mut MatchTracker,
    ) -> Action {
        let mut action = inherited;
        for (_, rule) in self.matching_rules(relpath, is_dir) {
            tracker.record(rule.pattern());
            action = rule.action();
        }
        action
    }

    pub fn last_matching_rule(&self, relpath: &str, is_dir: bool) -> Option<usize> {
        self.matching_rules(relpath, is_dir).last().map(|(idx, _)| idx)
    }

    /// Whether an `Include` rule after the one that decided `dir_relpath`
    /// could match something strictly inside it. Errs towards `true`.
    pub fn may_have_late_include_descendant(&self, dir_relpath: &str) -> bool {
        let dir = normalize_relpath(dir_relpath);
        let start = self
            .last_matching_rule(&dir, true)
            .map_or(0, |idx| idx + 1);

        self.rules[start..]
            .iter()
            .filter(|rule| rule.is_include())
            .any(|rule| {
                let could_match = self
                    .alternatives_of(rule.pattern())
                    .iter()
                    .any(|alternative| could_match_descendant(alternative, &dir));
                if could_match {
                    log::trace!("Rule {} may re-include paths under '{}'", rule, dir);
                }
                could_match
            })
    }

    fn alternatives_of(&self, pattern: &str) -> Vec<String> {
        match self.matchers.get(pattern) {
            Some(matcher) => matcher.alternatives().to_vec(),
            None => expand_braces(pattern),
        }
    }
}

/// Structural check of one brace-free pattern against a directory.
/// Returns `false` only when some leading segment of the pattern is a
/// literal (or glob) that cannot match the corresponding segment of `dir`.
fn could_match_descendant(pattern: &str, dir: &str) -> bool {
    if pattern.contains("**") || dir.is_empty() {
        return true;
    }
    let body = pattern.trim_start_matches('/').trim_end_matches('/');
    if body.starts_with(&format!("{dir}/")) || !body.contains('/') {
        return true;
    }

    body.split('/')
        .zip(dir.split('/'))
        .all(|(pattern_segment, dir_segment)| segment_compatible(pattern_segment, dir_segment))
}

fn segment_compatible(pattern_segment: &str, dir_segment: &str) -> bool {
    if !pattern_segment.contains(['*', '?', '[', '{']) {
        return pattern_segment == dir_segment;
    }
    match Glob::new(pattern_segment) {
        Ok(glob) => glob.compile_matcher().is_match(dir_segment),
        Err(_) => true,
    }
}

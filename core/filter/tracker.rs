use crate::rules::Rule;
use indexmap::IndexMap;

/// Counts how often each pattern matched during a walk.
///
/// Kept outside [`super::FilterEngine`] so rule evaluation stays a pure
/// function; the walker feeds it through [`super::FilterEngine::evaluate`].
/// Only meaningful once the walk has finished.
#[derive(Debug, Default, Clone)]
pub struct MatchTracker {
    hits: IndexMap<String, usize>,
}

impl MatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pattern: &str) {
        match self.hits.get_mut(pattern) {
            Some(count) => *count += 1,
            None => {
                self.hits.insert(pattern.to_string(), 1);
            }
        }
    }

    pub fn hits(&self, pattern: &str) -> usize {
        self.hits.get(pattern).copied().unwrap_or(0)
    }

    /// Rules from `rules` whose pattern never matched, in rule order and
    /// without duplicates.
    pub fn unmatched<'r>(&self, rules: &'r [Rule]) -> Vec<&'r Rule> {
        let mut unmatched: Vec<&Rule> = Vec::new();
        for rule in rules {
            if self.hits(rule.pattern()) == 0 && !unmatched.contains(&rule) {
                unmatched.push(rule);
            }
        }
        unmatched
    }
}

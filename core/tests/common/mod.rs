use gpt_copy_core::{FileInfo, FilterEngine, IgnoreSource, MatchTracker, Rule, collect_file_info};
use std::fs;
use tempfile::TempDir;

/// Create a directory structure from a list of relative paths.
/// Paths ending with '/' create directories; others create files whose
/// content is their own path.
pub fn create_fixture(paths: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for p in paths {
        let full = tmp.path().join(p);
        if p.ends_with('/') {
            fs::create_dir_all(&full).unwrap();
        } else {
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, p).unwrap();
        }
    }
    tmp
}

/// Walk with no VCS filtering and return the records plus the tracker.
pub fn walk(tmp: &TempDir, rules: Vec<Rule>) -> (Vec<FileInfo>, MatchTracker) {
    let engine = FilterEngine::new(rules);
    let mut tracker = MatchTracker::new();
    let infos = collect_file_info(tmp.path(), &IgnoreSource::Disabled, &engine, &mut tracker);
    (infos, tracker)
}

pub fn emitted(infos: &[FileInfo]) -> Vec<&str> {
    infos
        .iter()
        .filter(|i| i.is_file())
        .map(|i| i.relative_path.as_str())
        .collect()
}

pub fn record<'a>(infos: &'a [FileInfo], rel: &str) -> Option<&'a FileInfo> {
    infos.iter().find(|i| i.relative_path == rel)
}

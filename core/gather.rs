use crate::filter::{FilterEngine, MatchTracker};
use crate::ignore_source::IgnoreSource;
use crate::rules::Action;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Children shown for an excluded directory.
pub const COMPRESSED_PREVIEW_LIMIT: usize = 3;

/// Display data for an excluded directory: up to
/// [`COMPRESSED_PREVIEW_LIMIT`] child names; `truncated` asks the renderer
/// for an ellipsis line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressedDir {
    pub entries: Vec<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Relative to the scan root, `/`-separated.
    pub relative_path: String,
    pub is_directory: bool,
    /// Set for excluded directories shown as placeholders.
    pub compressed: Option<CompressedDir>,
}

impl FileInfo {
    fn from_entry(entry: DirChild, compressed: Option<CompressedDir>) -> Self {
        Self {
            path: entry.path,
            relative_path: entry.relative_path,
            is_directory: entry.is_dir,
            compressed,
        }
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed.is_some()
    }

    pub fn name(&self) -> &str {
        child_name(&self.relative_path)
    }
}

/// Files whose content should be emitted, in walk order.
pub fn emitted_files(file_infos: &[FileInfo]) -> impl Iterator<Item = &FileInfo> {
    file_infos.iter().filter(|info| info.is_file())
}

/// Walks `root` depth-first and returns every visible record.
///
/// Listing failures are logged and treated as empty directories, so this
/// never fails.
pub fn collect_file_info(
    root: &Path,
    ignore: &IgnoreSource,
    engine: &FilterEngine,
    tracker: &mut MatchTracker,
) -> Vec<FileInfo> {
    Walker::new(root, ignore, engine).collect(tracker)
}

#[derive(Debug)]
struct DirChild {
    path: PathBuf,
    relative_path: String,
    is_dir: bool,
}

enum Frame {
    Visit {
        entry: DirChild,
        inherited: Action,
    },
    /// Runs after the subtree of an excluded-but-traversed directory.
    Leave { record: usize, preview: CompressedDir },
}

pub struct Walker<'a> {
    root: &'a Path,
    ignore: &'a IgnoreSource,
    engine: &'a FilterEngine,
    skip_paths: Vec<PathBuf>,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Path, ignore: &'a IgnoreSource, engine: &'a FilterEngine) -> Self {
        Self {
            root,
            ignore,
            engine,
            skip_paths: Vec::new(),
        }
    }

    /// Never report this path (e.g. the output file being written).
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    /// Explicit-stack equivalent of a recursive pre-order walk: children
    /// are pushed in reverse so they pop in sorted order.
    pub fn collect(&self, tracker: &mut MatchTracker) -> Vec<FileInfo> {
        log::info!("Walking directory: {}", self.root.display());
        let mut records: Vec<FileInfo> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        push_children(&mut stack, self.list_children(self.root, ""), Action::Include);

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit { entry, inherited } => {
                    self.visit(entry, inherited, &mut records, &mut stack, tracker);
                }
                Frame::Leave { record, preview } => {
                    collapse_if_nothing_visible(&mut records, record, preview)
                }
            }
        }

        log::info!(
            "Walk complete: {} visible entries ({} files)",
            records.len(),
            records.iter().filter(|r| r.is_file()).count()
        );
        records
    }

    fn visit(
        &self,
        entry: DirChild,
        inherited: Action,
        records: &mut Vec<FileInfo>,
        stack: &mut Vec<Frame>,
        tracker: &mut MatchTracker,
    ) {
        let action = self
            .engine
            .evaluate(&entry.relative_path, entry.is_dir, inherited, tracker);

        match (entry.is_dir, action) {
            (false, Action::Include) => {
                log::trace!("Including file: {}", entry.relative_path);
                records.push(FileInfo::from_entry(entry, None));
            }
            (false, Action::Exclude) => {
                log::trace!("Excluding file: {}", entry.relative_path);
            }
            (true, Action::Include) => {
                let children = self.list_children(&entry.path, &entry.relative_path);
                records.push(FileInfo::from_entry(entry, None));
                push_children(stack, children, Action::Include);
            }
            (true, Action::Exclude) => {
                if self
                    .engine
                    .may_have_late_include_descendant(&entry.relative_path)
                {
                    log::debug!(
                        "Directory {} is excluded but a later include may apply; traversing",
                        entry.relative_path
                    );
                    let children = self.list_children(&entry.path, &entry.relative_path);
                    stack.push(Frame::Leave {
                        record: records.len(),
                        preview: preview_of(&children),
                    });
                    records.push(FileInfo::from_entry(entry, None));
                    push_children(stack, children, Action::Exclude);
                } else {
                    log::debug!("Compressing excluded directory: {}", entry.relative_path);
                    let children = self.list_children(&entry.path, &entry.relative_path);
                    let preview = preview_of(&children);
                    records.push(FileInfo::from_entry(entry, Some(preview)));
                }
            }
        }
    }

    /// Direct children sorted by name, minus those the ignore source drops.
    fn list_children(&self, dir: &Path, relative_dir: &str) -> Vec<DirChild> {
        let mut children = Vec::new();
        let listing = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry_result in listing {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Could not list {}: {}", dir.display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy();
            let relative_path = if relative_dir.is_empty() {
                name.into_owned()
            } else {
                format!("{relative_dir}/{name}")
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() && !entry.path().is_file() {
                log::trace!("Skipping symlink that is not a file: {}", relative_path);
                continue;
            }
            let is_dir = file_type.is_dir();

            if self.ignore.is_ignored(&relative_path, is_dir) {
                log::trace!("Ignored by {}: {}", self.ignore.describe(), relative_path);
                continue;
            }
            if self.skip_paths.iter().any(|skip| skip == entry.path()) {
                log::debug!("Skipping {}", relative_path);
                continue;
            }

            children.push(DirChild {
                path: entry.into_path(),
                relative_path,
                is_dir,
            });
        }
        children
    }
}

fn push_children(stack: &mut Vec<Frame>, children: Vec<DirChild>, inherited: Action) {
    for entry in children.into_iter().rev() {
        stack.push(Frame::Visit { entry, inherited });
    }
}

/// Preview of a directory's listed children, capped at
/// [`COMPRESSED_PREVIEW_LIMIT`] names.
fn preview_of(children: &[DirChild]) -> CompressedDir {
    CompressedDir {
        entries: children
            .iter()
            .take(COMPRESSED_PREVIEW_LIMIT)
            .map(|child| child_name(&child.relative_path).to_string())
            .collect(),
        truncated: children.len() > COMPRESSED_PREVIEW_LIMIT,
    }
}

/// Turns a traversed excluded directory back into a compressed placeholder
/// when nothing below it besides other placeholders was recorded.
fn collapse_if_nothing_visible(
    records: &mut Vec<FileInfo>,
    record: usize,
    preview: CompressedDir,
) {
    let first_descendant = record + 1;
    let anything_visible = records[first_descendant..]
        .iter()
        .any(|info| !info.is_compressed());
    if anything_visible {
        return;
    }
    records.truncate(first_descendant);
    if let Some(info) = records.get_mut(record) {
        log::debug!("Nothing re-included under {}; compressing", info.relative_path);
        info.compressed = Some(preview);
    }
}

fn child_name(relative_path: &str) -> &str {
    relative_path
        .rsplit_once('/')
        .map_or(relative_path, |(_, name)| name)
}
